//! Pure expiry predicates over lifecycle records.

use chrono::{DateTime, Utc};

use super::store::{KeyRecord, LifecycleStore};

/// Whether a record counts as expired at `now`
///
/// Non-strict: a key expiring exactly at `now` is expired.
pub fn is_expired(record: &KeyRecord, now: DateTime<Utc>) -> bool {
    now >= record.expires_at
}

/// All identities in the store whose record is expired at `now`
///
/// Order is unspecified; callers that display the result may sort it.
pub fn expired_identities(store: &LifecycleStore, now: DateTime<Utc>) -> Vec<String> {
    store
        .iter()
        .filter(|(_, record)| is_expired(record, now))
        .map(|(identity, _)| identity.clone())
        .collect()
}
