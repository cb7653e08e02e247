/*!
 * Renewal engine: extend expiry without touching key material
 *
 * Renewal advances `expires_at` by a caller-supplied extension and
 * leaves both `created_at` and the key files on disk untouched. It
 * never mutates the filesystem.
 */

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use super::store::{KeyRecord, LifecycleStore};

/// What a renewal pass did
#[derive(Debug, Default)]
pub struct RenewalOutcome {
    /// Identities that were renewed, with their updated records
    pub renewed: HashMap<String, KeyRecord>,
    /// Identities named explicitly but absent from the store
    pub missing: Vec<String>,
}

/// Extend the expiry of the given identities by `extension`
///
/// Identities absent from the store are reported in
/// [`RenewalOutcome::missing`] rather than silently dropped, so the
/// caller can warn the user. The caller chooses the identity set; the
/// CLI defaults to every currently-expired identity when none are named.
pub fn renew_keys(
    store: &mut LifecycleStore,
    identities: &[String],
    extension: Duration,
) -> RenewalOutcome {
    let mut outcome = RenewalOutcome::default();

    for identity in identities {
        match store.get_mut(identity) {
            Some(record) => {
                // Saturate instead of panicking when the extension pushes
                // past chrono's representable range.
                record.expires_at = record
                    .expires_at
                    .checked_add_signed(extension)
                    .unwrap_or(DateTime::<Utc>::MAX_UTC);
                outcome.renewed.insert(identity.clone(), *record);
            }
            None => outcome.missing.push(identity.clone()),
        }
    }

    outcome
}
