/*!
 * Reconciliation pass: drop store entries with no backing file
 *
 * The store is the authority for expiry state and the filesystem is the
 * authority for whether key material exists; the two can drift when keys
 * are removed or created outside this tool. Reconciliation runs once per
 * invocation, before any other operation, and filters out entries whose
 * private-key file no longer exists.
 */

use std::fs;
use std::io::ErrorKind;

use tracing::{debug, warn};

use super::store::LifecycleStore;

/// Return a copy of the store without entries whose file is gone
///
/// A stat failure other than NotFound (for example permission denied)
/// conservatively keeps the entry and logs a warning; a single odd entry
/// must not abort the whole pass. Idempotent while the filesystem is
/// unchanged.
pub fn reconcile(store: &LifecycleStore) -> LifecycleStore {
    let mut reconciled = LifecycleStore::new();

    for (identity, record) in store.iter() {
        match fs::metadata(identity) {
            Ok(_) => reconciled.insert(identity.clone(), *record),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(%identity, "dropping entry: backing file no longer exists");
            }
            Err(e) => {
                warn!(%identity, error = %e, "could not stat backing file, keeping entry");
                reconciled.insert(identity.clone(), *record);
            }
        }
    }

    reconciled
}
