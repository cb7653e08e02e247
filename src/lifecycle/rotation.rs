/*!
 * Rotation engine: destroy and regenerate key pairs under the same name
 *
 * Rotation is destructive. For each identity the old private and public
 * key files are deleted and a fresh pair is generated at the same path;
 * the engine records the new creation timestamps and the caller derives
 * expiry timestamps from them with [`complete_records`]. Any failure
 * aborts the whole batch so that no partial result is ever folded into
 * the lifecycle store. Key files already deleted when the batch aborts
 * are not restored; there is no implicit backup of old key material.
 */

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::error::{LifecycleError, LifecycleResult};
use crate::keygen::ssh::public_key_path;
use crate::keygen::{Cipher, KeyGenerator};

use super::store::KeyRecord;

/// Delete both halves of a key pair
///
/// Exactly one half present on disk is an inconsistent pair state and is
/// surfaced as [`LifecycleError::PairingError`] rather than silently
/// papered over. Both halves absent is fine: rotation may be adopting a
/// name that was never generated.
fn delete_key_pair(identity: &str) -> LifecycleResult<()> {
    let private = Path::new(identity);
    let public = public_key_path(private);
    let public = Path::new(&public);

    let have_private = private.exists();
    let have_public = public.exists();

    match (have_private, have_public) {
        (true, true) => {
            fs::remove_file(private)?;
            fs::remove_file(public)?;
            Ok(())
        }
        (false, false) => Ok(()),
        (true, false) => Err(LifecycleError::PairingError {
            identity: identity.to_string(),
            detail: "private key exists but public key is missing".to_string(),
        }),
        (false, true) => Err(LifecycleError::PairingError {
            identity: identity.to_string(),
            detail: "public key exists but private key is missing".to_string(),
        }),
    }
}

/// Rotate the given identities, returning fresh creation timestamps
///
/// The caller decides which identities to act on; this engine does not
/// check expiry. Identities are processed sequentially and the first
/// error aborts the whole rotation.
pub fn rotate_keys<G: KeyGenerator>(
    generator: &G,
    identities: &[String],
    cipher: Cipher,
    passphrase: &str,
) -> LifecycleResult<HashMap<String, DateTime<Utc>>> {
    let mut creation_times = HashMap::with_capacity(identities.len());

    for identity in identities {
        debug!(%identity, "rotating key pair");
        delete_key_pair(identity)?;
        generator.generate(Path::new(identity), cipher, passphrase)?;
        creation_times.insert(identity.clone(), Utc::now());
    }

    Ok(creation_times)
}

/// Derive full lifecycle records from creation timestamps and a horizon
///
/// `expires_at = created_at + horizon` for every entry. Pure and total;
/// kept separate from [`rotate_keys`] so expiry policy never touches
/// key-generation mechanics.
pub fn complete_records(
    creation_times: &HashMap<String, DateTime<Utc>>,
    horizon: Duration,
) -> HashMap<String, KeyRecord> {
    creation_times
        .iter()
        .map(|(identity, &created_at)| {
            let expires_at = created_at
                .checked_add_signed(horizon)
                .unwrap_or(DateTime::<Utc>::MAX_UTC);
            (identity.clone(), KeyRecord::new(created_at, expires_at))
        })
        .collect()
}
