/*!
 * Key lifecycle tracking and rotation engine
 *
 * This module holds the durable record of per-key creation/expiry state
 * and the operations built on top of it: expiry checking, rotation
 * (destroy and regenerate under the same name), renewal (extend expiry
 * without touching key material) and reconciliation against the
 * filesystem.
 */

pub mod policy;
pub mod reconcile;
pub mod renewal;
pub mod rotation;
pub mod store;


pub use policy::expired_identities;
pub use policy::is_expired;
pub use reconcile::reconcile;
pub use renewal::renew_keys;
pub use renewal::RenewalOutcome;
pub use rotation::complete_records;
pub use rotation::rotate_keys;
pub use store::default_store_path;
pub use store::KeyRecord;
pub use store::LifecycleStore;
