/*!
 * keywarden: SSH key lifecycle tracking and rotation
 *
 * ssh-keygen can create keys but has no notion of when they should stop
 * being used. keywarden keeps a durable record of when each tracked key
 * pair was created and when it expires, detects expiry, and drives two
 * corrective workflows:
 *
 * - rotation: delete and regenerate a key pair under the same name,
 *   resetting both creation and expiry timestamps
 * - renewal: push the expiry timestamp forward without touching key
 *   material
 *
 * The lifecycle store is the sole authority for expiry state while the
 * filesystem is the sole authority for whether key material exists; a
 * reconciliation pass drops tracked entries whose files were removed
 * behind the tool's back.
 *
 * Intended use is one CLI invocation at a time by a single local user.
 * There is no inter-process locking on the store file: concurrent
 * invocations race with whole-file last-writer-wins semantics.
 */

/// Discovery of private keys in the key directory
pub mod discovery;

/// Parsing for the CLI duration grammar
pub mod duration;

/// Common error types for lifecycle operations
pub mod error;

/// Key generation collaborators (ssh-keygen and injectable fakes)
pub mod keygen;

/// The lifecycle store and the engines built on top of it
pub mod lifecycle;

// Re-export main types for convenience
pub use discovery::ScanFilter;
pub use error::LifecycleError;
pub use error::LifecycleResult;
pub use keygen::Cipher;
pub use keygen::KeyGenerator;
pub use keygen::SshKeygen;
pub use lifecycle::KeyRecord;
pub use lifecycle::LifecycleStore;
pub use lifecycle::RenewalOutcome;
