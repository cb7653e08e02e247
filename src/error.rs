use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for key lifecycle operations
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Persisted store data exists but cannot be decoded
    #[error("corrupt lifecycle store at {path}: {cause}")]
    CorruptStore { path: PathBuf, cause: String },

    /// A record violates the creation-before-expiry invariant
    #[error("invalid record for {identity}: created_at {created_at} is not before expires_at {expires_at}")]
    InvalidRecord {
        identity: String,
        created_at: String,
        expires_at: String,
    },

    /// Exactly one half of a key pair exists on disk
    #[error("mismatched key pair for {identity}: {detail}")]
    PairingError { identity: String, detail: String },

    /// External key generation failed
    #[error("key generation failed for {identity}: {cause}")]
    GenError { identity: String, cause: String },

    /// Cipher name not in the supported set
    #[error("unsupported cipher: {0}")]
    UnsupportedCipher(String),

    /// Malformed duration string
    #[error("invalid duration {input:?}: {cause}")]
    InvalidDuration { input: String, cause: String },

    /// IO Error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type alias for key lifecycle operations
pub type LifecycleResult<T> = Result<T, LifecycleError>;
