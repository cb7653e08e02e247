/*!
 * Key generation collaborators
 *
 * The lifecycle engines never handle key material themselves. They call
 * a [`KeyGenerator`], a capability that (re)creates a private/public key
 * pair at a path, atomically from the caller's point of view: either
 * both files exist afterwards or an error is returned. The production
 * implementation shells out to ssh-keygen(1); tests inject a fake.
 */

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::{LifecycleError, LifecycleResult};

pub mod ssh;

pub use ssh::SshKeygen;

/// Ciphers supported for key generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cipher {
    /// Ed25519 keys
    Ed25519,
    /// RSA keys, 4096 bits
    Rsa,
    /// ECDSA keys, 521-bit curve
    Ecdsa,
}

impl Cipher {
    /// Name in the form ssh-keygen's `-t` flag expects
    pub fn name(&self) -> &'static str {
        match self {
            Cipher::Ed25519 => "ed25519",
            Cipher::Rsa => "rsa",
            Cipher::Ecdsa => "ecdsa",
        }
    }

    /// Key size in bits, for ciphers that take one
    pub fn key_bits(&self) -> Option<u32> {
        match self {
            Cipher::Ed25519 => None,
            Cipher::Rsa => Some(4096),
            Cipher::Ecdsa => Some(521),
        }
    }
}

impl fmt::Display for Cipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cipher {
    type Err = LifecycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ed25519" => Ok(Cipher::Ed25519),
            "rsa" => Ok(Cipher::Rsa),
            "ecdsa" => Ok(Cipher::Ecdsa),
            other => Err(LifecycleError::UnsupportedCipher(other.to_string())),
        }
    }
}

/// Capability to (re)generate a key pair on disk
pub trait KeyGenerator {
    /// Create a fresh private key at `path` and its public half at
    /// `path.pub`, protected by `passphrase`
    fn generate(&self, path: &Path, cipher: Cipher, passphrase: &str) -> LifecycleResult<()>;
}
