//! ssh-keygen(1) backed key generation.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use crate::error::{LifecycleError, LifecycleResult};

use super::{Cipher, KeyGenerator};

/// Key generator that invokes the ssh-keygen binary
#[derive(Debug, Clone)]
pub struct SshKeygen {
    /// Rounds passed to ssh-keygen's `-a` KDF flag
    kdf_rounds: u32,
}

impl Default for SshKeygen {
    fn default() -> Self {
        Self { kdf_rounds: 100 }
    }
}

impl SshKeygen {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Remove a file, treating "already gone" as success
fn remove_if_present(path: &Path) -> LifecycleResult<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(LifecycleError::IoError(e)),
    }
}

impl KeyGenerator for SshKeygen {
    fn generate(&self, path: &Path, cipher: Cipher, passphrase: &str) -> LifecycleResult<()> {
        let identity = path.display().to_string();
        let public_path = public_key_path(path);

        // Stale files would make ssh-keygen prompt for confirmation.
        remove_if_present(path)?;
        remove_if_present(Path::new(&public_path))?;

        let mut command = Command::new("ssh-keygen");
        command
            .arg("-q")
            .arg("-t")
            .arg(cipher.name())
            .arg("-N")
            .arg(passphrase)
            .arg("-f")
            .arg(path)
            .arg("-a")
            .arg(self.kdf_rounds.to_string());
        if let Some(bits) = cipher.key_bits() {
            command.arg("-b").arg(bits.to_string());
        }

        debug!(%identity, cipher = %cipher, "invoking ssh-keygen");
        let output = command.output().map_err(|e| LifecycleError::GenError {
            identity: identity.clone(),
            cause: format!("failed to run ssh-keygen: {}", e),
        })?;

        if !output.status.success() {
            return Err(LifecycleError::GenError {
                identity,
                cause: format!(
                    "ssh-keygen exited with {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        // ssh-keygen reported success; make sure both halves actually landed.
        if !path.exists() {
            return Err(LifecycleError::GenError {
                identity,
                cause: "private key was not created".to_string(),
            });
        }
        if !Path::new(&public_path).exists() {
            return Err(LifecycleError::GenError {
                identity,
                cause: "public key was not created".to_string(),
            });
        }

        info!(%identity, cipher = %cipher, "generated new key pair");
        Ok(())
    }
}

/// Conventional public-key path for a private key: the same path + `.pub`
pub fn public_key_path(private: &Path) -> String {
    format!("{}.pub", private.display())
}
