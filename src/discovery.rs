/*!
 * Discovery of private keys in the key directory
 *
 * When no explicit subset of identities is given, the engines operate on
 * every private key found in the configured key directory (conventionally
 * `~/.ssh`). Deciding what counts as a private key is policy, not
 * mechanism, so the filter is table-driven and configurable rather than
 * hard-coded.
 */

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::LifecycleResult;

/// Table-driven filter for private-key file names
#[derive(Debug, Clone)]
pub struct ScanFilter {
    /// Names containing any of these substrings are not keys
    pub exclude_substrings: Vec<String>,
    /// Suffix denoting a public key
    pub public_suffix: String,
    /// Prefix denoting a hidden file
    pub hidden_prefix: String,
}

impl Default for ScanFilter {
    /// Defaults tuned for an OpenSSH key directory
    fn default() -> Self {
        Self {
            exclude_substrings: vec![
                "authorized_keys".to_string(),
                "known_hosts".to_string(),
                "config".to_string(),
            ],
            public_suffix: ".pub".to_string(),
            hidden_prefix: ".".to_string(),
        }
    }
}

impl ScanFilter {
    /// Whether a file name looks like a private key
    pub fn is_private_key(&self, name: &str) -> bool {
        if name.ends_with(&self.public_suffix) || name.starts_with(&self.hidden_prefix) {
            return false;
        }
        !self
            .exclude_substrings
            .iter()
            .any(|excluded| name.contains(excluded.as_str()))
    }
}

/// List all private keys in `dir`, as full paths
pub fn discover_private_keys(dir: &Path, filter: &ScanFilter) -> LifecycleResult<Vec<String>> {
    let mut keys = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        // Path::is_dir follows symlinks, so a symlink to a directory is
        // skipped like the directory itself would be.
        if entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if filter.is_private_key(&name) {
            keys.push(entry.path().display().to_string());
        }
    }

    Ok(keys)
}

/// Default key directory: `.ssh` in the user's home directory
pub fn default_key_dir() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".ssh");
    path
}

/// Create the key directory with owner-only permissions if it is missing
pub fn ensure_key_dir(dir: &Path) -> LifecycleResult<()> {
    if dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(dir, fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_filter_skips_non_key_files() {
        let filter = ScanFilter::default();
        assert!(filter.is_private_key("id_ed25519"));
        assert!(filter.is_private_key("work_key"));
        assert!(!filter.is_private_key("id_ed25519.pub"));
        assert!(!filter.is_private_key("authorized_keys"));
        assert!(!filter.is_private_key("known_hosts"));
        assert!(!filter.is_private_key("known_hosts.old"));
        assert!(!filter.is_private_key("config"));
        assert!(!filter.is_private_key(".hidden"));
    }

    #[test]
    fn test_discover_lists_only_private_keys() {
        let dir = tempdir().unwrap();
        for name in ["id_ed25519", "id_ed25519.pub", "known_hosts", ".profile"] {
            fs::write(dir.path().join(name), b"x").unwrap();
        }
        fs::create_dir(dir.path().join("subdir")).unwrap();

        let keys = discover_private_keys(dir.path(), &ScanFilter::default()).unwrap();
        assert_eq!(keys, vec![dir.path().join("id_ed25519").display().to_string()]);
    }

    #[cfg(unix)]
    #[test]
    fn test_discover_skips_symlinked_directories() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("real_dir")).unwrap();
        std::os::unix::fs::symlink(dir.path().join("real_dir"), dir.path().join("linked_dir"))
            .unwrap();
        fs::write(dir.path().join("id_ed25519"), b"x").unwrap();

        let keys = discover_private_keys(dir.path(), &ScanFilter::default()).unwrap();
        assert_eq!(keys, vec![dir.path().join("id_ed25519").display().to_string()]);
    }

    #[test]
    fn test_custom_filter_table() {
        let filter = ScanFilter {
            exclude_substrings: vec!["backup".to_string()],
            public_suffix: ".pub".to_string(),
            hidden_prefix: ".".to_string(),
        };
        assert!(!filter.is_private_key("key_backup"));
        assert!(filter.is_private_key("authorized_keys"));
    }
}
