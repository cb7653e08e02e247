/*!
 * Persistent lifecycle store for tracked key pairs
 *
 * The store is the durable mapping from a key identity (the filesystem
 * path of a private key) to its creation and expiry timestamps. It is
 * persisted as a versioned JSON document under the user's home directory
 * and rewritten wholesale on every save.
 */

use std::collections::HashMap;
use std::fs;
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LifecycleError, LifecycleResult};

/// Version of the persisted store format
const STORE_FORMAT_VERSION: u8 = 1;

/// Creation and expiry timestamps for a single tracked key pair
///
/// The invariant `created_at < expires_at` (strictly) must hold for a
/// record to be persisted; [`LifecycleStore::save`] rejects the whole
/// store if any record violates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRecord {
    /// When the key pair was generated
    pub created_at: DateTime<Utc>,
    /// When the key pair should be considered expired
    pub expires_at: DateTime<Utc>,
}

impl KeyRecord {
    /// Create a new record from explicit timestamps
    pub fn new(created_at: DateTime<Utc>, expires_at: DateTime<Utc>) -> Self {
        Self {
            created_at,
            expires_at,
        }
    }

    /// Whether the record satisfies the creation-before-expiry invariant
    pub fn is_valid(&self) -> bool {
        self.created_at < self.expires_at
    }
}

/// The set of key pairs currently tracked, keyed by private-key path
///
/// Insertion order is irrelevant and duplicate identities are impossible
/// by construction (map semantics).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleStore {
    /// Version of the store format
    version: u8,
    /// Tracked records, keyed by private-key path
    keys: HashMap<String, KeyRecord>,
}

impl Default for LifecycleStore {
    fn default() -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            keys: HashMap::new(),
        }
    }
}

impl LifecycleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a store from the given path
    ///
    /// A missing or empty file yields an empty store ("no config yet" is
    /// not an error). Bytes that exist but cannot be decoded yield
    /// [`LifecycleError::CorruptStore`]; the file is never auto-repaired.
    pub fn load<P: AsRef<Path>>(path: P) -> LifecycleResult<Self> {
        let path = path.as_ref();

        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Self::new()),
            Err(e) => return Err(LifecycleError::IoError(e)),
        };

        if contents.trim().is_empty() {
            return Ok(Self::new());
        }

        serde_json::from_str(&contents).map_err(|e| LifecycleError::CorruptStore {
            path: path.to_path_buf(),
            cause: e.to_string(),
        })
    }

    /// Save the store to the given path
    ///
    /// Every record is validated first: a single record with
    /// `created_at >= expires_at` aborts the save with
    /// [`LifecycleError::InvalidRecord`] before the file is touched, so
    /// the previous on-disk state survives intact. A successful save is
    /// a whole-file truncate and rewrite with owner-only permissions.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> LifecycleResult<()> {
        self.validate()?;

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let serialized = serde_json::to_string_pretty(self)
            .map_err(|e| LifecycleError::IoError(io::Error::new(ErrorKind::Other, e)))?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        // A fresh store file must never be readable by anyone else, not
        // even between creation and a later chmod.
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(path)?;
        file.write_all(serialized.as_bytes())?;

        // The creation mode does not apply to a pre-existing file;
        // tighten its permissions too.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    /// Check every record against the creation-before-expiry invariant
    pub fn validate(&self) -> LifecycleResult<()> {
        for (identity, record) in &self.keys {
            if !record.is_valid() {
                return Err(LifecycleError::InvalidRecord {
                    identity: identity.clone(),
                    created_at: record.created_at.to_rfc3339(),
                    expires_at: record.expires_at.to_rfc3339(),
                });
            }
        }
        Ok(())
    }

    /// Insert or replace the record for an identity
    pub fn insert(&mut self, identity: impl Into<String>, record: KeyRecord) {
        self.keys.insert(identity.into(), record);
    }

    /// Fold a batch of records into the store, replacing existing entries
    pub fn extend(&mut self, records: HashMap<String, KeyRecord>) {
        self.keys.extend(records);
    }

    /// Remove the record for an identity, returning it if present
    pub fn remove(&mut self, identity: &str) -> Option<KeyRecord> {
        self.keys.remove(identity)
    }

    /// Look up the record for an identity
    pub fn get(&self, identity: &str) -> Option<&KeyRecord> {
        self.keys.get(identity)
    }

    /// Mutable lookup, used by the renewal engine
    pub fn get_mut(&mut self, identity: &str) -> Option<&mut KeyRecord> {
        self.keys.get_mut(identity)
    }

    /// Whether an identity is tracked
    pub fn contains(&self, identity: &str) -> bool {
        self.keys.contains_key(identity)
    }

    /// Iterate over all tracked identities and their records
    pub fn iter(&self) -> impl Iterator<Item = (&String, &KeyRecord)> {
        self.keys.iter()
    }

    /// All tracked identities
    pub fn identities(&self) -> impl Iterator<Item = &String> {
        self.keys.keys()
    }

    /// Number of tracked identities
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Whether the store tracks no identities
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// Default store location: `.keywarden.json` in the user's home directory
pub fn default_store_path() -> PathBuf {
    let mut path = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(".keywarden.json");
    path
}
