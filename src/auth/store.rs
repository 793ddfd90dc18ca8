use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};

use super::credential::Credential;

const CREDENTIAL_FILE: &str = "credentials.toml";

/// Storage abstraction for the persisted session credential.
///
/// A single well-known slot, overwritten wholesale on every `save`. Only the
/// session manager writes to it; last write wins.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Option<Credential>>;
    fn save(&self, credential: &Credential) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Configuration for file-backed credential storage.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
}

impl StoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_keywork_dir()
    }
}

/// File-backed credential store using a single TOML file.
///
/// # Example
/// ```no_run
/// use keywork::auth::{Credential, CredentialStore, FileCredentialStore};
///
/// let store = FileCredentialStore::new_default();
/// let credential = Credential {
///     access_token: "access".to_string(),
///     refresh_token: "refresh".to_string(),
///     subject: "ops@example.com".to_string(),
/// };
/// store.save(&credential)?;
/// # Ok::<(), keywork::error::ClientError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    base_dir: PathBuf,
}

impl FileCredentialStore {
    pub fn new(config: StoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_keywork_dir(),
        }
    }

    fn credential_path(&self) -> PathBuf {
        self.base_dir.join(CREDENTIAL_FILE)
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        Ok(())
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let path = self.credential_path();
        let raw = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(ClientError::Io(err.to_string())),
        };
        let file: CredentialFile = toml::from_str(&raw)?;
        Ok(Some(file.credential))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let path = self.credential_path();
        Self::ensure_parent(&path)?;
        let file = CredentialFile {
            version: 1,
            credential: credential.clone(),
            saved_at: Utc::now(),
        };
        let serialized = toml::to_string(&file)?;
        fs::write(&path, serialized)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match fs::remove_file(self.credential_path()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ClientError::Io(err.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CredentialFile {
    version: u32,
    credential: Credential,
    saved_at: DateTime<Utc>,
}

fn default_keywork_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".keywork"))
        .unwrap_or_else(|| PathBuf::from(".keywork"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileCredentialStore) {
        let dir = TempDir::new().unwrap();
        let store = FileCredentialStore::new(StoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    fn sample_credential() -> Credential {
        Credential {
            access_token: "access".to_string(),
            refresh_token: "refresh".to_string(),
            subject: "ops@example.com".to_string(),
        }
    }

    #[test]
    fn credential_round_trip_works() {
        let (_dir, store) = temp_store();
        store.save(&sample_credential()).unwrap();
        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.access_token, "access");
        assert_eq!(loaded.refresh_token, "refresh");
        assert_eq!(loaded.subject, "ops@example.com");
    }

    #[test]
    fn load_missing_returns_none() {
        let (_dir, store) = temp_store();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn save_overwrites_wholesale() {
        let (_dir, store) = temp_store();
        store.save(&sample_credential()).unwrap();
        let replacement = Credential {
            access_token: "access-2".to_string(),
            refresh_token: "refresh-2".to_string(),
            subject: "other@example.com".to_string(),
        };
        store.save(&replacement).unwrap();
        assert_eq!(store.load().unwrap().unwrap(), replacement);
    }

    #[test]
    fn clear_removes_credential() {
        let (_dir, store) = temp_store();
        store.save(&sample_credential()).unwrap();
        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn clear_missing_is_noop() {
        let (_dir, store) = temp_store();
        store.clear().unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let (dir, store) = temp_store();
        store.save(&sample_credential()).unwrap();
        let meta = fs::metadata(dir.path().join(CREDENTIAL_FILE)).unwrap();
        assert_eq!(meta.permissions().mode() & 0o777, 0o600);
    }
}
