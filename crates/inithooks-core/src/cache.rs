//! Flat key/value answer cache: one file per key, plain text value. First
//! boot scripts record the answers a wizard collected so later hooks (and
//! re-runs) can read them back. No locking, no schema.

use std::fs;
use std::os::unix::fs::DirBuilderExt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Default cache directory, overridable via `INITHOOKS_CACHE`.
pub const DEFAULT_CACHE_DIR: &str = "/var/lib/inithooks/cache";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("invalid cache key '{0}'")]
    InvalidKey(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub struct KeyStore {
    cache_dir: PathBuf,
}

impl KeyStore {
    /// Open the cache at `cache_dir`, creating it (mode 0755) if missing.
    pub fn new<P: AsRef<Path>>(cache_dir: P) -> Result<Self, CacheError> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        if !cache_dir.is_dir() {
            fs::DirBuilder::new()
                .recursive(true)
                .mode(0o755)
                .create(&cache_dir)?;
        }
        Ok(Self { cache_dir })
    }

    fn keypath(&self, key: &str) -> Result<PathBuf, CacheError> {
        // Keys are file names; anything that could escape the cache
        // directory is rejected.
        if key.is_empty() || key.contains('/') || key == "." || key == ".." {
            return Err(CacheError::InvalidKey(key.to_string()));
        }
        Ok(self.cache_dir.join(key))
    }

    /// Value of `key`, or `None` if it was never written.
    pub fn read(&self, key: &str) -> Result<Option<String>, CacheError> {
        let keypath = self.keypath(key)?;
        if !keypath.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(keypath)?))
    }

    /// Set `key` to `val`, overwriting any previous value.
    pub fn write(&self, key: &str, val: &str) -> Result<(), CacheError> {
        let keypath = self.keypath(key)?;
        fs::write(keypath, val)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn read_write_round_trip() {
        let dir = tempdir().unwrap();
        let store = KeyStore::new(dir.path()).unwrap();

        assert!(store.read("domain").unwrap().is_none());
        store.write("domain", "www.example.com\n").unwrap();
        assert_eq!(
            store.read("domain").unwrap().as_deref(),
            Some("www.example.com\n")
        );

        store.write("domain", "other").unwrap();
        assert_eq!(store.read("domain").unwrap().as_deref(), Some("other"));
    }

    #[test]
    fn creates_missing_cache_dir() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("var/lib/inithooks/cache");
        let store = KeyStore::new(&nested).unwrap();
        store.write("key", "value").unwrap();
        assert!(nested.join("key").is_file());
    }

    #[test]
    fn rejects_path_separator_keys() {
        let dir = tempdir().unwrap();
        let store = KeyStore::new(dir.path()).unwrap();
        assert!(matches!(
            store.write("../escape", "x"),
            Err(CacheError::InvalidKey(_))
        ));
        assert!(matches!(store.read("a/b"), Err(CacheError::InvalidKey(_))));
        assert!(matches!(store.read(""), Err(CacheError::InvalidKey(_))));
    }
}
