// File: ./src/storage.rs
// Locked, atomic file helpers shared by the session store and the config.
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

pub struct DiskStore;

impl DiskStore {
    /// Helper to get a sidecar lock file path (`session.json` -> `session.json.lock`).
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on the sidecar lock file.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .with_context(|| format!("Failed to open lock file: {:?}", lock_path))?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads and parses a JSON file under its lock. A missing file yields `None`.
    pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
        if !path.exists() {
            return Ok(None);
        }
        Self::with_lock(path, || {
            let json = fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let value = serde_json::from_str(&json)
                .with_context(|| format!("Failed to parse {}", path.display()))?;
            Ok(Some(value))
        })
    }

    pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
        Self::with_lock(path, || {
            let json = serde_json::to_string_pretty(value)?;
            Self::atomic_write(path, json)
        })
    }

    /// Removes `path` under its lock. Removing a file that does not exist is not an error.
    pub fn remove(path: &Path) -> Result<()> {
        if !path.exists() {
            return Ok(());
        }
        Self::with_lock(path, || {
            match fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{AppContext, TestContext};
    use serde::Deserialize;

    #[derive(Serialize, Deserialize, Debug, PartialEq)]
    struct Sample {
        value: String,
    }

    #[test]
    fn lock_path_appends_suffix() {
        let p = DiskStore::get_lock_path(Path::new("/tmp/session.json"));
        assert_eq!(p, PathBuf::from("/tmp/session.json.lock"));
        let bare = DiskStore::get_lock_path(Path::new("/tmp/session"));
        assert_eq!(bare, PathBuf::from("/tmp/session.lock"));
    }

    #[test]
    fn json_write_read_remove() {
        let ctx = TestContext::new();
        let path = ctx.get_data_dir().unwrap().join("sample.json");

        assert!(DiskStore::read_json::<Sample>(&path).unwrap().is_none());

        let sample = Sample {
            value: "abc".to_string(),
        };
        DiskStore::write_json(&path, &sample).unwrap();
        assert_eq!(DiskStore::read_json::<Sample>(&path).unwrap(), Some(sample));
        assert!(!path.with_extension("tmp").exists());

        DiskStore::remove(&path).unwrap();
        assert!(!path.exists());
        // Second removal is a no-op
        DiskStore::remove(&path).unwrap();
    }
}
