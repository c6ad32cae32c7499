//! Key-value registers
//!
//! The ephemeral session register lives as long as the hosting process (one browser tab).
//! The durable intent register is a JSON file that survives process termination. Both are
//! injected as [`KeyValueRegister`] ports rather than reached through globals.
//!
//! Register operations are synchronous: they run inside page-lifecycle handlers, where
//! asynchronous work may never complete.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::RegisterError;

pub trait KeyValueRegister: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, RegisterError>;
    fn set(&self, key: &str, value: &str) -> Result<(), RegisterError>;
    fn remove(&self, key: &str) -> Result<(), RegisterError>;
}

/// Process-local register
#[derive(Debug, Default)]
pub struct MemoryRegister {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryRegister {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueRegister for MemoryRegister {
    fn get(&self, key: &str) -> Result<Option<String>, RegisterError> {
        let entries = self.entries.lock().map_err(|_| RegisterError::Poisoned)?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RegisterError> {
        let mut entries = self.entries.lock().map_err(|_| RegisterError::Poisoned)?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), RegisterError> {
        let mut entries = self.entries.lock().map_err(|_| RegisterError::Poisoned)?;
        entries.remove(key);
        Ok(())
    }
}

/// Register persisted as a JSON object in a single file.
///
/// Every write replaces the file atomically (temp file in the same directory, then rename),
/// so a crash mid-write leaves either the old or the new contents.
#[derive(Debug)]
pub struct FileRegister {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileRegister {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, RegisterError> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) if content.trim().is_empty() => Ok(HashMap::new()),
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, entries: &HashMap<String, String>) -> Result<(), RegisterError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        std::fs::create_dir_all(&dir)?;

        let mut file = tempfile::NamedTempFile::new_in(&dir)?;
        file.write_all(serde_json::to_string_pretty(entries)?.as_bytes())?;
        file.as_file().sync_all()?;
        file.persist(&self.path)?;
        Ok(())
    }

    fn update<F>(&self, f: F) -> Result<(), RegisterError>
    where
        F: FnOnce(&mut HashMap<String, String>) -> bool,
    {
        let _guard = self.lock.lock().map_err(|_| RegisterError::Poisoned)?;
        let mut entries = self.load()?;
        if f(&mut entries) {
            self.store(&entries)?;
        }
        Ok(())
    }
}

impl KeyValueRegister for FileRegister {
    fn get(&self, key: &str) -> Result<Option<String>, RegisterError> {
        let _guard = self.lock.lock().map_err(|_| RegisterError::Poisoned)?;
        Ok(self.load()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), RegisterError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), RegisterError> {
        self.update(|entries| entries.remove(key).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_register_set_get_remove() {
        let register = MemoryRegister::new();
        assert_eq!(register.get("k").unwrap(), None);

        register.set("k", "v1").unwrap();
        register.set("k", "v2").unwrap();
        assert_eq!(register.get("k").unwrap().as_deref(), Some("v2"));

        register.remove("k").unwrap();
        register.remove("k").unwrap();
        assert_eq!(register.get("k").unwrap(), None);
    }

    #[test]
    fn test_file_register_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("registers.json");

        let register = FileRegister::new(&path);
        register.set("pending_purge", "session_1_abc").unwrap();
        register.set("other", "x").unwrap();
        drop(register);

        let reopened = FileRegister::new(&path);
        assert_eq!(
            reopened.get("pending_purge").unwrap().as_deref(),
            Some("session_1_abc")
        );

        reopened.remove("pending_purge").unwrap();
        assert_eq!(FileRegister::new(&path).get("pending_purge").unwrap(), None);
        assert_eq!(FileRegister::new(&path).get("other").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_file_register_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let register = FileRegister::new(dir.path().join("absent.json"));
        assert_eq!(register.get("anything").unwrap(), None);
        register.remove("anything").unwrap();
        assert!(!register.path().exists());
    }

    #[test]
    fn test_file_register_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registers.json");
        std::fs::write(&path, "not json").unwrap();

        let register = FileRegister::new(&path);
        assert!(matches!(
            register.get("k"),
            Err(RegisterError::Serialization(_))
        ));
    }
}
