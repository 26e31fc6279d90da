//! Key-value backends for the session. `MemoryStore` lives for the process only;
//! `FileStore` persists a flat JSON object on disk and plays the role of the
//! browser's origin-scoped storage. Both are synchronous.

use super::SessionError;
use std::{
    collections::BTreeMap,
    fmt, fs,
    io::{ErrorKind, Write},
    path::{Path, PathBuf},
    sync::{Mutex, MutexGuard, PoisonError},
};
use tracing::{debug, warn};

/// Synchronous string key-value storage.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    /// # Errors
    /// Returns an error if the value cannot be persisted.
    fn set(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// # Errors
    /// Returns an error if the removal cannot be persisted.
    fn remove(&self, key: &str) -> Result<(), SessionError>;

    /// Remove every key.
    ///
    /// # Errors
    /// Returns an error if the cleared state cannot be persisted.
    fn clear(&self) -> Result<(), SessionError>;
}

type Entries = BTreeMap<String, String>;

fn lock(entries: &Mutex<Entries>) -> MutexGuard<'_, Entries> {
    // A poisoned map is still a valid map; keep serving it.
    entries.lock().unwrap_or_else(PoisonError::into_inner)
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Entries>,
}

// Values are credentials; only the keys are shown.
impl fmt::Debug for MemoryStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStore")
            .field("keys", &lock(&self.entries).keys().collect::<Vec<_>>())
            .finish()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        lock(&self.entries).insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        lock(&self.entries).remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        lock(&self.entries).clear();
        Ok(())
    }
}

/// JSON-file backed store. Every mutation is written through, and the in-memory
/// map only changes once the write succeeded. The file is readable by its owner only.
pub struct FileStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl fmt::Debug for FileStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileStore")
            .field("path", &self.path)
            .field("keys", &lock(&self.entries).keys().collect::<Vec<_>>())
            .finish()
    }
}

impl FileStore {
    /// Opens the store at `path`. A missing file is an empty store; an unreadable
    /// or malformed one is also treated as empty so a damaged file reads as logged out.
    ///
    /// # Errors
    /// Returns an error if the parent directory cannot be created.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let entries = load(&path);
        debug!("session file {} holds {} keys", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Writes `entries` to a sibling temp file (mode 0o600) and renames it over the store.
    fn persist(&self, entries: &Entries) -> Result<(), SessionError> {
        let payload = serde_json::to_vec_pretty(entries)?;
        let tmp = self.path.with_extension("tmp");

        {
            let mut options = fs::OpenOptions::new();
            options.write(true).create(true).truncate(true);
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;
                options.mode(0o600);
            }
            let mut file = options.open(&tmp)?;
            file.write_all(&payload)?;
        }

        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    /// Persists the edited copy, then swaps it in. On error nothing changes.
    fn update(&self, edit: impl FnOnce(&mut Entries) -> bool) -> Result<(), SessionError> {
        let mut entries = lock(&self.entries);
        let mut next = entries.clone();
        if !edit(&mut next) {
            return Ok(());
        }
        self.persist(&next)?;
        *entries = next;
        Ok(())
    }
}

fn load(path: &Path) -> Entries {
    match fs::read(path) {
        Ok(raw) => serde_json::from_slice(&raw).unwrap_or_else(|err| {
            warn!("ignoring malformed session file {}: {err}", path.display());
            Entries::new()
        }),
        Err(err) if err.kind() == ErrorKind::NotFound => Entries::new(),
        Err(err) => {
            warn!("ignoring unreadable session file {}: {err}", path.display());
            Entries::new()
        }
    }
}

impl SessionStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.update(|entries| {
            entries.insert(key.to_string(), value.to_string());
            true
        })
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.update(|entries| entries.remove(key).is_some())
    }

    fn clear(&self) -> Result<(), SessionError> {
        self.update(|entries| {
            entries.clear();
            true
        })
    }
}
