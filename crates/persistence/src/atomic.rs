use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;

use cb_domain::error::{Error, Result};

/// A JSON document backed by one file, with an in-memory mirror guarded by
/// a single mutex. Readers and writers within the process share this one
/// lock; at chat-message rates contention is negligible (§5).
pub struct AtomicJsonStore<T> {
    path: PathBuf,
    mirror: Mutex<T>,
}

impl<T> AtomicJsonStore<T>
where
    T: Serialize + DeserializeOwned + Default + Clone,
{
    /// Load from `path`, failing with `CorruptState` if the file exists but
    /// does not parse. Used for the catalog, which must be seeded before the
    /// engine can run.
    pub fn load_required(path: PathBuf, club_id: &str) -> Result<Self> {
        let raw = fs::read_to_string(&path).map_err(Error::Io)?;
        let value: T = serde_json::from_str(&raw).map_err(|e| Error::CorruptState {
            club_id: club_id.to_owned(),
            message: e.to_string(),
        })?;
        Ok(Self { path, mirror: Mutex::new(value) })
    }

    /// Load from `path`, tolerating a missing file by starting from
    /// `T::default()`. Used for round state, which is created lazily.
    pub fn load_or_default(path: PathBuf, club_id: &str) -> Result<Self> {
        if !path.exists() {
            return Ok(Self { path, mirror: Mutex::new(T::default()) });
        }
        Self::load_required(path, club_id)
    }

    /// A clone of the current in-memory value.
    pub fn snapshot(&self) -> T {
        self.mirror.lock().clone()
    }

    /// Mutate the in-memory mirror and persist it atomically before
    /// returning. If `f` errors, the mirror still holds the attempted
    /// mutation (callers that need all-or-nothing semantics should clone
    /// the snapshot, mutate the clone, then call `replace`).
    pub fn mutate<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&mut T) -> Result<R>,
    {
        let mut guard = self.mirror.lock();
        let result = f(&mut guard)?;
        write_atomic(&self.path, &*guard)?;
        Ok(result)
    }

    /// Replace the in-memory value wholesale and persist it.
    pub fn replace(&self, value: T) -> Result<()> {
        let mut guard = self.mirror.lock();
        *guard = value;
        write_atomic(&self.path, &*guard)
    }
}

/// Serialize `value` to a sibling temp file, then atomically rename it over
/// `path`. A reader opening `path` at any point either sees the old
/// contents in full or the new contents in full — never a partial write.
fn write_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(Error::Io)?;

    let json = serde_json::to_string_pretty(value).map_err(Error::Json)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(Error::Io)?;
    tmp.write_all(json.as_bytes()).map_err(Error::Io)?;
    tmp.flush().map_err(Error::Io)?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
    struct Doc {
        n: u32,
    }

    #[test]
    fn missing_file_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store: AtomicJsonStore<Doc> =
            AtomicJsonStore::load_or_default(dir.path().join("state.json"), "club1").unwrap();
        assert_eq!(store.snapshot(), Doc::default());
    }

    #[test]
    fn required_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let result: Result<AtomicJsonStore<Doc>> =
            AtomicJsonStore::load_required(dir.path().join("catalog.json"), "club1");
        assert!(result.is_err());
    }

    #[test]
    fn corrupt_json_is_corrupt_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        fs::write(&path, "not json").unwrap();
        match AtomicJsonStore::<Doc>::load_required(path, "club1") {
            Err(Error::CorruptState { club_id, .. }) => assert_eq!(club_id, "club1"),
            other => panic!("expected CorruptState, got {other:?}"),
        }
    }

    #[test]
    fn mutate_persists_and_is_visible_without_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store: AtomicJsonStore<Doc> = AtomicJsonStore::load_or_default(path.clone(), "club1").unwrap();

        store.mutate(|doc| {
            doc.n = 7;
            Ok(())
        }).unwrap();

        assert_eq!(store.snapshot(), Doc { n: 7 });

        let raw = fs::read_to_string(&path).unwrap();
        let on_disk: Doc = serde_json::from_str(&raw).unwrap();
        assert_eq!(on_disk, Doc { n: 7 });
    }

    #[test]
    fn mutate_error_does_not_persist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        let store: AtomicJsonStore<Doc> = AtomicJsonStore::load_or_default(path.clone(), "club1").unwrap();

        let result: Result<()> = store.mutate(|_doc| Err(Error::NotFound("x".into())));
        assert!(result.is_err());
        assert!(!path.exists());
    }
}
