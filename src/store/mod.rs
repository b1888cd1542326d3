//! Local key-value persistence.
//!
//! Every slice of panel state lives under its own key and is written and read
//! independently. Values are bincode-encoded behind a format version so that
//! stale files are reported instead of misread.

mod worker;

pub use worker::{PersistEvent, PersistWorker};

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use serde::{de::DeserializeOwned, Serialize};

use crate::error::{NotesError, Result};

pub const NOTES_KEY: &str = "notes";
pub const BG_IMAGE_KEY: &str = "bgImage";
pub const BG_OFFSET_KEY: &str = "bgOffset";
/// Key used by the legacy popup in the synchronized store.
pub const LEGACY_NOTE_KEY: &str = "note";

const STORE_VERSION: u32 = 1;

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;
    fn set(&mut self, key: &str, value: &[u8]) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

pub fn encode<T: Serialize>(key: &str, value: &T) -> Result<Vec<u8>> {
    bincode::serialize(&(STORE_VERSION, value)).map_err(|e| NotesError::store(key, e))
}

pub fn decode<T: DeserializeOwned>(key: &str, bytes: &[u8]) -> Result<T> {
    let (version, value): (u32, T) =
        bincode::deserialize(bytes).map_err(|e| NotesError::store(key, e))?;
    if version != STORE_VERSION {
        return Err(NotesError::store(
            key,
            format!("format version {} (expected {})", version, STORE_VERSION),
        ));
    }
    Ok(value)
}

pub fn load<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Result<Option<T>> {
    match store.get(key)? {
        Some(bytes) => decode(key, &bytes).map(Some),
        None => Ok(None),
    }
}

pub fn save<T: Serialize>(store: &mut dyn KeyValueStore, key: &str, value: &T) -> Result<()> {
    let bytes = encode(key, value)?;
    store.set(key, &bytes)
}

/// One `<key>.bin` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.bin", key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(NotesError::store(key, e)),
        }
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| NotesError::store(key, e))?;
        let path = self.path_for(key);
        let tmp = path.with_extension("bin.tmp");
        let write = || -> std::io::Result<()> {
            let mut file = fs::File::create(&tmp)?;
            file.write_all(value)?;
            file.sync_all()?;
            fs::rename(&tmp, &path)
        };
        write().map_err(|e| NotesError::store(key, e))
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(NotesError::store(key, e)),
        }
    }
}

/// In-memory store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store whose every operation fails.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    fn entries(&self, key: &str) -> Result<std::sync::MutexGuard<'_, HashMap<String, Vec<u8>>>> {
        if self.unavailable {
            return Err(NotesError::store(key, "store offline"));
        }
        self.entries
            .lock()
            .map_err(|_| NotesError::store(key, "store lock poisoned"))
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.entries(key)?.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.entries(key)?.insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries(key)?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::background::Offset;
    use crate::notes::{Note, NoteCollection, NoteColor};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "stickit-test-{}-{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_notes_round_trip_preserves_order_and_fields() {
        let mut notes = NoteCollection::new();
        for text in ["first", "second", "third"] {
            let id = notes.add();
            notes.update_text(&id, text);
        }
        let pinned = notes.notes()[2].id.clone();
        notes.toggle_pin(&pinned);
        let colored = notes.notes()[1].id.clone();
        notes.set_color(&colored, NoteColor::from_index(4).unwrap());

        let mut store = MemoryStore::new();
        save(&mut store, NOTES_KEY, &notes.notes().to_vec()).unwrap();
        let loaded: Vec<Note> = load(&store, NOTES_KEY).unwrap().unwrap();

        assert_eq!(loaded.as_slice(), notes.notes());
    }

    #[test]
    fn test_missing_key_loads_none() {
        let store = MemoryStore::new();
        let loaded: Option<Offset> = load(&store, BG_OFFSET_KEY).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_version_mismatch_is_reported() {
        let bytes = bincode::serialize(&(STORE_VERSION + 1, Offset::new(1, 2))).unwrap();
        let err = decode::<Offset>(BG_OFFSET_KEY, &bytes).unwrap_err();
        assert!(matches!(err, NotesError::StoreUnavailable { .. }));
    }

    #[test]
    fn test_unavailable_store_fails_every_call() {
        let mut store = MemoryStore::unavailable();
        assert!(store.get(NOTES_KEY).is_err());
        assert!(store.set(NOTES_KEY, b"x").is_err());
        assert!(store.remove(NOTES_KEY).is_err());
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let mut a = MemoryStore::new();
        let b = a.clone();
        a.set("k", b"v").unwrap();
        assert_eq!(b.get("k").unwrap(), Some(b"v".to_vec()));
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let dir = scratch_dir("file-store");
        let mut store = FileStore::new(&dir);

        assert_eq!(store.get(BG_OFFSET_KEY).unwrap(), None);
        save(&mut store, BG_OFFSET_KEY, &Offset::new(-4, 9)).unwrap();
        assert!(dir.join("bgOffset.bin").exists());
        assert!(!dir.join("bgOffset.bin.tmp").exists());

        let loaded: Offset = load(&store, BG_OFFSET_KEY).unwrap().unwrap();
        assert_eq!(loaded, Offset::new(-4, 9));

        store.remove(BG_OFFSET_KEY).unwrap();
        store.remove(BG_OFFSET_KEY).unwrap();
        assert_eq!(store.get(BG_OFFSET_KEY).unwrap(), None);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_background_payload_round_trips() {
        let mut store = MemoryStore::new();
        let payload = "data:image/png;base64,iVBORw0KGgo=";
        save(&mut store, BG_IMAGE_KEY, &payload).unwrap();
        let loaded: Option<String> = load(&store, BG_IMAGE_KEY).unwrap();
        assert_eq!(loaded.as_deref(), Some(payload));
    }
}
