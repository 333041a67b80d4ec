use crate::core::bill::Bill;
use crate::core::participant::Roster;
use crate::store::{BillStore, RosterStore, StoreError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const BILLS_FILE: &str = "bills.json";
const ACTIVE_INDEX_FILE: &str = "last_active_index.json";
const PARTICIPANTS_FILE: &str = "participants.json";

/// Stores each collection as a pretty-printed JSON file in one directory.
///
/// Missing files read as empty. Writes go to a temporary file that is then
/// renamed over the target, so a crash mid-write leaves the old file intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    /// Use `dir` for storage, creating it if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, StoreError> {
        let path = self.dir.join(name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        if content.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(serde_json::from_str(&content)?))
    }

    fn write<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<(), StoreError> {
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{}.tmp", name));
        let json = serde_json::to_string_pretty(value)?;
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &path)?;
        log::debug!("Wrote {}", path.display());
        Ok(())
    }
}

impl BillStore for JsonFileStore {
    fn load_all(&self) -> Result<Vec<Bill>, StoreError> {
        Ok(self.read(BILLS_FILE)?.unwrap_or_default())
    }

    fn save_all(&mut self, bills: &[Bill]) -> Result<(), StoreError> {
        self.write(BILLS_FILE, bills)
    }

    fn last_active_index(&self) -> Result<Option<usize>, StoreError> {
        Ok(self.read::<Option<usize>>(ACTIVE_INDEX_FILE)?.flatten())
    }

    fn set_last_active_index(&mut self, index: Option<usize>) -> Result<(), StoreError> {
        self.write(ACTIVE_INDEX_FILE, &index)
    }
}

impl RosterStore for JsonFileStore {
    fn load_participants(&self) -> Result<Roster, StoreError> {
        Ok(self.read(PARTICIPANTS_FILE)?.unwrap_or_default())
    }

    fn save_participants(&mut self, roster: &Roster) -> Result<(), StoreError> {
        self.write(PARTICIPANTS_FILE, roster)
    }
}
