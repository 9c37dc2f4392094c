use crate::error::CoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub const SUBJECTS_TABLE: &str = "subjects.json";
pub const SECTION_LIST_TABLE: &str = "sectionlist.json";
pub const SECTION_SUBJECTS_TABLE: &str = "sectionsubjects.json";
pub const TEACHER_SECTIONS_TABLE: &str = "teachersections.json";
pub const ROLL_SECTIONS_TABLE: &str = "sections.json";
pub const STUDENT_SUBJECTS_TABLE: &str = "studentsubjects.json";
pub const ROLL_NUMBERS_TABLE: &str = "rollnumbers.json";
pub const ATTENDANCE_TABLE: &str = "attendance_master.json";
pub const USERS_TABLE: &str = "users.json";
pub const EXAM_TABLE: &str = "exam_date.json";

/// One workspace directory of JSON tables. All mutating operations serialize
/// their load -> mutate -> persist cycle through `begin_write`, and every
/// table write goes through a temp file + rename so a failed write never
/// leaves a partial document behind.
pub struct Store {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl Store {
    pub fn open(root: &Path) -> Result<Self, CoreError> {
        std::fs::create_dir_all(root)?;
        Ok(Store {
            root: root.to_path_buf(),
            write_lock: Mutex::new(()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.root.join(table)
    }

    /// Single-writer guard for a whole read-modify-write cycle.
    pub fn begin_write(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// `Ok(None)` when the table file does not exist yet (first run).
    /// Malformed content is a hard storage error, never an empty default.
    pub fn read_table<T: DeserializeOwned>(&self, table: &str) -> Result<Option<T>, CoreError> {
        let path = self.table_path(table);
        let text = match std::fs::read_to_string(&path) {
            Ok(t) => t,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|e| CoreError::Storage(format!("{} is malformed: {}", table, e)))
    }

    /// Missing table reads as the empty/default table (bootstrap case).
    pub fn read_table_or_default<T>(&self, table: &str) -> Result<T, CoreError>
    where
        T: DeserializeOwned + Default,
    {
        Ok(self.read_table(table)?.unwrap_or_default())
    }

    pub fn write_table<T: Serialize>(&self, table: &str, value: &T) -> Result<(), CoreError> {
        let text = serde_json::to_string_pretty(value)
            .map_err(|e| CoreError::Storage(format!("failed to serialize {}: {}", table, e)))?;
        let path = self.table_path(table);
        let tmp = self.root.join(format!("{}.tmp", table));
        std::fs::write(&tmp, text)?;
        std::fs::rename(&tmp, &path)?;
        Ok(())
    }
}
