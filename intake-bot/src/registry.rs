//! Durable store of completed registrations.
//!
//! File layout (`users.json`): one object keyed by chat id.
//!
//! ```json
//! {
//!   "123456": {
//!     "bank": "BCA",
//!     "account_name": "Agus Budiman",
//!     "account_number": "1234567890",
//!     "balance": 0,
//!     "registered_at": "2026-10-19T08:00:00Z"
//!   }
//! }
//! ```

use crate::intake::Submission;
use crate::message::ChatId;
use chrono::{DateTime, Utc};
use fs4::fs_std::FileExt;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// A committed registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub bank: String,
    pub account_name: String,
    pub account_number: String,
    #[serde(default)]
    pub balance: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registered_at: Option<DateTime<Utc>>,
}

impl Record {
    /// New record with a zero balance, stamped now.
    pub fn from_submission(submission: Submission) -> Self {
        Self {
            bank: submission.bank,
            account_name: submission.account_name,
            account_number: submission.account_number,
            balance: 0,
            registered_at: Some(Utc::now()),
        }
    }
}

/// Registry error type.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("Registry IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Registry JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to lock registry file: {0}")]
    Lock(String),
}

/// Keyed access to committed records.
pub trait RecordRegistry: Send + Sync {
    fn has(&self, chat_id: ChatId) -> bool;

    fn get(&self, chat_id: ChatId) -> Option<Record>;

    /// Store a record, replacing any previous one for the chat.
    fn put(&mut self, chat_id: ChatId, record: Record) -> Result<(), RegistryError>;
}

// ============================================================================
// JSON file registry
// ============================================================================

/// Registry persisted as a single pretty-printed JSON file.
///
/// The whole map is kept in memory and rewritten on every `put`.
pub struct JsonFileRegistry {
    path: PathBuf,
    records: BTreeMap<String, Record>,
}

impl JsonFileRegistry {
    /// Open the registry at `path`.
    ///
    /// A missing or empty file starts an empty registry. So does an unreadable
    /// or corrupt one, with a warning; the next `put` overwrites it.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match Self::load(&path) {
            Ok(records) => records,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to read registry, starting with no records"
                );
                BTreeMap::new()
            }
        };

        tracing::info!(path = %path.display(), records = records.len(), "Registry opened");
        Self { path, records }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn load(path: &Path) -> Result<BTreeMap<String, Record>, RegistryError> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }

        let contents = fs::read_to_string(path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_str(&contents)?)
    }

    fn save(&self) -> Result<(), RegistryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        file.lock_exclusive()
            .map_err(|e| RegistryError::Lock(e.to_string()))?;

        let result = Self::write_locked(&file, &self.records);

        if let Err(e) = FileExt::unlock(&file) {
            tracing::warn!(path = %self.path.display(), error = %e, "Failed to unlock registry file");
        }

        result
    }

    fn write_locked(file: &File, records: &BTreeMap<String, Record>) -> Result<(), RegistryError> {
        file.set_len(0)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, records)?;
        writer.write_all(b"\n")?;
        writer.flush()?;
        Ok(())
    }
}

impl RecordRegistry for JsonFileRegistry {
    fn has(&self, chat_id: ChatId) -> bool {
        self.records.contains_key(&chat_id.to_string())
    }

    fn get(&self, chat_id: ChatId) -> Option<Record> {
        self.records.get(&chat_id.to_string()).cloned()
    }

    fn put(&mut self, chat_id: ChatId, record: Record) -> Result<(), RegistryError> {
        self.records.insert(chat_id.to_string(), record);
        self.save()
    }
}

// ============================================================================
// In-memory registry
// ============================================================================

/// Registry that keeps records in memory only.
#[derive(Debug, Default)]
pub struct MemoryRegistry {
    records: BTreeMap<ChatId, Record>,
    fail_writes: bool,
}

impl MemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every `put` fail without storing anything.
    pub fn with_failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordRegistry for MemoryRegistry {
    fn has(&self, chat_id: ChatId) -> bool {
        self.records.contains_key(&chat_id)
    }

    fn get(&self, chat_id: ChatId) -> Option<Record> {
        self.records.get(&chat_id).cloned()
    }

    fn put(&mut self, chat_id: ChatId, record: Record) -> Result<(), RegistryError> {
        if self.fail_writes {
            return Err(RegistryError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "memory registry: writes disabled",
            )));
        }
        self.records.insert(chat_id, record);
        Ok(())
    }
}
