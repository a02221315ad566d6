//! Persistence boundary for remaining-tries counters.
//!
//! The engine only needs a key-value contract over the composite
//! `(attempt_id, question_id)` key: read the remaining counter (absent
//! means the question has not consumed a try yet) and write it back.
//! Mutual exclusion between concurrent hosts is the store implementor's
//! concern; the engine processes actions strictly sequentially.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::StoreError;

pub trait TriesStore {
    /// Remaining tries for the attempt/question pair, or `None` if no
    /// record exists yet (the engine then defaults to the configured
    /// total).
    fn remaining(&self, attempt_id: &str, question_id: &str) -> Result<Option<u32>, StoreError>;

    /// Create or update the remaining-tries record.
    fn set_remaining(
        &mut self,
        attempt_id: &str,
        question_id: &str,
        remaining: u32,
    ) -> Result<(), StoreError>;
}

/// Volatile store for tests, demos and single-process replays.
#[derive(Debug, Default)]
pub struct MemoryTriesStore {
    records: BTreeMap<(String, String), u32>,
}

impl MemoryTriesStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TriesStore for MemoryTriesStore {
    fn remaining(&self, attempt_id: &str, question_id: &str) -> Result<Option<u32>, StoreError> {
        Ok(self
            .records
            .get(&(attempt_id.to_string(), question_id.to_string()))
            .copied())
    }

    fn set_remaining(
        &mut self,
        attempt_id: &str,
        question_id: &str,
        remaining: u32,
    ) -> Result<(), StoreError> {
        self.records
            .insert((attempt_id.to_string(), question_id.to_string()), remaining);
        Ok(())
    }
}

/// File-backed store: one JSON document mapping attempt id → question id
/// → remaining tries, rewritten through a sibling temp file on every
/// update so a crashed write never truncates existing records.
#[derive(Debug)]
pub struct JsonTriesStore {
    path: PathBuf,
    records: BTreeMap<String, BTreeMap<String, u32>>,
}

impl JsonTriesStore {
    /// Open the store at `path`, loading existing records if the file
    /// exists.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let records = if path.exists() {
            let contents =
                std::fs::read_to_string(&path).map_err(|e| StoreError::Read(e.to_string()))?;
            serde_json::from_str(&contents).map_err(|e| StoreError::Read(e.to_string()))?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, records })
    }

    fn persist(&self) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(&self.records)
            .map_err(|e| StoreError::Write(e.to_string()))?;
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, json).map_err(|e| StoreError::Write(e.to_string()))?;
        std::fs::rename(&tmp, &self.path).map_err(|e| StoreError::Write(e.to_string()))?;
        Ok(())
    }
}

impl TriesStore for JsonTriesStore {
    fn remaining(&self, attempt_id: &str, question_id: &str) -> Result<Option<u32>, StoreError> {
        Ok(self
            .records
            .get(attempt_id)
            .and_then(|by_question| by_question.get(question_id))
            .copied())
    }

    fn set_remaining(
        &mut self,
        attempt_id: &str,
        question_id: &str,
        remaining: u32,
    ) -> Result<(), StoreError> {
        self.records
            .entry(attempt_id.to_string())
            .or_default()
            .insert(question_id.to_string(), remaining);
        self.persist()
    }
}
