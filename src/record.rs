//! Project records and the read-only store that owns them for a page's lifetime.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One portfolio entry shown in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub id: u64,
    pub title: String,
    pub category: String,
    pub desc: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProjectRecord {
    pub fn new(id: u64, title: &str, category: &str, desc: &str, tags: &[&str]) -> Self {
        Self {
            id,
            title: title.to_string(),
            category: category.to_string(),
            desc: desc.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }
}

/// Built-in records used when the page does not inject a dataset.
pub fn fallback_records() -> Vec<ProjectRecord> {
    vec![
        ProjectRecord::new(101, "Classic Fade", "grooming", "Timeless clean cut.", &["Hair"]),
        ProjectRecord::new(102, "Urban Tech", "street", "Utility focused.", &["Style"]),
        ProjectRecord::new(103, "Gala Ready", "formal", "Black tie excellence.", &["Suit"]),
    ]
}

/// Ordered, immutable list of records.
///
/// Populated once; nothing in the behavior layer mutates or removes a record
/// after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordStore {
    records: Vec<ProjectRecord>,
}

impl RecordStore {
    /// Build a store from a list, rejecting duplicate ids.
    pub fn new(records: Vec<ProjectRecord>) -> Result<Self> {
        let mut seen = HashSet::new();
        for r in &records {
            if !seen.insert(r.id) {
                return Err(Error::MalformedData(format!("duplicate project id {}", r.id)));
            }
        }
        Ok(Self { records })
    }

    /// The built-in fallback set.
    pub fn fallback() -> Self {
        Self { records: fallback_records() }
    }

    /// Use the injected dataset when present and well formed, else the fallback.
    ///
    /// A missing dataset is the normal case and is not logged as a problem.
    pub fn from_injected(injected: Option<Vec<ProjectRecord>>) -> Self {
        match injected {
            None => Self::fallback(),
            Some(records) => match Self::new(records) {
                Ok(store) => store,
                Err(e) => {
                    log::warn!("ignoring injected dataset: {}", e);
                    Self::fallback()
                }
            },
        }
    }

    /// Parse an injected dataset from a JSON array.
    pub fn from_json(json: &str) -> Result<Self> {
        let records: Vec<ProjectRecord> = serde_json::from_str(json)?;
        Self::new(records)
    }

    pub fn records(&self) -> &[ProjectRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: u64) -> Option<&ProjectRecord> {
        self.records.iter().find(|r| r.id == id)
    }
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::fallback()
    }
}
