//! Contact form draft persistence.

use crate::dom::ContactForm;
use crate::storage::KeyValueStore;
use crate::Result;
use serde::{Deserialize, Serialize};

/// The four persisted contact form fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DraftRecord {
    pub name: String,
    pub email: String,
    pub message: String,
    pub newsletter: bool,
}

impl DraftRecord {
    /// Read the live field values. Controls the form lacks read as empty.
    pub fn capture(form: &dyn ContactForm) -> Self {
        Self {
            name: form.value("name").unwrap_or_default(),
            email: form.value("email").unwrap_or_default(),
            message: form.value("message").unwrap_or_default(),
            newsletter: form.checked("newsletter").unwrap_or(false),
        }
    }

    /// Write the draft into the live fields.
    pub fn apply(&self, form: &mut dyn ContactForm) {
        form.set_value("name", &self.name);
        form.set_value("email", &self.email);
        form.set_value("message", &self.message);
        form.set_checked("newsletter", self.newsletter);
    }
}

/// Save / load / clear of the single draft under a fixed key.
pub struct DraftStore<'a> {
    store: &'a mut dyn KeyValueStore,
    key: &'a str,
}

impl<'a> DraftStore<'a> {
    pub fn new(store: &'a mut dyn KeyValueStore, key: &'a str) -> Self {
        Self { store, key }
    }

    /// Overwrite any previous draft.
    pub fn save(&mut self, draft: &DraftRecord) -> Result<()> {
        let json = serde_json::to_string(draft)?;
        self.store.set(self.key, &json)
    }

    /// The saved draft, or `None` when there is none or it cannot be read.
    pub fn load(&self) -> Option<DraftRecord> {
        let raw = match self.store.get(self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("draft storage unreadable, treating as empty: {}", e);
                return None;
            }
        };
        match serde_json::from_str::<Option<DraftRecord>>(&raw) {
            Ok(draft) => draft,
            Err(e) => {
                log::warn!("discarding malformed draft under `{}`: {}", self.key, e);
                None
            }
        }
    }

    pub fn clear(&mut self) -> Result<()> {
        self.store.remove(self.key)
    }
}
