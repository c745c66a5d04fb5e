//! BCULT site behavior layer
//!
//! The interactive parts of the BCULT marketing site expressed as a typed
//! library: the project gallery with search and category filtering, the
//! project detail modal, the contact form with local draft persistence and a
//! simulated submission, and the light/dark theme preference.
//!
//! # Features
//!
//! - **Capability based**: components receive handles to page regions
//!   (`dom::Capabilities`) instead of querying a document, and any region may
//!   be missing without failing the page
//! - **Deterministic time**: every delay runs on a virtual timer queue, so the
//!   whole submission flow can be driven synchronously in tests
//! - **HTML pages** (feature `html`, default): load a static page's regions,
//!   form fields and injected dataset with `scraper`
//!
//! # Example
//!
//! ```
//! use bcult_site::dom::{MemoryPage, PageLayout};
//! use bcult_site::storage::MemoryStore;
//! use bcult_site::{Site, SiteConfig, UiEvent};
//!
//! let page = MemoryPage::new(PageLayout::projects());
//! let mut site = Site::new(
//!     SiteConfig::default(),
//!     page.capabilities(),
//!     Box::new(MemoryStore::new()),
//!     None,
//! );
//!
//! page.select_category("street");
//! site.dispatch(UiEvent::CategoryChanged);
//! assert_eq!(page.snapshot().card_titles(), vec!["Urban Tech"]);
//! ```

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

pub mod error;
pub use error::{Error, Result};

pub mod dom;
pub mod draft;
pub mod filter;
pub mod form;
pub mod gallery;
pub mod modal;
pub mod record;
pub mod site;
pub mod storage;
pub mod theme;
pub mod timer;

// Worker-thread handle that runs a site against real time
pub mod async_api;
pub use async_api::{SiteHandle, SiteSnapshot};

pub use draft::{DraftRecord, DraftStore};
pub use filter::{filter, CategoryFilter, FilterCriteria};
pub use form::submission::{SimulatedTransport, SubmissionPhase, SubmissionTransport};
pub use modal::ModalState;
pub use record::{ProjectRecord, RecordStore};
pub use site::{Site, UiEvent};
pub use theme::{Theme, ThemeState};

/// Configuration for the behavior layer
///
/// The defaults reproduce the live site: storage keys under `bcult-`, a
/// featured grid of three, 1.5 s of simulated transmission latency and the
/// site's status messages.
///
/// # Examples
///
/// ```
/// let cfg = bcult_site::SiteConfig::default();
/// assert_eq!(cfg.storage_prefix, "bcult");
/// assert_eq!(cfg.featured_limit, 3);
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Prefix for every durable storage key
    pub storage_prefix: String,
    /// Cards shown by a featured (home page) gallery
    pub featured_limit: usize,
    /// Simulated transmission latency in milliseconds
    pub submit_latency_ms: u64,
    /// How long the "sent" state is held before the form is restored
    pub success_hold_ms: u64,
    /// How long draft save/clear messages stay visible
    pub status_clear_ms: u64,
    /// Button labels and status messages
    pub labels: FormLabels,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            storage_prefix: "bcult".to_string(),
            featured_limit: 3,
            submit_latency_ms: 1500,
            success_hold_ms: 3000,
            status_clear_ms: 2000,
            labels: FormLabels::default(),
        }
    }
}

impl SiteConfig {
    /// Load a JSON config file; missing keys keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("cannot read {}: {}", path.display(), e)))?;
        let cfg: SiteConfig = serde_json::from_str(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {}", path.display(), e)))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.storage_prefix.trim().is_empty() {
            return Err(Error::ConfigError("storage_prefix must not be empty".into()));
        }
        if self.featured_limit == 0 {
            return Err(Error::ConfigError("featured_limit must be at least 1".into()));
        }
        if self.labels.in_flight.trim().is_empty() {
            return Err(Error::ConfigError("labels.in_flight must not be empty".into()));
        }
        Ok(())
    }

    pub fn submit_latency(&self) -> Duration {
        Duration::from_millis(self.submit_latency_ms)
    }

    pub fn success_hold(&self) -> Duration {
        Duration::from_millis(self.success_hold_ms)
    }

    pub fn status_clear(&self) -> Duration {
        Duration::from_millis(self.status_clear_ms)
    }
}

/// User-visible strings of the contact form
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormLabels {
    /// Submit button label while transmitting
    pub in_flight: String,
    /// Submit button label once transmitted
    pub sent: String,
    pub success_message: String,
    pub failure_message: String,
    pub draft_saved: String,
    pub draft_cleared: String,
}

impl Default for FormLabels {
    fn default() -> Self {
        Self {
            in_flight: "TRANSMITTING...".to_string(),
            sent: "SENT".to_string(),
            success_message: "Data transmitted successfully. We will be in touch.".to_string(),
            failure_message: "Transmission failed. Your draft is still saved.".to_string(),
            draft_saved: "Draft Saved to Memory.".to_string(),
            draft_cleared: "Memory Wiped.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.submit_latency(), Duration::from_millis(1500));
        assert_eq!(config.success_hold(), Duration::from_millis(3000));
        assert_eq!(config.labels.in_flight, "TRANSMITTING...");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let cfg: SiteConfig =
            serde_json::from_str(r#"{"submit_latency_ms": 10, "labels": {"sent": "OK"}}"#).unwrap();
        assert_eq!(cfg.submit_latency_ms, 10);
        assert_eq!(cfg.labels.sent, "OK");
        assert_eq!(cfg.labels.in_flight, "TRANSMITTING...");
        assert_eq!(cfg.storage_prefix, "bcult");
    }

    #[test]
    fn test_invalid_config() {
        let cfg = SiteConfig { storage_prefix: " ".into(), ..Default::default() };
        assert!(matches!(cfg.validate(), Err(Error::ConfigError(_))));
        let cfg = SiteConfig { featured_limit: 0, ..Default::default() };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("site.json");
        std::fs::write(&path, r#"{"storage_prefix": "demo"}"#).unwrap();
        assert_eq!(SiteConfig::from_json_file(&path).unwrap().storage_prefix, "demo");
        std::fs::write(&path, r#"{"storage_prefix": ""}"#).unwrap();
        assert!(SiteConfig::from_json_file(&path).is_err());
    }
}
