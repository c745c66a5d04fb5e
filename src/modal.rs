//! Project detail dialog.

use crate::dom::{Key, ModalRegion};
use crate::record::ProjectRecord;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Open(ProjectRecord),
}

pub struct Modal {
    region: Option<Box<dyn ModalRegion>>,
    state: ModalState,
}

impl Modal {
    pub fn new(region: Option<Box<dyn ModalRegion>>) -> Self {
        Self { region, state: ModalState::Closed }
    }

    pub fn state(&self) -> &ModalState {
        &self.state
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, ModalState::Open(_))
    }

    /// Show `record` and move focus into the dialog. Without a modal region
    /// the state stays `Closed`.
    pub fn open(&mut self, record: &ProjectRecord) {
        let Some(region) = self.region.as_mut() else {
            return;
        };
        region.set_content(&record.title, &record.desc, &record.tags);
        region.set_aria_hidden(false);
        if !region.focus_close() {
            log::debug!("modal has no close affordance to focus");
        }
        self.state = ModalState::Open(record.clone());
        log::debug!("modal opened for record {}", record.id);
    }

    /// Idempotent.
    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        if let Some(region) = self.region.as_mut() {
            region.set_aria_hidden(true);
        }
        self.state = ModalState::Closed;
    }

    /// Escape closes an open dialog. Returns true if the key was consumed.
    pub fn handle_key(&mut self, key: &Key) -> bool {
        if *key == Key::Escape && self.is_open() {
            self.close();
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryPage, PageLayout};
    use crate::record::fallback_records;

    #[test]
    fn open_populates_and_focuses() {
        let page = MemoryPage::new(PageLayout::projects());
        let mut modal = Modal::new(page.capabilities().modal);
        let rec = &fallback_records()[0];
        modal.open(rec);
        let snap = page.snapshot();
        assert!(!snap.modal.aria_hidden);
        assert_eq!(snap.modal.title, "Classic Fade");
        assert_eq!(snap.modal.description, "Timeless clean cut.");
        assert_eq!(snap.modal.tags, vec!["Hair".to_string()]);
        assert_eq!(snap.focus.as_deref(), Some("close-modal-btn"));
        assert_eq!(modal.state(), &ModalState::Open(rec.clone()));
    }

    #[test]
    fn close_is_idempotent() {
        let page = MemoryPage::new(PageLayout::projects());
        let mut modal = Modal::new(page.capabilities().modal);
        modal.close();
        assert_eq!(modal.state(), &ModalState::Closed);
        modal.open(&fallback_records()[1]);
        modal.close();
        modal.close();
        assert_eq!(modal.state(), &ModalState::Closed);
        assert!(page.snapshot().modal.aria_hidden);
    }

    #[test]
    fn escape_only_acts_when_open() {
        let mut modal = Modal::new(MemoryPage::new(PageLayout::projects()).capabilities().modal);
        assert!(!modal.handle_key(&Key::Escape));
        modal.open(&fallback_records()[2]);
        assert!(!modal.handle_key(&Key::Enter));
        assert!(modal.handle_key(&Key::Escape));
        assert!(!modal.is_open());
    }

    #[test]
    fn no_region_stays_closed() {
        let mut modal = Modal::new(None);
        modal.open(&fallback_records()[0]);
        assert!(!modal.is_open());
    }
}
