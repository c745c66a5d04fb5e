//! Site controller: wires records, gallery, modal, form and theme to the
//! page capabilities and reacts to UI events and timers.

use crate::dom::{
    Capabilities, Card, CardInput, ContactForm, FilterControls, Key, StatusRegion, StatusTone,
    ThemeRoot,
};
use crate::draft::{DraftRecord, DraftStore};
use crate::filter::{filter, CategoryFilter, FilterCriteria};
use crate::form::submission::{
    SimulatedTransport, SubmissionFlow, SubmissionPhase, SubmissionTransport, SubmitOutcome,
};
use crate::gallery::Gallery;
use crate::modal::{Modal, ModalState};
use crate::record::{ProjectRecord, RecordStore};
use crate::storage::{KeyValueStore, StorageKeys};
use crate::theme::{Theme, ThemeState};
use crate::timer::{TimerId, TimerQueue};
use crate::SiteConfig;
use std::time::Duration;

/// Discrete UI events the layer reacts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    /// `input` on the search box
    SearchInput,
    /// `change` on the category selector
    CategoryChanged,
    /// Click or keydown on a gallery card
    Card { record_id: u64, input: CardInput },
    /// Activation of a modal close affordance
    CloseModal,
    /// Document-level keydown
    KeyDown(Key),
    ToggleTheme,
    SaveDraft,
    ClearDraft,
    Submit,
}

/// Work scheduled on the timer queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    TransmissionDone,
    RestoreSubmit,
    ClearStatus,
}

pub struct Site {
    config: SiteConfig,
    keys: StorageKeys,
    records: RecordStore,
    gallery: Gallery,
    controls: Option<Box<dyn FilterControls>>,
    modal: Modal,
    form: Option<Box<dyn ContactForm>>,
    status: Option<Box<dyn StatusRegion>>,
    submission: Option<SubmissionFlow>,
    theme: ThemeState,
    theme_root: Option<Box<dyn ThemeRoot>>,
    storage: Box<dyn KeyValueStore>,
    timers: TimerQueue<Deferred>,
    status_timer: Option<TimerId>,
}

impl Site {
    /// Build and initialize a site with the simulated transport.
    pub fn new(
        config: SiteConfig,
        caps: Capabilities,
        storage: Box<dyn KeyValueStore>,
        dataset: Option<Vec<ProjectRecord>>,
    ) -> Self {
        let transport = Box::new(SimulatedTransport::new(config.submit_latency()));
        Self::with_transport(config, caps, storage, dataset, transport)
    }

    /// Build and initialize a site with an explicit submission transport.
    ///
    /// Initialization applies the stored theme (or keeps the page's own when none
    /// is stored), renders the gallery and loads the draft into the form, each
    /// only if its region exists.
    pub fn with_transport(
        config: SiteConfig,
        caps: Capabilities,
        storage: Box<dyn KeyValueStore>,
        dataset: Option<Vec<ProjectRecord>>,
        transport: Box<dyn SubmissionTransport>,
    ) -> Self {
        let keys = StorageKeys::new(&config.storage_prefix);
        let page_theme = caps
            .theme_root
            .as_ref()
            .map_or(Theme::Light, |root| Theme::from_dark(root.is_dark()));
        let theme = ThemeState::load(storage.as_ref(), &keys.theme, page_theme);
        let submission = caps
            .form
            .as_ref()
            .map(|_| SubmissionFlow::new(transport, config.labels.clone()));

        let mut site = Self {
            keys,
            records: RecordStore::from_injected(dataset),
            gallery: Gallery::new(caps.gallery),
            controls: caps.controls,
            modal: Modal::new(caps.modal),
            form: caps.form,
            status: caps.status,
            submission,
            theme,
            theme_root: caps.theme_root,
            storage,
            timers: TimerQueue::new(),
            status_timer: None,
            config,
        };
        site.init();
        site
    }

    fn init(&mut self) {
        if let Some(root) = self.theme_root.as_mut() {
            self.theme.apply(root.as_mut());
        }

        let shown = self.gallery.render_initial(self.records.records(), self.config.featured_limit);
        log::debug!("initial gallery render: {} cards", shown);

        if let Some(form) = self.form.as_mut() {
            let drafts = DraftStore::new(self.storage.as_mut(), &self.keys.draft);
            if let Some(draft) = drafts.load() {
                draft.apply(form.as_mut());
                log::info!("restored saved draft");
            }
        }
    }

    pub fn records(&self) -> &RecordStore {
        &self.records
    }

    /// Criteria as the controls currently read. Missing controls mean no restriction.
    pub fn criteria(&self) -> FilterCriteria {
        let Some(controls) = self.controls.as_ref() else {
            return FilterCriteria::default();
        };
        FilterCriteria {
            term: controls.search_term().unwrap_or_default(),
            category: controls
                .category()
                .map_or(CategoryFilter::All, |value| CategoryFilter::parse(&value)),
        }
    }

    /// Recompute the filter from scratch and re-render the gallery.
    pub fn refilter(&mut self) -> usize {
        if self.gallery.mode().is_none() {
            return 0;
        }
        let matching = filter(self.records.records(), &self.criteria());
        self.gallery.render(&matching, None)
    }

    pub fn visible_ids(&self) -> &[u64] {
        self.gallery.visible_ids()
    }

    pub fn modal_state(&self) -> &ModalState {
        self.modal.state()
    }

    pub fn submission_phase(&self) -> Option<SubmissionPhase> {
        self.submission.as_ref().map(|s| s.phase())
    }

    pub fn submission_history(&self) -> &[SubmissionPhase] {
        self.submission.as_ref().map(|s| s.history()).unwrap_or(&[])
    }

    pub fn theme(&self) -> Theme {
        self.theme.current()
    }

    /// The draft currently in storage, if any.
    pub fn stored_draft(&mut self) -> Option<DraftRecord> {
        DraftStore::new(self.storage.as_mut(), &self.keys.draft).load()
    }

    /// Time until the next timer fires.
    pub fn next_timer_in(&self) -> Option<Duration> {
        self.timers.next_in()
    }

    /// No timers pending.
    pub fn is_idle(&self) -> bool {
        self.timers.is_idle()
    }

    pub fn dispatch(&mut self, event: UiEvent) {
        log::trace!("event {:?}", event);
        match event {
            UiEvent::SearchInput | UiEvent::CategoryChanged => {
                self.refilter();
            }
            UiEvent::Card { record_id, input } => self.activate_card(record_id, &input),
            UiEvent::CloseModal => self.modal.close(),
            UiEvent::KeyDown(key) => {
                self.modal.handle_key(&key);
            }
            UiEvent::ToggleTheme => self.toggle_theme(),
            UiEvent::SaveDraft => self.save_draft(),
            UiEvent::ClearDraft => self.clear_draft(),
            UiEvent::Submit => self.submit(),
        }
    }

    /// Let `elapsed` pass, firing due timers in order. Timers scheduled by a
    /// firing timer also fire if they fall inside the window.
    pub fn advance(&mut self, elapsed: Duration) {
        let until = self.timers.now() + elapsed;
        while let Some(task) = self.timers.pop_due(until) {
            self.run_deferred(task);
        }
        self.timers.settle(until);
    }

    /// Fire every pending timer, however far away.
    pub fn run_until_idle(&mut self) {
        while let Some(next) = self.timers.next_in() {
            self.advance(next);
        }
    }

    fn activate_card(&mut self, record_id: u64, input: &CardInput) {
        if !self.gallery.is_visible(record_id) {
            log::debug!("input for card {} which is not rendered", record_id);
            return;
        }
        let Some(record) = self.records.get(record_id) else {
            return;
        };
        if Card::from_record(record).activates(input) {
            self.modal.open(record);
        }
    }

    fn toggle_theme(&mut self) {
        let theme = self.theme.toggle();
        if let Some(root) = self.theme_root.as_mut() {
            self.theme.apply(root.as_mut());
        }
        if let Err(e) = self.theme.persist(self.storage.as_mut()) {
            log::error!("failed to persist theme preference: {}", e);
        }
        log::info!("theme switched to {}", theme.as_str());
    }

    fn show_status(&mut self, text: &str, tone: StatusTone, clear_after: Option<Duration>) {
        if let Some(id) = self.status_timer.take() {
            self.timers.cancel(id);
        }
        let Some(status) = self.status.as_mut() else {
            return;
        };
        status.show(text, tone);
        if let Some(delay) = clear_after {
            self.status_timer = Some(self.timers.schedule(delay, Deferred::ClearStatus));
        }
    }

    fn save_draft(&mut self) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        if !form.affordances().save_draft {
            return;
        }
        let draft = DraftRecord::capture(form.as_ref());
        let mut drafts = DraftStore::new(self.storage.as_mut(), &self.keys.draft);
        match drafts.save(&draft) {
            Ok(()) => {
                log::info!("draft saved");
                let text = self.config.labels.draft_saved.clone();
                self.show_status(&text, StatusTone::Neutral, Some(self.config.status_clear()));
            }
            Err(e) => log::error!("failed to save draft: {}", e),
        }
    }

    fn clear_draft(&mut self) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        if !form.affordances().clear_draft {
            return;
        }
        form.reset();
        if let Err(e) = DraftStore::new(self.storage.as_mut(), &self.keys.draft).clear() {
            log::error!("failed to remove draft: {}", e);
        }
        let text = self.config.labels.draft_cleared.clone();
        self.show_status(&text, StatusTone::Neutral, Some(self.config.status_clear()));
    }

    fn submit(&mut self) {
        let (Some(form), Some(flow)) = (self.form.as_mut(), self.submission.as_mut()) else {
            return;
        };
        if let SubmitOutcome::Accepted { latency } = flow.begin(form.as_mut()) {
            self.timers.schedule(latency, Deferred::TransmissionDone);
        }
    }

    fn run_deferred(&mut self, task: Deferred) {
        match task {
            Deferred::TransmissionDone => self.finish_transmission(),
            Deferred::RestoreSubmit => {
                if let (Some(form), Some(flow)) = (self.form.as_mut(), self.submission.as_mut()) {
                    flow.restore(form.as_mut());
                }
                if let Some(status) = self.status.as_mut() {
                    status.clear();
                }
            }
            Deferred::ClearStatus => {
                self.status_timer = None;
                if let Some(status) = self.status.as_mut() {
                    status.clear();
                }
            }
        }
    }

    fn finish_transmission(&mut self) {
        let (Some(form), Some(flow)) = (self.form.as_mut(), self.submission.as_mut()) else {
            return;
        };
        match flow.complete(form.as_mut()) {
            Ok(()) => {
                form.reset();
                if let Err(e) = DraftStore::new(self.storage.as_mut(), &self.keys.draft).clear() {
                    log::error!("failed to remove draft after submission: {}", e);
                }
                log::info!("contact message transmitted");
                let text = self.config.labels.success_message.clone();
                self.show_status(&text, StatusTone::Success, None);
                self.timers.schedule(self.config.success_hold(), Deferred::RestoreSubmit);
            }
            Err(e) => {
                log::error!("transmission failed: {}", e);
                let text = self.config.labels.failure_message.clone();
                self.show_status(&text, StatusTone::Error, Some(self.config.status_clear()));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryPage, PageLayout};
    use crate::storage::MemoryStore;

    fn site_for(layout: PageLayout) -> (MemoryPage, Site) {
        let page = MemoryPage::new(layout);
        let site = Site::new(SiteConfig::default(), page.capabilities(), Box::new(MemoryStore::new()), None);
        (page, site)
    }

    #[test]
    fn blank_page_does_nothing() {
        let mut site = Site::new(SiteConfig::default(), Capabilities::none(), Box::new(MemoryStore::new()), None);
        for event in [
            UiEvent::SearchInput,
            UiEvent::Card { record_id: 101, input: CardInput::Click },
            UiEvent::KeyDown(Key::Escape),
            UiEvent::SaveDraft,
            UiEvent::ClearDraft,
            UiEvent::Submit,
        ] {
            site.dispatch(event);
        }
        assert!(site.visible_ids().is_empty());
        assert_eq!(site.submission_phase(), None);
        assert!(site.is_idle());
    }

    #[test]
    fn home_page_shows_featured_records() {
        let (page, site) = site_for(PageLayout::home());
        assert_eq!(page.snapshot().cards.len(), 3);
        assert_eq!(site.visible_ids(), &[101, 102, 103]);
    }

    #[test]
    fn hidden_cards_cannot_be_activated() {
        let (page, mut site) = site_for(PageLayout::projects());
        page.set_search_term("gala");
        site.dispatch(UiEvent::SearchInput);
        site.dispatch(UiEvent::Card { record_id: 101, input: CardInput::Click });
        assert_eq!(site.modal_state(), &ModalState::Closed);
    }

    #[test]
    fn empty_category_value_matches_nothing() {
        let (page, mut site) = site_for(PageLayout::projects());
        page.select_category("");
        site.dispatch(UiEvent::CategoryChanged);
        assert!(page.snapshot().cards.is_empty());

        let search_only = PageLayout { category_select: false, ..PageLayout::projects() };
        let (page, site) = site_for(search_only);
        assert_eq!(site.criteria().category, CategoryFilter::All);
        assert_eq!(page.snapshot().cards.len(), 3);
    }

    #[test]
    fn dark_markup_is_kept_without_stored_preference() {
        let page = MemoryPage::new(PageLayout::home());
        page.set_dark_attribute(true);
        let mut site = Site::new(SiteConfig::default(), page.capabilities(), Box::new(MemoryStore::new()), None);
        assert_eq!(site.theme(), Theme::Dark);
        assert!(page.snapshot().dark_theme);

        site.dispatch(UiEvent::ToggleTheme);
        assert_eq!(site.theme(), Theme::Light);
        assert!(!page.snapshot().dark_theme);
        assert_eq!(site.storage.get("bcult-theme").unwrap().as_deref(), Some("light"));
    }

    #[test]
    fn stored_preference_overrides_markup() {
        let page = MemoryPage::new(PageLayout::home());
        page.set_dark_attribute(true);
        let mut store = MemoryStore::new();
        store.set("bcult-theme", "light").unwrap();
        let site = Site::new(SiteConfig::default(), page.capabilities(), Box::new(store), None);
        assert_eq!(site.theme(), Theme::Light);
        assert!(!page.snapshot().dark_theme);
    }

    #[test]
    fn status_message_clears_after_delay() {
        let (page, mut site) = site_for(PageLayout::contact());
        site.dispatch(UiEvent::SaveDraft);
        assert_eq!(page.snapshot().status.unwrap().text, "Draft Saved to Memory.");
        site.advance(Duration::from_millis(1999));
        assert!(page.snapshot().status.is_some());
        site.advance(Duration::from_millis(1));
        assert!(page.snapshot().status.is_none());
    }

    #[test]
    fn newer_status_is_not_cleared_by_older_timer() {
        let (page, mut site) = site_for(PageLayout::contact());
        site.dispatch(UiEvent::SaveDraft);
        site.advance(Duration::from_millis(1500));
        site.dispatch(UiEvent::ClearDraft);
        site.advance(Duration::from_millis(1000));
        assert_eq!(page.snapshot().status.unwrap().text, "Memory Wiped.");
        site.advance(Duration::from_millis(1000));
        assert!(page.snapshot().status.is_none());
    }
}
