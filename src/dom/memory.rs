//! In-memory page that records everything the behavior layer writes.
//!
//! Every region handed out by `MemoryPage::capabilities` shares one
//! `PageSnapshot`, so a test (or the CLI) can drive user input through the
//! page and then read back the whole visible state in one place.

use super::{
    Capabilities, Card, ContactForm, FieldKind, FieldMark, FieldSpec, FilterControls,
    FormAffordances, GalleryContainer, GalleryMode, ModalRegion, StatusRegion, StatusTone,
    SubmitButton, ThemeRoot,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

pub const DEFAULT_SUBMIT_LABEL: &str = "SEND";

/// Which regions exist on a page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageLayout {
    pub gallery: Option<GalleryMode>,
    pub search_input: bool,
    pub category_select: bool,
    pub modal: bool,
    pub modal_close: bool,
    pub contact_form: bool,
    pub status: bool,
    pub save_draft: bool,
    pub clear_draft: bool,
    pub theme_root: bool,
}

impl PageLayout {
    /// Home page: featured grid plus the modal.
    pub fn home() -> Self {
        Self {
            gallery: Some(GalleryMode::Featured),
            modal: true,
            modal_close: true,
            theme_root: true,
            ..Default::default()
        }
    }

    /// Projects page: full gallery, search, category selector and the modal.
    pub fn projects() -> Self {
        Self {
            gallery: Some(GalleryMode::Full),
            search_input: true,
            category_select: true,
            modal: true,
            modal_close: true,
            theme_root: true,
            ..Default::default()
        }
    }

    /// Contact page: form, status line and both draft buttons.
    pub fn contact() -> Self {
        Self {
            contact_form: true,
            status: true,
            save_draft: true,
            clear_draft: true,
            theme_root: true,
            ..Default::default()
        }
    }
}

/// Live state of one form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldState {
    pub spec: FieldSpec,
    pub value: String,
    pub checked: bool,
    pub mark: Option<FieldMark>,
    #[serde(skip)]
    initial_value: String,
    #[serde(skip)]
    initial_checked: bool,
}

impl FieldState {
    pub fn new(spec: FieldSpec, initial_value: &str, initial_checked: bool) -> Self {
        Self {
            spec,
            value: initial_value.to_string(),
            checked: initial_checked,
            mark: None,
            initial_value: initial_value.to_string(),
            initial_checked,
        }
    }

    fn reset(&mut self) {
        self.value = self.initial_value.clone();
        self.checked = self.initial_checked;
    }
}

/// The standard contact form controls.
pub fn contact_fields() -> Vec<FieldState> {
    vec![
        FieldState::new(FieldSpec::new("name", FieldKind::Text, true), "", false),
        FieldState::new(FieldSpec::new("email", FieldKind::Email, true), "", false),
        FieldState::new(FieldSpec::new("message", FieldKind::TextArea, true), "", false),
        FieldState::new(FieldSpec::new("newsletter", FieldKind::Checkbox, false), "", false),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModalSnapshot {
    pub aria_hidden: bool,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

impl Default for ModalSnapshot {
    fn default() -> Self {
        Self { aria_hidden: true, title: String::new(), description: String::new(), tags: Vec::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusLine {
    pub text: String,
    pub tone: StatusTone,
}

/// Everything visible on the page.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub layout: PageLayout,
    pub cards: Vec<Card>,
    pub modal: ModalSnapshot,
    pub focus: Option<String>,
    pub search_term: String,
    pub category: String,
    pub fields: Vec<FieldState>,
    pub submit_button: Option<SubmitButton>,
    pub status: Option<StatusLine>,
    pub dark_theme: bool,
}

impl PageSnapshot {
    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.fields.iter().find(|f| f.spec.name == name)
    }

    pub fn card_titles(&self) -> Vec<&str> {
        self.cards.iter().map(|c| c.title.as_str()).collect()
    }

    /// Hex SHA-256 of the JSON form, for golden comparisons.
    pub fn digest(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        hex::encode(Sha256::digest(json.as_bytes()))
    }
}

/// A page held entirely in memory.
#[derive(Clone)]
pub struct MemoryPage {
    state: Arc<Mutex<PageSnapshot>>,
}

impl MemoryPage {
    /// Build a page for `layout`; a contact form gets the standard controls.
    pub fn new(layout: PageLayout) -> Self {
        let (fields, submit) = if layout.contact_form {
            (
                contact_fields(),
                Some(SubmitButton { label: DEFAULT_SUBMIT_LABEL.to_string(), disabled: false }),
            )
        } else {
            (Vec::new(), None)
        };
        Self::with_form(layout, fields, submit)
    }

    /// Build a page with explicit form controls and submit button.
    pub fn with_form(layout: PageLayout, fields: Vec<FieldState>, submit: Option<SubmitButton>) -> Self {
        let snap = PageSnapshot {
            category: "all".to_string(),
            layout,
            fields,
            submit_button: submit,
            ..Default::default()
        };
        Self { state: Arc::new(Mutex::new(snap)) }
    }

    fn lock(&self) -> MutexGuard<'_, PageSnapshot> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Handles for every region this page's layout declares.
    pub fn capabilities(&self) -> Capabilities {
        let layout = self.lock().layout.clone();
        let region = || Region { page: self.clone() };
        Capabilities {
            gallery: layout.gallery.map(|_| Box::new(region()) as Box<dyn GalleryContainer>),
            controls: (layout.search_input || layout.category_select)
                .then(|| Box::new(region()) as Box<dyn FilterControls>),
            modal: layout.modal.then(|| Box::new(region()) as Box<dyn ModalRegion>),
            form: layout.contact_form.then(|| Box::new(region()) as Box<dyn ContactForm>),
            status: layout.status.then(|| Box::new(region()) as Box<dyn StatusRegion>),
            theme_root: layout.theme_root.then(|| Box::new(region()) as Box<dyn ThemeRoot>),
        }
    }

    pub fn snapshot(&self) -> PageSnapshot {
        self.lock().clone()
    }

    // --- user input ---

    pub fn type_into(&self, name: &str, value: &str) {
        if let Some(f) = self.lock().fields.iter_mut().find(|f| f.spec.name == name) {
            f.value = value.to_string();
        }
    }

    pub fn set_checked(&self, name: &str, checked: bool) {
        if let Some(f) = self.lock().fields.iter_mut().find(|f| f.spec.name == name) {
            f.checked = checked;
        }
    }

    pub fn set_search_term(&self, term: &str) {
        self.lock().search_term = term.to_string();
    }

    pub fn select_category(&self, category: &str) {
        self.lock().category = category.to_string();
    }

    pub fn set_dark_attribute(&self, dark: bool) {
        self.lock().dark_theme = dark;
    }
}

impl Default for MemoryPage {
    fn default() -> Self {
        Self::new(PageLayout::default())
    }
}

/// One region handle; all handles of a page share its snapshot.
struct Region {
    page: MemoryPage,
}

impl GalleryContainer for Region {
    fn mode(&self) -> GalleryMode {
        self.page.lock().layout.gallery.unwrap_or(GalleryMode::Full)
    }

    fn replace_cards(&mut self, cards: Vec<Card>) {
        self.page.lock().cards = cards;
    }
}

impl FilterControls for Region {
    fn search_term(&self) -> Option<String> {
        let s = self.page.lock();
        s.layout.search_input.then(|| s.search_term.clone())
    }

    fn category(&self) -> Option<String> {
        let s = self.page.lock();
        s.layout.category_select.then(|| s.category.clone())
    }
}

impl ModalRegion for Region {
    fn set_content(&mut self, title: &str, description: &str, tags: &[String]) {
        let mut s = self.page.lock();
        s.modal.title = title.to_string();
        s.modal.description = description.to_string();
        s.modal.tags = tags.to_vec();
    }

    fn set_aria_hidden(&mut self, hidden: bool) {
        self.page.lock().modal.aria_hidden = hidden;
    }

    fn focus_close(&mut self) -> bool {
        let mut s = self.page.lock();
        if !s.layout.modal_close {
            return false;
        }
        s.focus = Some("close-modal-btn".to_string());
        true
    }
}

impl ContactForm for Region {
    fn fields(&self) -> Vec<FieldSpec> {
        self.page.lock().fields.iter().map(|f| f.spec.clone()).collect()
    }

    fn value(&self, name: &str) -> Option<String> {
        self.page.lock().field(name).map(|f| f.value.clone())
    }

    fn set_value(&mut self, name: &str, value: &str) {
        self.page.type_into(name, value);
    }

    fn checked(&self, name: &str) -> Option<bool> {
        self.page.lock().field(name).map(|f| f.checked)
    }

    fn set_checked(&mut self, name: &str, checked: bool) {
        self.page.set_checked(name, checked);
    }

    fn mark(&mut self, name: &str, mark: FieldMark) {
        if let Some(f) = self.page.lock().fields.iter_mut().find(|f| f.spec.name == name) {
            f.mark = Some(mark);
        }
    }

    fn reset(&mut self) {
        for f in self.page.lock().fields.iter_mut() {
            f.reset();
        }
    }

    fn submit_button(&self) -> Option<SubmitButton> {
        self.page.lock().submit_button.clone()
    }

    fn set_submit_button(&mut self, button: SubmitButton) {
        let mut s = self.page.lock();
        if s.submit_button.is_some() {
            s.submit_button = Some(button);
        }
    }

    fn affordances(&self) -> FormAffordances {
        let s = self.page.lock();
        FormAffordances { save_draft: s.layout.save_draft, clear_draft: s.layout.clear_draft }
    }
}

impl StatusRegion for Region {
    fn show(&mut self, text: &str, tone: StatusTone) {
        self.page.lock().status = Some(StatusLine { text: text.to_string(), tone });
    }

    fn clear(&mut self) {
        self.page.lock().status = None;
    }
}

impl ThemeRoot for Region {
    fn set_dark(&mut self, dark: bool) {
        self.page.set_dark_attribute(dark);
    }

    fn is_dark(&self) -> bool {
        self.page.lock().dark_theme
    }
}
