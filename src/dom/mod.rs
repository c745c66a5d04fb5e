//! Page capabilities: the addressable regions the behavior layer writes to.
//!
//! Each region is a small trait so components receive handles instead of
//! querying a document. Any region may be missing from a page; the
//! corresponding `Capabilities` slot is then `None` and the feature that
//! depends on it becomes a no-op.

pub mod memory;

#[cfg(feature = "html")]
pub mod html;

pub use memory::{MemoryPage, PageLayout};

use crate::record::ProjectRecord;
use serde::{Deserialize, Serialize};

/// A keyboard key as reported by a keydown event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Enter,
    Escape,
    Other(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` name.
    pub fn from_name(name: &str) -> Self {
        match name {
            "Enter" => Key::Enter,
            "Escape" | "Esc" => Key::Escape,
            other => Key::Other(other.to_string()),
        }
    }
}

/// Input delivered to a gallery card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardInput {
    Click,
    Key(Key),
}

/// One rendered gallery card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub record_id: u64,
    pub title: String,
    pub tags: Vec<String>,
    pub tabindex: i32,
    pub role: String,
}

impl Card {
    pub fn from_record(record: &ProjectRecord) -> Self {
        Self {
            record_id: record.id,
            title: record.title.clone(),
            tags: record.tags.clone(),
            tabindex: 0,
            role: "button".to_string(),
        }
    }

    /// Pointer click and the Enter key both activate a card.
    pub fn activates(&self, input: &CardInput) -> bool {
        matches!(input, CardInput::Click | CardInput::Key(Key::Enter))
    }
}

/// How a gallery region presents the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GalleryMode {
    /// Projects page: every matching record.
    Full,
    /// Home page summary: only the first few records on the initial render.
    Featured,
}

/// Container that holds the gallery cards.
pub trait GalleryContainer: Send {
    fn mode(&self) -> GalleryMode;

    /// Replace every child of the container with `cards`, in order.
    fn replace_cards(&mut self, cards: Vec<Card>);
}

/// Search box and category selector. A control that is absent reads as `None`.
pub trait FilterControls: Send {
    fn search_term(&self) -> Option<String>;
    fn category(&self) -> Option<String>;
}

/// Detail dialog region.
pub trait ModalRegion: Send {
    fn set_content(&mut self, title: &str, description: &str, tags: &[String]);

    /// Accessible open/closed state (`aria-hidden`).
    fn set_aria_hidden(&mut self, hidden: bool);

    /// Move focus to the close affordance. Returns false when there is none.
    fn focus_close(&mut self) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Email,
    TextArea,
    Checkbox,
}

/// Static description of one form control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind, required: bool) -> Self {
        Self { name: name.to_string(), kind, required }
    }
}

/// Visual validity flag on a field's wrapper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldMark {
    Valid,
    Invalid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitButton {
    pub label: String,
    pub disabled: bool,
}

/// Optional buttons that sit beside the contact form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FormAffordances {
    pub save_draft: bool,
    pub clear_draft: bool,
}

/// The contact form and its named controls.
pub trait ContactForm: Send {
    fn fields(&self) -> Vec<FieldSpec>;
    fn value(&self, name: &str) -> Option<String>;
    fn set_value(&mut self, name: &str, value: &str);
    fn checked(&self, name: &str) -> Option<bool>;
    fn set_checked(&mut self, name: &str, checked: bool);
    fn mark(&mut self, name: &str, mark: FieldMark);

    /// Restore every control to its initial value.
    fn reset(&mut self);

    fn submit_button(&self) -> Option<SubmitButton>;
    fn set_submit_button(&mut self, button: SubmitButton);
    fn affordances(&self) -> FormAffordances;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTone {
    Neutral,
    Success,
    Error,
}

/// Inline status line under the form.
pub trait StatusRegion: Send {
    fn show(&mut self, text: &str, tone: StatusTone);
    fn clear(&mut self);
}

/// Page root carrying the theme attribute.
pub trait ThemeRoot: Send {
    fn set_dark(&mut self, dark: bool);
    fn is_dark(&self) -> bool;
}

/// The set of regions a page offers. Passed into `Site::new`.
#[derive(Default)]
pub struct Capabilities {
    pub gallery: Option<Box<dyn GalleryContainer>>,
    pub controls: Option<Box<dyn FilterControls>>,
    pub modal: Option<Box<dyn ModalRegion>>,
    pub form: Option<Box<dyn ContactForm>>,
    pub status: Option<Box<dyn StatusRegion>>,
    pub theme_root: Option<Box<dyn ThemeRoot>>,
}

impl Capabilities {
    /// A page with no addressable regions at all.
    pub fn none() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("gallery", &self.gallery.is_some())
            .field("controls", &self.controls.is_some())
            .field("modal", &self.modal.is_some())
            .field("form", &self.form.is_some())
            .field("status", &self.status.is_some())
            .field("theme_root", &self.theme_root.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn click_and_enter_activate_cards() {
        let card = Card::from_record(&ProjectRecord::new(1, "A", "x", "d", &["t"]));
        assert_eq!(card.tabindex, 0);
        assert_eq!(card.role, "button");
        assert!(card.activates(&CardInput::Click));
        assert!(card.activates(&CardInput::Key(Key::from_name("Enter"))));
        assert!(!card.activates(&CardInput::Key(Key::from_name(" "))));
        assert!(!card.activates(&CardInput::Key(Key::Escape)));
    }

    #[test]
    fn empty_capabilities() {
        let caps = Capabilities::none();
        assert!(caps.gallery.is_none() && caps.form.is_none() && caps.theme_root.is_none());
    }
}
