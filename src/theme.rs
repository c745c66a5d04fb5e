//! Light/dark theme preference.
//!
//! `ThemeState` is the only writer of both the page root's theme attribute
//! and the persisted theme key.

use crate::dom::ThemeRoot;
use crate::storage::KeyValueStore;
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Only `"dark"` selects the dark theme; anything else is light.
    pub fn parse(value: &str) -> Self {
        if value == "dark" {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn from_dark(dark: bool) -> Self {
        if dark {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeState {
    current: Theme,
    key: String,
}

impl ThemeState {
    /// Read the persisted preference. With nothing stored (or unreadable
    /// storage) the theme the page already shows is kept.
    pub fn load(store: &dyn KeyValueStore, key: &str, page_theme: Theme) -> Self {
        let current = match store.get(key) {
            Ok(Some(v)) => Theme::parse(&v),
            Ok(None) => page_theme,
            Err(e) => {
                log::warn!("theme preference unreadable: {}", e);
                page_theme
            }
        };
        Self { current, key: key.to_string() }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    /// Write the current theme to the page root.
    pub fn apply(&self, root: &mut dyn ThemeRoot) {
        root.set_dark(self.current == Theme::Dark);
    }

    /// Flip the theme and return the new value.
    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        self.current
    }

    pub fn persist(&self, store: &mut dyn KeyValueStore) -> Result<()> {
        store.set(&self.key, self.current.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn unknown_values_load_light() {
        let mut mem = MemoryStore::new();
        assert_eq!(ThemeState::load(&mem, "t", Theme::Light).current(), Theme::Light);
        mem.set("t", "purple").unwrap();
        assert_eq!(ThemeState::load(&mem, "t", Theme::Dark).current(), Theme::Light);
        mem.set("t", "dark").unwrap();
        assert_eq!(ThemeState::load(&mem, "t", Theme::Light).current(), Theme::Dark);
    }

    #[test]
    fn nothing_stored_keeps_page_theme() {
        let mem = MemoryStore::new();
        assert_eq!(ThemeState::load(&mem, "t", Theme::Dark).current(), Theme::Dark);
        assert_eq!(Theme::from_dark(false), Theme::Light);
    }

    #[test]
    fn toggle_and_persist() {
        let mut mem = MemoryStore::new();
        let mut theme = ThemeState::load(&mem, "t", Theme::Light);
        assert_eq!(theme.toggle(), Theme::Dark);
        theme.persist(&mut mem).unwrap();
        assert_eq!(mem.get("t").unwrap().as_deref(), Some("dark"));
        assert_eq!(theme.toggle(), Theme::Light);
        theme.persist(&mut mem).unwrap();
        assert_eq!(mem.get("t").unwrap().as_deref(), Some("light"));
    }
}
