//! Gallery renderer: projects records into cards inside the gallery container.

use crate::dom::{Card, GalleryContainer, GalleryMode};
use crate::record::ProjectRecord;

pub struct Gallery {
    container: Option<Box<dyn GalleryContainer>>,
    visible: Vec<u64>,
}

impl Gallery {
    pub fn new(container: Option<Box<dyn GalleryContainer>>) -> Self {
        Self { container, visible: Vec::new() }
    }

    pub fn mode(&self) -> Option<GalleryMode> {
        self.container.as_ref().map(|c| c.mode())
    }

    /// Replace the container's cards with one card per record, in order,
    /// truncated to `limit`. Returns the number of cards shown; zero when the
    /// page has no gallery container.
    pub fn render(&mut self, records: &[ProjectRecord], limit: Option<usize>) -> usize {
        let Some(container) = self.container.as_mut() else {
            return 0;
        };
        let take = limit.unwrap_or(records.len());
        let cards: Vec<Card> = records.iter().take(take).map(Card::from_record).collect();
        self.visible = cards.iter().map(|c| c.record_id).collect();
        let shown = cards.len();
        container.replace_cards(cards);
        log::debug!("rendered {} of {} records", shown, records.len());
        shown
    }

    /// First render on page load: featured galleries show only the first
    /// `featured_limit` records.
    pub fn render_initial(&mut self, records: &[ProjectRecord], featured_limit: usize) -> usize {
        let limit = match self.mode() {
            Some(GalleryMode::Featured) => Some(featured_limit),
            _ => None,
        };
        self.render(records, limit)
    }

    /// Ids of the cards currently in the container, in order.
    pub fn visible_ids(&self) -> &[u64] {
        &self.visible
    }

    pub fn is_visible(&self, id: u64) -> bool {
        self.visible.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::{MemoryPage, PageLayout};
    use crate::record::fallback_records;

    #[test]
    fn featured_initial_render_is_limited() {
        let page = MemoryPage::new(PageLayout {
            gallery: Some(GalleryMode::Featured),
            ..Default::default()
        });
        let mut gallery = Gallery::new(page.capabilities().gallery);
        assert_eq!(gallery.render_initial(&fallback_records(), 2), 2);
        assert_eq!(page.snapshot().card_titles(), vec!["Classic Fade", "Urban Tech"]);
        assert_eq!(gallery.visible_ids(), &[101, 102]);
    }

    #[test]
    fn render_replaces_previous_cards() {
        let page = MemoryPage::new(PageLayout::projects());
        let mut gallery = Gallery::new(page.capabilities().gallery);
        gallery.render(&fallback_records(), None);
        gallery.render(&fallback_records()[2..], None);
        assert_eq!(page.snapshot().card_titles(), vec!["Gala Ready"]);
        assert!(!gallery.is_visible(101));
    }

    #[test]
    fn empty_input_renders_no_cards() {
        let page = MemoryPage::new(PageLayout::projects());
        let mut gallery = Gallery::new(page.capabilities().gallery);
        gallery.render(&fallback_records(), None);
        assert_eq!(gallery.render(&[], None), 0);
        assert!(page.snapshot().cards.is_empty());
    }

    #[test]
    fn missing_container_is_a_no_op() {
        let mut gallery = Gallery::new(None);
        assert_eq!(gallery.render(&fallback_records(), Some(3)), 0);
        assert!(gallery.mode().is_none());
    }
}
