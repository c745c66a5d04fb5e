//! Draft persistence through the contact page and directly against stores

use bcult_site::dom::{MemoryPage, PageLayout};
use bcult_site::storage::{FileStore, KeyValueStore, MemoryStore, StorageKeys};
use bcult_site::{DraftRecord, DraftStore, Site, SiteConfig, UiEvent};

fn sample() -> DraftRecord {
    DraftRecord {
        name: "Ada".into(),
        email: "ada@example.com".into(),
        message: "Book a fitting".into(),
        newsletter: true,
    }
}

#[test]
fn save_then_load_returns_the_same_fields() {
    let mut store = MemoryStore::new();
    let mut drafts = DraftStore::new(&mut store, "bcult-draft");
    drafts.save(&sample()).unwrap();
    assert_eq!(drafts.load(), Some(sample()));
}

#[test]
fn clear_then_load_is_empty() {
    let mut store = MemoryStore::new();
    let mut drafts = DraftStore::new(&mut store, "bcult-draft");
    drafts.save(&sample()).unwrap();
    drafts.clear().unwrap();
    assert_eq!(drafts.load(), None);
    drafts.clear().unwrap();
}

#[test]
fn draft_is_stored_as_plain_json_object() {
    let mut store = MemoryStore::new();
    DraftStore::new(&mut store, "bcult-draft").save(&sample()).unwrap();
    let raw = store.get("bcult-draft").unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["email"], "ada@example.com");
    assert_eq!(value["newsletter"], true);
}

#[test]
fn malformed_or_partial_drafts() {
    let mut store = MemoryStore::new();
    store.set("bcult-draft", "{oops").unwrap();
    assert_eq!(DraftStore::new(&mut store, "bcult-draft").load(), None);

    store.set("bcult-draft", r#"{"name":"Ada"}"#).unwrap();
    let draft = DraftStore::new(&mut store, "bcult-draft").load().unwrap();
    assert_eq!(draft.name, "Ada");
    assert!(draft.email.is_empty());
    assert!(!draft.newsletter);
}

#[test]
fn page_buttons_save_restore_and_clear() {
    let page = MemoryPage::new(PageLayout::contact());
    page.type_into("name", "Ada");
    page.type_into("message", "Hello");
    page.set_checked("newsletter", true);

    let mut site = Site::new(SiteConfig::default(), page.capabilities(), Box::new(MemoryStore::new()), None);
    site.dispatch(UiEvent::SaveDraft);
    let saved = site.stored_draft().unwrap();
    assert_eq!(saved.name, "Ada");
    assert!(saved.newsletter);
    assert_eq!(page.snapshot().status.unwrap().text, "Draft Saved to Memory.");

    site.dispatch(UiEvent::ClearDraft);
    assert_eq!(site.stored_draft(), None);
    let snap = page.snapshot();
    assert_eq!(snap.field("name").unwrap().value, "");
    assert!(!snap.field("newsletter").unwrap().checked);
    assert_eq!(snap.status.unwrap().text, "Memory Wiped.");
}

#[test]
fn saved_draft_is_loaded_on_next_visit() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("storage.json");
    let keys = StorageKeys::new("bcult");

    let mut store = FileStore::open(&path);
    DraftStore::new(&mut store, &keys.draft).save(&sample())?;

    let page = MemoryPage::new(PageLayout::contact());
    let _site = Site::new(SiteConfig::default(), page.capabilities(), Box::new(FileStore::open(&path)), None);
    let snap = page.snapshot();
    assert_eq!(snap.field("name").unwrap().value, "Ada");
    assert_eq!(snap.field("email").unwrap().value, "ada@example.com");
    assert!(snap.field("newsletter").unwrap().checked);
    Ok(())
}

#[test]
fn quota_failure_keeps_the_page_usable() {
    let page = MemoryPage::new(PageLayout::contact());
    page.type_into("message", &"x".repeat(64));
    let mut site = Site::new(
        SiteConfig::default(),
        page.capabilities(),
        Box::new(MemoryStore::with_quota(16)),
        None,
    );
    site.dispatch(UiEvent::SaveDraft);
    assert_eq!(site.stored_draft(), None);
    assert!(page.snapshot().status.is_none());
    assert_eq!(page.snapshot().field("message").unwrap().value.len(), 64);
}

#[test]
fn missing_draft_buttons_disable_the_feature() {
    let layout = PageLayout { save_draft: false, ..PageLayout::contact() };
    let page = MemoryPage::new(layout);
    page.type_into("name", "Ada");
    let mut site = Site::new(SiteConfig::default(), page.capabilities(), Box::new(MemoryStore::new()), None);
    site.dispatch(UiEvent::SaveDraft);
    assert_eq!(site.stored_draft(), None);
}

#[test]
fn custom_prefix_namespaces_the_key() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let page = MemoryPage::new(PageLayout::contact());
    page.type_into("name", "Ada");
    let config = SiteConfig { storage_prefix: "studio".into(), ..Default::default() };
    let mut site = Site::new(config, page.capabilities(), Box::new(FileStore::open(&path)), None);
    site.dispatch(UiEvent::SaveDraft);

    let store = FileStore::open(&path);
    assert!(store.get("studio-draft").unwrap().is_some());
    assert!(store.get("bcult-draft").unwrap().is_none());
}
