//! Static HTML page loader.
//!
//! Parses a page with `scraper` and builds a `MemoryPage` carrying the same
//! regions, form controls and initial values, plus the dataset the page
//! injects for the gallery.

use super::memory::{FieldState, MemoryPage, PageLayout, DEFAULT_SUBMIT_LABEL};
use super::{FieldKind, FieldSpec, GalleryMode, SubmitButton};
use crate::record::ProjectRecord;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::path::Path;

static WINDOW_PROJECTS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"window\.PROJECTS\s*=\s*").expect("static dataset pattern"));

fn sel(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::LoadError(format!("bad selector `{}`: {:?}", css, e)))
}

fn first<'a>(doc: &'a Html, css: &str) -> Result<Option<ElementRef<'a>>> {
    Ok(doc.select(&sel(css)?).next())
}

fn exists(doc: &Html, css: &str) -> Result<bool> {
    Ok(first(doc, css)?.is_some())
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// A page loaded from HTML.
pub struct LoadedPage {
    pub page: MemoryPage,
    /// Records injected by the page, if it injects any parseable ones.
    pub dataset: Option<Vec<ProjectRecord>>,
    pub title: Option<String>,
    pub report: PageReport,
}

/// What a page offers: regions found and the features they enable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageReport {
    pub title: Option<String>,
    pub layout: PageLayout,
    pub theme_toggle: bool,
    pub fields: Vec<FieldSpec>,
    pub injected_records: Option<usize>,
    pub features: Vec<Feature>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Feature {
    pub name: &'static str,
    pub live: bool,
}

impl PageReport {
    fn features_of(layout: &PageLayout, theme_toggle: bool) -> Vec<Feature> {
        let f = |name, live| Feature { name, live };
        vec![
            f("gallery", layout.gallery.is_some()),
            f("featured", layout.gallery == Some(GalleryMode::Featured)),
            f("search", layout.gallery.is_some() && layout.search_input),
            f("category-filter", layout.gallery.is_some() && layout.category_select),
            f("modal", layout.gallery.is_some() && layout.modal),
            f("validation", layout.contact_form),
            f("save-draft", layout.contact_form && layout.save_draft),
            f("clear-draft", layout.contact_form && layout.clear_draft),
            f("status", layout.status),
            f("theme-toggle", theme_toggle),
        ]
    }
}

/// Read and load an HTML file.
pub fn load_file(path: impl AsRef<Path>) -> Result<LoadedPage> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::LoadError(format!("cannot read {}: {}", path.display(), e)))?;
    load_html(&text)
}

/// Build an in-memory page from an HTML document.
pub fn load_html(source: &str) -> Result<LoadedPage> {
    let doc = Html::parse_document(source);

    let gallery = if exists(&doc, "#projects-container")? {
        Some(GalleryMode::Full)
    } else if exists(&doc, "#featured-grid")? {
        Some(GalleryMode::Featured)
    } else {
        None
    };

    let form_el = first(&doc, "#contact-form")?;
    let layout = PageLayout {
        gallery,
        search_input: exists(&doc, "#search-input")?,
        category_select: exists(&doc, "#filter-select")?,
        modal: exists(&doc, "#project-modal")?,
        modal_close: exists(&doc, "#project-modal .close-modal-btn")?,
        contact_form: form_el.is_some(),
        status: exists(&doc, "#form-status")?,
        save_draft: exists(&doc, "#save-draft")?,
        clear_draft: exists(&doc, "#clear-draft")?,
        theme_root: exists(&doc, "body")?,
    };

    let (fields, submit) = match form_el {
        Some(form) => (form_fields(form)?, submit_button(form)?),
        None => (Vec::new(), None),
    };

    let page = MemoryPage::with_form(layout.clone(), fields.clone(), submit);

    if let Some(input) = first(&doc, "#search-input")? {
        page.set_search_term(input.value().attr("value").unwrap_or_default());
    }
    if let Some(category) = initial_category(&doc)? {
        page.select_category(&category);
    }
    if let Some(body) = first(&doc, "body")? {
        page.set_dark_attribute(body.value().attr("data-theme") == Some("dark"));
    }

    let title = first(&doc, "title")?.map(text_of).filter(|t| !t.is_empty());
    let theme_toggle = exists(&doc, "#theme-toggle")?;
    let dataset = injected_dataset(&doc)?;

    log::debug!(
        "loaded page {:?}: gallery {:?}, form {}, {} injected records",
        title,
        layout.gallery,
        layout.contact_form,
        dataset.as_ref().map_or(0, Vec::len)
    );

    let report = PageReport {
        title: title.clone(),
        features: PageReport::features_of(&layout, theme_toggle),
        layout,
        theme_toggle,
        fields: fields.into_iter().map(|f| f.spec).collect(),
        injected_records: dataset.as_ref().map(Vec::len),
    };

    Ok(LoadedPage { page, dataset, title, report })
}

fn form_fields(form: ElementRef<'_>) -> Result<Vec<FieldState>> {
    let mut fields = Vec::new();
    for el in form.select(&sel("input, textarea")?) {
        let attrs = el.value();
        let Some(name) = attrs.attr("name").filter(|n| !n.is_empty()) else {
            continue;
        };
        let kind = if attrs.name() == "textarea" {
            FieldKind::TextArea
        } else {
            match attrs.attr("type").unwrap_or("text").to_ascii_lowercase().as_str() {
                "submit" | "button" | "hidden" | "reset" => continue,
                "email" => FieldKind::Email,
                "checkbox" => FieldKind::Checkbox,
                _ => FieldKind::Text,
            }
        };
        let required = attrs.attr("required").is_some();
        let value = match kind {
            FieldKind::TextArea => el.text().collect::<String>(),
            FieldKind::Checkbox => String::new(),
            _ => attrs.attr("value").unwrap_or_default().to_string(),
        };
        let checked = kind == FieldKind::Checkbox && attrs.attr("checked").is_some();
        fields.push(FieldState::new(FieldSpec::new(name, kind, required), &value, checked));
    }
    Ok(fields)
}

fn submit_button(form: ElementRef<'_>) -> Result<Option<SubmitButton>> {
    if let Some(button) = form.select(&sel(r#"button[type="submit"]"#)?).next() {
        let label = text_of(button);
        return Ok(Some(SubmitButton {
            label: if label.is_empty() { DEFAULT_SUBMIT_LABEL.to_string() } else { label },
            disabled: button.value().attr("disabled").is_some(),
        }));
    }
    Ok(form.select(&sel(r#"input[type="submit"]"#)?).next().map(|input| SubmitButton {
        label: input.value().attr("value").unwrap_or(DEFAULT_SUBMIT_LABEL).to_string(),
        disabled: input.value().attr("disabled").is_some(),
    }))
}

fn initial_category(doc: &Html) -> Result<Option<String>> {
    let Some(select) = first(doc, "#filter-select")? else {
        return Ok(None);
    };
    let options = sel("option")?;
    let chosen = select
        .select(&options)
        .find(|o| o.value().attr("selected").is_some())
        .or_else(|| select.select(&options).next());
    Ok(chosen.map(|o| match o.value().attr("value") {
        Some(v) => v.to_string(),
        None => text_of(o),
    }))
}

/// The dataset a page injects: a `#projects-data` JSON script, else a
/// `window.PROJECTS = [...]` assignment. Unparseable data is ignored.
fn injected_dataset(doc: &Html) -> Result<Option<Vec<ProjectRecord>>> {
    if let Some(script) = first(doc, "script#projects-data")? {
        let json: String = script.text().collect();
        return Ok(parse_dataset(&json, "#projects-data"));
    }
    for script in doc.select(&sel("script")?) {
        let body: String = script.text().collect();
        if let Some(m) = WINDOW_PROJECTS_RE.find(&body) {
            return Ok(parse_leading_array(&body[m.end()..]));
        }
    }
    Ok(None)
}

/// Decode the array literal at the start of `rest`; whatever script follows
/// it is ignored.
fn parse_leading_array(rest: &str) -> Option<Vec<ProjectRecord>> {
    match serde_json::Deserializer::from_str(rest).into_iter::<Vec<ProjectRecord>>().next() {
        Some(Ok(records)) => Some(records),
        Some(Err(e)) => {
            log::warn!("ignoring injected dataset from window.PROJECTS: {}", e);
            None
        }
        None => {
            log::warn!("window.PROJECTS assignment has no value");
            None
        }
    }
}

fn parse_dataset(json: &str, origin: &str) -> Option<Vec<ProjectRecord>> {
    match serde_json::from_str::<Vec<ProjectRecord>>(json) {
        Ok(records) => Some(records),
        Err(e) => {
            log::warn!("ignoring injected dataset from {}: {}", origin, e);
            None
        }
    }
}
