//! Required-field and email-format checks.

use crate::dom::{ContactForm, FieldKind, FieldMark, FieldSpec};
use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// `local@domain.tld` shaped, no whitespace.
pub fn is_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    /// Required and blank after trimming (or a required checkbox left unchecked)
    Missing,
    /// Email field whose value is not `local@domain.tld` shaped
    MalformedEmail,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOutcome {
    pub name: String,
    pub problem: Option<FieldProblem>,
}

impl FieldOutcome {
    pub fn mark(&self) -> FieldMark {
        if self.problem.is_some() {
            FieldMark::Invalid
        } else {
            FieldMark::Valid
        }
    }
}

/// One outcome per form control, in form order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValidationReport {
    pub fields: Vec<FieldOutcome>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.fields.iter().all(|f| f.problem.is_none())
    }

    pub fn invalid_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.problem.is_some())
            .map(|f| f.name.as_str())
            .collect()
    }

    pub fn problem(&self, name: &str) -> Option<FieldProblem> {
        self.fields.iter().find(|f| f.name == name).and_then(|f| f.problem)
    }

    /// Flag every control on the form, valid ones included.
    pub fn apply(&self, form: &mut dyn ContactForm) {
        for f in &self.fields {
            form.mark(&f.name, f.mark());
        }
    }
}

/// Check one control. Only required controls are checked; the email format
/// applies to a required email control once it is non-empty.
pub fn check_field(spec: &FieldSpec, value: &str, checked: bool) -> Option<FieldProblem> {
    if !spec.required {
        return None;
    }
    match spec.kind {
        FieldKind::Checkbox if !checked => Some(FieldProblem::Missing),
        FieldKind::Checkbox => None,
        _ if value.trim().is_empty() => Some(FieldProblem::Missing),
        FieldKind::Email if !is_email(value) => Some(FieldProblem::MalformedEmail),
        _ => None,
    }
}

/// Evaluate every control in one pass; never stops at the first failure.
pub fn validate(form: &dyn ContactForm) -> ValidationReport {
    let fields = form
        .fields()
        .into_iter()
        .map(|spec| {
            let value = form.value(&spec.name).unwrap_or_default();
            let checked = form.checked(&spec.name).unwrap_or(false);
            FieldOutcome { problem: check_field(&spec, &value, checked), name: spec.name }
        })
        .collect();
    ValidationReport { fields }
}
