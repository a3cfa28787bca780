//! Structural validation of submitted drafts.
//!
//! Validation never stops at the first failure: every violated constraint
//! in one request is collected, interpolated to a message, and grouped by
//! field path, preserving first-seen field and message order. The boundary
//! layer serializes the resulting map as the error body.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::FilmDraft;

/// A validation rule, carrying its message template and any metadata the
/// template interpolates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    NotBlank,
    TooLong { max: usize, len: usize },
}

impl Rule {
    /// Message template for the fixed `en` catalog. Deterministic output
    /// regardless of the host locale.
    fn template(&self) -> &'static str {
        match self {
            Rule::NotBlank => "must not be blank",
            Rule::TooLong { .. } => "length must be at most {max}, was {len}",
        }
    }

    fn attributes(&self) -> Vec<(&'static str, String)> {
        match self {
            Rule::NotBlank => Vec::new(),
            Rule::TooLong { max, len } => {
                vec![("max", max.to_string()), ("len", len.to_string())]
            }
        }
    }

    /// Interpolate the template with the rule's attributes.
    pub fn message(&self) -> String {
        let mut msg = self.template().to_string();
        for (key, value) in self.attributes() {
            msg = msg.replace(&format!("{{{key}}}"), &value);
        }
        msg
    }
}

/// One failed constraint on one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub field: String,
    pub rule: Rule,
}

/// All violations of one request, grouped by field path.
///
/// Field order and per-field message order follow first appearance, the
/// same order the fields occur in the submitted body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Violations(IndexMap<String, Vec<String>>);

impl Violations {
    pub fn push(&mut self, violation: Violation) {
        self.0
            .entry(violation.field)
            .or_default()
            .push(violation.rule.message());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn messages(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

fn is_blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Column width of the text columns in storage (`VARCHAR(255)`). Checked
/// here so an oversized value is a validation failure, not a storage one.
const MAX_TEXT_LEN: usize = 255;

fn check_len(violations: &mut Violations, field: &str, value: &str) {
    let len = value.chars().count();
    if len > MAX_TEXT_LEN {
        violations.push(Violation {
            field: field.to_string(),
            rule: Rule::TooLong {
                max: MAX_TEXT_LEN,
                len,
            },
        });
    }
}

/// Validate a submitted film, reporting the complete set of violations.
///
/// Name fields are only required on id-less cast entries; an explicit-id
/// entry is a reference to an existing row and carries no names.
pub fn validate_film(draft: &FilmDraft) -> Result<(), Violations> {
    let mut violations = Violations::default();

    if is_blank(&draft.title) {
        violations.push(Violation {
            field: "title".to_string(),
            rule: Rule::NotBlank,
        });
    }
    check_len(&mut violations, "title", &draft.title);

    for (i, actor) in draft.actors.iter().enumerate() {
        if actor.id.is_some() {
            continue;
        }
        if is_blank(&actor.last_name) {
            violations.push(Violation {
                field: format!("actors[{i}].last_name"),
                rule: Rule::NotBlank,
            });
        }
        check_len(&mut violations, &format!("actors[{i}].last_name"), &actor.last_name);
        if is_blank(&actor.first_name) {
            violations.push(Violation {
                field: format!("actors[{i}].first_name"),
                rule: Rule::NotBlank,
            });
        }
        check_len(&mut violations, &format!("actors[{i}].first_name"), &actor.first_name);
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}
