//! Field backfill planning.
//!
//! DESIGN
//! ======
//! A backfill sets each listed field only on documents where it is absent,
//! so re-running the same migration is a no-op. Planning is pure: it takes
//! decoded documents and returns the patches, and the caller decides whether
//! to apply them (`--dry-run` prints the plan instead).

use schema::firestore::Document;
use serde_json::{Map, Value};

/// One `--set field=value` argument. The value is parsed as JSON when it
/// is valid JSON (`true`, `3`, `"x"`, `{}`), otherwise taken as a string.
#[derive(Clone, Debug, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub value: Value,
}

/// clap value parser for `--set`.
///
/// # Errors
///
/// A message when the argument has no `=` or an empty or dotted field name.
pub fn parse_assignment(raw: &str) -> Result<Assignment, String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value, got `{raw}`"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("empty field name in `{raw}`"));
    }
    if field.contains('.') {
        return Err(format!("only top-level fields can be backfilled, got `{field}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok(Assignment { field: field.to_owned(), value })
}

/// Fields of `assignments` missing from `fields`, or `None` when the document
/// already has all of them.
#[must_use]
pub fn missing_fields(fields: &Map<String, Value>, assignments: &[Assignment]) -> Option<Map<String, Value>> {
    let patch: Map<String, Value> = assignments
        .iter()
        .filter(|a| !fields.contains_key(&a.field))
        .map(|a| (a.field.clone(), a.value.clone()))
        .collect();
    (!patch.is_empty()).then_some(patch)
}

#[derive(Clone, Debug, PartialEq)]
pub struct Patch {
    pub id: String,
    pub fields: Map<String, Value>,
}

/// Running totals across pages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub scanned: usize,
    pub patched: usize,
    pub up_to_date: usize,
}

impl Summary {
    /// Plan one page of documents and count it.
    pub fn plan_page(&mut self, documents: &[Document], assignments: &[Assignment]) -> Vec<Patch> {
        self.scanned += documents.len();
        let patches: Vec<Patch> = documents
            .iter()
            .filter_map(|doc| {
                missing_fields(&doc.fields, assignments).map(|fields| Patch { id: doc.id().to_owned(), fields })
            })
            .collect();
        self.patched += patches.len();
        self.up_to_date += documents.len() - patches.len();
        patches
    }
}

#[cfg(test)]
#[path = "migrate_test.rs"]
mod tests;
