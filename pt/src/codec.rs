//! Import/export file format
//!
//! Exports are a pretty-printed JSON array of `{id, title, content, category}`.
//! Imports accept either one template object or an array of them; only
//! `title` and `content` are required, and IDs in the file are ignored.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::template::{PromptTemplate, TemplateDraft, import_id};

/// Suggested file name for exports
pub const EXPORT_FILE_NAME: &str = "prompt-templates.json";

/// Exported form of a template; field order is the file's key order
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    id: &'a str,
    title: &'a str,
    content: &'a str,
    category: &'a str,
}

/// Serialize templates for export
pub fn export(templates: &[PromptTemplate]) -> Result<String> {
    let records: Vec<ExportRecord<'_>> = templates
        .iter()
        .map(|t| ExportRecord {
            id: &t.id,
            title: &t.title,
            content: &t.content,
            category: t.category.as_deref().unwrap_or(""),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&records)?)
}

/// Templates that passed validation, with fresh IDs
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub accepted: Vec<PromptTemplate>,
    /// Number of entries in the input, valid or not
    pub total: usize,
}

impl ImportBatch {
    pub fn rejected(&self) -> usize {
        self.total - self.accepted.len()
    }

    pub fn report(&self) -> ImportReport {
        ImportReport {
            imported: self.accepted.len(),
            total: self.total,
        }
    }
}

/// Outcome of a successful import
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub imported: usize,
    pub total: usize,
}

impl ImportReport {
    /// Some entries were dropped
    pub fn is_partial(&self) -> bool {
        self.imported < self.total
    }
}

/// Parse an import file, keeping the valid entries
///
/// Fails only if the input is not JSON or not an object/array. An array with
/// no valid entries yields an empty batch; deciding what that means is up
/// to the caller.
pub fn parse_import(input: &str) -> Result<ImportBatch> {
    let value: Value = serde_json::from_str(input).map_err(|e| StoreError::Format(format!("not valid JSON: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(_) => vec![value],
        other => {
            return Err(StoreError::Format(format!(
                "expected a template object or an array of templates, got {}",
                json_type(&other)
            )));
        }
    };

    let total = items.len();
    let accepted: Vec<PromptTemplate> = items
        .iter()
        .filter_map(draft_from_value)
        .map(|draft| draft.into_template(import_id()))
        .collect();

    debug!(total, accepted = accepted.len(), "parse_import: validated entries");
    Ok(ImportBatch { accepted, total })
}

fn draft_from_value(value: &Value) -> Option<TemplateDraft> {
    let object = value.as_object()?;
    let title = object.get("title")?.as_str()?;
    let content = object.get("content")?.as_str()?;
    let category = object.get("category").and_then(Value::as_str).map(str::to_string);
    TemplateDraft {
        title: title.to_string(),
        content: content.to_string(),
        category,
    }
    .validated()
    .ok()
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
