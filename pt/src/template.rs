//! Template domain types and ID generation
//!
//! IDs come in three shapes depending on where a template was created:
//!
//! - user-created: `2026-10-19T10:00:00.123Z` (creation timestamp)
//! - seed: `default-code-review` (derived from the title)
//! - imported: `imported-1760868000123-k3j9x0q2a`

use chrono::{DateTime, SecondsFormat, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};

/// A stored, reusable prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTemplate {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PromptTemplate {
    /// Category label, or `None` when uncategorized
    pub fn category(&self) -> Option<&str> {
        self.category.as_deref().filter(|c| !c.is_empty())
    }
}

/// A template that has not been assigned an ID yet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateDraft {
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl TemplateDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Trim all fields and reject an empty title or content
    pub fn validated(self) -> Result<Self> {
        let title = self.title.trim();
        let content = self.content.trim();
        if title.is_empty() {
            return Err(StoreError::Validation("title must not be empty".to_string()));
        }
        if content.is_empty() {
            return Err(StoreError::Validation("content must not be empty".to_string()));
        }
        Ok(Self {
            title: title.to_string(),
            content: content.to_string(),
            category: normalize_category(self.category),
        })
    }

    /// Attach an ID, producing a storable template
    pub fn into_template(self, id: String) -> PromptTemplate {
        PromptTemplate {
            id,
            title: self.title,
            content: self.content,
            category: self.category,
        }
    }
}

/// Empty or whitespace-only categories mean uncategorized
pub fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

/// Color scheme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme '{}', expected light or dark", other)),
        }
    }
}

/// The persisted settings record shared by every client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    /// JSON-encoded array of [`PromptTemplate`]
    #[serde(default = "empty_template_list")]
    pub prompt_templates_json: String,

    #[serde(default)]
    pub theme: Theme,
}

fn empty_template_list() -> String {
    "[]".to_string()
}

impl Default for Options {
    fn default() -> Self {
        Self {
            prompt_templates_json: empty_template_list(),
            theme: Theme::default(),
        }
    }
}

impl Options {
    pub fn with_theme(theme: Theme) -> Self {
        Self {
            theme,
            ..Default::default()
        }
    }

    /// Decode the template list; a blank blob is an empty list
    pub fn templates(&self) -> Result<Vec<PromptTemplate>> {
        if self.prompt_templates_json.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&self.prompt_templates_json).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    pub fn set_templates(&mut self, templates: &[PromptTemplate]) -> Result<()> {
        self.prompt_templates_json = serde_json::to_string(templates)?;
        Ok(())
    }
}

/// ID for a user-created template: the creation time in RFC 3339 with milliseconds
pub fn timestamp_id(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Timestamp ID that does not collide with any existing template
pub fn unique_timestamp_id(now: DateTime<Utc>, existing: &[PromptTemplate]) -> String {
    let base = timestamp_id(now);
    let taken = |id: &str| existing.iter().any(|t| t.id == id);
    if !taken(&base) {
        return base;
    }
    let mut n = 1u32;
    loop {
        let candidate = format!("{}-{}", base, n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// Deterministic ID for a seed template
pub fn seed_id(title: &str) -> String {
    format!("default-{}", title.to_lowercase().replace(' ', "-"))
}

/// ID for an imported template: timestamp plus a random base36 suffix
pub fn import_id() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::rng();
    let suffix: String = (0..9)
        .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
        .collect();
    format!("imported-{}-{}", Utc::now().timestamp_millis(), suffix)
}
