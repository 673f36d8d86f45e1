//! Seed templates
//!
//! These are compiled into the binary from `templates/*.json` and written to
//! the store the first time it is initialized.

use tracing::debug;

use crate::error::{Result, StoreError};
use crate::template::{PromptTemplate, TemplateDraft, seed_id};

/// Bumped whenever the seed set changes
pub const SEED_VERSION: u32 = 1;

/// General question starter
pub const GENERAL_QUESTION: &str = include_str!("../templates/general-question.json");

/// Code review starter
pub const CODE_REVIEW: &str = include_str!("../templates/code-review.json");

/// Bug analysis starter
pub const BUG_ANALYSIS: &str = include_str!("../templates/bug-analysis.json");

const SEED_FILES: [&str; 3] = [GENERAL_QUESTION, CODE_REVIEW, BUG_ANALYSIS];

/// The starter templates, in display order
pub fn seed() -> Result<Vec<TemplateDraft>> {
    debug!(version = SEED_VERSION, "seed: loading embedded templates");
    SEED_FILES
        .iter()
        .map(|raw| serde_json::from_str::<TemplateDraft>(raw).map_err(StoreError::from))
        .collect()
}

/// The starter templates with their deterministic `default-*` IDs
pub fn seed_templates() -> Result<Vec<PromptTemplate>> {
    Ok(seed()?
        .into_iter()
        .map(|draft| {
            let id = seed_id(&draft.title);
            draft.into_template(id)
        })
        .collect())
}
