//! PromptStore - reusable prompt templates
//!
//! Stores prompt templates (title, content, optional category) in a single
//! synchronized settings document, fills `{{placeholder}}` tokens before a
//! template is inserted into a chat editor, and moves templates in and out
//! as JSON files.
//!
//! # Architecture
//!
//! ```text
//! {store_path}/
//! ├── options.json     # {"revision": N, "options": {"promptTemplatesJson": "[...]", "theme": "light"}}
//! └── options.lock
//! ```
//!
//! # Example
//!
//! ```ignore
//! use promptstore::{Options, TemplateDraft, TemplateStore, placeholder};
//!
//! let store = TemplateStore::open(".promptstore", Options::default())?;
//! let t = store.add(TemplateDraft::new("Greeting", "Hi {{name}}"))?;
//! let values = [("name".to_string(), "Bob".to_string())].into_iter().collect();
//! assert_eq!(placeholder::render(&t.content, &values), "Hi Bob");
//! ```

pub mod cli;
mod codec;
pub mod config;
mod defaults;
pub mod editor;
mod error;
pub mod messages;
pub mod placeholder;
pub mod settings;
mod store;
mod template;
pub mod wait;

pub use codec::{EXPORT_FILE_NAME, ImportBatch, ImportReport, export, parse_import};
pub use defaults::{SEED_VERSION, seed, seed_templates};
pub use error::{Result, StoreError};
pub use store::{DEFAULT_MAX_RETRIES, TemplateStore};
pub use template::{Options, PromptTemplate, TemplateDraft, Theme};
