//! Messages exchanged between page contexts and the background context
//!
//! Wire shapes:
//!
//! ```text
//! {"action": "openOptions"}
//! {"action": "insertTemplate", "template": {"id": "...", "title": "...", "content": "..."}}
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::editor::{Editor, insert_template};
use crate::error::Result;
use crate::placeholder;
use crate::settings::SettingsBackend;
use crate::store::TemplateStore;
use crate::template::PromptTemplate;

/// Keyboard shortcut that inserts the first stored template
pub const INSERT_TEMPLATE_COMMAND: &str = "insert-template";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Message {
    /// Page → background: open the template manager
    OpenOptions,
    /// Background → page: insert this template into the active editor
    InsertTemplate { template: PromptTemplate },
}

impl Message {
    /// Fill the placeholders of a carried template before it reaches the editor
    ///
    /// With `keep_unfilled`, empty or missing values leave their `{{name}}`
    /// token in place (preview); otherwise only provided values are substituted.
    pub fn filled(self, values: &HashMap<String, String>, keep_unfilled: bool) -> Self {
        match self {
            Message::InsertTemplate { mut template } => {
                template.content = if keep_unfilled {
                    placeholder::preview(&template.content, values)
                } else {
                    placeholder::render(&template.content, values)
                };
                Message::InsertTemplate { template }
            }
            other => other,
        }
    }
}

/// What the background context decided to do with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Response {
    OpenOptionsPage,
    Ignored,
}

/// Background-side message handling
pub struct Background<'a, B> {
    store: &'a TemplateStore<B>,
}

impl<'a, B: SettingsBackend> Background<'a, B> {
    pub fn new(store: &'a TemplateStore<B>) -> Self {
        Self { store }
    }

    pub fn handle(&self, message: &Message) -> Response {
        debug!(?message, "Background::handle: called");
        match message {
            Message::OpenOptions => Response::OpenOptionsPage,
            Message::InsertTemplate { .. } => Response::Ignored,
        }
    }

    /// Translate a keyboard command into a message for the active page
    ///
    /// Returns `None` for unknown commands or when no templates are stored.
    pub fn on_command(&self, command: &str) -> Result<Option<Message>> {
        if command != INSERT_TEMPLATE_COMMAND {
            debug!(%command, "Background::on_command: unknown command");
            return Ok(None);
        }
        Ok(self
            .store
            .list()?
            .into_iter()
            .next()
            .map(|template| Message::InsertTemplate { template }))
    }
}

/// Page-side handling; returns whether the editor was changed
pub fn handle_page_message(message: &Message, editor: &mut impl Editor) -> bool {
    match message {
        Message::InsertTemplate { template } => {
            insert_template(editor, &template.content);
            true
        }
        Message::OpenOptions => false,
    }
}
