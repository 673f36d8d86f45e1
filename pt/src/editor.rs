//! Inserting templates into a chat editor
//!
//! Site-specific code implements [`Editor`] for whatever widget the page
//! uses. [`TextEditor`] is a plain paragraph buffer used by the CLI.

use tracing::{info, warn};

use crate::wait::{WaitOptions, wait_for};

/// A rich-text editor that templates can be inserted into
pub trait Editor {
    /// The editor shows its empty-state placeholder
    fn is_empty(&self) -> bool;

    fn clear(&mut self);

    fn append_paragraph(&mut self, text: &str);

    /// Move focus (and the caret) to the end of the content
    fn focus(&mut self);
}

/// Insert text as a new paragraph, replacing the empty-state placeholder if shown
pub fn insert_template(editor: &mut impl Editor, text: &str) {
    if editor.is_empty() {
        editor.clear();
    }
    editor.append_paragraph(text);
    editor.focus();
}

/// Wait for the element the template control hangs off
///
/// On timeout the page simply does not get the control; this is logged and
/// not retried.
pub async fn attach<T>(find_anchor: impl FnMut() -> Option<T>, options: &WaitOptions) -> Option<T> {
    match wait_for(find_anchor, options).await {
        Ok(anchor) => {
            info!(what = %options.what, "Attached template control");
            Some(anchor)
        }
        Err(e) => {
            warn!(error = %e, "Template control not injected");
            None
        }
    }
}

/// In-memory editor holding a list of paragraphs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextEditor {
    paragraphs: Vec<String>,
    focused: bool,
}

impl TextEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(text: &str) -> Self {
        Self {
            paragraphs: vec![text.to_string()],
            focused: false,
        }
    }

    /// Paragraphs joined by newlines
    pub fn text(&self) -> String {
        self.paragraphs.join("\n")
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }
}

impl Editor for TextEditor {
    fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(|p| p.trim().is_empty())
    }

    fn clear(&mut self) {
        self.paragraphs.clear();
    }

    fn append_paragraph(&mut self, text: &str) {
        self.paragraphs.push(text.to_string());
    }

    fn focus(&mut self) {
        self.focused = true;
    }
}
