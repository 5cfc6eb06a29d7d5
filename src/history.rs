//! Tag and class history for the region currently being assembled.
//!
//! The tag history is a log, not a stack: tags are appended when opened and only
//! cleared at a block boundary, so scope resolution sees every ancestor of the region.

use crate::scope::ScopeTable;

#[derive(Debug, Clone, Default)]
pub struct History {
    /// Tags opened in this region, outermost first
    pub tags: Vec<String>,
    /// Non-empty class attributes seen on any tag in this region
    pub classes: Vec<String>,
    /// Most recently opened tag still owning the next text run
    active_tag: Option<String>,
    /// Whether the most recently opened tag is inline
    active_inline: bool,
    /// Inline segments emitted inside this region, by index into the builder output
    pending: Vec<usize>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_tag(&mut self, tag: &str, table: &ScopeTable) {
        self.tags.push(tag.to_string());
        self.active_tag = Some(tag.to_string());
        self.active_inline = table.is_inline(tag);
    }

    pub fn push_class(&mut self, class: &str) {
        if !class.is_empty() {
            self.classes.push(class.to_string());
        }
    }

    pub fn active_tag(&self) -> Option<&str> {
        self.active_tag.as_deref()
    }

    /// Release the active tag once its text has been consumed or it was closed
    pub fn clear_active(&mut self) {
        self.active_tag = None;
    }

    pub fn active_inline(&self) -> bool {
        self.active_inline
    }

    pub fn queue_child(&mut self, index: usize) {
        self.pending.push(index);
    }

    pub fn pending(&self) -> &[usize] {
        &self.pending
    }

    /// Clear tags, classes and pending children at a block boundary
    pub fn reset(&mut self) {
        self.tags.clear();
        self.classes.clear();
        self.pending.clear();
    }
}
