//! Scoped text segments produced from a markup document.

use serde::Serialize;
use std::sync::Arc;

/// How a segment was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentKind {
    /// A block region closed by a non-inline end tag
    Block,
    /// Text of an inline tag emitted as soon as it was read
    Inline,
    /// A markup comment
    Comment,
    /// An attribute value, such as image alt text
    Attribute,
}

/// A scoped unit of text ready for rule evaluation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Dotted scope identifier (`text.table.cell`, `strong`, `p`, ...)
    pub scope: String,
    pub text: String,
    /// Class attributes seen across the region, in the order they were opened
    pub classes: Vec<String>,
    /// Inline segments found inside this region
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Arc<Segment>>,
    /// For inline segments: the enclosing region's text with every inline child blanked out
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl Segment {
    pub fn new(kind: SegmentKind, scope: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind,
            scope: scope.into(),
            text: text.into(),
            classes: Vec::new(),
            children: Vec::new(),
            context: None,
        }
    }

    pub fn with_classes(mut self, classes: Vec<String>) -> Self {
        self.classes = classes;
        self
    }

    /// Context to evaluate this segment against: the masked enclosing region for
    /// inline segments, the segment's own text otherwise
    pub fn evaluation_context(&self) -> &str {
        self.context.as_deref().unwrap_or(&self.text)
    }
}

/// All segments of one document, in emission order, plus the prose summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Document {
    /// Every segment in the order it was emitted. Inline segments appear here
    /// and, shared, in the `children` of the block that encloses them.
    pub segments: Vec<Arc<Segment>>,
    /// Text of all generic prose regions, each followed by a space
    pub summary: String,
}

impl Document {
    pub fn iter(&self) -> impl Iterator<Item = &Segment> {
        self.segments.iter().map(|s| s.as_ref())
    }

    pub fn with_scope<'a>(&'a self, scope: &'a str) -> impl Iterator<Item = &'a Segment> + 'a {
        self.iter().filter(move |s| s.scope == scope)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }
}
