//! Single-pass transducer from a markup token stream to scoped segments.
//!
//! Text accumulates in a region buffer until a non-inline end tag closes the
//! region. At that point the region's scope is resolved from the tag history and
//! the buffer becomes a block segment. Text of scoped inline tags (links,
//! emphasis, code, ...) is emitted immediately as an inline segment and is also
//! kept in the buffer; the block records those inline segments as its children
//! and each child receives a copy of the block text with the children blanked out.

use crate::config::SourceFormat;
use crate::context::mask_children;
use crate::history::History;
use crate::markup::{self, Token};
use crate::mask::{clean, has_ignored_class, nested_in_verbatim};
use crate::scope::{ALT_TEXT_SCOPE, COMMENT_SCOPE, ScopeTable, is_prose};
use crate::segment::{Document, Segment, SegmentKind};
use std::sync::Arc;

/// A segment whose children are still referenced by index into the builder output
#[derive(Debug)]
struct Draft {
    segment: Segment,
    children: Vec<usize>,
    /// Byte offset of an inline segment's text in the region buffer
    offset: Option<usize>,
}

/// An open skip-tag region. Nested tags of the same name are counted so the
/// region ends at the matching end tag.
#[derive(Debug)]
struct Suppressed {
    tag: String,
    depth: usize,
}

/// Builds the [`Document`] for one token stream.
///
/// A builder owns all of its state and is consumed by [`SegmentBuilder::build`];
/// concurrent documents each use their own builder.
pub struct SegmentBuilder<'a> {
    table: &'a ScopeTable,
    format: SourceFormat,
    history: History,
    buffer: String,
    drafts: Vec<Draft>,
    summary: String,
    suppressed: Option<Suppressed>,
    /// The last opened tag masks the next text run
    mask_next: bool,
    /// Class attribute of the previous token, if it was a start tag
    last_class: String,
}

impl<'a> SegmentBuilder<'a> {
    pub fn new(table: &'a ScopeTable, format: SourceFormat) -> Self {
        Self {
            table,
            format,
            history: History::new(),
            buffer: String::new(),
            drafts: Vec::new(),
            summary: String::new(),
            suppressed: None,
            mask_next: false,
            last_class: String::new(),
        }
    }

    /// Walk the token stream to its end or to the first error token.
    ///
    /// Text of a region that is still open when the walk stops is discarded.
    pub fn build<I>(mut self, tokens: I) -> Document
    where
        I: IntoIterator<Item = Token>,
    {
        for token in tokens {
            match token {
                Token::Start { name, attrs } => self.start_tag(&name, &attrs),
                Token::End { name } => self.end_tag(&name),
                Token::Text(text) => self.text(&text),
                Token::Comment(text) => self.comment(&text),
                Token::Error(message) => {
                    log::debug!("Token stream stopped early: {message}");
                    break;
                }
            }
        }

        if !self.buffer.trim().is_empty() {
            log::debug!("Discarding unterminated region: {:?}", self.buffer.trim());
        }

        self.finish()
    }

    fn start_tag(&mut self, name: &str, attrs: &[(String, String)]) {
        if let Some(suppressed) = self.suppressed.as_mut() {
            if suppressed.tag == name {
                suppressed.depth += 1;
            }
            self.alt_text(name, attrs);
            return;
        }

        if self.table.is_skipped(name) {
            log::debug!("Skipping content of <{name}>");
            self.suppressed = Some(Suppressed {
                tag: name.to_string(),
                depth: 1,
            });
        }

        let class = attr(attrs, "class").unwrap_or_default();
        self.history.push_tag(name, self.table);
        self.history.push_class(class);
        self.mask_next = self.table.is_ignored_inline(name);
        self.last_class = class.to_string();
        self.alt_text(name, attrs);
    }

    /// Image alt text is its own segment, inside skipped regions too
    fn alt_text(&mut self, name: &str, attrs: &[(String, String)]) {
        if name == "img"
            && let Some(alt) = attr(attrs, "alt")
        {
            let segment = Segment::new(SegmentKind::Attribute, ALT_TEXT_SCOPE, alt.trim())
                .with_classes(self.history.classes.clone());
            self.push(segment, Vec::new());
        }
    }

    fn end_tag(&mut self, name: &str) {
        self.last_class.clear();
        if let Some(suppressed) = self.suppressed.as_mut() {
            if suppressed.tag != name {
                return;
            }
            suppressed.depth -= 1;
            if suppressed.depth > 0 {
                return;
            }
            self.suppressed = None;
        }

        if self.table.is_inline(name) {
            self.history.clear_active();
            return;
        }

        self.flush();
    }

    fn text(&mut self, raw: &str) {
        let text = raw.trim();
        if self.suppressed.is_some() || text.is_empty() {
            self.last_class.clear();
            return;
        }

        let skip = self.mask_next || nested_in_verbatim(&self.history.tags, self.format);
        let skip_class = has_ignored_class(&self.last_class, self.table);
        self.last_class.clear();
        let inline = self.history.active_inline();

        let inline_scope = self
            .history
            .active_tag()
            .and_then(|tag| self.table.inline_scope(tag))
            .map(str::to_string);
        let cleaned = clean(text, self.format, skip, skip_class, inline);
        if !inline && !self.buffer.is_empty() && !self.buffer.ends_with(char::is_whitespace) {
            self.buffer.push(' ');
        }
        let offset = self.buffer.len() + (cleaned.len() - cleaned.trim_start().len());
        self.buffer.push_str(&cleaned);
        self.mask_next = false;

        if let Some(scope) = inline_scope {
            let segment =
                Segment::new(SegmentKind::Inline, scope, text).with_classes(self.history.classes.clone());
            let index = self.push(segment, Vec::new());
            self.drafts[index].offset = Some(offset);
            self.history.queue_child(index);
            self.history.clear_active();
        }
    }

    fn comment(&mut self, raw: &str) {
        self.last_class.clear();
        if self.suppressed.is_some() {
            return;
        }
        let text = raw.trim();
        if !text.is_empty() {
            self.push(Segment::new(SegmentKind::Comment, COMMENT_SCOPE, text), Vec::new());
        }
    }

    /// Close the current region
    fn flush(&mut self) {
        if !self.buffer.trim().is_empty() {
            let scope = self.table.resolve(&self.history.tags);
            let text = self.buffer.trim_start_matches(' ').to_string();
            let shift = self.buffer.len() - text.len();
            let children = self.history.pending().to_vec();

            let context = {
                let spans: Vec<(&str, Option<usize>)> = children
                    .iter()
                    .map(|&index| {
                        let draft = &self.drafts[index];
                        (
                            draft.segment.text.as_str(),
                            draft.offset.and_then(|offset| offset.checked_sub(shift)),
                        )
                    })
                    .collect();
                mask_children(&text, &spans)
            };
            for &index in &children {
                self.drafts[index].segment.context = Some(context.clone());
            }

            if is_prose(&scope) {
                self.summary.push_str(&text);
                self.summary.push(' ');
            }

            let segment = Segment::new(SegmentKind::Block, scope, text).with_classes(self.history.classes.clone());
            self.push(segment, children);
        }

        self.history.reset();
        self.buffer.clear();
    }

    fn push(&mut self, segment: Segment, children: Vec<usize>) -> usize {
        self.drafts.push(Draft {
            segment,
            children,
            offset: None,
        });
        self.drafts.len() - 1
    }

    /// Children always precede their block, so every index resolves to an
    /// already-built segment.
    fn finish(self) -> Document {
        let mut segments: Vec<Arc<Segment>> = Vec::with_capacity(self.drafts.len());
        for Draft { mut segment, children, .. } in self.drafts {
            segment.children = children
                .iter()
                .filter_map(|&index| segments.get(index).cloned())
                .collect();
            segments.push(Arc::new(segment));
        }

        Document {
            segments,
            summary: self.summary,
        }
    }
}

fn attr<'t>(attrs: &'t [(String, String)], key: &str) -> Option<&'t str> {
    attrs.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
}

/// Segment a source document
pub fn segment(source: &str, format: SourceFormat, table: &ScopeTable) -> Document {
    SegmentBuilder::new(table, format).build(markup::tokenize(format, source))
}
