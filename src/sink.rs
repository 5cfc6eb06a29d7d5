//! Hand-off of finished segments to a rule engine.
//!
//! [`evaluate_document`] walks a [`Document`] in emission order and calls the
//! sink once per segment, honouring comment directives, then once for the
//! document summary and once for the raw source.

use crate::config::SourceFormat;
use crate::inline_config::InlineConfig;
use crate::mask::MASK_CHAR;
use crate::segment::{Document, SegmentKind};
use std::collections::BTreeSet;

/// Scope of the whole-document prose pass
pub const SUMMARY_SCOPE: &str = "summary";
/// Scope of the whole-document raw source pass
pub const RAW_SCOPE: &str = "raw";

/// One unit of work for the rule engine
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub scope: String,
    pub format: SourceFormat,
    pub text: String,
    /// Text position-aware rules should search; differs from `text` for inline segments
    pub context: String,
    pub classes: Vec<String>,
    /// 0-based source line where the text starts
    pub line_offset: usize,
    /// Rules switched off by comment directives at this point of the document
    pub disabled_rules: BTreeSet<String>,
}

impl Block {
    /// Scope with the format extension appended (`text.table.cell.md`)
    pub fn qualified_scope(&self) -> String {
        format!("{}{}", self.scope, self.format.extension())
    }

    pub fn is_rule_enabled(&self, rule: &str) -> bool {
        !self.disabled_rules.contains(rule)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("Failed to evaluate {scope}: {message}")]
    Evaluation { scope: String, message: String },
}

/// Receiver of evaluated blocks
pub trait ScopeSink {
    fn evaluate(&mut self, block: Block) -> Result<(), SinkError>;
}

/// Collects blocks in order
impl ScopeSink for Vec<Block> {
    fn evaluate(&mut self, block: Block) -> Result<(), SinkError> {
        self.push(block);
        Ok(())
    }
}

/// Byte offsets of line starts
#[derive(Debug, Clone)]
pub struct LineIndex {
    line_offsets: Vec<usize>,
}

impl LineIndex {
    pub fn new(content: &str) -> Self {
        let mut line_offsets = vec![0];
        for (i, c) in content.char_indices() {
            if c == '\n' {
                line_offsets.push(i + 1);
            }
        }
        Self { line_offsets }
    }

    /// 0-based line containing a byte offset
    pub fn line_of(&self, offset: usize) -> usize {
        self.line_offsets.partition_point(|&start| start <= offset).saturating_sub(1)
    }

    pub fn line_count(&self) -> usize {
        self.line_offsets.len()
    }
}

/// Finds segments in the source, moving forward as blocks are consumed
struct Locator<'a> {
    source: &'a str,
    index: LineIndex,
    cursor: usize,
}

impl<'a> Locator<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            index: LineIndex::new(source),
            cursor: 0,
        }
    }

    /// Line of the first unmasked word of `text` at or after the cursor
    fn locate(&mut self, text: &str, advance: bool) -> usize {
        let Some(word) = first_word(text) else {
            return self.index.line_of(self.cursor);
        };

        match self.source[self.cursor..].find(word) {
            Some(pos) => {
                let start = self.cursor + pos;
                if advance {
                    self.cursor = start + word.len();
                }
                self.index.line_of(start)
            }
            None => self.index.line_of(self.cursor),
        }
    }
}

fn first_word(text: &str) -> Option<&str> {
    text.split_whitespace()
        .filter(|word| !word.contains(MASK_CHAR))
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .find(|word| !word.is_empty())
}

/// Evaluate every segment of a document, then the summary and raw passes.
///
/// `source` is the text the document was built from. Segments that follow an
/// `off` directive are not sent until an `on` directive; comments themselves
/// are always sent. The first sink error stops the walk.
pub fn evaluate_document<S>(
    document: &Document,
    source: &str,
    format: SourceFormat,
    comment_prefix: &str,
    sink: &mut S,
) -> Result<(), SinkError>
where
    S: ScopeSink + ?Sized,
{
    let mut directives = InlineConfig::new(comment_prefix);
    let mut locator = Locator::new(source);

    for segment in &document.segments {
        let advance = matches!(segment.kind, SegmentKind::Block | SegmentKind::Comment);
        let line_offset = locator.locate(&segment.text, advance);

        if segment.kind == SegmentKind::Comment {
            directives.update(&segment.text);
        } else if directives.is_off() {
            continue;
        }

        sink.evaluate(Block {
            scope: segment.scope.clone(),
            format,
            text: segment.text.clone(),
            context: segment.evaluation_context().to_string(),
            classes: segment.classes.clone(),
            line_offset,
            disabled_rules: directives.disabled_rules().clone(),
        })?;
    }

    directives.reset();

    sink.evaluate(Block {
        scope: SUMMARY_SCOPE.to_string(),
        format,
        text: document.summary.clone(),
        context: document.summary.clone(),
        classes: Vec::new(),
        line_offset: 0,
        disabled_rules: BTreeSet::new(),
    })?;

    sink.evaluate(Block {
        scope: RAW_SCOPE.to_string(),
        format,
        text: source.to_string(),
        context: source.to_string(),
        classes: Vec::new(),
        line_offset: 0,
        disabled_rules: BTreeSet::new(),
    })
}
