pub mod builder;
pub mod config;
pub mod context;
pub mod history;
pub mod inline_config;
pub mod markup;
pub mod mask;
pub mod parallel;
pub mod scope;
pub mod segment;
pub mod sink;

pub use crate::builder::SegmentBuilder;
pub use crate::config::{Config, ConfigError, SourceFormat};
pub use crate::markup::Token;
pub use crate::scope::ScopeTable;
pub use crate::segment::{Document, Segment, SegmentKind};
pub use crate::sink::{Block, ScopeSink, SinkError};

use std::borrow::Cow;

/// Normalize line endings and typographic apostrophe entities before tokenizing
pub fn sanitize(content: &str) -> Cow<'_, str> {
    if !content.contains('\r') && !content.contains("&rsquo;") {
        return Cow::Borrowed(content);
    }
    Cow::Owned(content.replace("\r\n", "\n").replace('\r', "\n").replace("&rsquo;", "'"))
}

/// Segment a document with the scope table configured for its format
pub fn segment_document(content: &str, format: SourceFormat, config: &Config) -> Document {
    let content = sanitize(content);
    let table = config.scope_table(format);
    builder::segment(&content, format, &table)
}

/// Segment a document and send every block to `sink`
///
/// Blocks arrive in document order, followed by the summary and raw passes.
pub fn evaluate<S>(content: &str, format: SourceFormat, config: &Config, sink: &mut S) -> Result<Document, SinkError>
where
    S: ScopeSink + ?Sized,
{
    let content = sanitize(content);
    let table = config.scope_table(format);
    let document = builder::segment(&content, format, &table);
    sink::evaluate_document(&document, &content, format, &config.global.comment_prefix, sink)?;
    Ok(document)
}
