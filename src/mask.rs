//! Masking of text that must not be matched by rules.
//!
//! Masked text keeps its length and its newlines so positions computed on the
//! masked copy still line up with the original.

use crate::config::SourceFormat;
use crate::scope::ScopeTable;

/// Replacement character for skipped text
pub const MASK_CHAR: char = '*';

const STARTER_PUNCTUATION: &[char] = &['.', '?', '!', ',', ':', ';'];

/// Replace every character of `text` except newlines with `ch`
pub fn mask_all(text: &str, ch: char) -> String {
    text.chars().map(|c| if c == '\n' { c } else { ch }).collect()
}

/// Mask the first occurrence of `sub` in `src`.
///
/// Returns `None` when `sub` does not occur in `src`.
pub fn substitute(src: &str, sub: &str, ch: char) -> Option<String> {
    let idx = src.find(sub)?;
    let mut out = String::with_capacity(src.len());
    out.push_str(&src[..idx]);
    out.push_str(&mask_all(sub, ch));
    out.push_str(&src[idx + sub.len()..]);
    Some(out)
}

/// Wrap text in the inline-code delimiters of its source format
pub fn codify(format: SourceFormat, text: &str) -> String {
    match format {
        SourceFormat::Markdown | SourceFormat::AsciiDoc => format!("`{text}`"),
        SourceFormat::ReStructuredText => format!("``{text}``"),
        SourceFormat::Html => text.to_string(),
    }
}

/// Whether any class in a space-separated class attribute is ignored
pub fn has_ignored_class(attr: &str, table: &ScopeTable) -> bool {
    attr.split_whitespace().any(|class| table.is_skipped_class(class))
}

/// Detect markup nested directly inside a verbatim span.
///
/// rst2html wraps parts of inline literals in `span` elements inside `tt`; the
/// text of those spans is still code and must be masked.
pub fn nested_in_verbatim(tag_history: &[String], format: SourceFormat) -> bool {
    if !format.allows_markup_in_verbatim() {
        return false;
    }

    let n = tag_history.len();
    for (i, tag) in tag_history.iter().enumerate().rev() {
        if tag == "span" {
            continue;
        }
        return tag == "tt" && i + 1 != n;
    }
    false
}

/// Text starts with punctuation that attaches to the preceding word
pub fn starts_with_punctuation(text: &str) -> bool {
    text.chars().next().is_some_and(|c| STARTER_PUNCTUATION.contains(&c))
}

/// Prepare one text run for the region buffer: mask it when skipped, then apply
/// the inline spacing rule.
pub fn clean(text: &str, format: SourceFormat, skip: bool, skip_class: bool, inline: bool) -> String {
    let starter = starts_with_punctuation(text) && !skip;

    let text = if skip || skip_class {
        codify(format, &mask_all(text, MASK_CHAR))
    } else {
        text.to_string()
    };

    if inline && !starter { format!(" {text}") } else { text }
}
