//! Sibling-safe context for inline segments.
//!
//! Inline text is evaluated twice: on its own, and as part of the paragraph that
//! contains it. The context handed along with the inline evaluation is a copy of
//! the paragraph with every inline child blanked out, so position-aware rules can
//! tell that the span was already reported.

use crate::mask::{mask_all, substitute};
use std::ops::Range;

/// Filler used to blank out already-evaluated spans
pub const CONTEXT_FILLER: char = '@';

/// Blank out the first occurrence of `text` in `context`.
///
/// Each line of `text` is masked as a whole when it occurs verbatim; otherwise its
/// words are masked one by one, which copes with whitespace that was normalized
/// while the paragraph was assembled.
pub fn mask_span(context: &str, text: &str) -> String {
    let mut context = context.to_string();

    for line in text.split('\n').filter(|line| !line.is_empty()) {
        match substitute(&context, line, CONTEXT_FILLER) {
            Some(masked) => context = masked,
            None => {
                for word in line.split_whitespace() {
                    if let Some(masked) = substitute(&context, word, CONTEXT_FILLER) {
                        context = masked;
                    }
                }
            }
        }
    }

    context
}

/// Blank out every child text in the parent text, in order
pub fn mask_context<S: AsRef<str>>(parent: &str, children: &[S]) -> String {
    children
        .iter()
        .fold(parent.to_string(), |context, child| mask_span(&context, child.as_ref()))
}

/// Blank out inline children at the byte offsets they were appended at.
///
/// A child whose text no longer sits at its recorded offset (because it was
/// masked or wrapped as code) falls back to [`mask_span`].
pub fn mask_children(parent: &str, children: &[(&str, Option<usize>)]) -> String {
    let mut exact: Vec<Range<usize>> = Vec::new();
    let mut searched: Vec<&str> = Vec::new();
    for &(text, offset) in children {
        match offset.filter(|&start| parent.get(start..start + text.len()) == Some(text)) {
            Some(start) => exact.push(start..start + text.len()),
            None => searched.push(text),
        }
    }
    exact.sort_by_key(|range| range.start);

    // Right to left, so earlier offsets stay valid when a masked span changes byte length
    let mut context = parent.to_string();
    for range in exact.into_iter().rev() {
        let blanked = mask_all(&context[range.clone()], CONTEXT_FILLER);
        context.replace_range(range, &blanked);
    }

    mask_context(&context, &searched)
}
