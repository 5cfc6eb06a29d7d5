//! Static tag knowledge used by the segment builder: which tags map to which
//! scopes, which tags are inline, and which regions are never linted.
//!
//! A [`ScopeTable`] is an immutable value. Each builder receives its own table,
//! so documents of different formats can use different overrides side by side.

use crate::config::ScopeSettings;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

static HEADING_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^h\d$").unwrap());

/// Scope assigned to generic prose regions
pub const PROSE_SCOPE: &str = "p";
/// Scope assigned to verbatim code blocks
pub const CODE_BLOCK_SCOPE: &str = "pre";
/// Scope assigned to markup comments
pub const COMMENT_SCOPE: &str = "comment";
/// Scope prefix for headings (`text.heading.h2`)
pub const HEADING_SCOPE_PREFIX: &str = "text.heading.";
/// Scope for image alternate text
pub const ALT_TEXT_SCOPE: &str = "text.attr.alt";

const DEFAULT_SKIP_TAGS: &[&str] = &["script", "style", "pre", "figure"];

// `problematic` is added by rst2html to processing errors (often file-insertion
// URLs); `pre` and `code` are added by rst2html to code spans.
const DEFAULT_SKIP_CLASSES: &[&str] = &["problematic", "pre", "code"];

const DEFAULT_IGNORED_INLINE_TAGS: &[&str] = &["tt", "code"];

const INLINE_TAGS: &[&str] = &[
    "b", "big", "i", "small", "abbr", "acronym", "cite", "dfn", "em", "kbd", "strong", "a", "br", "img", "span", "sub",
    "sup", "code", "tt", "del",
];

const TAG_SCOPES: &[(&str, &str)] = &[
    ("th", "text.table.header"),
    ("td", "text.table.cell"),
    ("li", "text.list"),
    ("blockquote", "text.blockquote"),
    // Inline scopes don't inherit from `text`, otherwise they would be linted twice
    ("strong", "strong"),
    ("b", "strong"),
    ("a", "link"),
    ("em", "emphasis"),
    ("i", "emphasis"),
    ("code", "code"),
];

fn to_set(items: &[&str]) -> HashSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Tag-to-scope mapping plus the tag and class sets that drive skipping and masking
#[derive(Debug, Clone)]
pub struct ScopeTable {
    scopes: HashMap<String, String>,
    inline_tags: HashSet<String>,
    skip_tags: HashSet<String>,
    skip_classes: HashSet<String>,
    ignored_inline_tags: HashSet<String>,
}

impl Default for ScopeTable {
    fn default() -> Self {
        Self {
            scopes: TAG_SCOPES
                .iter()
                .map(|(tag, scope)| (tag.to_string(), scope.to_string()))
                .collect(),
            inline_tags: to_set(INLINE_TAGS),
            skip_tags: to_set(DEFAULT_SKIP_TAGS),
            skip_classes: to_set(DEFAULT_SKIP_CLASSES),
            ignored_inline_tags: to_set(DEFAULT_IGNORED_INLINE_TAGS),
        }
    }
}

impl ScopeTable {
    /// Built-in table with user settings applied.
    ///
    /// Non-empty `skipped_scopes` and `ignored_scopes` replace the built-in sets;
    /// `ignored_classes` extend them.
    pub fn with_settings(settings: &ScopeSettings) -> Self {
        let mut table = Self::default();
        if !settings.skipped_scopes.is_empty() {
            table.skip_tags = settings.skipped_scopes.iter().cloned().collect();
        }
        table.skip_classes.extend(settings.ignored_classes.iter().cloned());
        if !settings.ignored_scopes.is_empty() {
            table.ignored_inline_tags = settings.ignored_scopes.iter().cloned().collect();
        }
        table
    }

    /// Add or replace the scope for a tag
    pub fn with_scope(mut self, tag: &str, scope: &str) -> Self {
        self.scopes.insert(tag.to_string(), scope.to_string());
        self
    }

    pub fn scope_for(&self, tag: &str) -> Option<&str> {
        self.scopes.get(tag).map(String::as_str)
    }

    pub fn is_inline(&self, tag: &str) -> bool {
        self.inline_tags.contains(tag)
    }

    pub fn is_heading(&self, tag: &str) -> bool {
        HEADING_TAG.is_match(tag)
    }

    /// Content of this tag is dropped entirely
    pub fn is_skipped(&self, tag: &str) -> bool {
        self.skip_tags.contains(tag)
    }

    /// Content of this inline tag is masked inside its block
    pub fn is_ignored_inline(&self, tag: &str) -> bool {
        self.ignored_inline_tags.contains(tag)
    }

    pub fn is_skipped_class(&self, class: &str) -> bool {
        self.skip_classes.contains(class)
    }

    /// Scope of a text run emitted on its own: only inline tags with a scope entry qualify
    pub fn inline_scope(&self, tag: &str) -> Option<&str> {
        if self.is_inline(tag) { self.scope_for(tag) } else { None }
    }

    /// Resolve the scope of a finished region from its tag history.
    ///
    /// The history is scanned in push order, so outer structural ancestors win:
    /// a link inside a table cell is scoped as the cell. Inline tags never decide
    /// the scope of a region.
    pub fn resolve(&self, tag_history: &[String]) -> String {
        for tag in tag_history {
            if let Some(scope) = self.scope_for(tag)
                && !self.is_inline(tag)
            {
                return scope.to_string();
            }
            if self.is_heading(tag) {
                return format!("{HEADING_SCOPE_PREFIX}{tag}");
            }
        }

        if is_code_block(tag_history) {
            return CODE_BLOCK_SCOPE.to_string();
        }

        PROSE_SCOPE.to_string()
    }
}

/// History made of exactly the `pre` and `code` tags
fn is_code_block(tag_history: &[String]) -> bool {
    let distinct: HashSet<&str> = tag_history.iter().map(String::as_str).collect();
    distinct.len() == 2 && distinct.contains("pre") && distinct.contains("code")
}

/// Whether a scope denotes generic prose
pub fn is_prose(scope: &str) -> bool {
    scope == PROSE_SCOPE || scope == "text"
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_outer_structural_ancestor_wins() {
        let table = ScopeTable::default();
        assert_eq!(table.resolve(&history(&["table", "tr", "td", "a"])), "text.table.cell");
        assert_eq!(table.resolve(&history(&["ul", "li", "strong"])), "text.list");
        assert_eq!(table.resolve(&history(&["blockquote", "p"])), "text.blockquote");
    }

    #[test]
    fn test_inline_tags_never_decide_region_scope() {
        let table = ScopeTable::default();
        assert_eq!(table.resolve(&history(&["p", "a", "em"])), PROSE_SCOPE);
    }

    #[test]
    fn test_heading_scope() {
        let table = ScopeTable::default();
        assert_eq!(table.resolve(&history(&["h2"])), "text.heading.h2");
        assert_eq!(table.resolve(&history(&["h1", "code"])), "text.heading.h1");
        assert!(!table.is_heading("hr"));
        assert!(!table.is_heading("h10"));
    }

    #[test]
    fn test_heading_inside_table_cell_uses_scan_order() {
        let table = ScopeTable::default();
        assert_eq!(table.resolve(&history(&["table", "td", "h3"])), "text.table.cell");
        assert_eq!(table.resolve(&history(&["h3", "td"])), "text.heading.h3");
    }

    #[test]
    fn test_code_block_scope() {
        let table = ScopeTable::default();
        assert_eq!(table.resolve(&history(&["pre", "code"])), CODE_BLOCK_SCOPE);
        assert_eq!(table.resolve(&history(&["div", "pre", "code"])), PROSE_SCOPE);
        assert_eq!(table.resolve(&history(&["pre"])), PROSE_SCOPE);
    }

    #[test]
    fn test_unknown_tags_fall_through_to_prose() {
        let table = ScopeTable::default();
        assert_eq!(table.resolve(&history(&["section", "custom-element"])), PROSE_SCOPE);
        assert_eq!(table.resolve(&[]), PROSE_SCOPE);
    }

    #[test]
    fn test_settings_replace_and_extend() {
        let settings = ScopeSettings {
            skipped_scopes: vec!["aside".to_string()],
            ignored_classes: vec!["no-lint".to_string()],
            ignored_scopes: vec!["kbd".to_string()],
        };
        let table = ScopeTable::with_settings(&settings);

        assert!(table.is_skipped("aside"));
        assert!(!table.is_skipped("script"));
        assert!(table.is_skipped_class("no-lint"));
        assert!(table.is_skipped_class("problematic"));
        assert!(table.is_ignored_inline("kbd"));
        assert!(!table.is_ignored_inline("code"));
    }

    #[test]
    fn test_inline_scope() {
        let table = ScopeTable::default();
        assert_eq!(table.inline_scope("a"), Some("link"));
        assert_eq!(table.inline_scope("b"), Some("strong"));
        assert_eq!(table.inline_scope("span"), None);
        assert_eq!(table.inline_scope("td"), None);
    }

    #[test]
    fn test_with_scope_override() {
        let table = ScopeTable::default().with_scope("dd", "text.definition");
        assert_eq!(table.resolve(&history(&["dl", "dd"])), "text.definition");
    }

    #[test]
    fn test_is_prose() {
        assert!(is_prose("p"));
        assert!(is_prose("text"));
        assert!(!is_prose("text.list"));
    }
}
