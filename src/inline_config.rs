//! Inline configuration comments
//!
//! Supports, with the configured prefix (`prosa` by default):
//! - `<!-- prosa off -->` - Stop evaluating segments from this point
//! - `<!-- prosa on -->` - Resume evaluation
//! - `<!-- prosa Style.Rule = NO -->` - Disable one rule from this point
//! - `<!-- prosa Style.Rule = YES -->` - Re-enable it
//! - `<!-- prosa Style.A = NO, Style.B = NO -->` - Several rules at once
//!
//! Comments are read in document order as the segments are evaluated, so a
//! directive applies to the segments that follow it.

use std::collections::BTreeSet;

/// One instruction carried by a comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Off,
    On,
    Disable(String),
    Enable(String),
}

/// Parse the directives of a comment body.
///
/// Returns an empty list for comments that do not start with `prefix` or whose
/// body cannot be understood.
pub fn parse_directives(comment: &str, prefix: &str) -> Vec<Directive> {
    let Some(body) = comment.trim().strip_prefix(prefix) else {
        return Vec::new();
    };
    if !body.starts_with(char::is_whitespace) {
        return Vec::new();
    }

    match body.trim() {
        "off" => return vec![Directive::Off],
        "on" => return vec![Directive::On],
        _ => {}
    }

    let mut directives = Vec::new();
    for assignment in body.split(',') {
        let Some((rule, value)) = assignment.split_once('=') else {
            log::debug!("Ignoring malformed {prefix} directive: {:?}", comment.trim());
            return Vec::new();
        };
        let rule = rule.trim();
        if rule.is_empty() || rule.contains(char::is_whitespace) {
            log::debug!("Ignoring malformed {prefix} directive: {:?}", comment.trim());
            return Vec::new();
        }
        match value.trim().to_ascii_uppercase().as_str() {
            "NO" => directives.push(Directive::Disable(rule.to_string())),
            "YES" => directives.push(Directive::Enable(rule.to_string())),
            other => {
                log::debug!("Ignoring {prefix} directive for {rule}: unknown value {other:?}");
                return Vec::new();
            }
        }
    }
    directives
}

/// Evaluation state driven by inline comments
#[derive(Debug, Clone)]
pub struct InlineConfig {
    prefix: String,
    off: bool,
    disabled_rules: BTreeSet<String>,
}

impl Default for InlineConfig {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_COMMENT_PREFIX)
    }
}

impl InlineConfig {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            off: false,
            disabled_rules: BTreeSet::new(),
        }
    }

    /// Apply a comment; returns whether it carried any directive
    pub fn update(&mut self, comment: &str) -> bool {
        let directives = parse_directives(comment, &self.prefix);
        for directive in &directives {
            match directive {
                Directive::Off => self.off = true,
                Directive::On => self.off = false,
                Directive::Disable(rule) => {
                    self.disabled_rules.insert(rule.clone());
                }
                Directive::Enable(rule) => {
                    self.disabled_rules.remove(rule);
                }
            }
        }
        !directives.is_empty()
    }

    /// Forget every directive seen so far
    pub fn reset(&mut self) {
        self.off = false;
        self.disabled_rules.clear();
    }

    pub fn is_off(&self) -> bool {
        self.off
    }

    pub fn is_rule_disabled(&self, rule: &str) -> bool {
        self.disabled_rules.contains(rule)
    }

    pub fn disabled_rules(&self) -> &BTreeSet<String> {
        &self.disabled_rules
    }
}
