//!
//! This module defines configuration structures and loading logic for prosa.
//! Configuration is read from TOML and turned into immutable [`ScopeTable`] values,
//! one per source format, which are then handed to each segment builder.

use crate::scope::ScopeTable;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Default configuration file name looked up by the CLI
pub const CONFIG_FILE_NAME: &str = ".prosa.toml";

/// Prefix of comment directives when none is configured
pub const DEFAULT_COMMENT_PREFIX: &str = "prosa";

/// Source format the markup originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Markdown, rendered to HTML before tokenizing
    #[serde(alias = "md")]
    #[default]
    Markdown,
    /// Plain HTML
    #[serde(alias = "htm")]
    Html,
    /// HTML produced from reStructuredText (rst2html and friends)
    #[serde(rename = "rst", alias = "restructuredtext")]
    ReStructuredText,
    /// HTML produced from AsciiDoc (asciidoctor)
    #[serde(rename = "adoc", alias = "asciidoc")]
    AsciiDoc,
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceFormat::Markdown => write!(f, "markdown"),
            SourceFormat::Html => write!(f, "html"),
            SourceFormat::ReStructuredText => write!(f, "rst"),
            SourceFormat::AsciiDoc => write!(f, "adoc"),
        }
    }
}

impl FromStr for SourceFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim_start_matches('.').to_lowercase().as_str() {
            "markdown" | "md" | "mdown" | "mkd" => Ok(SourceFormat::Markdown),
            "html" | "htm" | "xhtml" => Ok(SourceFormat::Html),
            "rst" | "restructuredtext" => Ok(SourceFormat::ReStructuredText),
            "adoc" | "asciidoc" | "asc" => Ok(SourceFormat::AsciiDoc),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

impl SourceFormat {
    /// Detect format from file extension, falling back to Markdown
    pub fn from_extension(ext: &str) -> Self {
        ext.parse().unwrap_or_default()
    }

    /// Detect format from file path
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Canonical file extension, including the leading dot
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => ".md",
            Self::Html => ".html",
            Self::ReStructuredText => ".rst",
            Self::AsciiDoc => ".adoc",
        }
    }

    /// Whether verbatim spans in this format can legally contain structural markup
    pub fn allows_markup_in_verbatim(self) -> bool {
        matches!(self, Self::ReStructuredText)
    }
}

/// Tag and class sets that customize scope handling
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScopeSettings {
    /// Tags whose content is never linted. Replaces the built-in set when non-empty.
    #[serde(alias = "skipped_scopes")]
    pub skipped_scopes: Vec<String>,

    /// Classes whose content is masked. Added to the built-in set.
    #[serde(alias = "ignored_classes")]
    pub ignored_classes: Vec<String>,

    /// Inline tags whose content is masked in the enclosing block.
    /// Replaces the built-in set when non-empty.
    #[serde(alias = "ignored_scopes")]
    pub ignored_scopes: Vec<String>,
}

impl ScopeSettings {
    /// Layer `other` on top of `self`; non-empty lists in `other` win
    pub fn merged_with(&self, other: &ScopeSettings) -> ScopeSettings {
        let pick = |base: &Vec<String>, over: &Vec<String>| {
            if over.is_empty() { base.clone() } else { over.clone() }
        };

        let mut ignored_classes = self.ignored_classes.clone();
        for class in &other.ignored_classes {
            if !ignored_classes.contains(class) {
                ignored_classes.push(class.clone());
            }
        }

        ScopeSettings {
            skipped_scopes: pick(&self.skipped_scopes, &other.skipped_scopes),
            ignored_classes,
            ignored_scopes: pick(&self.ignored_scopes, &other.ignored_scopes),
        }
    }
}

/// Global configuration options
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "kebab-case")]
pub struct GlobalConfig {
    /// Force a source format instead of detecting it from the file extension
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<SourceFormat>,

    /// Prefix recognised in comment directives (`<!-- prosa off -->`)
    #[serde(alias = "comment_prefix")]
    pub comment_prefix: String,

    /// Tags whose content is never linted
    #[serde(alias = "skipped_scopes")]
    pub skipped_scopes: Vec<String>,

    /// Classes whose content is masked
    #[serde(alias = "ignored_classes")]
    pub ignored_classes: Vec<String>,

    /// Inline tags whose content is masked
    #[serde(alias = "ignored_scopes")]
    pub ignored_scopes: Vec<String>,
}

impl GlobalConfig {
    /// The scope-related part of the global section
    pub fn scopes(&self) -> ScopeSettings {
        ScopeSettings {
            skipped_scopes: self.skipped_scopes.clone(),
            ignored_classes: self.ignored_classes.clone(),
            ignored_scopes: self.ignored_scopes.clone(),
        }
    }
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            format: None,
            comment_prefix: default_comment_prefix(),
            skipped_scopes: Vec::new(),
            ignored_classes: Vec::new(),
            ignored_scopes: Vec::new(),
        }
    }
}

fn default_comment_prefix() -> String {
    DEFAULT_COMMENT_PREFIX.to_string()
}

/// Represents the complete configuration loaded from .prosa.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Global configuration options
    #[serde(default)]
    pub global: GlobalConfig,

    /// Per-format overrides keyed by format name (e.g. `[formats.rst]`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub formats: BTreeMap<String, ScopeSettings>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::IoError {
            source,
            path: path.display().to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;

        for name in config.formats.keys() {
            if name.parse::<SourceFormat>().is_err() {
                log::warn!("Ignoring overrides for unknown format: {name}");
            }
        }

        Ok(config)
    }

    /// Resolve the format for a file, honouring a forced `global.format`
    pub fn format_for(&self, path: &Path) -> SourceFormat {
        self.global.format.unwrap_or_else(|| SourceFormat::from_path(path))
    }

    /// Effective scope settings for a format: global settings with per-format overrides on top
    pub fn scope_settings(&self, format: SourceFormat) -> ScopeSettings {
        let mut settings = self.global.scopes();
        for (name, overrides) in &self.formats {
            if name.parse::<SourceFormat>().ok() == Some(format) {
                settings = settings.merged_with(overrides);
            }
        }
        settings
    }

    /// Build the immutable scope table used to segment documents of `format`
    pub fn scope_table(&self, format: SourceFormat) -> ScopeTable {
        ScopeTable::with_settings(&self.scope_settings(format))
    }
}

/// Errors that can occur when loading configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("Failed to read config file at {path}: {source}")]
    IoError { source: io::Error, path: String },

    /// Failed to parse the configuration content
    #[error("Failed to parse config: {0}")]
    ParseError(String),

    /// A format name was not recognised
    #[error("Unknown source format: {0}")]
    UnknownFormat(String),
}
