//! Configuration management for tmplfix.
//!
//! This module provides the [`Config`] struct which controls all fixing behavior.
//! Configuration can be loaded from:
//! - TOML files (`tmplfix.toml`)
//! - CLI arguments (which override file settings)
//! - In-file directives (`{# tmplfix: --indent 2 #}`)
//!
//! Config files are auto-discovered by searching parent directories from the file
//! being fixed up to the filesystem root, plus the user's home directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::format::{IndentParams, Rule};

/// Config file names to search for (in order of priority, later overrides earlier)
const CONFIG_FILE_NAMES: &[&str] = &["tmplfix.toml"];

/// Get the user's home directory
fn dirs_home() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        return Some(PathBuf::from(home));
    }
    // Fallback for Windows
    if let Ok(userprofile) = std::env::var("USERPROFILE") {
        return Some(PathBuf::from(userprofile));
    }
    None
}

// Serde default functions
fn default_indent() -> usize {
    4
}
fn default_inner_indent() -> usize {
    2
}
fn default_extensions() -> Vec<String> {
    vec!["twig".to_string(), "html".to_string()]
}

/// Main configuration struct for tmplfix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces per nesting level (default: 4)
    #[serde(default = "default_indent")]
    pub indent: usize,

    /// Extra spaces for lines inside a multi-line tag (default: 2)
    #[serde(default = "default_inner_indent")]
    pub inner_indent: usize,

    /// File extensions picked up when walking directories
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Rule switches by rule name; rules not listed are enabled
    #[serde(default)]
    pub rules: HashMap<String, bool>,
}

/// Partial configuration for TOML parsing
///
/// All fields are `Option<T>` so we can distinguish between
/// "explicitly set" and "not specified" when merging configs.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PartialConfig {
    pub indent: Option<usize>,
    pub inner_indent: Option<usize>,
    pub extensions: Option<Vec<String>>,
    #[serde(default)]
    pub rules: HashMap<String, bool>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            indent: default_indent(),
            inner_indent: default_inner_indent(),
            extensions: default_extensions(),
            rules: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum reasonable indent size
    const MAX_INDENT: usize = 20;

    /// Validate configuration values are within reasonable bounds
    ///
    /// Returns an error message if validation fails, None if valid.
    #[must_use]
    pub fn validate(&self) -> Option<String> {
        for (name, value) in [("indent", self.indent), ("inner_indent", self.inner_indent)] {
            if value == 0 {
                return Some(format!("{name} must be at least 1"));
            }
            if value > Self::MAX_INDENT {
                return Some(format!(
                    "{name} {value} exceeds maximum of {}",
                    Self::MAX_INDENT
                ));
            }
        }
        let mut names: Vec<&String> = self.rules.keys().collect();
        names.sort();
        for name in names {
            if !Rule::ALL.iter().any(|rule| rule.name() == name.as_str()) {
                return Some(format!("unknown rule '{name}'"));
            }
        }
        None
    }

    /// Load configuration from a TOML file
    pub fn from_toml_file(path: &Path) -> anyhow::Result<Self> {
        let partial = read_partial(path)?;
        let mut config = Self::default();
        config.apply_partial(&partial);
        Ok(config)
    }

    /// Apply a partial config, only overriding fields that are explicitly set
    fn apply_partial(&mut self, partial: &PartialConfig) {
        if let Some(v) = partial.indent {
            self.indent = v;
        }
        if let Some(v) = partial.inner_indent {
            self.inner_indent = v;
        }
        if let Some(v) = &partial.extensions {
            self.extensions.clone_from(v);
        }
        for (k, v) in &partial.rules {
            self.rules.insert(k.clone(), *v);
        }
    }

    /// Discover config files from parent directories of a given path
    ///
    /// Searches from the file's directory up to the root, then adds home directory config.
    /// Returns list of config file paths in order of priority (least specific first).
    #[must_use]
    pub fn discover_config_files(start_path: &Path) -> Vec<PathBuf> {
        let mut config_files = Vec::new();

        if let Some(home) = dirs_home() {
            for config_name in CONFIG_FILE_NAMES {
                let home_config = home.join(config_name);
                if home_config.is_file() {
                    config_files.push(home_config);
                }
            }
        }

        let start_dir = if start_path.is_file() {
            start_path.parent().map(Path::to_path_buf)
        } else if start_path.is_dir() {
            Some(start_path.to_path_buf())
        } else {
            std::env::current_dir().ok()
        };

        if let Some(dir) = start_dir {
            let mut ancestors: Vec<PathBuf> = dir.ancestors().map(Path::to_path_buf).collect();
            // Root first, so closer files win
            ancestors.reverse();

            for ancestor in ancestors {
                for config_name in CONFIG_FILE_NAMES {
                    let config_path = ancestor.join(config_name);
                    if config_path.is_file() && !config_files.contains(&config_path) {
                        config_files.push(config_path);
                    }
                }
            }
        }

        config_files
    }

    /// Load and merge configuration from discovered config files
    ///
    /// Later files override earlier ones (only explicitly set values).
    /// Unreadable or malformed files are skipped with a warning.
    #[must_use]
    pub fn from_discovered_files(start_path: &Path) -> Self {
        let mut config = Self::default();
        for path in Self::discover_config_files(start_path) {
            match read_partial(&path) {
                Ok(partial) => config.apply_partial(&partial),
                Err(e) => warn!("skipping config file: {e:#}"),
            }
        }
        config
    }

    /// Whether `rule` is switched on
    #[must_use]
    pub fn is_rule_enabled(&self, rule: Rule) -> bool {
        self.rules.get(rule.name()).copied().unwrap_or(true)
    }

    pub fn set_rule(&mut self, rule: Rule, enabled: bool) {
        self.rules.insert(rule.name().to_string(), enabled);
    }

    /// All switched-on rules, in declaration order
    #[must_use]
    pub fn enabled_rules(&self) -> Vec<Rule> {
        Rule::ALL
            .into_iter()
            .filter(|rule| self.is_rule_enabled(*rule))
            .collect()
    }

    #[must_use]
    pub fn indent_params(&self) -> IndentParams {
        IndentParams::new(self.indent, self.inner_indent)
    }
}

fn read_partial(path: &Path) -> anyhow::Result<PartialConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    toml::from_str(&contents).with_context(|| format!("failed to parse {}", path.display()))
}
