//! Settings loaded from `furrow.toml`.
//!
//! Everything is optional; defaults match the shipped behavior. `${VAR}`
//! and `$VAR` references in the store path are expanded from the
//! environment before use.
//!
//! ```toml
//! [store]
//! path = "${HOME}/data/irrigation.db"
//!
//! [quotas]
//! state_id = 5
//! year = 3
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::Dimension;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse settings file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub store: StoreSettings,
    pub quotas: Quotas,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Path to the SQLite fact store; `~/.furrow/irrigation.db` when unset.
    pub path: Option<String>,
}

/// Per-dimension selection caps for the multi-select dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Quotas {
    pub state_id: usize,
    pub domain_category: usize,
    pub year: usize,
    pub comparable_data_item: usize,
}

impl Default for Quotas {
    // The shipped caps live on Dimension::quota; this only restates them
    // as concrete fields so a settings file can override each one.
    fn default() -> Self {
        let cap = |dim: Dimension| dim.quota().unwrap_or(usize::MAX);
        Self {
            state_id: cap(Dimension::StateId),
            domain_category: cap(Dimension::DomainCategory),
            year: cap(Dimension::Year),
            comparable_data_item: cap(Dimension::ComparableDataItem),
        }
    }
}

impl Quotas {
    /// The cap for a dimension, if it has one.
    pub fn for_dimension(&self, dim: Dimension) -> Option<usize> {
        match dim {
            Dimension::StateId => Some(self.state_id),
            Dimension::DomainCategory => Some(self.domain_category),
            Dimension::Year => Some(self.year),
            Dimension::ComparableDataItem => Some(self.comparable_data_item),
            _ => None,
        }
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse settings from TOML text.
    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        let mut settings: Settings = toml::from_str(contents)?;
        if let Some(path) = settings.store.path.take() {
            settings.store.path = Some(expand_env_vars(&path));
        }
        Ok(settings)
    }
}

/// Expand `${VAR}` and `$VAR` references from the environment. Unset
/// variables are left as written.
fn expand_env_vars(input: &str) -> String {
    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '$' {
            result.push(ch);
            continue;
        }
        let braced = chars.peek() == Some(&'{');
        if braced {
            chars.next();
        }
        let mut name = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_alphanumeric() || next == '_' {
                name.push(next);
                chars.next();
            } else {
                break;
            }
        }
        if braced {
            if chars.peek() == Some(&'}') {
                chars.next();
            } else {
                // Unterminated brace: keep the text as written.
                result.push_str("${");
                result.push_str(&name);
                continue;
            }
        }
        if name.is_empty() {
            result.push('$');
            continue;
        }
        match std::env::var(&name) {
            Ok(value) => result.push_str(&value),
            Err(_) => {
                if braced {
                    result.push_str("${");
                    result.push_str(&name);
                    result.push('}');
                } else {
                    result.push('$');
                    result.push_str(&name);
                }
            }
        }
    }
    result
}
