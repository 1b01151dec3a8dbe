//! Scope configuration
//!
//! Marker attribute names and the claim underflow policy.

use serde::{Deserialize, Serialize};

use crate::ScopeError;

/// What a claim does when no fragment is pending
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnderflowPolicy {
    /// Return `ScopeError::NoPendingFragment`
    #[default]
    Error,
    /// Log a warning and hand back an empty mapping
    Empty,
}

/// Scope configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScopeConfig {
    /// Boolean attribute marking a `<script>` as scoped
    pub script_marker: String,
    /// Attribute whose value names an element in its fragment
    pub name_marker: String,
    /// Boolean attribute marking an element's handlers as scoped
    pub event_marker: String,
    /// Prefix of inline handler attributes
    pub handler_prefix: String,
    pub underflow: UnderflowPolicy,
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            script_marker: "scoped".into(),
            name_marker: "idx".into(),
            event_marker: "evx".into(),
            handler_prefix: "on".into(),
            underflow: UnderflowPolicy::Error,
        }
    }
}

impl ScopeConfig {
    /// Load and validate a configuration from JSON; missing keys take defaults
    pub fn from_json(json: &str) -> Result<Self, ScopeError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ScopeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String, ScopeError> {
        serde_json::to_string_pretty(self).map_err(|e| ScopeError::Config(e.to_string()))
    }

    /// Marker names must be usable as HTML attribute names
    pub fn validate(&self) -> Result<(), ScopeError> {
        let names = [
            ("script_marker", &self.script_marker),
            ("name_marker", &self.name_marker),
            ("event_marker", &self.event_marker),
            ("handler_prefix", &self.handler_prefix),
        ];

        for (field, value) in names {
            if value.is_empty() {
                return Err(ScopeError::Config(format!("{} must not be empty", field)));
            }
            let invalid = |c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '>' | '/' | '=');
            if value.chars().any(invalid) {
                return Err(ScopeError::Config(format!(
                    "{} '{}' is not a valid attribute name",
                    field, value
                )));
            }
            // The HTML parser lowercases attribute names
            if value.chars().any(|c| c.is_ascii_uppercase()) {
                return Err(ScopeError::Config(format!("{} '{}' must be lowercase", field, value)));
            }
        }

        Ok(())
    }
}
