// File: src/config.rs
// Purpose: Configuration parsing from unobtrusive.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Layer configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UnobtrusiveConfig {
    #[serde(default)]
    pub classes: ClassNames,

    #[serde(default)]
    pub engine: EngineConfig,
}

/// CSS classes toggled on inputs, message containers and summaries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassNames {
    #[serde(default = "default_input_error")]
    pub input_error: String,

    #[serde(default = "default_field_error")]
    pub field_error: String,

    #[serde(default = "default_field_valid")]
    pub field_valid: String,

    #[serde(default = "default_summary_errors")]
    pub summary_errors: String,

    #[serde(default = "default_summary_valid")]
    pub summary_valid: String,
}

/// Options forwarded to the engine on attach
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Tag of generated error labels
    #[serde(default = "default_error_element")]
    pub error_element: String,
}

fn default_input_error() -> String {
    "input-validation-error".to_string()
}

fn default_field_error() -> String {
    "field-validation-error".to_string()
}

fn default_field_valid() -> String {
    "field-validation-valid".to_string()
}

fn default_summary_errors() -> String {
    "validation-summary-errors".to_string()
}

fn default_summary_valid() -> String {
    "validation-summary-valid".to_string()
}

fn default_error_element() -> String {
    "span".to_string()
}

impl Default for ClassNames {
    fn default() -> Self {
        Self {
            input_error: default_input_error(),
            field_error: default_field_error(),
            field_valid: default_field_valid(),
            summary_errors: default_summary_errors(),
            summary_valid: default_summary_valid(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            error_element: default_error_element(),
        }
    }
}

impl UnobtrusiveConfig {
    /// Load configuration from a TOML file; a missing or empty file yields defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: UnobtrusiveConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path))?;

        Ok(config)
    }

    /// Load configuration from ./unobtrusive.toml
    pub fn load_default() -> Result<Self> {
        Self::load("unobtrusive.toml")
    }
}
