//! Engine configuration

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Engine configuration
///
/// Every field has a default, so a TOML file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Suffix appended to names when cloning
    pub clone_suffix: String,
    /// Random draws before id generation gives up
    pub max_id_attempts: usize,
    /// Longest accepted element name
    pub max_name_len: usize,
    /// Run the validator before Add/Update commit
    pub validate_on_commit: bool,
}

impl EngineConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns `Config` if the text is not valid TOML for this struct
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// With clone suffix
    #[inline]
    #[must_use]
    pub fn with_clone_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.clone_suffix = suffix.into();
        self
    }

    /// With id attempts
    #[inline]
    #[must_use]
    pub fn with_max_id_attempts(mut self, attempts: usize) -> Self {
        self.max_id_attempts = attempts;
        self
    }

    /// With name length limit
    #[inline]
    #[must_use]
    pub fn with_max_name_len(mut self, len: usize) -> Self {
        self.max_name_len = len;
        self
    }

    /// With commit-time validation on or off
    #[inline]
    #[must_use]
    pub fn with_validate_on_commit(mut self, enabled: bool) -> Self {
        self.validate_on_commit = enabled;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            clone_suffix: "-copy".to_string(),
            max_id_attempts: 16,
            max_name_len: 30,
            validate_on_commit: true,
        }
    }
}
