//! Import and export
//!
//! JSON and YAML encodings of [`Scenario`]. Parsing is pure: a malformed
//! document yields an error and nothing else.

use std::path::Path;

use schemars::schema::RootSchema;

use crate::document::Scenario;
use crate::kind::{Level, NodeKind};

/// Errors raised by the model crate
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// JSON parse failure
    #[error("invalid JSON: {0}")]
    InvalidJson(#[source] serde_json::Error),

    /// YAML parse failure
    #[error("invalid YAML: {0}")]
    InvalidYaml(#[source] serde_yaml::Error),

    /// Serialization failure
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Unrecognised file extension
    #[error("unknown document format: {0}")]
    UnknownFormat(String),

    /// String does not name a known value
    #[error("unknown {what}: '{value}'")]
    UnknownValue { what: &'static str, value: String },

    /// Kind used at the wrong tree level
    #[error("{kind} is not a {level:?} kind")]
    LevelMismatch { kind: NodeKind, level: Level },
}

impl ModelError {
    pub(crate) fn level_mismatch(kind: NodeKind, level: Level) -> Self {
        Self::LevelMismatch { kind, level }
    }
}

/// Document encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick a format from a file extension
    ///
    /// # Errors
    /// Returns [`ModelError::UnknownFormat`] for anything but
    /// `.json`, `.yaml` or `.yml`
    pub fn from_path(path: &Path) -> Result<Self, ModelError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        Self::from_name(&ext).ok_or_else(|| ModelError::UnknownFormat(path.display().to_string()))
    }

    /// Parse a format name (`json`, `yaml`, `yml`)
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

impl Scenario {
    /// Parse from JSON string
    ///
    /// # Errors
    /// Returns error if JSON is invalid or does not match the document shape
    #[inline]
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        serde_json::from_str(json).map_err(ModelError::InvalidJson)
    }

    /// Parse from YAML string
    ///
    /// # Errors
    /// Returns error if YAML is invalid or does not match the document shape
    #[inline]
    pub fn from_yaml(yaml: &str) -> Result<Self, ModelError> {
        serde_yaml::from_str(yaml).map_err(ModelError::InvalidYaml)
    }

    /// Parse in the given format
    ///
    /// # Errors
    /// Propagates the format's parse error
    pub fn parse(input: &str, format: DocumentFormat) -> Result<Self, ModelError> {
        match format {
            DocumentFormat::Json => Self::from_json(input),
            DocumentFormat::Yaml => Self::from_yaml(input),
        }
    }

    /// Serialize to pretty JSON
    ///
    /// # Errors
    /// Returns error if serialization fails (rare for JSON)
    #[inline]
    pub fn to_json(&self) -> Result<String, ModelError> {
        serde_json::to_string_pretty(self).map_err(|e| ModelError::Serialization(e.to_string()))
    }

    /// Serialize to YAML
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[inline]
    pub fn to_yaml(&self) -> Result<String, ModelError> {
        serde_yaml::to_string(self).map_err(|e| ModelError::Serialization(e.to_string()))
    }

    /// Serialize in the given format
    ///
    /// # Errors
    /// Propagates the format's serialization error
    pub fn render(&self, format: DocumentFormat) -> Result<String, ModelError> {
        match format {
            DocumentFormat::Json => self.to_json(),
            DocumentFormat::Yaml => self.to_yaml(),
        }
    }

    /// JSON schema of the document
    #[must_use]
    pub fn schema() -> RootSchema {
        schemars::schema_for!(Scenario)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{Domain, DomainAttrs};
    use crate::kind::DomainType;
    use pretty_assertions::assert_eq;

    fn small() -> Scenario {
        let mut s = Scenario::named("demo");
        s.deployment.domains.push(Domain {
            attrs: DomainAttrs {
                id: "op-1".into(),
                name: "operator1".into(),
                kind: DomainType::Operator,
                net_char: None,
                cellular_domain_config: None,
            },
            zones: Vec::new(),
        });
        s
    }

    #[test]
    fn json_and_yaml_agree() {
        let s = small();
        let from_json = Scenario::from_json(&s.to_json().unwrap()).unwrap();
        let from_yaml = Scenario::from_yaml(&s.to_yaml().unwrap()).unwrap();
        assert_eq!(from_json, s);
        assert_eq!(from_yaml, s);
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(
            Scenario::from_json("{\"name\": "),
            Err(ModelError::InvalidJson(_))
        ));
        assert!(matches!(
            Scenario::from_yaml("name: [unterminated"),
            Err(ModelError::InvalidYaml(_))
        ));
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let s = Scenario::from_json(r#"{"name": "x", "legacy": 1, "deployment": {"domains": []}}"#)
            .unwrap();
        assert_eq!(s.name, "x");
    }

    #[test]
    fn format_from_path() {
        assert_eq!(
            DocumentFormat::from_path(Path::new("a/b.YML")).unwrap(),
            DocumentFormat::Yaml
        );
        assert_eq!(
            DocumentFormat::from_path(Path::new("s.json")).unwrap(),
            DocumentFormat::Json
        );
        assert!(DocumentFormat::from_path(Path::new("s.toml")).is_err());
    }

    #[test]
    fn schema_mentions_deployment() {
        let schema = serde_json::to_value(Scenario::schema()).unwrap();
        assert!(schema["properties"]["deployment"].is_object());
    }
}
