//! Project manifest parsing and validation.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::semantic::types::{Problem, Severity, kinds};

/// The project descriptor stored at a library's root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub name: String,
    pub uuid: Uuid,
    pub version: String,
    #[serde(default)]
    pub authors: Vec<String>,
    /// Dependency name → dependency library uuid.
    #[serde(default)]
    pub deps: IndexMap<String, Uuid>,
    /// Free-form tool-specific configuration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

/// Failure to read a manifest at all (I/O-shaped errors carry their own
/// type; structural complaints become [`Problem`]s via [`ProjectManifest::validate`]).
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("manifest is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProjectManifest {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uuid: Uuid::new_v4(),
            version: version.into(),
            authors: Vec::new(),
            deps: IndexMap::new(),
            tool: None,
            tags: Vec::new(),
        }
    }

    /// Parse a manifest from JSON text.
    pub fn parse(text: &str) -> Result<Self, ManifestError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serialize back to JSON text.
    pub fn render(&self) -> Result<String, ManifestError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Structural validation; complaints are surfaced as problems rather
    /// than hard failures so a workspace can keep loading around them.
    pub fn validate(&self) -> Vec<Problem> {
        let mut problems = Vec::new();
        if self.name.is_empty() {
            problems.push(
                Problem::new(kinds::INVALID_MANIFEST, "Invalid manifest", Severity::Error)
                    .with_details("manifest has an empty `name`"),
            );
        }
        if self.version.is_empty() {
            problems.push(
                Problem::new(kinds::INVALID_MANIFEST, "Invalid manifest", Severity::Error)
                    .with_details(format!("manifest `{}` has an empty `version`", self.name)),
            );
        }
        if self.deps.contains_key(&self.name) {
            problems.push(
                Problem::new(kinds::INVALID_MANIFEST, "Invalid manifest", Severity::Error)
                    .with_details(format!("library `{}` depends on itself", self.name)),
            );
        }
        problems
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_roundtrip() {
        let mut manifest = ProjectManifest::new("Electrical", "0.4.1");
        manifest.authors.push("dyad".to_string());
        manifest.deps.insert("BlockComponents".to_string(), Uuid::new_v4());

        let text = manifest.render().unwrap();
        let parsed = ProjectManifest::parse(&text).unwrap();
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_manifest_defaults() {
        let text = r#"{"name":"M","uuid":"67e55044-10b1-426f-9247-bb680e5fe0c8","version":"1.0.0"}"#;
        let manifest = ProjectManifest::parse(text).unwrap();
        assert!(manifest.authors.is_empty());
        assert!(manifest.deps.is_empty());
        assert!(manifest.validate().is_empty());
    }

    #[test]
    fn test_manifest_validation() {
        let mut manifest = ProjectManifest::new("Loop", "1.0.0");
        manifest.deps.insert("Loop".to_string(), manifest.uuid);
        let problems = manifest.validate();
        assert_eq!(problems.len(), 1);
        assert_eq!(problems[0].kind, "invalid-manifest");
    }

    #[test]
    fn test_manifest_rejects_bad_json() {
        assert!(ProjectManifest::parse("{not json").is_err());
        assert!(ProjectManifest::parse(r#"{"name":"A","uuid":"nope","version":"1"}"#).is_err());
    }
}
