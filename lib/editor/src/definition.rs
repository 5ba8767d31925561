//! Flow definition types.
//!
//! A flow definition is the unit written to disk:
//! - Metadata (name, description, timestamps)
//! - The flow document (nodes and connections)
//!
//! Metadata and document fields sit side by side at the top level, so a
//! bare document also parses as a definition with default metadata.

use crate::document::FlowDocument;
use crate::error::DocumentError;
use agent_flow_core::FlowId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Name given to flows created without one.
pub const DEFAULT_FLOW_NAME: &str = "Untitled Flow";

fn default_name() -> String {
    DEFAULT_FLOW_NAME.to_string()
}

/// Metadata for a flow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowMetadata {
    /// Human-readable name for this flow.
    #[serde(default = "default_name")]
    pub name: String,
    /// Description of what this flow does.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// When this flow was created.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    /// When this flow was last updated.
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl FlowMetadata {
    /// Creates new metadata with default values.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Default for FlowMetadata {
    fn default() -> Self {
        Self::new(DEFAULT_FLOW_NAME)
    }
}

/// A complete flow definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    /// Unique identifier for this flow.
    #[serde(default)]
    pub id: FlowId,
    #[serde(flatten)]
    pub metadata: FlowMetadata,
    #[serde(flatten)]
    pub document: FlowDocument,
}

impl FlowDefinition {
    /// Creates a definition with a fresh ID around `document`.
    #[must_use]
    pub fn new(name: impl Into<String>, document: FlowDocument) -> Self {
        Self {
            id: FlowId::new(),
            metadata: FlowMetadata::new(name),
            document,
        }
    }

    /// Parses a definition from JSON text.
    ///
    /// Accepts a bare document (with or without the older field names), in
    /// which case metadata takes its defaults.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] if the text is not a flow.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        let mut definition: Self = serde_json::from_str(json).map_err(|e| DocumentError::Parse {
            details: e.to_string(),
        })?;
        // Flattened fields do not see aliases such as `edges`.
        definition.document = FlowDocument::from_json(json)?;
        Ok(definition)
    }

    /// Renders the definition as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::Parse {
            details: e.to_string(),
        })
    }

    /// Returns the flow name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.metadata.name
    }

    /// Marks the flow as updated.
    pub fn touch(&mut self) {
        self.metadata.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_creation() {
        let flow = FlowDefinition::new("Support bot", FlowDocument::default());
        assert_eq!(flow.name(), "Support bot");
        assert_eq!(flow.metadata.created_at, flow.metadata.updated_at);
        assert!(flow.document.nodes.is_empty());
    }

    #[test]
    fn touch_moves_update_time_only() {
        let mut flow = FlowDefinition::new("Test", FlowDocument::default());
        let created = flow.metadata.created_at;

        flow.touch();
        assert_eq!(flow.metadata.created_at, created);
        assert!(flow.metadata.updated_at >= created);
    }

    #[test]
    fn description_is_kept_and_enabled_flag_is_not_written() {
        let json = r#"{"name": "Triage", "description": "Answers tickets", "enabled": false, "nodes": []}"#;
        let flow = FlowDefinition::from_json(json).expect("parse");
        assert_eq!(flow.metadata.description.as_deref(), Some("Answers tickets"));

        let written = flow.to_json_pretty().expect("serialize");
        assert!(written.contains("Answers tickets"));
        assert!(!written.contains("enabled"));
    }

    #[test]
    fn fields_are_flattened() {
        let flow = FlowDefinition::new("Flat", FlowDocument::default());
        let value = serde_json::to_value(&flow).expect("serialize");
        assert_eq!(value["name"], "Flat");
        assert_eq!(value["version"], 1);
        assert!(value["nodes"].is_array());
        assert!(value.get("metadata").is_none());
    }

    #[test]
    fn bare_document_parses_with_defaults() {
        let json = r#"{"nodes": [
            {"id": "1", "type": "agent", "position": {"x": 0, "y": 0}},
            {"id": "2", "type": "output", "position": {"x": 0, "y": 0}}
        ], "edges": [{"id": "e1", "source": "1", "target": "2"}]}"#;
        let flow = FlowDefinition::from_json(json).expect("parse");
        assert_eq!(flow.name(), DEFAULT_FLOW_NAME);
        assert_eq!(flow.document.nodes.len(), 2);
        assert_eq!(flow.document.connections.len(), 1);
        assert!(flow.id.as_str().starts_with("flow_"));
    }

    #[test]
    fn definition_serde_roundtrip() {
        let flow = FlowDefinition::new("Roundtrip", FlowDocument::default());
        let json = flow.to_json_pretty().expect("serialize");
        let parsed = FlowDefinition::from_json(&json).expect("deserialize");
        assert_eq!(parsed, flow);
    }
}
