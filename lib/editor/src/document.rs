//! Persisted flow documents.
//!
//! A document is the persistence-ready projection of a graph snapshot:
//!
//! ```json
//! {
//!   "version": 1,
//!   "nodes": [{"id": "...", "kind": "agent", "position": {"x": 0, "y": 0}, "config": {...}}],
//!   "connections": [{"id": "...", "source": "...", "target": "...", "sourcePort": "true"}]
//! }
//! ```
//!
//! Implicit ports are omitted. Documents written by the older front end use
//! `type`, `data`, `edges`, `sourceHandle` and `targetHandle`; those names
//! are accepted on read.

use crate::connection::Connection;
use crate::error::{DocumentError, GraphError};
use crate::graph::{ConnectionPolicy, FlowGraph, GraphSnapshot};
use crate::node::{ConfigField, Node, NodeConfig, NodeKind, Position};
use crate::port::PortId;
use agent_flow_core::{ConnectionId, NodeId};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use tracing::debug;

/// The current document format version.
pub const CURRENT_VERSION: u32 = 1;

fn current_version() -> u32 {
    CURRENT_VERSION
}

/// A serialized flow graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowDocument {
    #[serde(default = "current_version")]
    pub version: u32,
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default, alias = "edges")]
    pub connections: Vec<ConnectionRecord>,
}

impl Default for FlowDocument {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION,
            nodes: Vec::new(),
            connections: Vec::new(),
        }
    }
}

/// A serialized node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: NodeId,
    /// Kind tag, validated on deserialize.
    #[serde(alias = "type")]
    pub kind: String,
    pub position: Position,
    #[serde(default, alias = "data")]
    pub config: BTreeMap<String, JsonValue>,
}

/// A serialized connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRecord {
    pub id: ConnectionId,
    pub source: NodeId,
    pub target: NodeId,
    #[serde(
        default,
        alias = "sourceHandle",
        skip_serializing_if = "Option::is_none"
    )]
    pub source_port: Option<String>,
    #[serde(
        default,
        alias = "targetHandle",
        skip_serializing_if = "Option::is_none"
    )]
    pub target_port: Option<String>,
}

impl FlowDocument {
    /// Parses a document from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] if the text is not a document.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        serde_json::from_str(json).map_err(|e| DocumentError::Parse {
            details: e.to_string(),
        })
    }

    /// Renders the document as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Parse`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        serde_json::to_string_pretty(self).map_err(|e| DocumentError::Parse {
            details: e.to_string(),
        })
    }
}

/// Projects a snapshot into a document.
#[must_use]
pub fn serialize(snapshot: &GraphSnapshot) -> FlowDocument {
    let nodes = snapshot
        .nodes
        .iter()
        .map(|node| NodeRecord {
            id: node.id.clone(),
            kind: node.kind().as_str().to_string(),
            position: node.position,
            config: node
                .config
                .entries()
                .into_iter()
                .map(|(key, value)| (key, JsonValue::String(value)))
                .collect(),
        })
        .collect();

    let connections = snapshot
        .connections
        .iter()
        .map(|connection| ConnectionRecord {
            id: connection.id.clone(),
            source: connection.source.clone(),
            target: connection.target.clone(),
            source_port: explicit_port(connection.source_port),
            target_port: explicit_port(connection.target_port),
        })
        .collect();

    FlowDocument {
        version: CURRENT_VERSION,
        nodes,
        connections,
    }
}

fn explicit_port(port: PortId) -> Option<String> {
    (!port.is_implicit()).then(|| port.as_str().to_string())
}

/// Rebuilds a graph from a document with the permissive connection policy.
///
/// # Errors
///
/// Returns the first problem found; see [`deserialize_with_policy`].
pub fn deserialize(document: &FlowDocument) -> Result<FlowGraph, DocumentError> {
    deserialize_with_policy(document, ConnectionPolicy::default())
}

/// Rebuilds a graph from a document.
///
/// # Errors
///
/// Returns an error if a node has an unknown kind, a duplicate id, or an
/// invalid enumerated config value, or if a connection has a duplicate id,
/// an unknown port, a missing endpoint, or is rejected by `policy`.
pub fn deserialize_with_policy(
    document: &FlowDocument,
    policy: ConnectionPolicy,
) -> Result<FlowGraph, DocumentError> {
    let mut graph = FlowGraph::with_policy(policy);

    for record in &document.nodes {
        let node = node_from_record(record)?;
        graph.insert_node(node).map_err(|_| DocumentError::DuplicateNodeId {
            node_id: record.id.clone(),
        })?;
    }

    for record in &document.connections {
        let connection = connection_from_record(&graph, record)?;
        graph
            .insert_connection(connection)
            .map_err(|error| match error {
                GraphError::DuplicateConnectionId { connection_id } => {
                    DocumentError::DuplicateConnectionId { connection_id }
                }
                error => DocumentError::InvalidConnection {
                    connection_id: record.id.clone(),
                    error,
                },
            })?;
    }

    Ok(graph)
}

fn node_from_record(record: &NodeRecord) -> Result<Node, DocumentError> {
    let kind: NodeKind = record
        .kind
        .parse()
        .map_err(|_| DocumentError::UnknownKind {
            node_id: record.id.clone(),
            kind: record.kind.clone(),
        })?;

    let mut config = NodeConfig::default_for(kind);
    for (key, value) in &record.config {
        let Some(field) = ConfigField::from_key(key).filter(|f| kind.recognizes(*f)) else {
            debug!(node_id = %record.id, %key, "ignoring unrecognized config key");
            continue;
        };
        let value = match value {
            JsonValue::Null => continue,
            JsonValue::String(s) => s.clone(),
            JsonValue::Number(n) => n.to_string(),
            JsonValue::Bool(b) => b.to_string(),
            other => {
                return Err(DocumentError::InvalidConfig {
                    node_id: record.id.clone(),
                    key: key.clone(),
                    value: other.to_string(),
                });
            }
        };
        config
            .set(field, &value)
            .map_err(|_| DocumentError::InvalidConfig {
                node_id: record.id.clone(),
                key: key.clone(),
                value,
            })?;
    }

    Ok(Node::with_config(record.id.clone(), record.position, config))
}

fn connection_from_record(
    graph: &FlowGraph,
    record: &ConnectionRecord,
) -> Result<Connection, DocumentError> {
    if record.source == record.target {
        return Err(DocumentError::SelfLoop {
            connection_id: record.id.clone(),
        });
    }
    for endpoint in [&record.source, &record.target] {
        if !graph.contains_node(endpoint) {
            return Err(DocumentError::DanglingEndpoint {
                connection_id: record.id.clone(),
                node_id: endpoint.clone(),
            });
        }
    }

    let source_port = parse_port(record, record.source_port.as_deref())?;
    let mut target_port = parse_port(record, record.target_port.as_deref())?;
    // Older documents name the left condition input `true`.
    if target_port == Some(PortId::True)
        && graph.node(&record.target).map(Node::kind) == Some(NodeKind::Condition)
    {
        target_port = Some(PortId::Left);
    }

    graph
        .resolve_connection(
            record.id.clone(),
            &record.source,
            source_port,
            &record.target,
            target_port,
        )
        .map_err(|error| DocumentError::InvalidConnection {
            connection_id: record.id.clone(),
            error,
        })
}

fn parse_port(
    record: &ConnectionRecord,
    name: Option<&str>,
) -> Result<Option<PortId>, DocumentError> {
    match name.map(str::trim) {
        None | Some("") => Ok(None),
        Some(name) => PortId::from_name(name)
            .map(Some)
            .ok_or_else(|| DocumentError::UnknownPort {
                connection_id: record.id.clone(),
                port: name.to_string(),
            }),
    }
}
