//! Error types for the editor crate.
//!
//! Errors are layered the same way throughout:
//! - `GraphError`: rejected structural requests against the graph store
//! - `ConfigError`: node kind tags and per-kind configuration values
//! - `DocumentError`: persisted documents that cannot be turned back into a graph
//!
//! The first two are returned as plain values; `DocumentError` is handed to
//! callers wrapped in a rootcause report by the editor facade.

use crate::node::{ConfigField, NodeKind};
use crate::port::PortId;
use agent_flow_core::{ConnectionId, NodeId};
use std::fmt;

/// Errors from graph store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Node with the given ID is not in the graph.
    NodeNotFound { node_id: NodeId },
    /// A connection would start and end on the same node.
    SelfLoop { node_id: NodeId },
    /// The source node has no implicit source port; a named port is required.
    SourcePortRequired { node_id: NodeId, kind: NodeKind },
    /// Source port does not exist on the source node's kind.
    SourcePortNotFound { node_id: NodeId, port: PortId },
    /// Target port does not exist on the target node's kind.
    TargetPortNotFound { node_id: NodeId, port: PortId },
    /// A node with this ID already exists.
    DuplicateNodeId { node_id: NodeId },
    /// A connection with this ID already exists.
    DuplicateConnectionId { connection_id: ConnectionId },
    /// An identical connection already exists and the policy forbids parallels.
    ParallelConnection { source: NodeId, target: NodeId },
    /// The connection would close a cycle and the policy forbids cycles.
    CycleDetected { source: NodeId, target: NodeId },
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NodeNotFound { node_id } => write!(f, "node not found: {node_id}"),
            Self::SelfLoop { node_id } => {
                write!(f, "node {node_id} cannot be connected to itself")
            }
            Self::SourcePortRequired { node_id, kind } => {
                write!(
                    f,
                    "connections leaving {kind} node {node_id} must name a source port"
                )
            }
            Self::SourcePortNotFound { node_id, port } => {
                write!(f, "source port '{port}' not found on node {node_id}")
            }
            Self::TargetPortNotFound { node_id, port } => {
                write!(f, "target port '{port}' not found on node {node_id}")
            }
            Self::DuplicateNodeId { node_id } => write!(f, "duplicate node id: {node_id}"),
            Self::DuplicateConnectionId { connection_id } => {
                write!(f, "duplicate connection id: {connection_id}")
            }
            Self::ParallelConnection { source, target } => {
                write!(f, "connection {source} -> {target} already exists")
            }
            Self::CycleDetected { source, target } => {
                write!(f, "connection {source} -> {target} would create a cycle")
            }
        }
    }
}

impl std::error::Error for GraphError {}

/// Errors from node kind and configuration handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The tag does not name a known node kind.
    UnknownKind { tag: String },
    /// The field is not part of this kind's configuration.
    UnrecognizedField { kind: NodeKind, field: ConfigField },
    /// The value is not one of the field's allowed options.
    InvalidValue { field: ConfigField, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownKind { tag } => write!(f, "unknown node kind: '{tag}'"),
            Self::UnrecognizedField { kind, field } => {
                write!(f, "{kind} nodes have no '{}' field", field.key())
            }
            Self::InvalidValue { field, value } => {
                write!(f, "invalid value '{value}' for '{}'", field.key())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Errors from reading or writing a persisted flow document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The document is not valid JSON or does not have the expected shape.
    Parse { details: String },
    /// Reading or writing the document file failed.
    Io { path: String, details: String },
    /// A node uses a kind tag outside the closed set.
    UnknownKind { node_id: NodeId, kind: String },
    /// Two nodes share an id.
    DuplicateNodeId { node_id: NodeId },
    /// Two connections share an id.
    DuplicateConnectionId { connection_id: ConnectionId },
    /// A configuration value is not allowed for its field.
    InvalidConfig {
        node_id: NodeId,
        key: String,
        value: String,
    },
    /// A connection names a port that does not exist.
    UnknownPort {
        connection_id: ConnectionId,
        port: String,
    },
    /// A connection references a node that is not in the document.
    DanglingEndpoint {
        connection_id: ConnectionId,
        node_id: NodeId,
    },
    /// A connection starts and ends on the same node.
    SelfLoop { connection_id: ConnectionId },
    /// A connection was rejected by the graph store.
    InvalidConnection {
        connection_id: ConnectionId,
        error: GraphError,
    },
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse { details } => write!(f, "malformed flow document: {details}"),
            Self::Io { path, details } => write!(f, "flow file '{path}': {details}"),
            Self::UnknownKind { node_id, kind } => {
                write!(f, "node {node_id} has unknown kind '{kind}'")
            }
            Self::DuplicateNodeId { node_id } => {
                write!(f, "node id {node_id} appears more than once")
            }
            Self::DuplicateConnectionId { connection_id } => {
                write!(f, "connection id {connection_id} appears more than once")
            }
            Self::InvalidConfig {
                node_id,
                key,
                value,
            } => write!(f, "node {node_id} has invalid {key} '{value}'"),
            Self::UnknownPort {
                connection_id,
                port,
            } => write!(f, "connection {connection_id} uses unknown port '{port}'"),
            Self::DanglingEndpoint {
                connection_id,
                node_id,
            } => write!(
                f,
                "connection {connection_id} references missing node {node_id}"
            ),
            Self::SelfLoop { connection_id } => {
                write!(f, "connection {connection_id} connects a node to itself")
            }
            Self::InvalidConnection {
                connection_id,
                error,
            } => write!(f, "connection {connection_id} is invalid: {error}"),
        }
    }
}

impl std::error::Error for DocumentError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn graph_error_display() {
        let node_id = NodeId::new();
        let err = GraphError::NodeNotFound { node_id };
        assert!(err.to_string().contains("node not found"));
    }

    #[test]
    fn graph_error_source_port_not_found() {
        let node_id: NodeId = "n1".parse().expect("id");
        let err = GraphError::SourcePortNotFound {
            node_id,
            port: PortId::False,
        };
        assert_eq!(err.to_string(), "source port 'false' not found on node n1");
    }

    #[test]
    fn config_error_display() {
        let err = ConfigError::InvalidValue {
            field: ConfigField::ToolType,
            value: "hammer".to_string(),
        };
        assert_eq!(err.to_string(), "invalid value 'hammer' for 'toolType'");
    }

    #[test]
    fn document_error_dangling_endpoint() {
        let err = DocumentError::DanglingEndpoint {
            connection_id: "e1".parse().expect("id"),
            node_id: "ghost".parse().expect("id"),
        };
        assert!(err.to_string().contains("missing node ghost"));
    }
}
