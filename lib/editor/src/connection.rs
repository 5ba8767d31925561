//! Connections between nodes.
//!
//! A connection runs from a source port on one node to a target port on
//! another. Ports are always resolved: a connection created without naming a
//! port stores the kind's implicit port.

use crate::port::PortId;
use agent_flow_core::{ConnectionId, NodeId};

/// A directed connection in a flow graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Unique identifier for this connection.
    pub id: ConnectionId,
    /// The node the connection leaves.
    pub source: NodeId,
    /// The port on the source node.
    pub source_port: PortId,
    /// The node the connection enters.
    pub target: NodeId,
    /// The port on the target node.
    pub target_port: PortId,
}

impl Connection {
    /// Returns true if either endpoint is `node_id`.
    #[must_use]
    pub fn touches(&self, node_id: &NodeId) -> bool {
        &self.source == node_id || &self.target == node_id
    }

    /// Returns true if this connection joins the same ports as `other`.
    #[must_use]
    pub fn parallels(&self, other: &Connection) -> bool {
        self.source == other.source
            && self.source_port == other.source_port
            && self.target == other.target
            && self.target_port == other.target_port
    }
}
