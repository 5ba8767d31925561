//! Flow graph store using petgraph.
//!
//! The store owns every node and connection of a flow. Nodes are graph
//! weights and connections are edge weights of a `StableDiGraph`, so indices
//! held in the lookup maps stay valid across removals. Parallel edges and
//! cycles are allowed unless the [`ConnectionPolicy`] says otherwise.
//!
//! Every mutation that changes state bumps the revision counter and notifies
//! the registered [`GraphObserver`]s. Requests naming an unknown id are
//! no-ops: a gesture may still hold the id of a node removed a moment ago.

use crate::connection::Connection;
use crate::error::GraphError;
use crate::node::{ConfigField, ConfigPatch, Node, NodeKind, Position};
use crate::port::PortId;
use crate::registry;
use agent_flow_core::{ConnectionId, NodeId};
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, warn};

/// Which structurally valid connections the store accepts.
///
/// The default accepts everything: parallel connections between the same
/// ports and connections that close a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionPolicy {
    /// Accept a connection identical (same nodes and ports) to an existing one.
    #[serde(default = "default_allow")]
    pub allow_parallel: bool,
    /// Accept a connection whose target can already reach its source.
    #[serde(default = "default_allow")]
    pub allow_cycles: bool,
}

fn default_allow() -> bool {
    true
}

impl Default for ConnectionPolicy {
    fn default() -> Self {
        Self {
            allow_parallel: default_allow(),
            allow_cycles: default_allow(),
        }
    }
}

impl ConnectionPolicy {
    /// A policy that rejects parallel connections and cycles.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            allow_parallel: false,
            allow_cycles: false,
        }
    }
}

/// A change applied to the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphChange {
    NodeAdded { node_id: NodeId },
    NodeMoved { node_id: NodeId, position: Position },
    NodeConfigUpdated { node_id: NodeId },
    /// A node was removed together with every connection touching it.
    NodeRemoved {
        node_id: NodeId,
        connections: Vec<ConnectionId>,
    },
    ConnectionAdded { connection_id: ConnectionId },
    ConnectionRemoved { connection_id: ConnectionId },
    /// The whole graph was replaced (document load).
    Replaced,
}

impl GraphChange {
    /// Returns the node this change is about, if any.
    #[must_use]
    pub fn node_id(&self) -> Option<&NodeId> {
        match self {
            Self::NodeAdded { node_id }
            | Self::NodeMoved { node_id, .. }
            | Self::NodeConfigUpdated { node_id }
            | Self::NodeRemoved { node_id, .. } => Some(node_id),
            _ => None,
        }
    }
}

/// Receives change notifications from a [`FlowGraph`].
pub trait GraphObserver {
    /// Called after a change has been applied.
    fn graph_changed(&mut self, change: &GraphChange, revision: u64);
}

impl<F> GraphObserver for F
where
    F: FnMut(&GraphChange, u64),
{
    fn graph_changed(&mut self, change: &GraphChange, revision: u64) {
        self(change, revision);
    }
}

/// Handle returned by [`FlowGraph::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

/// An isolated, point-in-time copy of a graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphSnapshot {
    /// Revision of the store when the snapshot was taken.
    pub revision: u64,
    /// Nodes in insertion order.
    pub nodes: Vec<Node>,
    /// Connections in insertion order.
    pub connections: Vec<Connection>,
}

impl GraphSnapshot {
    /// Returns the node with the given ID, if any.
    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| &n.id == node_id)
    }

    /// Returns the connection with the given ID, if any.
    #[must_use]
    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.id == connection_id)
    }
}

/// The authoritative store of a flow's nodes and connections.
pub struct FlowGraph {
    graph: StableDiGraph<Node, Connection>,
    node_index: HashMap<NodeId, NodeIndex>,
    edge_index: HashMap<ConnectionId, EdgeIndex>,
    node_order: Vec<NodeId>,
    connection_order: Vec<ConnectionId>,
    policy: ConnectionPolicy,
    observers: Vec<(ObserverId, Box<dyn GraphObserver>)>,
    next_observer: u64,
    revision: u64,
}

impl FlowGraph {
    /// Creates a new empty graph with the permissive policy.
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(ConnectionPolicy::default())
    }

    /// Creates a new empty graph with the given policy.
    #[must_use]
    pub fn with_policy(policy: ConnectionPolicy) -> Self {
        Self {
            graph: StableDiGraph::new(),
            node_index: HashMap::new(),
            edge_index: HashMap::new(),
            node_order: Vec::new(),
            connection_order: Vec::new(),
            policy,
            observers: Vec::new(),
            next_observer: 0,
            revision: 0,
        }
    }

    /// Creates the starter flow: trigger → agent → output.
    #[must_use]
    pub fn seeded(policy: ConnectionPolicy) -> Self {
        let mut graph = Self::with_policy(policy);
        let trigger = graph.add_node(NodeKind::Trigger, Position::new(250.0, 50.0), None);
        let agent = graph.add_node(NodeKind::Agent, Position::new(250.0, 200.0), None);
        let output = graph.add_node(
            NodeKind::Output,
            Position::new(250.0, 350.0),
            Some("Return Result"),
        );
        graph.update_node_config(
            &agent,
            &ConfigPatch::single(ConfigField::Description, "Handles user requests"),
        );

        for (source, target) in [(&trigger, &agent), (&agent, &output)] {
            if let Err(error) = graph.connect(source, None, target, None) {
                warn!(%error, "failed to wire starter flow");
            }
        }
        graph
    }

    /// Returns the connection policy.
    #[must_use]
    pub fn policy(&self) -> ConnectionPolicy {
        self.policy
    }

    /// Returns the current revision. Every applied change increments it.
    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Registers an observer for graph changes.
    pub fn subscribe(&mut self, observer: impl GraphObserver + 'static) -> ObserverId {
        let id = ObserverId(self.next_observer);
        self.next_observer += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    /// Removes a previously registered observer.
    pub fn unsubscribe(&mut self, id: ObserverId) {
        self.observers.retain(|(observer_id, _)| *observer_id != id);
    }

    fn notify(&mut self, change: GraphChange) {
        self.revision += 1;
        let revision = self.revision;
        for (_, observer) in &mut self.observers {
            observer.graph_changed(&change, revision);
        }
    }

    /// Adds a node of `kind` with default configuration, optionally labelled.
    ///
    /// Returns the new node's ID.
    pub fn add_node(&mut self, kind: NodeKind, position: Position, label: Option<&str>) -> NodeId {
        let mut node = Node::new(kind, position);
        if let Some(label) = label
            && let Err(error) = node.config.set(ConfigField::Label, label)
        {
            warn!(%error, "ignoring initial label");
        }
        let node_id = node.id.clone();
        self.attach_node(node);
        self.notify(GraphChange::NodeAdded {
            node_id: node_id.clone(),
        });
        node_id
    }

    /// Inserts a fully built node, keeping its ID.
    ///
    /// # Errors
    ///
    /// Returns an error if a node with the same ID already exists.
    pub fn insert_node(&mut self, node: Node) -> Result<(), GraphError> {
        if self.node_index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNodeId { node_id: node.id });
        }
        let node_id = node.id.clone();
        self.attach_node(node);
        self.notify(GraphChange::NodeAdded { node_id });
        Ok(())
    }

    fn attach_node(&mut self, node: Node) {
        let node_id = node.id.clone();
        let index = self.graph.add_node(node);
        self.node_index.insert(node_id.clone(), index);
        self.node_order.push(node_id);
    }

    /// Moves a node. Unknown IDs are ignored.
    ///
    /// Returns true if the node exists.
    pub fn move_node(&mut self, node_id: &NodeId, position: Position) -> bool {
        let Some(node) = self.node_mut(node_id) else {
            debug!(%node_id, "ignoring move of unknown node");
            return false;
        };
        if node.position == position {
            return true;
        }
        node.position = position;
        self.notify(GraphChange::NodeMoved {
            node_id: node_id.clone(),
            position,
        });
        true
    }

    /// Merges `patch` into a node's configuration. Unknown IDs are ignored.
    ///
    /// Fields the node's kind does not recognize, and values an enumerated
    /// field does not accept, are skipped; every other field in the patch is
    /// applied and fields absent from the patch are left as they are.
    ///
    /// Returns true if the node exists.
    pub fn update_node_config(&mut self, node_id: &NodeId, patch: &ConfigPatch) -> bool {
        let Some(node) = self.node_mut(node_id) else {
            debug!(%node_id, "ignoring config update of unknown node");
            return false;
        };
        let mut changed = false;
        for (field, value) in patch.iter() {
            match node.config.set(field, value) {
                Ok(()) => changed = true,
                Err(error) => warn!(%node_id, %error, "skipping config field"),
            }
        }
        if changed {
            self.notify(GraphChange::NodeConfigUpdated {
                node_id: node_id.clone(),
            });
        }
        true
    }

    /// Removes a node and every connection touching it.
    ///
    /// Removing an absent node does nothing.
    pub fn remove_node(&mut self, node_id: &NodeId) -> Option<Node> {
        let index = self.node_index.remove(node_id)?;

        let removed_connections: Vec<ConnectionId> = self
            .graph
            .edges_directed(index, Direction::Outgoing)
            .chain(self.graph.edges_directed(index, Direction::Incoming))
            .map(|edge| edge.weight().id.clone())
            .collect();
        for connection_id in &removed_connections {
            self.edge_index.remove(connection_id);
        }
        self.connection_order
            .retain(|id| !removed_connections.contains(id));
        self.node_order.retain(|id| id != node_id);

        let node = self.graph.remove_node(index)?;
        self.notify(GraphChange::NodeRemoved {
            node_id: node_id.clone(),
            connections: removed_connections,
        });
        Some(node)
    }

    /// Connects two nodes and returns the new connection's ID.
    ///
    /// `None` ports select the kind's implicit port. Condition nodes have no
    /// implicit source port and must name `true` or `false`.
    ///
    /// # Errors
    ///
    /// Returns an error, leaving the graph unchanged, if:
    /// - Source and target are the same node
    /// - Either node does not exist
    /// - A port is missing or does not exist on that node's kind
    /// - The connection policy rejects a parallel connection or a cycle
    pub fn connect(
        &mut self,
        source: &NodeId,
        source_port: Option<PortId>,
        target: &NodeId,
        target_port: Option<PortId>,
    ) -> Result<ConnectionId, GraphError> {
        let connection = self.resolve_connection(
            ConnectionId::new(),
            source,
            source_port,
            target,
            target_port,
        )?;
        let connection_id = connection.id.clone();
        self.insert_connection(connection)?;
        Ok(connection_id)
    }

    /// Builds a connection with resolved ports without inserting it.
    pub(crate) fn resolve_connection(
        &self,
        id: ConnectionId,
        source: &NodeId,
        source_port: Option<PortId>,
        target: &NodeId,
        target_port: Option<PortId>,
    ) -> Result<Connection, GraphError> {
        if source == target {
            return Err(GraphError::SelfLoop {
                node_id: source.clone(),
            });
        }
        let source_kind = self
            .node(source)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: source.clone(),
            })?
            .kind();
        let target_kind = self
            .node(target)
            .ok_or_else(|| GraphError::NodeNotFound {
                node_id: target.clone(),
            })?
            .kind();

        let source_descriptor = registry::describe(source_kind);
        let source_port = source_port
            .or_else(|| source_descriptor.default_source_port())
            .ok_or_else(|| GraphError::SourcePortRequired {
                node_id: source.clone(),
                kind: source_kind,
            })?;
        if !source_descriptor.has_source_port(source_port) {
            return Err(GraphError::SourcePortNotFound {
                node_id: source.clone(),
                port: source_port,
            });
        }

        let target_descriptor = registry::describe(target_kind);
        let target_port = target_port.unwrap_or_else(|| target_descriptor.default_target_port());
        if !target_descriptor.has_target_port(target_port) {
            return Err(GraphError::TargetPortNotFound {
                node_id: target.clone(),
                port: target_port,
            });
        }

        Ok(Connection {
            id,
            source: source.clone(),
            source_port,
            target: target.clone(),
            target_port,
        })
    }

    /// Inserts a connection, keeping its ID and ports.
    ///
    /// # Errors
    ///
    /// Returns an error if the ID is taken, the connection is a self-loop,
    /// an endpoint is missing, a port does not exist on its node's kind, or
    /// the policy rejects it.
    pub fn insert_connection(&mut self, connection: Connection) -> Result<(), GraphError> {
        if self.edge_index.contains_key(&connection.id) {
            return Err(GraphError::DuplicateConnectionId {
                connection_id: connection.id,
            });
        }
        let connection = self.resolve_connection(
            connection.id,
            &connection.source,
            Some(connection.source_port),
            &connection.target,
            Some(connection.target_port),
        )?;
        let (Some(&source_index), Some(&target_index)) = (
            self.node_index.get(&connection.source),
            self.node_index.get(&connection.target),
        ) else {
            return Err(GraphError::NodeNotFound {
                node_id: connection.source,
            });
        };

        if !self.policy.allow_parallel
            && self
                .graph
                .edges_connecting(source_index, target_index)
                .any(|edge| edge.weight().parallels(&connection))
        {
            return Err(GraphError::ParallelConnection {
                source: connection.source,
                target: connection.target,
            });
        }
        if !self.policy.allow_cycles
            && petgraph::algo::has_path_connecting(&self.graph, target_index, source_index, None)
        {
            return Err(GraphError::CycleDetected {
                source: connection.source,
                target: connection.target,
            });
        }

        let connection_id = connection.id.clone();
        let edge = self.graph.add_edge(source_index, target_index, connection);
        self.edge_index.insert(connection_id.clone(), edge);
        self.connection_order.push(connection_id.clone());
        self.notify(GraphChange::ConnectionAdded { connection_id });
        Ok(())
    }

    /// Removes a connection. Removing an absent connection does nothing.
    pub fn remove_connection(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        let edge = self.edge_index.remove(connection_id)?;
        self.connection_order.retain(|id| id != connection_id);
        let connection = self.graph.remove_edge(edge)?;
        self.notify(GraphChange::ConnectionRemoved {
            connection_id: connection_id.clone(),
        });
        Some(connection)
    }

    /// Replaces this graph's contents with `other`'s, keeping observers.
    pub fn replace_with(&mut self, other: FlowGraph) {
        self.graph = other.graph;
        self.node_index = other.node_index;
        self.edge_index = other.edge_index;
        self.node_order = other.node_order;
        self.connection_order = other.connection_order;
        self.policy = other.policy;
        self.notify(GraphChange::Replaced);
    }

    /// Takes an isolated copy of the current nodes and connections.
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            revision: self.revision,
            nodes: self.nodes().cloned().collect(),
            connections: self.connections().cloned().collect(),
        }
    }

    /// Returns a node by its ID.
    #[must_use]
    pub fn node(&self, node_id: &NodeId) -> Option<&Node> {
        let index = self.node_index.get(node_id)?;
        self.graph.node_weight(*index)
    }

    fn node_mut(&mut self, node_id: &NodeId) -> Option<&mut Node> {
        let index = self.node_index.get(node_id)?;
        self.graph.node_weight_mut(*index)
    }

    /// Returns true if the graph contains the node.
    #[must_use]
    pub fn contains_node(&self, node_id: &NodeId) -> bool {
        self.node_index.contains_key(node_id)
    }

    /// Returns a connection by its ID.
    #[must_use]
    pub fn connection(&self, connection_id: &ConnectionId) -> Option<&Connection> {
        let index = self.edge_index.get(connection_id)?;
        self.graph.edge_weight(*index)
    }

    /// Returns all nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.node(id))
    }

    /// Returns all connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connection_order
            .iter()
            .filter_map(|id| self.connection(id))
    }

    /// Returns the number of nodes in the graph.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of connections in the graph.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the connections leaving a node.
    pub fn outgoing(&self, node_id: &NodeId) -> Vec<&Connection> {
        self.edges(node_id, Direction::Outgoing)
    }

    /// Returns the connections entering a node.
    pub fn incoming(&self, node_id: &NodeId) -> Vec<&Connection> {
        self.edges(node_id, Direction::Incoming)
    }

    /// Returns every connection touching a node, in insertion order.
    pub fn connections_of(&self, node_id: &NodeId) -> Vec<&Connection> {
        self.connections()
            .filter(|connection| connection.touches(node_id))
            .collect()
    }

    fn edges(&self, node_id: &NodeId, direction: Direction) -> Vec<&Connection> {
        let Some(&index) = self.node_index.get(node_id) else {
            return Vec::new();
        };
        self.graph
            .edges_directed(index, direction)
            .map(|edge| edge.weight())
            .collect()
    }

    /// Returns nodes that have no incoming connections, in insertion order.
    pub fn entry_nodes(&self) -> Vec<&Node> {
        self.nodes()
            .filter(|node| self.incoming(&node.id).is_empty())
            .collect()
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FlowGraph")
            .field("nodes", &self.node_count())
            .field("connections", &self.connection_count())
            .field("policy", &self.policy)
            .field("revision", &self.revision)
            .field("observers", &self.observers.len())
            .finish()
    }
}
