//! Canvas gesture handling.
//!
//! The controller turns pointer gestures into graph store mutations. It owns
//! the current interaction (idle, dragging a node, drawing a connection, or
//! a selected node) and only ever holds node ids; every gesture resolves
//! them against the graph passed in, so a node deleted mid-gesture simply
//! ends the gesture.
//!
//! All pointer coordinates are canvas coordinates except for palette drops,
//! which arrive in client coordinates together with the canvas bounds.

use crate::graph::FlowGraph;
use crate::node::{NodeKind, Position};
use crate::port::PortId;
use crate::registry;
use crate::settings::{EditorSettings, GridSnap};
use agent_flow_core::{ConnectionId, NodeId};
use tracing::debug;

/// What lies under the pointer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HitTarget {
    /// Empty canvas.
    Empty,
    /// The body of a node.
    Node(NodeId),
    /// A port on a node.
    Port { node_id: NodeId, port: PortId },
}

/// The controller's interaction state.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractionState {
    Idle,
    /// A node follows the pointer.
    DraggingNode {
        node_id: NodeId,
        /// Node position when the drag started.
        origin: Position,
        /// Pointer position when the drag started.
        grab: Position,
    },
    /// A connection is being drawn from a source port.
    DrawingConnection {
        source: NodeId,
        source_port: PortId,
        cursor: Position,
    },
    Selected(NodeId),
}

/// The identity tagged onto a palette drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragPayload {
    pub kind: NodeKind,
    pub label: String,
}

/// Data carried by a drag gesture from start to drop.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragTransfer {
    payload: Option<DragPayload>,
}

impl DragTransfer {
    /// A drag carrying no palette tag (e.g. a file dragged from elsewhere).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A drag tagged with a node kind and label.
    #[must_use]
    pub fn tagged(kind: NodeKind, label: impl Into<String>) -> Self {
        Self {
            payload: Some(DragPayload {
                kind,
                label: label.into(),
            }),
        }
    }

    #[must_use]
    pub fn payload(&self) -> Option<&DragPayload> {
        self.payload.as_ref()
    }
}

/// The canvas element's bounding box in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CanvasBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CanvasBounds {
    #[must_use]
    pub fn origin(&self) -> Position {
        Position::new(self.left, self.top)
    }
}

/// Translates gestures into graph mutations.
#[derive(Debug, Clone)]
pub struct CanvasController {
    state: InteractionState,
    grid: GridSnap,
    drop_offset: Position,
}

impl CanvasController {
    /// Creates an idle controller.
    #[must_use]
    pub fn new(settings: &EditorSettings) -> Self {
        Self {
            state: InteractionState::Idle,
            grid: settings.grid,
            drop_offset: settings.drop_offset,
        }
    }

    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Returns the selected node, if any.
    ///
    /// A node being dragged counts as selected.
    #[must_use]
    pub fn selection(&self) -> Option<&NodeId> {
        match &self.state {
            InteractionState::Selected(node_id)
            | InteractionState::DraggingNode { node_id, .. } => Some(node_id),
            _ => None,
        }
    }

    /// Starts a drag on a node or a connection on a source port.
    ///
    /// Pressing on empty canvas, on a target port, or on a node that no
    /// longer exists leaves the state unchanged.
    pub fn pointer_down(&mut self, graph: &FlowGraph, hit: &HitTarget, pointer: Position) {
        match hit {
            HitTarget::Node(node_id) => {
                let Some(node) = graph.node(node_id) else {
                    debug!(%node_id, "pointer down on unknown node");
                    return;
                };
                self.state = InteractionState::DraggingNode {
                    node_id: node_id.clone(),
                    origin: node.position,
                    grab: pointer,
                };
            }
            HitTarget::Port { node_id, port } => {
                let Some(node) = graph.node(node_id) else {
                    debug!(%node_id, "pointer down on port of unknown node");
                    return;
                };
                if !registry::describe(node.kind()).has_source_port(*port) {
                    return;
                }
                self.state = InteractionState::DrawingConnection {
                    source: node_id.clone(),
                    source_port: *port,
                    cursor: pointer,
                };
            }
            HitTarget::Empty => {}
        }
    }

    /// Follows the pointer: moves the dragged node or the connection preview.
    pub fn pointer_move(&mut self, graph: &mut FlowGraph, pointer: Position) {
        let node_gone = match &mut self.state {
            InteractionState::DraggingNode {
                node_id,
                origin,
                grab,
            } => {
                let delta = pointer.relative_to(*grab);
                let position = self.grid.apply(origin.offset(delta.x, delta.y));
                !graph.move_node(node_id, position)
            }
            InteractionState::DrawingConnection { cursor, .. } => {
                *cursor = pointer;
                false
            }
            _ => false,
        };
        if node_gone {
            self.state = InteractionState::Idle;
        }
    }

    /// Ends the current gesture.
    ///
    /// A drag ends with the node selected. A connection being drawn is
    /// created if the pointer is released over a target port that accepts
    /// it and discarded otherwise; either way the controller returns to
    /// idle. Returns the new connection's id, if one was created.
    pub fn pointer_up(&mut self, graph: &mut FlowGraph, hit: &HitTarget) -> Option<ConnectionId> {
        match std::mem::replace(&mut self.state, InteractionState::Idle) {
            InteractionState::DraggingNode { node_id, .. } => {
                if graph.contains_node(&node_id) {
                    self.state = InteractionState::Selected(node_id);
                }
                None
            }
            InteractionState::DrawingConnection {
                source,
                source_port,
                ..
            } => {
                let HitTarget::Port { node_id, port } = hit else {
                    debug!(%source, "connection dropped on empty space");
                    return None;
                };
                match graph.connect(&source, Some(source_port), node_id, Some(*port)) {
                    Ok(connection_id) => Some(connection_id),
                    Err(error) => {
                        debug!(%error, "connection rejected");
                        None
                    }
                }
            }
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Selects the clicked node, or clears the selection on empty canvas.
    pub fn click(&mut self, graph: &FlowGraph, hit: &HitTarget) {
        match hit {
            HitTarget::Node(node_id) if graph.contains_node(node_id) => {
                self.state = InteractionState::Selected(node_id.clone());
            }
            HitTarget::Node(_) | HitTarget::Empty => self.state = InteractionState::Idle,
            HitTarget::Port { .. } => {}
        }
    }

    /// Places a node from a palette drop.
    ///
    /// The node lands at the drop point relative to the canvas origin plus
    /// the centering offset. Drops without a palette tag are ignored.
    pub fn drop(
        &mut self,
        graph: &mut FlowGraph,
        transfer: &DragTransfer,
        client: Position,
        bounds: CanvasBounds,
    ) -> Option<NodeId> {
        let Some(payload) = transfer.payload() else {
            debug!("ignoring drop without palette tag");
            return None;
        };
        let position = client
            .relative_to(bounds.origin())
            .offset(self.drop_offset.x, self.drop_offset.y);
        Some(graph.add_node(payload.kind, position, Some(&payload.label)))
    }

    /// Drops any reference to `node_id` held by the current gesture.
    pub fn forget(&mut self, node_id: &NodeId) {
        let holds = match &self.state {
            InteractionState::Selected(id) | InteractionState::DraggingNode { node_id: id, .. } => {
                id == node_id
            }
            InteractionState::DrawingConnection { source, .. } => source == node_id,
            InteractionState::Idle => false,
        };
        if holds {
            self.state = InteractionState::Idle;
        }
    }

    /// Returns to idle.
    pub fn reset(&mut self) {
        self.state = InteractionState::Idle;
    }
}

impl Default for CanvasController {
    fn default() -> Self {
        Self::new(&EditorSettings::default())
    }
}
