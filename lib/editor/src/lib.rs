//! Headless flow graph editor for agent-flow.
//!
//! This crate provides everything needed to compose an agent pipeline as a
//! graph, without a rendering surface:
//!
//! - **Graph Store**: nodes and connections on a petgraph `StableDiGraph`,
//!   with change notifications and a configurable connection policy
//! - **Node Types**: trigger, agent, llm, condition, tool and output, each
//!   with typed configuration and a fixed set of ports
//! - **Canvas**: pointer gestures, palette drops, grid snap and selection
//! - **Inspector**: per-kind forms whose edits are applied live
//! - **Documents**: JSON persistence, including the older front end's format
//! - **Editor**: the facade tying it together (save, open, export, run)

pub mod canvas;
pub mod connection;
pub mod definition;
pub mod document;
pub mod editor;
pub mod error;
pub mod graph;
pub mod inspector;
pub mod node;
pub mod palette;
pub mod port;
pub mod registry;
pub mod settings;
pub mod viewport;

pub use canvas::{CanvasBounds, CanvasController, DragTransfer, HitTarget, InteractionState};
pub use connection::Connection;
pub use definition::{FlowDefinition, FlowMetadata};
pub use document::{FlowDocument, deserialize, serialize};
pub use editor::{FlowEditor, FlowExecutor, FlowStats};
pub use error::{ConfigError, DocumentError, GraphError};
pub use graph::{ConnectionPolicy, FlowGraph, GraphChange, GraphObserver, GraphSnapshot};
pub use inspector::{FieldInput, InspectorView, NodeForm};
pub use node::{ConfigField, ConfigPatch, Node, NodeConfig, NodeKind, Position};
pub use port::PortId;
pub use registry::{NodeDescriptor, describe};
pub use settings::EditorSettings;
pub use viewport::Viewport;
