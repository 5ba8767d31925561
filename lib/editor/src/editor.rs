//! The flow editor.
//!
//! [`FlowEditor`] composes the graph store, canvas controller, viewport,
//! palette and inspector into one object exposing the editor's toolbar
//! verbs: save, open/import, export and run. Loading is all-or-nothing: a
//! document that fails to parse or validate leaves the current graph in
//! place.

use crate::canvas::{CanvasBounds, CanvasController, DragTransfer, HitTarget};
use crate::connection::Connection;
use crate::definition::{FlowDefinition, FlowMetadata};
use crate::document::{self, FlowDocument};
use crate::error::DocumentError;
use crate::graph::{FlowGraph, GraphSnapshot};
use crate::inspector::{self, InspectorView};
use crate::node::{ConfigField, Position};
use crate::palette::PaletteEntry;
use crate::settings::{BackgroundGrid, EditorSettings};
use crate::viewport::{self, MinimapNode, Viewport};
use agent_flow_core::{ConnectionId, FlowId, NodeId, Result};
use std::fmt;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{info, instrument, warn};

/// Runs a flow snapshot. Execution semantics live outside the editor.
pub trait FlowExecutor {
    /// What a run produces (a run id, a result, ...).
    type Outcome;

    /// Executes the given snapshot of flow `flow_id`.
    fn execute(&mut self, flow_id: &FlowId, snapshot: GraphSnapshot) -> Self::Outcome;
}

/// Node and connection counts, shown in the info panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStats {
    pub nodes: usize,
    pub connections: usize,
}

impl fmt::Display for FlowStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "nodes: {} | connections: {}",
            self.nodes, self.connections
        )
    }
}

/// A headless flow editor.
#[derive(Debug)]
pub struct FlowEditor {
    flow_id: FlowId,
    metadata: FlowMetadata,
    settings: EditorSettings,
    graph: FlowGraph,
    canvas: CanvasController,
    viewport: Viewport,
}

impl FlowEditor {
    /// Creates an editor holding the starter flow.
    #[must_use]
    pub fn new(settings: EditorSettings) -> Self {
        let graph = FlowGraph::seeded(settings.connections);
        Self::with_graph(settings, graph)
    }

    /// Creates an editor with an empty canvas.
    #[must_use]
    pub fn empty(settings: EditorSettings) -> Self {
        let graph = FlowGraph::with_policy(settings.connections);
        Self::with_graph(settings, graph)
    }

    fn with_graph(settings: EditorSettings, graph: FlowGraph) -> Self {
        Self {
            flow_id: FlowId::new(),
            metadata: FlowMetadata::default(),
            canvas: CanvasController::new(&settings),
            viewport: Viewport::default(),
            settings,
            graph,
        }
    }

    #[must_use]
    pub fn flow_id(&self) -> &FlowId {
        &self.flow_id
    }

    #[must_use]
    pub fn metadata(&self) -> &FlowMetadata {
        &self.metadata
    }

    /// Renames the flow.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.metadata.name = name.into();
    }

    #[must_use]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    #[must_use]
    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    /// Mutable access to the graph store, e.g. to subscribe observers.
    pub fn graph_mut(&mut self) -> &mut FlowGraph {
        &mut self.graph
    }

    #[must_use]
    pub fn canvas(&self) -> &CanvasController {
        &self.canvas
    }

    #[must_use]
    pub fn selection(&self) -> Option<&NodeId> {
        self.canvas.selection()
    }

    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        self.graph.snapshot()
    }

    #[must_use]
    pub fn stats(&self) -> FlowStats {
        FlowStats {
            nodes: self.graph.node_count(),
            connections: self.graph.connection_count(),
        }
    }

    // Gestures

    pub fn pointer_down(&mut self, hit: &HitTarget, pointer: Position) {
        self.canvas.pointer_down(&self.graph, hit, pointer);
    }

    pub fn pointer_move(&mut self, pointer: Position) {
        self.canvas.pointer_move(&mut self.graph, pointer);
    }

    pub fn pointer_up(&mut self, hit: &HitTarget) -> Option<ConnectionId> {
        self.canvas.pointer_up(&mut self.graph, hit)
    }

    pub fn click(&mut self, hit: &HitTarget) {
        self.canvas.click(&self.graph, hit);
    }

    pub fn drop(
        &mut self,
        transfer: &DragTransfer,
        client: Position,
        bounds: CanvasBounds,
    ) -> Option<NodeId> {
        self.canvas.drop(&mut self.graph, transfer, client, bounds)
    }

    /// Places a palette entry at the first free slot of the default layout.
    pub fn place_from_palette(&mut self, entry: &PaletteEntry) -> NodeId {
        let layout = self.settings.layout;
        let position = (0..)
            .map(|index| layout.slot(index))
            .find(|slot| self.graph.nodes().all(|node| node.position != *slot))
            .unwrap_or(layout.origin);
        self.graph.add_node(entry.kind, position, Some(entry.label))
    }

    /// Removes a node and its connections, clearing it from the selection.
    pub fn delete_node(&mut self, node_id: &NodeId) -> bool {
        self.canvas.forget(node_id);
        self.graph.remove_node(node_id).is_some()
    }

    /// Removes the selected node, if any.
    pub fn delete_selection(&mut self) -> bool {
        match self.selection().cloned() {
            Some(node_id) => self.delete_node(&node_id),
            None => false,
        }
    }

    pub fn disconnect(&mut self, connection_id: &ConnectionId) -> Option<Connection> {
        self.graph.remove_connection(connection_id)
    }

    // Inspector

    #[must_use]
    pub fn inspector(&self) -> InspectorView {
        inspector::inspect(&self.graph, self.selection())
    }

    /// Applies an inspector edit to the selected node.
    pub fn edit_field(&mut self, field: ConfigField, value: impl Into<String>) -> bool {
        let selection = self.canvas.selection().cloned();
        inspector::apply_edit(&mut self.graph, selection.as_ref(), field, value)
    }

    // Viewport

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames the whole flow in a `width` × `height` canvas.
    pub fn fit_view(&mut self, width: f64, height: f64) -> Viewport {
        self.viewport = Viewport::fit(
            &self.graph.snapshot(),
            width,
            height,
            self.settings.fit_view_padding,
        );
        self.viewport
    }

    #[must_use]
    pub fn minimap(&self) -> Vec<MinimapNode> {
        viewport::minimap(&self.graph.snapshot())
    }

    #[must_use]
    pub fn background(&self) -> BackgroundGrid {
        self.settings.background
    }

    // Persistence

    /// Returns the current graph as a document.
    #[must_use]
    pub fn document(&self) -> FlowDocument {
        document::serialize(&self.graph.snapshot())
    }

    /// Returns the current flow with its metadata.
    #[must_use]
    pub fn definition(&self) -> FlowDefinition {
        FlowDefinition {
            id: self.flow_id.clone(),
            metadata: self.metadata.clone(),
            document: self.document(),
        }
    }

    /// Replaces the graph with the one described by `document`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed; the current graph is
    /// kept.
    #[instrument(skip_all, fields(nodes = document.nodes.len(), connections = document.connections.len()))]
    pub fn load_document(&mut self, document: &FlowDocument) -> Result<(), DocumentError> {
        let graph = document::deserialize_with_policy(document, self.settings.connections)
            .inspect_err(|error| warn!(%error, "keeping current flow"))?;
        self.graph.replace_with(graph);
        self.canvas.reset();
        info!("flow loaded");
        Ok(())
    }

    /// Replaces the graph and metadata with `definition`.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is malformed; the current flow is
    /// kept.
    pub fn load_definition(
        &mut self,
        definition: FlowDefinition,
    ) -> Result<(), DocumentError> {
        self.load_document(&definition.document)?;
        self.flow_id = definition.id;
        self.metadata = definition.metadata;
        Ok(())
    }

    /// Loads a flow from JSON text (a flow file or a bare document).
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid flow; the current flow is
    /// kept.
    pub fn import_json(&mut self, json: &str) -> Result<(), DocumentError> {
        let definition = FlowDefinition::from_json(json)
            .inspect_err(|error| warn!(%error, "keeping current flow"))?;
        self.load_definition(definition)
    }

    /// Renders the current flow as indented JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn export_json(&self) -> Result<String, DocumentError> {
        Ok(self.definition().to_json_pretty()?)
    }

    /// Writes the current flow to `path`, stamping its update time.
    ///
    /// The document goes to a temporary file beside `path` which then
    /// replaces it, so a failed save leaves the previous file intact.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn save_to_path(&mut self, path: &Path) -> Result<(), DocumentError> {
        let mut definition = self.definition();
        definition.touch();
        let json = definition.to_json_pretty()?;
        let io_error = |e: std::io::Error| DocumentError::Io {
            path: path.display().to_string(),
            details: e.to_string(),
        };
        let dir = path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut file = NamedTempFile::new_in(dir).map_err(io_error)?;
        file.write_all(json.as_bytes()).map_err(io_error)?;
        file.persist(path).map_err(|e| io_error(e.error))?;
        self.metadata = definition.metadata;
        info!(stats = %self.stats(), "flow saved");
        Ok(())
    }

    /// Loads a flow file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid flow;
    /// the current flow is kept.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn open(&mut self, path: &Path) -> Result<(), DocumentError> {
        let json = std::fs::read_to_string(path).map_err(|e| DocumentError::Io {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        self.import_json(&json)
    }

    /// Hands a snapshot of the current graph to `executor`.
    pub fn run<E: FlowExecutor>(&self, executor: &mut E) -> E::Outcome {
        info!(flow_id = %self.flow_id, stats = %self.stats(), "running flow");
        executor.execute(&self.flow_id, self.graph.snapshot())
    }
}

impl Default for FlowEditor {
    fn default() -> Self {
        Self::new(EditorSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::GraphChange;
    use crate::node::NodeKind;
    use crate::palette;
    use crate::port::PortId;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Default)]
    struct RecordingExecutor {
        runs: Vec<(FlowId, GraphSnapshot)>,
    }

    impl FlowExecutor for RecordingExecutor {
        type Outcome = usize;

        fn execute(&mut self, flow_id: &FlowId, snapshot: GraphSnapshot) -> usize {
            self.runs.push((flow_id.clone(), snapshot));
            self.runs.len()
        }
    }

    #[test]
    fn fresh_editor_holds_seed_graph() {
        let editor = FlowEditor::default();
        assert_eq!(
            editor.stats(),
            FlowStats {
                nodes: 3,
                connections: 2
            }
        );
        assert_eq!(editor.stats().to_string(), "nodes: 3 | connections: 2");
        assert_eq!(editor.inspector(), InspectorView::Empty);
    }

    #[test]
    fn palette_drop_lands_at_offset_position() {
        let mut editor = FlowEditor::default();
        let transfer = palette::find("Calculator").expect("entry").start_drag();
        let node_id = editor
            .drop(&transfer, Position::new(120.0, 80.0), CanvasBounds::default())
            .expect("placed");

        let node = editor.graph().node(&node_id).expect("node");
        assert_eq!(node.position, Position::new(-180.0, 30.0));
        assert_eq!(node.kind(), NodeKind::Tool);
        assert_eq!(node.label(), "Calculator");
    }

    #[test]
    fn click_to_place_fills_layout_slots() {
        let mut editor = FlowEditor::empty(EditorSettings::default());
        let entry = palette::find("AI Agent").expect("entry");
        let first = editor.place_from_palette(entry);
        let second = editor.place_from_palette(entry);

        assert_eq!(
            editor.graph().node(&first).expect("first").position,
            Position::new(80.0, 80.0)
        );
        assert_eq!(
            editor.graph().node(&second).expect("second").position,
            Position::new(280.0, 80.0)
        );
    }

    #[test]
    fn click_to_place_reuses_freed_slot() {
        let mut editor = FlowEditor::empty(EditorSettings::default());
        let entry = palette::find("Browser").expect("entry");
        let first = editor.place_from_palette(entry);
        let second = editor.place_from_palette(entry);
        assert!(editor.delete_node(&first));

        let third = editor.place_from_palette(entry);
        let second_position = editor.graph().node(&second).expect("second").position;
        let third_position = editor.graph().node(&third).expect("third").position;
        assert_ne!(second_position, third_position);
        assert_eq!(third_position, Position::new(80.0, 80.0));

        let fourth = editor.place_from_palette(entry);
        assert_eq!(
            editor.graph().node(&fourth).expect("fourth").position,
            Position::new(480.0, 80.0)
        );
    }

    #[test]
    fn selection_drives_inspector() {
        let mut editor = FlowEditor::default();
        let agent = editor.snapshot().nodes[1].id.clone();

        editor.click(&HitTarget::Node(agent.clone()));
        assert!(editor.edit_field(ConfigField::Model, "glm-4"));
        let InspectorView::Node(form) = editor.inspector() else {
            panic!("expected node form");
        };
        assert_eq!(form.field(ConfigField::Model).expect("model").value, "glm-4");

        editor.click(&HitTarget::Empty);
        assert_eq!(editor.inspector(), InspectorView::Empty);
        assert!(!editor.edit_field(ConfigField::Model, "gpt-4"));
    }

    #[test]
    fn deleting_selected_node_clears_selection() {
        let mut editor = FlowEditor::default();
        let agent = editor.snapshot().nodes[1].id.clone();
        editor.click(&HitTarget::Node(agent));

        assert!(editor.delete_selection());
        assert_eq!(editor.selection(), None);
        assert_eq!(editor.stats().connections, 0);
        assert!(!editor.delete_selection());
    }

    #[test]
    fn malformed_document_keeps_last_good_graph() {
        let mut editor = FlowEditor::default();
        let before = editor.snapshot();

        let result = editor.import_json(
            r#"{"nodes": [{"id": "a", "kind": "agent", "position": {"x": 0, "y": 0}}],
                "connections": [{"id": "c", "source": "a", "target": "ghost"}]}"#,
        );
        assert!(result.is_err());
        assert!(editor.import_json("not json").is_err());
        assert_eq!(editor.snapshot().nodes, before.nodes);
        assert_eq!(editor.snapshot().connections, before.connections);
    }

    #[test]
    fn load_notifies_single_replace() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut editor = FlowEditor::default();
        let sink = Rc::clone(&seen);
        editor
            .graph_mut()
            .subscribe(move |change: &GraphChange, _revision: u64| {
                sink.borrow_mut().push(change.clone());
            });

        assert!(editor.import_json(r#"{"nodes": [{"id": "a"}]}"#).is_err());
        assert!(seen.borrow().is_empty());

        let document = FlowEditor::default().document();
        editor.load_document(&document).expect("load");
        assert_eq!(*seen.borrow(), vec![GraphChange::Replaced]);
    }

    #[test]
    fn import_replaces_graph_and_metadata() {
        let mut editor = FlowEditor::default();
        editor
            .import_json(
                r#"{"id": "7", "name": "Triage",
                    "nodes": [
                        {"id": "c", "kind": "condition", "position": {"x": 0, "y": 0}},
                        {"id": "y", "kind": "agent", "position": {"x": 0, "y": 100}},
                        {"id": "n", "kind": "output", "position": {"x": 200, "y": 0}}
                    ],
                    "connections": [
                        {"id": "cy", "source": "c", "target": "y", "sourcePort": "true"},
                        {"id": "cn", "source": "c", "target": "n", "sourcePort": "false"}
                    ]}"#,
            )
            .expect("import");

        assert_eq!(editor.flow_id().as_str(), "7");
        assert_eq!(editor.metadata().name, "Triage");
        let snapshot = editor.snapshot();
        assert_eq!(snapshot.connections[0].source_port, PortId::True);
        assert_eq!(snapshot.connections[1].source_port, PortId::False);
    }

    #[test]
    fn save_and_open_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flow.json");

        let mut editor = FlowEditor::default();
        editor.rename("Support bot");
        let agent = editor.snapshot().nodes[1].id.clone();
        editor.click(&HitTarget::Node(agent));
        editor.edit_field(ConfigField::Description, "Answers tickets");
        editor.save_to_path(&path).expect("save");

        let mut reopened = FlowEditor::empty(EditorSettings::default());
        reopened.open(&path).expect("open");
        assert_eq!(reopened.flow_id(), editor.flow_id());
        assert_eq!(reopened.metadata().name, "Support bot");
        assert_eq!(reopened.snapshot().nodes, editor.snapshot().nodes);
        assert_eq!(
            reopened.snapshot().connections,
            editor.snapshot().connections
        );
    }

    #[test]
    fn save_replaces_existing_file_without_leftovers() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("flow.json");
        std::fs::write(&path, "stale").expect("seed");

        let mut editor = FlowEditor::default();
        editor.rename("Fresh");
        editor.save_to_path(&path).expect("save");

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .expect("read_dir")
            .collect::<std::io::Result<_>>()
            .expect("entries");
        assert_eq!(entries.len(), 1);
        let written = std::fs::read_to_string(&path).expect("read");
        assert!(written.contains("\"Fresh\""));
    }

    #[test]
    fn save_into_missing_directory_fails_cleanly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("absent").join("flow.json");

        let mut editor = FlowEditor::default();
        let before = editor.metadata().updated_at;
        assert!(editor.save_to_path(&path).is_err());
        assert!(!path.exists());
        assert_eq!(editor.metadata().updated_at, before);
        assert_eq!(std::fs::read_dir(dir.path()).expect("read_dir").count(), 0);
    }

    #[test]
    fn open_missing_file_fails_and_keeps_graph() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut editor = FlowEditor::default();
        assert!(editor.open(&dir.path().join("missing.json")).is_err());
        assert_eq!(editor.stats().nodes, 3);
    }

    #[test]
    fn export_is_reimportable() {
        let editor = FlowEditor::default();
        let json = editor.export_json().expect("export");
        let mut other = FlowEditor::empty(EditorSettings::default());
        other.import_json(&json).expect("import");
        assert_eq!(other.snapshot().nodes, editor.snapshot().nodes);
    }

    #[test]
    fn run_hands_snapshot_to_executor() {
        let editor = FlowEditor::default();
        let mut executor = RecordingExecutor::default();

        assert_eq!(editor.run(&mut executor), 1);
        let (flow_id, snapshot) = &executor.runs[0];
        assert_eq!(flow_id, editor.flow_id());
        assert_eq!(snapshot.nodes.len(), 3);
    }

    #[test]
    fn fit_view_frames_content() {
        let mut editor = FlowEditor::default();
        let viewport = editor.fit_view(800.0, 600.0);
        assert_eq!(editor.viewport(), viewport);
        assert_ne!(viewport, Viewport::default());
        assert_eq!(editor.minimap().len(), 3);
        assert_eq!(editor.background().gap, 12.0);
    }
}
