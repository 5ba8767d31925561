//! Canvas viewport: framing, projection and the minimap.

use crate::graph::GraphSnapshot;
use crate::node::Position;
use crate::registry;
use agent_flow_core::NodeId;

/// Rendered node width in canvas units.
pub const NODE_WIDTH: f64 = 160.0;
/// Rendered node height in canvas units.
pub const NODE_HEIGHT: f64 = 60.0;

pub const MIN_ZOOM: f64 = 0.5;
pub const MAX_ZOOM: f64 = 2.0;

/// Axis-aligned rectangle in canvas units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// The rectangle covering every node of `snapshot`, or `None` if empty.
    #[must_use]
    pub fn around(snapshot: &GraphSnapshot) -> Option<Self> {
        let mut nodes = snapshot.nodes.iter();
        let first = nodes.next()?.position;
        let (mut min, mut max) = (first, first);
        for node in nodes {
            min.x = min.x.min(node.position.x);
            min.y = min.y.min(node.position.y);
            max.x = max.x.max(node.position.x);
            max.y = max.y.max(node.position.y);
        }
        Some(Self {
            x: min.x,
            y: min.y,
            width: max.x - min.x + NODE_WIDTH,
            height: max.y - min.y + NODE_HEIGHT,
        })
    }

    #[must_use]
    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

/// Pan and zoom of the canvas: screen = canvas * zoom + (x, y).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f64,
    pub y: f64,
    pub zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            zoom: 1.0,
        }
    }
}

impl Viewport {
    /// Frames every node of `snapshot` in a `width` × `height` screen area.
    ///
    /// `padding` is the fraction of the screen left empty around the
    /// content. Zoom is clamped to [`MIN_ZOOM`, `MAX_ZOOM`]. An empty graph
    /// gets the default viewport.
    #[must_use]
    pub fn fit(snapshot: &GraphSnapshot, width: f64, height: f64, padding: f64) -> Self {
        let Some(bounds) = Rect::around(snapshot) else {
            return Self::default();
        };
        let usable = (1.0 - 2.0 * padding.clamp(0.0, 0.45)).max(f64::EPSILON);
        let zoom = (width * usable / bounds.width)
            .min(height * usable / bounds.height)
            .clamp(MIN_ZOOM, MAX_ZOOM);
        let center = bounds.center();
        Self {
            x: width / 2.0 - center.x * zoom,
            y: height / 2.0 - center.y * zoom,
            zoom,
        }
    }

    /// Converts a screen point (relative to the canvas element) to canvas
    /// coordinates.
    #[must_use]
    pub fn to_canvas(&self, screen: Position) -> Position {
        Position::new((screen.x - self.x) / self.zoom, (screen.y - self.y) / self.zoom)
    }

    /// Converts a canvas point to screen coordinates.
    #[must_use]
    pub fn to_screen(&self, canvas: Position) -> Position {
        Position::new(canvas.x * self.zoom + self.x, canvas.y * self.zoom + self.y)
    }
}

/// A node as drawn on the minimap.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapNode {
    pub node_id: NodeId,
    pub rect: Rect,
    /// CSS fill color.
    pub color: &'static str,
}

/// Projects a snapshot onto the minimap, colored by kind.
#[must_use]
pub fn minimap(snapshot: &GraphSnapshot) -> Vec<MinimapNode> {
    snapshot
        .nodes
        .iter()
        .map(|node| MinimapNode {
            node_id: node.id.clone(),
            rect: Rect {
                x: node.position.x,
                y: node.position.y,
                width: NODE_WIDTH,
                height: NODE_HEIGHT,
            },
            color: registry::describe(node.kind()).minimap_color.hex(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{ConnectionPolicy, FlowGraph};
    use crate::node::NodeKind;

    #[test]
    fn empty_graph_gets_default_viewport() {
        let snapshot = FlowGraph::new().snapshot();
        assert_eq!(Viewport::fit(&snapshot, 800.0, 600.0, 0.1), Viewport::default());
    }

    #[test]
    fn fit_centers_content() {
        let snapshot = FlowGraph::seeded(ConnectionPolicy::default()).snapshot();
        let viewport = Viewport::fit(&snapshot, 800.0, 600.0, 0.1);

        let bounds = Rect::around(&snapshot).expect("bounds");
        assert_eq!(bounds.height, 360.0);
        let center = viewport.to_screen(bounds.center());
        assert!((center.x - 400.0).abs() < 1e-9);
        assert!((center.y - 300.0).abs() < 1e-9);
        assert!(viewport.zoom >= MIN_ZOOM && viewport.zoom <= MAX_ZOOM);
    }

    #[test]
    fn fit_clamps_zoom() {
        let mut graph = FlowGraph::new();
        graph.add_node(NodeKind::Agent, Position::new(0.0, 0.0), None);
        let viewport = Viewport::fit(&graph.snapshot(), 4000.0, 4000.0, 0.0);
        assert_eq!(viewport.zoom, MAX_ZOOM);
    }

    #[test]
    fn projection_roundtrips() {
        let viewport = Viewport {
            x: 40.0,
            y: -20.0,
            zoom: 2.0,
        };
        let canvas = viewport.to_canvas(Position::new(140.0, 80.0));
        assert_eq!(canvas, Position::new(50.0, 50.0));
        assert_eq!(viewport.to_screen(canvas), Position::new(140.0, 80.0));
    }

    #[test]
    fn minimap_colors_by_kind() {
        let snapshot = FlowGraph::seeded(ConnectionPolicy::default()).snapshot();
        let colors: Vec<_> = minimap(&snapshot).iter().map(|n| n.color).collect();
        assert_eq!(colors, vec!["#f59e0b", "#667eea", "#999999"]);
    }
}
