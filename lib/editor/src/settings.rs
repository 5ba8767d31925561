//! Editor settings.
//!
//! Every field has a serde default, so a partial settings table (or none at
//! all) deserializes into a working editor configuration. Front ends load
//! this through the `config` crate and hand it to the editor.

use crate::graph::ConnectionPolicy;
use crate::node::Position;
use serde::{Deserialize, Serialize};

/// Settings for one editor instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditorSettings {
    /// Grid snapping for node positions.
    #[serde(default)]
    pub grid: GridSnap,

    /// Offset added to palette drops so the node lands centered on the pointer.
    #[serde(default = "default_drop_offset")]
    pub drop_offset: Position,

    /// Which connections the graph store accepts.
    #[serde(default)]
    pub connections: ConnectionPolicy,

    /// Canvas background pattern.
    #[serde(default)]
    pub background: BackgroundGrid,

    /// Padding around content when fitting the viewport, as a fraction of
    /// the viewport size.
    #[serde(default = "default_fit_view_padding")]
    pub fit_view_padding: f64,

    /// Slots used when placing nodes by clicking a palette entry.
    #[serde(default)]
    pub layout: LayoutGrid,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            grid: GridSnap::default(),
            drop_offset: default_drop_offset(),
            connections: ConnectionPolicy::default(),
            background: BackgroundGrid::default(),
            fit_view_padding: default_fit_view_padding(),
            layout: LayoutGrid::default(),
        }
    }
}

fn default_drop_offset() -> Position {
    Position::new(-300.0, -50.0)
}

fn default_fit_view_padding() -> f64 {
    0.1
}

/// Grid snapping for node positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSnap {
    #[serde(default = "default_snap_enabled")]
    pub enabled: bool,
    /// Grid cell size in canvas units.
    #[serde(default = "default_snap_step")]
    pub step: f64,
}

fn default_snap_enabled() -> bool {
    true
}

fn default_snap_step() -> f64 {
    15.0
}

impl Default for GridSnap {
    fn default() -> Self {
        Self {
            enabled: default_snap_enabled(),
            step: default_snap_step(),
        }
    }
}

impl GridSnap {
    /// Applies the snap to a position.
    #[must_use]
    pub fn apply(&self, position: Position) -> Position {
        if self.enabled {
            position.snapped(self.step)
        } else {
            position
        }
    }
}

/// Background pattern drawn behind the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundVariant {
    #[default]
    Dots,
    Lines,
    Cross,
}

/// Canvas background description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundGrid {
    #[serde(default)]
    pub variant: BackgroundVariant,
    /// Distance between pattern marks.
    #[serde(default = "default_background_gap")]
    pub gap: f64,
    /// Size of each mark.
    #[serde(default = "default_background_size")]
    pub size: f64,
}

fn default_background_gap() -> f64 {
    12.0
}

fn default_background_size() -> f64 {
    1.0
}

impl Default for BackgroundGrid {
    fn default() -> Self {
        Self {
            variant: BackgroundVariant::default(),
            gap: default_background_gap(),
            size: default_background_size(),
        }
    }
}

/// Default layout grid for click-to-place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayoutGrid {
    #[serde(default = "default_layout_origin")]
    pub origin: Position,
    #[serde(default = "default_layout_column_spacing")]
    pub column_spacing: f64,
    #[serde(default = "default_layout_row_spacing")]
    pub row_spacing: f64,
    #[serde(default = "default_layout_columns")]
    pub columns: usize,
}

fn default_layout_origin() -> Position {
    Position::new(80.0, 80.0)
}

fn default_layout_column_spacing() -> f64 {
    200.0
}

fn default_layout_row_spacing() -> f64 {
    120.0
}

fn default_layout_columns() -> usize {
    3
}

impl Default for LayoutGrid {
    fn default() -> Self {
        Self {
            origin: default_layout_origin(),
            column_spacing: default_layout_column_spacing(),
            row_spacing: default_layout_row_spacing(),
            columns: default_layout_columns(),
        }
    }
}

impl LayoutGrid {
    /// Returns the position of the `index`th slot, filling rows left to right.
    #[must_use]
    pub fn slot(&self, index: usize) -> Position {
        let columns = self.columns.max(1);
        let col = (index % columns) as f64;
        let row = (index / columns) as f64;
        self.origin
            .offset(col * self.column_spacing, row * self.row_spacing)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_have_correct_defaults() {
        let settings = EditorSettings::default();
        assert!(settings.grid.enabled);
        assert_eq!(settings.grid.step, 15.0);
        assert_eq!(settings.drop_offset, Position::new(-300.0, -50.0));
        assert_eq!(settings.connections, ConnectionPolicy::default());
        assert_eq!(settings.background.variant, BackgroundVariant::Dots);
        assert_eq!(settings.background.gap, 12.0);
        assert_eq!(settings.background.size, 1.0);
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let json = r#"{"grid": {"enabled": false}, "connections": {"allow_cycles": false}}"#;
        let settings: EditorSettings = serde_json::from_str(json).expect("parse");
        assert!(!settings.grid.enabled);
        assert_eq!(settings.grid.step, 15.0);
        assert!(settings.connections.allow_parallel);
        assert!(!settings.connections.allow_cycles);
        assert_eq!(settings.layout, LayoutGrid::default());
        assert_eq!(settings.drop_offset, Position::new(-300.0, -50.0));
    }

    #[test]
    fn disabled_snap_leaves_position() {
        let snap = GridSnap {
            enabled: false,
            step: 15.0,
        };
        assert_eq!(snap.apply(Position::new(7.0, 8.0)), Position::new(7.0, 8.0));
    }

    #[test]
    fn layout_slots_wrap_after_three_columns() {
        let layout = LayoutGrid::default();
        assert_eq!(layout.slot(0), Position::new(80.0, 80.0));
        assert_eq!(layout.slot(2), Position::new(480.0, 80.0));
        assert_eq!(layout.slot(3), Position::new(80.0, 200.0));
    }
}
