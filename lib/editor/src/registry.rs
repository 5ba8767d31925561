//! Node type registry.
//!
//! Maps each [`NodeKind`] to its rendering and behavior contract: display
//! name, glyph, ports, minimap color and default configuration. The set of
//! kinds is closed, so lookup is total.

use crate::node::{NodeConfig, NodeKind};
use crate::port::{CONDITION_PORTS, Port, PortId, STANDARD_PORTS};

/// Minimap fill color for a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MinimapColor {
    Accent1,
    Accent2,
    Accent3,
    Accent4,
    Neutral,
}

impl MinimapColor {
    /// Returns the CSS color for this slot.
    #[must_use]
    pub const fn hex(&self) -> &'static str {
        match self {
            Self::Accent1 => "#667eea",
            Self::Accent2 => "#f59e0b",
            Self::Accent3 => "#10b981",
            Self::Accent4 => "#ef4444",
            Self::Neutral => "#999999",
        }
    }
}

/// The static description of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeDescriptor {
    pub kind: NodeKind,
    /// Name shown in the inspector header.
    pub display_name: &'static str,
    pub glyph: &'static str,
    pub ports: &'static [Port],
    pub minimap_color: MinimapColor,
}

impl NodeDescriptor {
    /// Returns the default configuration for this kind.
    #[must_use]
    pub fn default_config(&self) -> NodeConfig {
        NodeConfig::default_for(self.kind)
    }

    /// Returns the ports connections may start from.
    pub fn source_ports(&self) -> impl Iterator<Item = &'static Port> {
        self.ports.iter().filter(|p| p.is_source())
    }

    /// Returns the ports connections may end at.
    pub fn target_ports(&self) -> impl Iterator<Item = &'static Port> {
        self.ports.iter().filter(|p| p.is_target())
    }

    /// Returns true if `port` is a source port of this kind.
    #[must_use]
    pub fn has_source_port(&self, port: PortId) -> bool {
        self.source_ports().any(|p| p.id == port)
    }

    /// Returns true if `port` is a target port of this kind.
    #[must_use]
    pub fn has_target_port(&self, port: PortId) -> bool {
        self.target_ports().any(|p| p.id == port)
    }

    /// Returns the source port used when a connection names none.
    ///
    /// Condition nodes have no default; their connections must pick a branch.
    #[must_use]
    pub fn default_source_port(&self) -> Option<PortId> {
        self.has_source_port(PortId::Out).then_some(PortId::Out)
    }

    /// Returns the target port used when a connection names none.
    #[must_use]
    pub fn default_target_port(&self) -> PortId {
        PortId::In
    }
}

static DESCRIPTORS: [NodeDescriptor; 6] = [
    NodeDescriptor {
        kind: NodeKind::Trigger,
        display_name: "Trigger",
        glyph: "⚡",
        ports: &STANDARD_PORTS,
        minimap_color: MinimapColor::Accent2,
    },
    NodeDescriptor {
        kind: NodeKind::Agent,
        display_name: "Agent",
        glyph: "🤖",
        ports: &STANDARD_PORTS,
        minimap_color: MinimapColor::Accent1,
    },
    NodeDescriptor {
        kind: NodeKind::Llm,
        display_name: "LLM",
        glyph: "🧠",
        ports: &STANDARD_PORTS,
        minimap_color: MinimapColor::Neutral,
    },
    NodeDescriptor {
        kind: NodeKind::Condition,
        display_name: "Condition",
        glyph: "🔀",
        ports: &CONDITION_PORTS,
        minimap_color: MinimapColor::Accent3,
    },
    NodeDescriptor {
        kind: NodeKind::Tool,
        display_name: "Tool",
        glyph: "🔧",
        ports: &STANDARD_PORTS,
        minimap_color: MinimapColor::Accent4,
    },
    NodeDescriptor {
        kind: NodeKind::Output,
        display_name: "Output",
        glyph: "📤",
        ports: &STANDARD_PORTS,
        minimap_color: MinimapColor::Neutral,
    },
];

/// Returns the descriptor for a node kind.
#[must_use]
pub fn describe(kind: NodeKind) -> &'static NodeDescriptor {
    let index = match kind {
        NodeKind::Trigger => 0,
        NodeKind::Agent => 1,
        NodeKind::Llm => 2,
        NodeKind::Condition => 3,
        NodeKind::Tool => 4,
        NodeKind::Output => 5,
    };
    &DESCRIPTORS[index]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_has_its_own_descriptor() {
        for kind in NodeKind::ALL {
            assert_eq!(describe(kind).kind, kind);
        }
    }

    #[test]
    fn every_kind_has_top_target_port() {
        for kind in NodeKind::ALL {
            assert!(describe(kind).has_target_port(PortId::In), "{kind}");
        }
    }

    #[test]
    fn condition_requires_named_source_port() {
        let condition = describe(NodeKind::Condition);
        assert_eq!(condition.default_source_port(), None);
        assert!(condition.has_source_port(PortId::True));
        assert!(condition.has_source_port(PortId::False));
        assert!(condition.has_target_port(PortId::Left));
        assert!(!condition.has_source_port(PortId::Out));
    }

    #[test]
    fn standard_kinds_default_to_bottom_port() {
        let agent = describe(NodeKind::Agent);
        assert_eq!(agent.default_source_port(), Some(PortId::Out));
        assert!(!agent.has_source_port(PortId::True));
        assert!(!agent.has_target_port(PortId::Left));
    }

    #[test]
    fn minimap_colors_follow_kind_mapping() {
        assert_eq!(describe(NodeKind::Agent).minimap_color, MinimapColor::Accent1);
        assert_eq!(describe(NodeKind::Trigger).minimap_color, MinimapColor::Accent2);
        assert_eq!(describe(NodeKind::Condition).minimap_color, MinimapColor::Accent3);
        assert_eq!(describe(NodeKind::Tool).minimap_color, MinimapColor::Accent4);
        assert_eq!(describe(NodeKind::Llm).minimap_color, MinimapColor::Neutral);
        assert_eq!(describe(NodeKind::Output).minimap_color, MinimapColor::Neutral);
    }

    #[test]
    fn default_config_matches_kind() {
        assert_eq!(
            describe(NodeKind::Tool).default_config().kind(),
            NodeKind::Tool
        );
    }
}
