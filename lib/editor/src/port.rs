//! Port system for flow nodes.
//!
//! Ports are the anchor points where connections attach. Every kind has an
//! implicit target port on top (`in`) and an implicit source port on the
//! bottom (`out`). Condition nodes replace the implicit source with two named
//! branch ports, `true` (bottom) and `false` (right), and add a second target
//! port on the left.
//!
//! Implicit ports are omitted from persisted connections; named ports are
//! written by name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies a port on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortId {
    /// Implicit target port.
    In,
    /// Implicit source port.
    Out,
    /// Secondary target port of condition nodes.
    Left,
    /// Branch taken when a condition holds.
    True,
    /// Branch taken when a condition does not hold.
    False,
}

impl PortId {
    const ALL: [PortId; 5] = [Self::In, Self::Out, Self::Left, Self::True, Self::False];

    /// Returns the port's name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::In => "in",
            Self::Out => "out",
            Self::Left => "left",
            Self::True => "true",
            Self::False => "false",
        }
    }

    /// Looks up a port by name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|port| port.as_str() == name)
    }

    /// Returns true for the ports that are left out of persisted connections.
    #[must_use]
    pub const fn is_implicit(&self) -> bool {
        matches!(self, Self::In | Self::Out)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a connection starts or ends at a port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortDirection {
    Source,
    Target,
}

/// A port on a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Port {
    pub id: PortId,
    pub direction: PortDirection,
}

impl Port {
    /// Creates a source port.
    #[must_use]
    pub const fn source(id: PortId) -> Self {
        Self {
            id,
            direction: PortDirection::Source,
        }
    }

    /// Creates a target port.
    #[must_use]
    pub const fn target(id: PortId) -> Self {
        Self {
            id,
            direction: PortDirection::Target,
        }
    }

    /// Returns true if connections may start here.
    #[must_use]
    pub fn is_source(&self) -> bool {
        self.direction == PortDirection::Source
    }

    /// Returns true if connections may end here.
    #[must_use]
    pub fn is_target(&self) -> bool {
        self.direction == PortDirection::Target
    }
}

/// Ports shared by every kind except condition.
pub(crate) static STANDARD_PORTS: [Port; 2] = [
    Port::target(PortId::In),
    Port::source(PortId::Out),
];

/// Condition ports: top and left targets, `true` (bottom) and `false` (right) branches.
pub(crate) static CONDITION_PORTS: [Port; 4] = [
    Port::target(PortId::In),
    Port::target(PortId::Left),
    Port::source(PortId::True),
    Port::source(PortId::False),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_names_roundtrip() {
        for port in PortId::ALL {
            assert_eq!(PortId::from_name(port.as_str()), Some(port));
        }
        assert_eq!(PortId::from_name("maybe"), None);
    }

    #[test]
    fn only_default_ports_are_implicit() {
        assert!(PortId::In.is_implicit());
        assert!(PortId::Out.is_implicit());
        assert!(!PortId::True.is_implicit());
        assert!(!PortId::Left.is_implicit());
    }

    #[test]
    fn condition_branches_are_sources() {
        let sources: Vec<_> = CONDITION_PORTS
            .iter()
            .filter(|p| p.is_source())
            .map(|p| p.id)
            .collect();
        assert_eq!(sources, vec![PortId::True, PortId::False]);
    }

    #[test]
    fn standard_ports_have_one_of_each() {
        assert_eq!(STANDARD_PORTS.iter().filter(|p| p.is_source()).count(), 1);
        assert_eq!(STANDARD_PORTS.iter().filter(|p| p.is_target()).count(), 1);
    }
}
