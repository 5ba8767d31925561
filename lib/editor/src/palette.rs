//! Node palette.
//!
//! A static catalog of placeable nodes grouped by category. Entries either
//! start a drag (tagging it with their kind and label) or are placed
//! directly by the editor at the next layout slot.

use crate::canvas::DragTransfer;
use crate::node::NodeKind;

/// A placeable node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteEntry {
    pub kind: NodeKind,
    /// Label given to the placed node.
    pub label: &'static str,
    pub glyph: &'static str,
}

impl PaletteEntry {
    const fn new(kind: NodeKind, label: &'static str, glyph: &'static str) -> Self {
        Self { kind, label, glyph }
    }

    /// Tags a drag gesture with this entry's identity.
    #[must_use]
    pub fn start_drag(&self) -> DragTransfer {
        DragTransfer::tagged(self.kind, self.label)
    }
}

/// A titled group of palette entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaletteSection {
    pub title: &'static str,
    pub entries: &'static [PaletteEntry],
}

const TRIGGERS: &[PaletteEntry] = &[
    PaletteEntry::new(NodeKind::Trigger, "Message Trigger", "⚡"),
    PaletteEntry::new(NodeKind::Trigger, "Scheduled Task", "⏰"),
    PaletteEntry::new(NodeKind::Trigger, "Webhook", "🔗"),
];

const AGENTS: &[PaletteEntry] = &[
    PaletteEntry::new(NodeKind::Agent, "AI Agent", "🤖"),
    PaletteEntry::new(NodeKind::Llm, "LLM", "🧠"),
];

const FLOW_CONTROL: &[PaletteEntry] = &[PaletteEntry::new(NodeKind::Condition, "Condition", "🔀")];

const TOOLS: &[PaletteEntry] = &[
    PaletteEntry::new(NodeKind::Tool, "Browser", "🌐"),
    PaletteEntry::new(NodeKind::Tool, "Web Search", "🔍"),
    PaletteEntry::new(NodeKind::Tool, "Calculator", "🧮"),
    PaletteEntry::new(NodeKind::Tool, "Code Execution", "💻"),
];

const OUTPUTS: &[PaletteEntry] = &[PaletteEntry::new(NodeKind::Output, "Return Result", "📤")];

static SECTIONS: [PaletteSection; 5] = [
    PaletteSection {
        title: "Triggers",
        entries: TRIGGERS,
    },
    PaletteSection {
        title: "Agents",
        entries: AGENTS,
    },
    PaletteSection {
        title: "Flow Control",
        entries: FLOW_CONTROL,
    },
    PaletteSection {
        title: "Tools",
        entries: TOOLS,
    },
    PaletteSection {
        title: "Output",
        entries: OUTPUTS,
    },
];

/// Returns the palette sections in display order.
#[must_use]
pub fn sections() -> &'static [PaletteSection] {
    &SECTIONS
}

/// Returns every entry in display order.
pub fn entries() -> impl Iterator<Item = &'static PaletteEntry> {
    SECTIONS.iter().flat_map(|section| section.entries.iter())
}

/// Finds an entry by its label.
#[must_use]
pub fn find(label: &str) -> Option<&'static PaletteEntry> {
    entries().find(|entry| entry.label == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sections_in_display_order() {
        let titles: Vec<_> = sections().iter().map(|s| s.title).collect();
        assert_eq!(
            titles,
            vec!["Triggers", "Agents", "Flow Control", "Tools", "Output"]
        );
    }

    #[test]
    fn every_kind_is_placeable() {
        for kind in NodeKind::ALL {
            assert!(entries().any(|e| e.kind == kind), "{kind}");
        }
    }

    #[test]
    fn find_by_label() {
        let calculator = find("Calculator").expect("entry");
        assert_eq!(calculator.kind, NodeKind::Tool);
        assert!(find("Teleporter").is_none());
    }

    #[test]
    fn drag_carries_kind_and_label() {
        let transfer = find("Web Search").expect("entry").start_drag();
        let payload = transfer.payload().expect("tagged");
        assert_eq!(payload.kind, NodeKind::Tool);
        assert_eq!(payload.label, "Web Search");
    }
}
