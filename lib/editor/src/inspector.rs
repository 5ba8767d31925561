//! Property inspector.
//!
//! Builds the editable form for the selected node and writes edits straight
//! back into the graph store. There is no apply step: every edit is a
//! single-field config merge.

use crate::graph::FlowGraph;
use crate::node::{ConfigField, ConfigPatch, NodeKind};
use crate::registry;
use agent_flow_core::NodeId;

/// One choice of a select input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectOption {
    pub value: &'static str,
    pub label: &'static str,
}

const fn option(value: &'static str, label: &'static str) -> SelectOption {
    SelectOption { value, label }
}

/// Curated model list offered for agent and llm nodes.
pub const MODEL_OPTIONS: [SelectOption; 5] = [
    option("gpt-4", "GPT-4"),
    option("gpt-3.5-turbo", "GPT-3.5 Turbo"),
    option("claude-3-opus", "Claude 3 Opus"),
    option("claude-3-sonnet", "Claude 3 Sonnet"),
    option("glm-4", "GLM-4"),
];

pub const TRIGGER_TYPE_OPTIONS: [SelectOption; 3] = [
    option("user-message", "User message"),
    option("schedule", "Scheduled task"),
    option("webhook", "Webhook"),
];

pub const TOOL_TYPE_OPTIONS: [SelectOption; 5] = [
    option("browser", "Browser"),
    option("search", "Web search"),
    option("fetch", "Fetch page"),
    option("calculator", "Calculator"),
    option("code", "Code execution"),
];

/// The widget used to edit a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldInput {
    Text,
    TextArea { rows: u8 },
    Select { options: &'static [SelectOption] },
}

#[derive(Debug, Clone, Copy)]
struct FieldSpec {
    field: ConfigField,
    label: &'static str,
    input: FieldInput,
    placeholder: Option<&'static str>,
}

const fn spec(field: ConfigField, label: &'static str, input: FieldInput) -> FieldSpec {
    FieldSpec {
        field,
        label,
        input,
        placeholder: None,
    }
}

const NAME: FieldSpec = spec(ConfigField::Label, "Node name", FieldInput::Text);
const MODEL: FieldSpec = spec(
    ConfigField::Model,
    "Model",
    FieldInput::Select {
        options: &MODEL_OPTIONS,
    },
);

const TRIGGER_FIELDS: &[FieldSpec] = &[
    NAME,
    spec(
        ConfigField::TriggerType,
        "Trigger type",
        FieldInput::Select {
            options: &TRIGGER_TYPE_OPTIONS,
        },
    ),
];

const AGENT_FIELDS: &[FieldSpec] = &[
    NAME,
    spec(ConfigField::Description, "Description", FieldInput::Text),
    MODEL,
];

const LLM_FIELDS: &[FieldSpec] = &[
    NAME,
    MODEL,
    FieldSpec {
        field: ConfigField::Prompt,
        label: "System prompt",
        input: FieldInput::TextArea { rows: 4 },
        placeholder: Some("Set the system prompt for the model..."),
    },
];

const CONDITION_FIELDS: &[FieldSpec] = &[
    NAME,
    FieldSpec {
        field: ConfigField::Condition,
        label: "Condition expression",
        input: FieldInput::Text,
        placeholder: Some("e.g. input contains 'hello'"),
    },
];

const TOOL_FIELDS: &[FieldSpec] = &[
    NAME,
    spec(
        ConfigField::ToolType,
        "Tool type",
        FieldInput::Select {
            options: &TOOL_TYPE_OPTIONS,
        },
    ),
    spec(ConfigField::ToolName, "Tool name", FieldInput::Text),
];

const OUTPUT_FIELDS: &[FieldSpec] = &[
    NAME,
    spec(ConfigField::OutputType, "Output type", FieldInput::Text),
];

fn field_specs(kind: NodeKind) -> &'static [FieldSpec] {
    match kind {
        NodeKind::Trigger => TRIGGER_FIELDS,
        NodeKind::Agent => AGENT_FIELDS,
        NodeKind::Llm => LLM_FIELDS,
        NodeKind::Condition => CONDITION_FIELDS,
        NodeKind::Tool => TOOL_FIELDS,
        NodeKind::Output => OUTPUT_FIELDS,
    }
}

/// A rendered form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldView {
    pub field: ConfigField,
    pub label: &'static str,
    /// Current value, seeded from the node's config.
    pub value: String,
    pub input: FieldInput,
    pub placeholder: Option<&'static str>,
}

/// The form for one node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeForm {
    pub node_id: NodeId,
    pub kind: NodeKind,
    pub title: &'static str,
    pub glyph: &'static str,
    pub fields: Vec<FieldView>,
}

impl NodeForm {
    /// Returns the view of `field`, if the form has one.
    #[must_use]
    pub fn field(&self, field: ConfigField) -> Option<&FieldView> {
        self.fields.iter().find(|f| f.field == field)
    }
}

/// What the inspector shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InspectorView {
    /// No node selected.
    Empty,
    Node(NodeForm),
}

/// Builds the inspector for the current selection.
///
/// A selection naming a node that no longer exists shows the empty state.
#[must_use]
pub fn inspect(graph: &FlowGraph, selection: Option<&NodeId>) -> InspectorView {
    let Some(node) = selection.and_then(|id| graph.node(id)) else {
        return InspectorView::Empty;
    };
    let kind = node.kind();
    let descriptor = registry::describe(kind);
    let defaults = descriptor.default_config();

    let fields = field_specs(kind)
        .iter()
        .map(|spec| FieldView {
            field: spec.field,
            label: spec.label,
            value: node
                .config
                .get(spec.field)
                .or_else(|| defaults.get(spec.field))
                .unwrap_or_default(),
            input: spec.input,
            placeholder: spec.placeholder,
        })
        .collect();

    InspectorView::Node(NodeForm {
        node_id: node.id.clone(),
        kind,
        title: descriptor.display_name,
        glyph: descriptor.glyph,
        fields,
    })
}

/// Writes a single field edit for the selected node.
///
/// Returns false (and does nothing) when nothing is selected or the
/// selected node is gone.
pub fn apply_edit(
    graph: &mut FlowGraph,
    selection: Option<&NodeId>,
    field: ConfigField,
    value: impl Into<String>,
) -> bool {
    let Some(node_id) = selection else {
        return false;
    };
    graph.update_node_config(node_id, &ConfigPatch::single(field, value))
}
