//! Flow node types and per-kind configuration.
//!
//! Every node has:
//! - A unique ID
//! - A kind from a closed set (trigger, agent, llm, condition, tool, output)
//! - A canvas position
//! - A configuration record whose fields depend on the kind
//!
//! Configuration is a tagged union: each kind owns a typed record whose
//! `Default` is the documented default for that kind. Edits arrive as
//! string values keyed by [`ConfigField`] and are merged field by field.

use crate::error::ConfigError;
use agent_flow_core::NodeId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The kind of a flow node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Entry point that starts the flow.
    Trigger,
    /// An AI agent with its own model and description.
    Agent,
    /// A single model call with a system prompt.
    Llm,
    /// Two-way branch on an expression.
    Condition,
    /// A tool invocation (browser, search, ...).
    Tool,
    /// Terminal node producing the flow's result.
    Output,
}

impl NodeKind {
    /// All kinds, in palette order.
    pub const ALL: [NodeKind; 6] = [
        Self::Trigger,
        Self::Agent,
        Self::Llm,
        Self::Condition,
        Self::Tool,
        Self::Output,
    ];

    /// Returns the wire tag for this kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trigger => "trigger",
            Self::Agent => "agent",
            Self::Llm => "llm",
            Self::Condition => "condition",
            Self::Tool => "tool",
            Self::Output => "output",
        }
    }

    /// Returns the configuration fields this kind recognizes, in form order.
    #[must_use]
    pub const fn config_fields(&self) -> &'static [ConfigField] {
        match self {
            Self::Trigger => &[ConfigField::Label, ConfigField::TriggerType],
            Self::Agent => &[
                ConfigField::Label,
                ConfigField::Description,
                ConfigField::Model,
            ],
            Self::Llm => &[ConfigField::Label, ConfigField::Model, ConfigField::Prompt],
            Self::Condition => &[ConfigField::Label, ConfigField::Condition],
            Self::Tool => &[
                ConfigField::Label,
                ConfigField::ToolType,
                ConfigField::ToolName,
            ],
            Self::Output => &[ConfigField::Label, ConfigField::OutputType],
        }
    }

    /// Returns true if this kind recognizes the given field.
    #[must_use]
    pub fn recognizes(&self, field: ConfigField) -> bool {
        self.config_fields().contains(&field)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownKind { tag: s.to_string() })
    }
}

/// A point in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this position offset by `(dx, dy)`.
    #[must_use]
    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Returns the vector from `origin` to this position.
    #[must_use]
    pub fn relative_to(self, origin: Position) -> Self {
        Self::new(self.x - origin.x, self.y - origin.y)
    }

    /// Rounds both coordinates to the nearest multiple of `step`.
    ///
    /// A non-positive step leaves the position unchanged.
    #[must_use]
    pub fn snapped(self, step: f64) -> Self {
        if step <= 0.0 {
            return self;
        }
        Self::new((self.x / step).round() * step, (self.y / step).round() * step)
    }
}

/// A configuration field, identified on the wire by its camelCase key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfigField {
    Label,
    Description,
    Model,
    Prompt,
    TriggerType,
    Condition,
    ToolType,
    ToolName,
    OutputType,
}

impl ConfigField {
    const ALL: [ConfigField; 9] = [
        Self::Label,
        Self::Description,
        Self::Model,
        Self::Prompt,
        Self::TriggerType,
        Self::Condition,
        Self::ToolType,
        Self::ToolName,
        Self::OutputType,
    ];

    /// Returns the document key for this field.
    #[must_use]
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Label => "label",
            Self::Description => "description",
            Self::Model => "model",
            Self::Prompt => "prompt",
            Self::TriggerType => "triggerType",
            Self::Condition => "condition",
            Self::ToolType => "toolType",
            Self::ToolName => "toolName",
            Self::OutputType => "outputType",
        }
    }

    /// Looks up a field by its document key.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.key() == key)
    }
}

/// What starts a flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriggerType {
    #[default]
    UserMessage,
    Schedule,
    Webhook,
}

impl TriggerType {
    /// All trigger types, in the order the inspector lists them.
    pub const ALL: [TriggerType; 3] = [Self::UserMessage, Self::Schedule, Self::Webhook];

    /// Returns the document value for this trigger type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UserMessage => "user-message",
            Self::Schedule => "schedule",
            Self::Webhook => "webhook",
        }
    }
}

impl FromStr for TriggerType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: ConfigField::TriggerType,
                value: s.to_string(),
            })
    }
}

/// Which tool a tool node invokes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    #[default]
    Browser,
    Search,
    Fetch,
    Calculator,
    Code,
}

impl ToolType {
    /// All tool types, in the order the inspector lists them.
    pub const ALL: [ToolType; 5] = [
        Self::Browser,
        Self::Search,
        Self::Fetch,
        Self::Calculator,
        Self::Code,
    ];

    /// Returns the document value for this tool type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Browser => "browser",
            Self::Search => "search",
            Self::Fetch => "fetch",
            Self::Calculator => "calculator",
            Self::Code => "code",
        }
    }
}

impl FromStr for ToolType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| ConfigError::InvalidValue {
                field: ConfigField::ToolType,
                value: s.to_string(),
            })
    }
}

/// Default model for agent and llm nodes.
pub const DEFAULT_MODEL: &str = "gpt-4";

/// Configuration for trigger nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerConfig {
    pub label: String,
    pub trigger_type: TriggerType,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            label: "Message Trigger".to_string(),
            trigger_type: TriggerType::default(),
        }
    }
}

/// Configuration for agent nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentConfig {
    pub label: String,
    pub description: String,
    /// Free text; the inspector offers a curated list.
    pub model: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            label: "Agent".to_string(),
            description: String::new(),
            model: DEFAULT_MODEL.to_string(),
        }
    }
}

/// Configuration for llm nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub label: String,
    pub model: String,
    /// System prompt text.
    pub prompt: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            label: "LLM".to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt: String::new(),
        }
    }
}

/// Configuration for condition nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionConfig {
    pub label: String,
    /// Expression text; not evaluated by the editor.
    pub condition: String,
}

impl Default for ConditionConfig {
    fn default() -> Self {
        Self {
            label: "Condition".to_string(),
            condition: String::new(),
        }
    }
}

/// Configuration for tool nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolConfig {
    pub label: String,
    pub tool_type: ToolType,
    pub tool_name: String,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            label: "Tool".to_string(),
            tool_type: ToolType::default(),
            tool_name: String::new(),
        }
    }
}

/// Configuration for output nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    pub label: String,
    pub output_type: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            label: "Output".to_string(),
            output_type: "text".to_string(),
        }
    }
}

/// Configuration for a node, varying by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeConfig {
    Trigger(TriggerConfig),
    Agent(AgentConfig),
    Llm(LlmConfig),
    Condition(ConditionConfig),
    Tool(ToolConfig),
    Output(OutputConfig),
}

impl NodeConfig {
    /// Returns the default configuration for a kind.
    #[must_use]
    pub fn default_for(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Trigger => Self::Trigger(TriggerConfig::default()),
            NodeKind::Agent => Self::Agent(AgentConfig::default()),
            NodeKind::Llm => Self::Llm(LlmConfig::default()),
            NodeKind::Condition => Self::Condition(ConditionConfig::default()),
            NodeKind::Tool => Self::Tool(ToolConfig::default()),
            NodeKind::Output => Self::Output(OutputConfig::default()),
        }
    }

    /// Returns the kind this configuration belongs to.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Trigger(_) => NodeKind::Trigger,
            Self::Agent(_) => NodeKind::Agent,
            Self::Llm(_) => NodeKind::Llm,
            Self::Condition(_) => NodeKind::Condition,
            Self::Tool(_) => NodeKind::Tool,
            Self::Output(_) => NodeKind::Output,
        }
    }

    /// Returns the node's display label.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Trigger(c) => &c.label,
            Self::Agent(c) => &c.label,
            Self::Llm(c) => &c.label,
            Self::Condition(c) => &c.label,
            Self::Tool(c) => &c.label,
            Self::Output(c) => &c.label,
        }
    }

    /// Returns the current value of a field, or `None` if this kind does not
    /// recognize it.
    #[must_use]
    pub fn get(&self, field: ConfigField) -> Option<String> {
        let value = match (self, field) {
            (_, ConfigField::Label) => self.label(),
            (Self::Trigger(c), ConfigField::TriggerType) => c.trigger_type.as_str(),
            (Self::Agent(c), ConfigField::Description) => c.description.as_str(),
            (Self::Agent(c), ConfigField::Model) => c.model.as_str(),
            (Self::Llm(c), ConfigField::Model) => c.model.as_str(),
            (Self::Llm(c), ConfigField::Prompt) => c.prompt.as_str(),
            (Self::Condition(c), ConfigField::Condition) => c.condition.as_str(),
            (Self::Tool(c), ConfigField::ToolType) => c.tool_type.as_str(),
            (Self::Tool(c), ConfigField::ToolName) => c.tool_name.as_str(),
            (Self::Output(c), ConfigField::OutputType) => c.output_type.as_str(),
            _ => return None,
        };
        Some(value.to_string())
    }

    /// Sets a single field from its string value.
    ///
    /// A blank value for an enumerated field resets it to its default.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind does not recognize the field, or if the
    /// value is not one of an enumerated field's options. The configuration
    /// is left unchanged on error.
    pub fn set(&mut self, field: ConfigField, value: &str) -> Result<(), ConfigError> {
        let kind = self.kind();
        match (self, field) {
            (Self::Trigger(c), ConfigField::Label) => c.label = value.to_string(),
            (Self::Agent(c), ConfigField::Label) => c.label = value.to_string(),
            (Self::Llm(c), ConfigField::Label) => c.label = value.to_string(),
            (Self::Condition(c), ConfigField::Label) => c.label = value.to_string(),
            (Self::Tool(c), ConfigField::Label) => c.label = value.to_string(),
            (Self::Output(c), ConfigField::Label) => c.label = value.to_string(),
            (Self::Trigger(c), ConfigField::TriggerType) => {
                c.trigger_type = if value.trim().is_empty() {
                    TriggerType::default()
                } else {
                    value.parse()?
                };
            }
            (Self::Agent(c), ConfigField::Description) => c.description = value.to_string(),
            (Self::Agent(c), ConfigField::Model) => c.model = value.to_string(),
            (Self::Llm(c), ConfigField::Model) => c.model = value.to_string(),
            (Self::Llm(c), ConfigField::Prompt) => c.prompt = value.to_string(),
            (Self::Condition(c), ConfigField::Condition) => c.condition = value.to_string(),
            (Self::Tool(c), ConfigField::ToolType) => {
                c.tool_type = if value.trim().is_empty() {
                    ToolType::default()
                } else {
                    value.parse()?
                };
            }
            (Self::Tool(c), ConfigField::ToolName) => c.tool_name = value.to_string(),
            (Self::Output(c), ConfigField::OutputType) => c.output_type = value.to_string(),
            _ => return Err(ConfigError::UnrecognizedField { kind, field }),
        }
        Ok(())
    }

    /// Returns every recognized field as `key -> value`, for persistence.
    #[must_use]
    pub fn entries(&self) -> BTreeMap<String, String> {
        self.kind()
            .config_fields()
            .iter()
            .filter_map(|field| Some((field.key().to_string(), self.get(*field)?)))
            .collect()
    }
}

/// A partial configuration: field values to merge into a node's config.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigPatch {
    values: BTreeMap<ConfigField, String>,
}

impl ConfigPatch {
    /// Creates an empty patch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a patch that sets a single field.
    #[must_use]
    pub fn single(field: ConfigField, value: impl Into<String>) -> Self {
        Self::new().with(field, value)
    }

    /// Adds a field value to the patch.
    #[must_use]
    pub fn with(mut self, field: ConfigField, value: impl Into<String>) -> Self {
        self.values.insert(field, value.into());
        self
    }

    /// Iterates over the patch's field values.
    pub fn iter(&self) -> impl Iterator<Item = (ConfigField, &str)> {
        self.values.iter().map(|(field, value)| (*field, value.as_str()))
    }
}

/// A flow node.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// Unique identifier for this node.
    pub id: NodeId,
    /// Canvas position of the node's top-left corner.
    pub position: Position,
    /// Node configuration (determines kind).
    pub config: NodeConfig,
}

impl Node {
    /// Creates a new node of the given kind with default configuration.
    #[must_use]
    pub fn new(kind: NodeKind, position: Position) -> Self {
        Self::with_config(NodeId::new(), position, NodeConfig::default_for(kind))
    }

    /// Creates a node with a specific ID and configuration.
    #[must_use]
    pub fn with_config(id: NodeId, position: Position, config: NodeConfig) -> Self {
        Self {
            id,
            position,
            config,
        }
    }

    /// Returns the kind of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.config.kind()
    }

    /// Returns the node's display label.
    #[must_use]
    pub fn label(&self) -> &str {
        self.config.label()
    }
}
