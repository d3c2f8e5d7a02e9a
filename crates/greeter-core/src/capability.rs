//! Capability definitions: what a server offers and what invoking it yields

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;

/// The three kinds of capability a server can offer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityKind {
    Tool,
    Prompt,
    Resource,
}

impl CapabilityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CapabilityKind::Tool => "tool",
            CapabilityKind::Prompt => "prompt",
            CapabilityKind::Resource => "resource",
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content block returned by tools and prompts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    Text { text: String },
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text { text } => Some(text),
        }
    }
}

/// Output of a tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolOutput {
    pub content: Vec<Content>,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
        }
    }
}

/// Speaker of a prompt message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A single message produced by a prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: Role,
    pub content: Content,
}

impl PromptMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: Content::text(text),
        }
    }
}

/// Output of a prompt get
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub messages: Vec<PromptMessage>,
}

/// Contents of a resolved resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    pub uri: String,
    pub mime_type: String,
    pub text: String,
}

/// Prompt arguments are a free-form string map
pub type PromptArguments = HashMap<String, String>;

pub type ToolHandler = Arc<dyn Fn(Value) -> Result<ToolOutput> + Send + Sync>;
pub type PromptHandler = Arc<dyn Fn(&PromptArguments) -> Result<PromptOutput> + Send + Sync>;
pub type ResourceHandler = Arc<dyn Fn(&str) -> Result<ResourceContents> + Send + Sync>;

/// Tool metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub input_schema: Value,
}

/// A declared prompt argument
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptArgument {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
}

/// Prompt metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSpec {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<PromptArgument>,
}

/// Resource metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSpec {
    pub uri: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub mime_type: String,
}

/// A named unit of functionality with its handler
#[derive(Clone)]
pub enum Capability {
    Tool { spec: ToolSpec, handler: ToolHandler },
    Prompt { spec: PromptSpec, handler: PromptHandler },
    Resource { spec: ResourceSpec, handler: ResourceHandler },
}

impl Capability {
    pub fn tool<F>(spec: ToolSpec, handler: F) -> Self
    where
        F: Fn(Value) -> Result<ToolOutput> + Send + Sync + 'static,
    {
        Capability::Tool {
            spec,
            handler: Arc::new(handler),
        }
    }

    pub fn prompt<F>(spec: PromptSpec, handler: F) -> Self
    where
        F: Fn(&PromptArguments) -> Result<PromptOutput> + Send + Sync + 'static,
    {
        Capability::Prompt {
            spec,
            handler: Arc::new(handler),
        }
    }

    pub fn resource<F>(spec: ResourceSpec, handler: F) -> Self
    where
        F: Fn(&str) -> Result<ResourceContents> + Send + Sync + 'static,
    {
        Capability::Resource {
            spec,
            handler: Arc::new(handler),
        }
    }

    pub fn kind(&self) -> CapabilityKind {
        match self {
            Capability::Tool { .. } => CapabilityKind::Tool,
            Capability::Prompt { .. } => CapabilityKind::Prompt,
            Capability::Resource { .. } => CapabilityKind::Resource,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Capability::Tool { spec, .. } => &spec.name,
            Capability::Prompt { spec, .. } => &spec.name,
            Capability::Resource { spec, .. } => &spec.name,
        }
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("kind", &self.kind())
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

/// Output of a generic invocation, tagged by kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CapabilityOutput {
    Tool(ToolOutput),
    Prompt(PromptOutput),
    Resource(ResourceContents),
}
