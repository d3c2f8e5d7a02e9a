//! # greeter-core
//!
//! Capability registration and resource resolution for the greeter MCP server:
//! - Registry of tools, prompts and resources keyed by (kind, name)
//! - `scheme:key` resource resolver with pluggable per-scheme lookups
//! - Protocol-agnostic output types shared with the transport layer

pub mod capability;
pub mod error;
pub mod registry;
pub mod resolver;

pub use capability::{
    Capability, CapabilityKind, CapabilityOutput, Content, PromptArgument, PromptArguments,
    PromptMessage, PromptOutput, PromptSpec, ResourceContents, ResourceSpec, Role, ToolOutput,
    ToolSpec,
};
pub use error::{CapabilityError, Result};
pub use registry::CapabilityRegistry;
pub use resolver::{EmbeddedStore, ResourceResolver, SchemeLookup, StoredResource, EMBEDDED_SCHEME};
