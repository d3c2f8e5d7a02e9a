//! Capabilities offered by the greeter server

mod greet;
mod info;

use greeter_core::{CapabilityRegistry, Result};

pub use greet::GREET;
pub use info::{resolver, INFO_URI};

/// Implementation name reported during initialize
pub const SERVER_NAME: &str = "greeter";

/// Build the registry: one tool, one prompt, one resource
pub fn build_registry() -> Result<CapabilityRegistry> {
    let mut registry = CapabilityRegistry::new();

    registry.register_tool(greet::tool_spec(), greet::say_hi)?;
    registry.register_prompt(greet::prompt_spec(), greet::prompt_hi)?;

    let resolver = info::resolver();
    registry.register_resource(info::resource_spec(), move |uri| resolver.resolve(uri))?;

    Ok(registry)
}
