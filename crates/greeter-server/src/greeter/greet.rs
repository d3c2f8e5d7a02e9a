//! The `greet` tool and prompt

use serde::Deserialize;
use serde_json::{json, Value};

use greeter_core::{
    CapabilityError, PromptArgument, PromptArguments, PromptMessage, PromptOutput, PromptSpec,
    Result, ToolOutput, ToolSpec,
};

pub const GREET: &str = "greet";

/// Arguments accepted by the greet tool
#[derive(Debug, Deserialize)]
struct GreetArgs {
    name: String,
}

pub fn tool_spec() -> ToolSpec {
    ToolSpec {
        name: GREET.to_string(),
        description: Some("say hi".to_string()),
        input_schema: json!({
            "type": "object",
            "properties": {
                "name": {
                    "type": "string",
                    "description": "the name to say hi to"
                }
            },
            "required": ["name"]
        }),
    }
}

pub fn say_hi(arguments: Value) -> Result<ToolOutput> {
    let args: GreetArgs = serde_json::from_value(arguments)
        .map_err(|e| CapabilityError::InvalidArguments(e.to_string()))?;

    Ok(ToolOutput::text(format!("Hi {}", args.name)))
}

pub fn prompt_spec() -> PromptSpec {
    PromptSpec {
        name: GREET.to_string(),
        description: None,
        arguments: vec![PromptArgument {
            name: "name".to_string(),
            description: Some("the name to say hi to".to_string()),
            required: false,
        }],
    }
}

/// A missing `name` renders as the empty string
pub fn prompt_hi(arguments: &PromptArguments) -> Result<PromptOutput> {
    let name = arguments.get("name").map(String::as_str).unwrap_or_default();

    Ok(PromptOutput {
        description: Some("Code review prompt".to_string()),
        messages: vec![PromptMessage::user(format!("Say hi to {}", name))],
    })
}
