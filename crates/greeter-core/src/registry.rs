//! Capability registry keyed by (kind, name)

use indexmap::IndexMap;
use serde_json::Value;
use tracing::{debug, info};

use crate::capability::{
    Capability, CapabilityKind, CapabilityOutput, PromptArguments, PromptOutput, PromptSpec,
    ResourceContents, ResourceHandler, ResourceSpec, ToolOutput, ToolSpec,
};
use crate::error::{CapabilityError, Result};

/// Registry key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CapabilityKey {
    kind: CapabilityKind,
    name: String,
}

impl CapabilityKey {
    fn new(kind: CapabilityKind, name: &str) -> Self {
        Self {
            kind,
            name: name.to_string(),
        }
    }
}

/// Registry of the tools, prompts and resources a server offers
///
/// Populated once at startup, then shared read-only (typically behind an
/// `Arc`) with every transport.
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    entries: IndexMap<CapabilityKey, Capability>,
}

impl CapabilityRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a capability
    ///
    /// Fails with [`CapabilityError::DuplicateName`] if the kind already has
    /// an entry with this name, or with [`CapabilityError::DuplicateUri`] if
    /// a resource is already served at the same URI. The existing entry is kept.
    pub fn register(&mut self, capability: Capability) -> Result<()> {
        let key = CapabilityKey::new(capability.kind(), capability.name());

        if self.entries.contains_key(&key) {
            return Err(CapabilityError::DuplicateName {
                kind: key.kind,
                name: key.name,
            });
        }

        if let Capability::Resource { spec, .. } = &capability {
            if self.find_resource(&spec.uri).is_some() {
                return Err(CapabilityError::DuplicateUri(spec.uri.clone()));
            }
        }

        info!("Registered {} {}", key.kind, key.name);
        self.entries.insert(key, capability);
        Ok(())
    }

    pub fn register_tool<F>(&mut self, spec: ToolSpec, handler: F) -> Result<()>
    where
        F: Fn(Value) -> Result<ToolOutput> + Send + Sync + 'static,
    {
        self.register(Capability::tool(spec, handler))
    }

    pub fn register_prompt<F>(&mut self, spec: PromptSpec, handler: F) -> Result<()>
    where
        F: Fn(&PromptArguments) -> Result<PromptOutput> + Send + Sync + 'static,
    {
        self.register(Capability::prompt(spec, handler))
    }

    pub fn register_resource<F>(&mut self, spec: ResourceSpec, handler: F) -> Result<()>
    where
        F: Fn(&str) -> Result<ResourceContents> + Send + Sync + 'static,
    {
        self.register(Capability::resource(spec, handler))
    }

    /// Look up a capability
    pub fn get(&self, kind: CapabilityKind, name: &str) -> Option<&Capability> {
        self.entries.get(&CapabilityKey::new(kind, name))
    }

    /// Invoke a capability by kind and name
    ///
    /// `args` is the tool argument object, the prompt argument map, or the
    /// resource URI as a JSON string. Handler errors are returned as-is.
    pub fn invoke(&self, kind: CapabilityKind, name: &str, args: Value) -> Result<CapabilityOutput> {
        let capability = self.get(kind, name).ok_or_else(|| CapabilityError::NotFound {
            kind,
            name: name.to_string(),
        })?;

        debug!("Invoking {} {}", kind, name);

        match capability {
            Capability::Tool { handler, .. } => handler(args).map(CapabilityOutput::Tool),
            Capability::Prompt { handler, .. } => {
                let arguments = prompt_arguments(args)?;
                handler(&arguments).map(CapabilityOutput::Prompt)
            }
            Capability::Resource { handler, .. } => {
                let uri = args.as_str().ok_or_else(|| {
                    CapabilityError::InvalidArguments("resource URI must be a string".to_string())
                })?;
                handler(uri).map(CapabilityOutput::Resource)
            }
        }
    }

    /// Call a tool; missing arguments are treated as an empty object
    pub fn call_tool(&self, name: &str, arguments: Option<Value>) -> Result<ToolOutput> {
        let args = arguments.unwrap_or_else(|| Value::Object(serde_json::Map::new()));
        match self.get(CapabilityKind::Tool, name) {
            Some(Capability::Tool { handler, .. }) => handler(args),
            _ => Err(CapabilityError::NotFound {
                kind: CapabilityKind::Tool,
                name: name.to_string(),
            }),
        }
    }

    /// Render a prompt
    pub fn get_prompt(&self, name: &str, arguments: &PromptArguments) -> Result<PromptOutput> {
        match self.get(CapabilityKind::Prompt, name) {
            Some(Capability::Prompt { handler, .. }) => handler(arguments),
            _ => Err(CapabilityError::NotFound {
                kind: CapabilityKind::Prompt,
                name: name.to_string(),
            }),
        }
    }

    /// Read the resource registered at exactly this URI
    pub fn read_resource(&self, uri: &str) -> Result<ResourceContents> {
        match self.find_resource(uri) {
            Some(handler) => handler(uri),
            None => Err(CapabilityError::NotFound {
                kind: CapabilityKind::Resource,
                name: uri.to_string(),
            }),
        }
    }

    fn find_resource(&self, uri: &str) -> Option<&ResourceHandler> {
        self.entries.values().find_map(|capability| match capability {
            Capability::Resource { spec, handler } if spec.uri == uri => Some(handler),
            _ => None,
        })
    }

    /// Registered tools, in registration order
    pub fn tools(&self) -> Vec<&ToolSpec> {
        self.entries
            .values()
            .filter_map(|capability| match capability {
                Capability::Tool { spec, .. } => Some(spec),
                _ => None,
            })
            .collect()
    }

    /// Registered prompts, in registration order
    pub fn prompts(&self) -> Vec<&PromptSpec> {
        self.entries
            .values()
            .filter_map(|capability| match capability {
                Capability::Prompt { spec, .. } => Some(spec),
                _ => None,
            })
            .collect()
    }

    /// Registered resources, in registration order
    pub fn resources(&self) -> Vec<&ResourceSpec> {
        self.entries
            .values()
            .filter_map(|capability| match capability {
                Capability::Resource { spec, .. } => Some(spec),
                _ => None,
            })
            .collect()
    }

    /// Whether any capability of `kind` is registered
    pub fn has_kind(&self, kind: CapabilityKind) -> bool {
        self.entries.keys().any(|key| key.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn prompt_arguments(args: Value) -> Result<PromptArguments> {
    match args {
        Value::Null => Ok(PromptArguments::new()),
        other => serde_json::from_value(other)
            .map_err(|e| CapabilityError::InvalidArguments(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::PromptMessage;
    use serde_json::json;

    fn echo_tool(name: &str) -> ToolSpec {
        ToolSpec {
            name: name.to_string(),
            description: None,
            input_schema: json!({"type": "object"}),
        }
    }

    fn registry() -> CapabilityRegistry {
        let mut registry = CapabilityRegistry::new();
        registry
            .register_tool(echo_tool("echo"), |args| Ok(ToolOutput::text(args.to_string())))
            .unwrap();
        registry
            .register_tool(echo_tool("fail"), |_| {
                Err(CapabilityError::HandlerFailed("boom".to_string()))
            })
            .unwrap();
        registry
            .register_prompt(
                PromptSpec {
                    name: "echo".to_string(),
                    description: None,
                    arguments: Vec::new(),
                },
                |args| {
                    Ok(PromptOutput {
                        description: None,
                        messages: vec![PromptMessage::user(
                            args.get("text").cloned().unwrap_or_default(),
                        )],
                    })
                },
            )
            .unwrap();
        registry
            .register_resource(
                ResourceSpec {
                    uri: "test:doc".to_string(),
                    name: "doc".to_string(),
                    description: None,
                    mime_type: "text/plain".to_string(),
                },
                |uri| {
                    Ok(ResourceContents {
                        uri: uri.to_string(),
                        mime_type: "text/plain".to_string(),
                        text: "doc".to_string(),
                    })
                },
            )
            .unwrap();
        registry
    }

    #[test]
    fn test_invoke_returns_handler_output() {
        let registry = registry();

        let output = registry
            .invoke(CapabilityKind::Tool, "echo", json!({"a": 1}))
            .unwrap();
        assert_eq!(output, CapabilityOutput::Tool(ToolOutput::text(r#"{"a":1}"#)));

        let output = registry
            .invoke(CapabilityKind::Prompt, "echo", json!({"text": "hey"}))
            .unwrap();
        match output {
            CapabilityOutput::Prompt(prompt) => {
                assert_eq!(prompt.messages, vec![PromptMessage::user("hey")])
            }
            other => panic!("unexpected output: {other:?}"),
        }

        let output = registry
            .invoke(CapabilityKind::Resource, "doc", json!("test:doc"))
            .unwrap();
        match output {
            CapabilityOutput::Resource(contents) => assert_eq!(contents.text, "doc"),
            other => panic!("unexpected output: {other:?}"),
        }
    }

    #[test]
    fn test_invoke_unregistered() {
        let registry = registry();

        let err = registry
            .invoke(CapabilityKind::Tool, "missing", json!({}))
            .unwrap_err();
        assert_eq!(
            err,
            CapabilityError::NotFound {
                kind: CapabilityKind::Tool,
                name: "missing".to_string(),
            }
        );

        // Names are scoped by kind
        let err = registry
            .invoke(CapabilityKind::Resource, "echo", json!("test:doc"))
            .unwrap_err();
        assert!(matches!(err, CapabilityError::NotFound { .. }));
    }

    #[test]
    fn test_handler_error_is_propagated_unchanged() {
        let err = registry()
            .invoke(CapabilityKind::Tool, "fail", json!({}))
            .unwrap_err();
        assert_eq!(err, CapabilityError::HandlerFailed("boom".to_string()));
    }

    #[test]
    fn test_duplicate_registration_keeps_original() {
        let mut registry = registry();

        let err = registry
            .register_tool(echo_tool("echo"), |_| Ok(ToolOutput::text("replaced")))
            .unwrap_err();
        assert_eq!(
            err,
            CapabilityError::DuplicateName {
                kind: CapabilityKind::Tool,
                name: "echo".to_string(),
            }
        );

        let output = registry.call_tool("echo", Some(json!("x"))).unwrap();
        assert_eq!(output, ToolOutput::text(r#""x""#));
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn test_duplicate_resource_uri_rejected() {
        let mut registry = registry();

        let err = registry
            .register_resource(
                ResourceSpec {
                    uri: "test:doc".to_string(),
                    name: "other".to_string(),
                    description: None,
                    mime_type: "text/plain".to_string(),
                },
                |uri| {
                    Ok(ResourceContents {
                        uri: uri.to_string(),
                        mime_type: "text/plain".to_string(),
                        text: "shadowed".to_string(),
                    })
                },
            )
            .unwrap_err();
        assert_eq!(err, CapabilityError::DuplicateUri("test:doc".to_string()));

        assert_eq!(registry.resources().len(), 1);
        assert!(registry.get(CapabilityKind::Resource, "other").is_none());
        assert_eq!(registry.read_resource("test:doc").unwrap().text, "doc");
    }

    #[test]
    fn test_same_name_different_kind() {
        let registry = registry();
        assert!(registry.get(CapabilityKind::Tool, "echo").is_some());
        assert!(registry.get(CapabilityKind::Prompt, "echo").is_some());
    }

    #[test]
    fn test_invalid_arguments_shape() {
        let registry = registry();

        let err = registry
            .invoke(CapabilityKind::Prompt, "echo", json!([1, 2]))
            .unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidArguments(_)));

        let err = registry
            .invoke(CapabilityKind::Resource, "doc", json!(42))
            .unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidArguments(_)));
    }

    #[test]
    fn test_read_resource_by_uri() {
        let registry = registry();
        assert_eq!(registry.read_resource("test:doc").unwrap().text, "doc");

        let err = registry.read_resource("test:other").unwrap_err();
        assert!(err.is_missing_resource());
    }

    #[test]
    fn test_listing_follows_registration_order() {
        let registry = registry();
        let tools: Vec<&str> = registry.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(tools, vec!["echo", "fail"]);
        assert_eq!(registry.prompts().len(), 1);
        assert_eq!(registry.resources()[0].uri, "test:doc");
        assert!(registry.has_kind(CapabilityKind::Resource));
        assert!(!CapabilityRegistry::new().has_kind(CapabilityKind::Tool));
    }
}
