//! The `info` resource, served from the embedded store

use greeter_core::{EmbeddedStore, ResourceResolver, ResourceSpec, EMBEDDED_SCHEME};

pub const INFO_URI: &str = "embedded:info";

const TEXT_PLAIN: &str = "text/plain";

/// Static contents of the `embedded:` scheme
pub fn embedded_store() -> EmbeddedStore {
    EmbeddedStore::new().with_entry("info", "This is the hello example server.", TEXT_PLAIN)
}

/// Resolver with every scheme the greeter serves
pub fn resolver() -> ResourceResolver {
    ResourceResolver::new().with_scheme(EMBEDDED_SCHEME, embedded_store())
}

pub fn resource_spec() -> ResourceSpec {
    ResourceSpec {
        uri: INFO_URI.to_string(),
        name: "info".to_string(),
        description: None,
        mime_type: TEXT_PLAIN.to_string(),
    }
}
