//! Resource URI resolution
//!
//! URIs take the opaque form `scheme:key`. The scheme selects a lookup, the
//! key is handed to that lookup uninterpreted.

use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use url::Url;

use crate::capability::ResourceContents;
use crate::error::{CapabilityError, Result};

/// Scheme served by the in-memory embedded store
pub const EMBEDDED_SCHEME: &str = "embedded";

/// Text stored behind a resource key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResource {
    pub text: String,
    pub mime_type: String,
}

/// Backing store for one URI scheme
pub trait SchemeLookup: Send + Sync {
    /// Find the resource stored under `key`, if any
    fn lookup(&self, key: &str) -> Option<StoredResource>;
}

/// Static key -> text store, populated once
#[derive(Debug, Clone, Default)]
pub struct EmbeddedStore {
    entries: HashMap<String, StoredResource>,
}

impl EmbeddedStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry (builder style)
    pub fn with_entry(
        mut self,
        key: impl Into<String>,
        text: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        self.entries.insert(
            key.into(),
            StoredResource {
                text: text.into(),
                mime_type: mime_type.into(),
            },
        );
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SchemeLookup for EmbeddedStore {
    fn lookup(&self, key: &str) -> Option<StoredResource> {
        self.entries.get(key).cloned()
    }
}

/// Maps `scheme:key` URIs onto registered lookups
#[derive(Clone, Default)]
pub struct ResourceResolver {
    schemes: HashMap<String, Arc<dyn SchemeLookup>>,
}

impl ResourceResolver {
    /// Create a resolver with no schemes
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a lookup for a scheme, replacing any previous one
    pub fn with_scheme(mut self, scheme: &str, lookup: impl SchemeLookup + 'static) -> Self {
        self.schemes
            .insert(scheme.to_ascii_lowercase(), Arc::new(lookup));
        self
    }

    /// Whether a lookup is registered for `scheme`
    pub fn supports(&self, scheme: &str) -> bool {
        self.schemes.contains_key(&scheme.to_ascii_lowercase())
    }

    /// Resolve a URI into its contents
    pub fn resolve(&self, uri: &str) -> Result<ResourceContents> {
        let (scheme, key) = parse_opaque_uri(uri)?;

        let lookup = self
            .schemes
            .get(&scheme)
            .ok_or_else(|| CapabilityError::UnsupportedScheme(scheme.clone()))?;

        let stored = lookup
            .lookup(&key)
            .ok_or_else(|| CapabilityError::UnknownResource {
                scheme: scheme.clone(),
                key: key.clone(),
            })?;

        debug!("Resolved {} ({} bytes)", uri, stored.text.len());

        Ok(ResourceContents {
            uri: uri.to_string(),
            mime_type: stored.mime_type,
            text: stored.text,
        })
    }
}

impl std::fmt::Debug for ResourceResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut schemes: Vec<&String> = self.schemes.keys().collect();
        schemes.sort();
        f.debug_struct("ResourceResolver")
            .field("schemes", &schemes)
            .finish()
    }
}

/// Split a URI into scheme and opaque key
fn parse_opaque_uri(uri: &str) -> Result<(String, String)> {
    let invalid = |reason: String| CapabilityError::InvalidUri {
        uri: uri.to_string(),
        reason,
    };

    let parsed = Url::parse(uri).map_err(|e| invalid(e.to_string()))?;

    // `scheme://authority/...` URIs carry no opaque key
    if !parsed.cannot_be_a_base() {
        return Err(invalid("expected scheme:key form".to_string()));
    }

    Ok((parsed.scheme().to_string(), parsed.path().to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn embedded_resolver() -> ResourceResolver {
        ResourceResolver::new().with_scheme(
            EMBEDDED_SCHEME,
            EmbeddedStore::new().with_entry("info", "This is the hello example server.", "text/plain"),
        )
    }

    #[test]
    fn test_resolve_embedded_info() {
        let contents = embedded_resolver().resolve("embedded:info").unwrap();
        assert_eq!(contents.text, "This is the hello example server.");
        assert_eq!(contents.mime_type, "text/plain");
        assert_eq!(contents.uri, "embedded:info");
    }

    #[test]
    fn test_resolve_unknown_key() {
        let err = embedded_resolver().resolve("embedded:missing").unwrap_err();
        assert_eq!(
            err,
            CapabilityError::UnknownResource {
                scheme: "embedded".to_string(),
                key: "missing".to_string(),
            }
        );
    }

    #[test]
    fn test_resolve_unsupported_scheme() {
        let err = embedded_resolver().resolve("bogus:info").unwrap_err();
        assert_eq!(err, CapabilityError::UnsupportedScheme("bogus".to_string()));
    }

    #[test]
    fn test_resolve_invalid_uri() {
        let resolver = embedded_resolver();
        for uri in [":::not a uri", "", "info"] {
            let err = resolver.resolve(uri).unwrap_err();
            assert!(
                matches!(err, CapabilityError::InvalidUri { .. }),
                "{uri:?} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_resolve_rejects_authority_form() {
        let err = embedded_resolver().resolve("embedded://info").unwrap_err();
        assert!(matches!(err, CapabilityError::InvalidUri { .. }));
    }

    #[test]
    fn test_additional_scheme() {
        let resolver = embedded_resolver().with_scheme(
            "docs",
            EmbeddedStore::new().with_entry("readme", "# Greeter", "text/markdown"),
        );

        assert!(resolver.supports("docs"));
        let contents = resolver.resolve("docs:readme").unwrap();
        assert_eq!(contents.mime_type, "text/markdown");

        // Embedded scheme keeps working
        assert!(resolver.resolve("embedded:info").is_ok());
    }
}
