//! State-to-document conversion.
//!
//! Each partition carries one converter capability that turns a raw state
//! payload into a store-ready [`StateDocument`]. Converters are resolved
//! once at startup through the [`ConverterRegistry`]; collections without a
//! registered converter fall back to the pass-through [`RawStateConverter`].

use std::collections::HashMap;
use std::sync::Arc;

use crate::models::StateDocument;
use crate::Result;

mod raw;

pub use raw::RawStateConverter;

/// Converts one decoded state payload into a persistable document.
///
/// Implementations may fail with a decoding error; the poller treats that
/// as fatal to the current window and retries it on the next tick.
pub trait StateConverter: Send + Sync {
    fn convert(&self, raw_state: &[u8], block_index: i64, address: &str) -> Result<StateDocument>;
}

/// Dispatch table mapping collection names to converter capabilities.
pub struct ConverterRegistry {
    converters: HashMap<String, Arc<dyn StateConverter>>,
    fallback: Arc<dyn StateConverter>,
}

impl ConverterRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            converters: HashMap::new(),
            fallback: Arc::new(RawStateConverter),
        }
    }

    /// Register a converter for a collection, replacing any previous one.
    pub fn register(&mut self, collection: impl Into<String>, converter: Arc<dyn StateConverter>) {
        self.converters.insert(collection.into(), converter);
    }

    /// Resolve the converter for a collection.
    #[must_use]
    pub fn resolve(&self, collection: &str) -> Arc<dyn StateConverter> {
        self.converters
            .get(collection)
            .cloned()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl Default for ConverterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperCaseConverter;

    impl StateConverter for UpperCaseConverter {
        fn convert(
            &self,
            raw_state: &[u8],
            block_index: i64,
            address: &str,
        ) -> Result<StateDocument> {
            Ok(StateDocument {
                key: address.to_uppercase(),
                address: address.to_string(),
                block_index,
                body: serde_json::json!({ "len": raw_state.len() }),
            })
        }
    }

    #[test]
    fn resolves_registered_converter() {
        let mut registry = ConverterRegistry::new();
        registry.register("avatars", Arc::new(UpperCaseConverter));

        let document = registry
            .resolve("avatars")
            .convert(b"abc", 7, "deadbeef")
            .unwrap();
        assert_eq!(document.key, "DEADBEEF");
        assert_eq!(document.body["len"], 3);
    }

    #[test]
    fn falls_back_to_raw_converter() {
        let registry = ConverterRegistry::new();
        let document = registry
            .resolve("unregistered")
            .convert(b"\x01\x02", 9, "0xAbCd")
            .unwrap();
        assert_eq!(document.block_index, 9);
        assert_eq!(document.body["raw"], "0102");
    }
}
