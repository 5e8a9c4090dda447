//! In-memory variable store for embedding and tests

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::error::ProviderResult;
use crate::providers::VariableStore;

/// Process-local [`VariableStore`] backed by a hash map
///
/// Suitable for single-process deployments and test fixtures; values do not
/// survive a restart.
#[derive(Debug, Default)]
pub struct InMemoryVariableStore {
    inner: RwLock<HashMap<String, Value>>,
}

impl InMemoryVariableStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored variables
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// True when nothing has been stored
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

#[async_trait]
impl VariableStore for InMemoryVariableStore {
    async fn get(&self, name: &str) -> ProviderResult<Option<Value>> {
        Ok(self.inner.read().get(name).cloned())
    }

    async fn set(&self, name: &str, value: Value) -> ProviderResult<()> {
        self.inner.write().insert(name.to_string(), value);
        Ok(())
    }
}
