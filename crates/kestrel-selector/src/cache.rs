//! Compiled-selector cache keyed by selector text.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use crate::compiler::{CompiledSelector, compile};
use crate::error::Result;

/// Insert-if-absent cache of compiled selectors. Entries are never evicted;
/// failed compilations are not stored.
#[derive(Debug, Default)]
pub struct SelectorCache {
    entries: RwLock<HashMap<String, Arc<CompiledSelector>>>,
}

impl SelectorCache {
    /// An empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled form of `selector`, compiling it on first use.
    ///
    /// # Errors
    ///
    /// Returns the compilation error; nothing is cached in that case.
    pub fn get_or_compile(&self, selector: &str) -> Result<Arc<CompiledSelector>> {
        if let Some(hit) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(selector)
        {
            return Ok(Arc::clone(hit));
        }

        debug!(selector, "compiling selector");
        let compiled = Arc::new(compile(selector)?);
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(entries.entry(selector.to_string()).or_insert(compiled)))
    }

    /// Number of cached selectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
