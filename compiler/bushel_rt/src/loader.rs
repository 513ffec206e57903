//! Terminology and library loading.
//!
//! The host resolves resource locators (application bundles, library
//! files) into term dictionaries and library programs. Dictionaries are
//! cached per locator until the cache is cleared.

use std::sync::Arc;

use bushel_ir::{Program, TermDictionary};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

pub trait ResourceLoader: Send + Sync {
    /// The terminology published by the resource at `locator`.
    fn load_terminology(&self, locator: &str) -> Option<TermDictionary>;

    /// The program of the library at `locator`.
    fn load_library(&self, _locator: &str) -> Option<Program> {
        None
    }
}

/// Loads nothing.
#[derive(Debug, Default)]
pub struct NoResources;

impl ResourceLoader for NoResources {
    fn load_terminology(&self, _locator: &str) -> Option<TermDictionary> {
        None
    }
}

/// Per-locator cache in front of a [`ResourceLoader`].
pub struct TerminologyCache {
    loader: Arc<dyn ResourceLoader>,
    loaded: RwLock<FxHashMap<String, Option<Arc<TermDictionary>>>>,
}

impl TerminologyCache {
    pub fn new(loader: Arc<dyn ResourceLoader>) -> Self {
        TerminologyCache {
            loader,
            loaded: RwLock::new(FxHashMap::default()),
        }
    }

    /// Terminology for `locator`, loading it on first request.
    ///
    /// Misses are cached too.
    pub fn load(&self, locator: &str) -> Option<Arc<TermDictionary>> {
        if let Some(cached) = self.loaded.read().get(locator) {
            return cached.clone();
        }
        let loaded = self.loader.load_terminology(locator).map(Arc::new);
        tracing::debug!(locator, found = loaded.is_some(), "loaded terminology");
        self.loaded
            .write()
            .entry(locator.to_owned())
            .or_insert(loaded)
            .clone()
    }

    pub fn load_library(&self, locator: &str) -> Option<Program> {
        self.loader.load_library(locator)
    }

    pub fn clear(&self) {
        self.loaded.write().clear();
    }
}

impl std::fmt::Debug for TerminologyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminologyCache")
            .field("loaded", &self.loaded.read().len())
            .finish_non_exhaustive()
    }
}
