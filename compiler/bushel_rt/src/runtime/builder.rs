//! `RuntimeBuilder` for configuring a [`Runtime`].

use std::sync::Arc;
use std::time::Duration;

use bushel_ir::builtin_terms::builtin_dictionary;
use bushel_ir::TermId;
use rustc_hash::FxHashMap;

use super::{Runtime, RuntimeConfig, TerminationHandle};
use crate::loader::{NoResources, ResourceLoader, TerminologyCache};
use crate::module::{Module, ModuleArena, ModuleKind};
use crate::output::{stdout_output, SharedOutput};
use crate::protocol::ProtocolAdapter;
use crate::reflection::TypeTree;
use crate::value::{GlobalScope, Value};

/// Builder for [`Runtime`].
///
/// Without an adapter every remote command fails with
/// `RemoteCommandsDisallowed`; without a loader no terminology or library
/// resolves.
pub struct RuntimeBuilder {
    script_name: String,
    config: RuntimeConfig,
    adapter: Option<Arc<dyn ProtocolAdapter>>,
    loader: Arc<dyn ResourceLoader>,
    output: SharedOutput,
    globals: Vec<(TermId, Value)>,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        RuntimeBuilder {
            script_name: "script".to_owned(),
            config: RuntimeConfig::default(),
            adapter: None,
            loader: Arc::new(NoResources),
            output: stdout_output(),
            globals: Vec::new(),
        }
    }

    #[must_use]
    pub fn script_name(mut self, name: impl Into<String>) -> Self {
        self.script_name = name.into();
        self
    }

    #[must_use]
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn max_call_depth(mut self, depth: Option<usize>) -> Self {
        self.config.max_call_depth = depth;
        self
    }

    #[must_use]
    pub fn delay_slice(mut self, slice: Duration) -> Self {
        self.config.delay_slice = slice;
        self
    }

    #[must_use]
    pub fn adapter(mut self, adapter: Arc<dyn ProtocolAdapter>) -> Self {
        self.adapter = Some(adapter);
        self
    }

    #[must_use]
    pub fn loader(mut self, loader: Arc<dyn ResourceLoader>) -> Self {
        self.loader = loader;
        self
    }

    #[must_use]
    pub fn output(mut self, output: SharedOutput) -> Self {
        self.output = output;
        self
    }

    /// Define a host global property.
    #[must_use]
    pub fn global(mut self, property: TermId, value: Value) -> Self {
        self.globals.push((property, value));
        self
    }

    pub fn build(self) -> Runtime {
        let mut modules = ModuleArena::new();
        let mut core = Module::new(ModuleKind::Core);
        crate::core_module::install(&mut core.functions);
        let core = modules.insert(core);
        let globals = GlobalScope::with_properties(self.globals);

        Runtime {
            config: self.config,
            types: TypeTree::builtin(),
            terms: builtin_dictionary(),
            modules,
            core,
            globals: globals.clone(),
            initial_globals: globals,
            adapter: self.adapter,
            resources: TerminologyCache::new(self.loader),
            output: self.output,
            termination: TerminationHandle::default(),
            libraries: FxHashMap::default(),
            script_name: self.script_name,
        }
    }
}
