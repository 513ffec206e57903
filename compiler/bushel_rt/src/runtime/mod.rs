//! The runtime: long-lived state shared by every run of a program.
//!
//! A [`Runtime`] owns the type tree, the term dictionary, the module arena
//! with its core module, the global scope and the host's collaborators
//! (protocol adapter, resource loader, output handler). Each
//! [`Runtime::run`] resets per-run state and evaluates one program.
//!
//! Termination is cooperative. Another thread holding a
//! [`TerminationHandle`] sets a flag; the interpreter checks it before
//! every node, before every remote send and during `delay`.

mod builder;
mod config;

pub use builder::RuntimeBuilder;
pub use config::RuntimeConfig;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bushel_ir::builtin_terms::{builtin_dictionary, Commands};
use bushel_ir::{Program, TermDictionary, TermId};
use rustc_hash::FxHashMap;

use crate::errors::{ControlAction, ErrorKind, RunError, RuntimeError};
use crate::interpreter::Interpreter;
use crate::loader::TerminologyCache;
use crate::module::{Module, ModuleArena, ModuleId, ModuleKind};
use crate::output::SharedOutput;
use crate::protocol::ProtocolAdapter;
use crate::reflection::TypeTree;
use crate::value::{term_display_name, GlobalScope, Value};

/// Shared flags for stopping a run from another thread.
#[derive(Clone, Debug, Default)]
pub struct TerminationHandle {
    requested: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl TerminationHandle {
    /// Ask the current run to stop at its next check.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }

    /// Whether a run is in progress.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn clear(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }
}

/// Marks a run as in progress until dropped.
struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn enter(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        RunningGuard(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Runtime {
    pub(crate) config: RuntimeConfig,
    pub(crate) types: TypeTree,
    /// Built-ins, the running program's terms and imported terminology.
    pub(crate) terms: TermDictionary,
    pub(crate) modules: ModuleArena,
    pub(crate) core: ModuleId,
    pub(crate) globals: GlobalScope,
    /// Global scope as the host configured it; every run starts from it.
    pub(crate) initial_globals: GlobalScope,
    pub(crate) adapter: Option<Arc<dyn ProtocolAdapter>>,
    pub(crate) resources: TerminologyCache,
    pub(crate) output: SharedOutput,
    pub(crate) termination: TerminationHandle,
    /// Library modules of the current run, by locator.
    pub(crate) libraries: FxHashMap<String, ModuleId>,
    pub(crate) script_name: String,
}

impl Runtime {
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Run `program` to completion.
    ///
    /// The result is the value of the program's last statement, or the
    /// value of a top-level `return`.
    pub fn run(&mut self, program: &Program) -> Result<Value, RunError> {
        self.termination.clear();
        self.begin_run(program)
            .map_err(|kind| RunError::Error(RuntimeError::new(kind)))?;
        let script = self.modules.insert(Module::new(ModuleKind::Script {
            name: program.name.clone(),
        }));
        self.globals.set_top_script(Some(script));

        let running = Arc::clone(&self.termination.running);
        let _running = RunningGuard::enter(&running);
        tracing::debug!(script = %self.script_name, program = %program.name, "run started");

        let result = Interpreter::new(self, Arc::clone(&program.arena), script).eval(program.root);
        let outcome = match result {
            Ok(value) | Err(ControlAction::Return(value)) => Ok(value),
            Err(ControlAction::Error(error)) => Err(RunError::Error(*error)),
            Err(ControlAction::Terminated) => Err(RunError::Terminated),
        };
        tracing::debug!(ok = outcome.is_ok(), "run finished");
        outcome
    }

    /// Reset per-run state: modules other than core, libraries, globals
    /// and the term dictionary.
    fn begin_run(&mut self, program: &Program) -> Result<(), ErrorKind> {
        self.core = self.modules.reset(self.core)?;
        self.libraries.clear();
        self.globals = self.initial_globals.clone();
        let mut terms = builtin_dictionary();
        terms.merge(&program.terms);
        self.terms = terms;
        Ok(())
    }

    /// Ask the current run to stop; safe to call when nothing is running.
    pub fn request_termination(&self) {
        self.termination.request();
    }

    pub fn is_running(&self) -> bool {
        self.termination.is_running()
    }

    /// A handle other threads can use to stop runs of this runtime.
    pub fn termination_handle(&self) -> TerminationHandle {
        self.termination.clone()
    }

    /// Forget loaded terminology; the next `use` of an application reloads it.
    pub fn clear_terminology_cache(&self) {
        self.resources.clear();
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn output(&self) -> &SharedOutput {
        &self.output
    }

    pub fn terms(&self) -> &TermDictionary {
        &self.terms
    }

    pub fn globals(&self) -> &GlobalScope {
        &self.globals
    }

    /// Display name of a term, from the dictionary when it has one.
    pub fn term_name(&self, id: &TermId) -> String {
        self.terms
            .lookup_id(id)
            .and_then(|term| term.name.as_ref())
            .map_or_else(|| term_display_name(id), ToString::to_string)
    }

    /// Merge an application's terminology into the dictionary.
    ///
    /// Terms the application calls `get` or `set` are skipped unless they
    /// are the built-in commands, so an application cannot shadow them.
    pub(crate) fn import_terminology(&mut self, locator: &str) {
        let Some(imported) = self.resources.load(locator) else {
            return;
        };
        let reserved = [Commands::Get, Commands::Set];
        let filtered = TermDictionary::from_terms(imported.iter().filter(|term| {
            let shadows = reserved.iter().any(|command| {
                term.name.as_ref().is_some_and(|name| name.to_string() == command.name())
                    && !command.is(&term.id)
            });
            !shadows
        }).cloned());
        tracing::debug!(locator, terms = filtered.len(), "imported terminology");
        self.terms.merge(&filtered);
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("script_name", &self.script_name)
            .field("config", &self.config)
            .field("modules", &self.modules.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
