//! Bushel RT - the BushelScript execution core.
//!
//! This crate runs programs built by `bushel_ir`:
//! - `Interpreter`: tree-walking evaluation over three context stacks
//!   (variable frames, modules, targets)
//! - the specifier engine: lazy object queries, evaluated locally or sent
//!   whole to a remote application
//! - `FunctionSet`: command dispatch by overload resolution
//! - the core module of built-in operators and commands
//!
//! Hosts configure a [`Runtime`] through [`RuntimeBuilder`], supply a
//! [`ProtocolAdapter`] for remote targets and a [`ResourceLoader`] for
//! terminology and libraries, and call [`Runtime::run`].

mod context;
mod core_module;
pub mod dispatch;
pub mod errors;
pub mod interpreter;
pub mod loader;
pub mod module;
pub mod output;
pub mod protocol;
pub mod reflection;
mod runtime;
mod specifier_engine;
mod stack;
pub mod value;

pub use context::{Context, Frame, Stack};
pub use dispatch::{Arguments, Function, FunctionSet, NativeFn, Signature};
pub use errors::{ControlAction, ErrorKind, EvalResult, RunError, RuntimeError};
pub use interpreter::{Interpreter, ScopedInterpreter};
pub use loader::{NoResources, ResourceLoader, TerminologyCache};
pub use module::{Module, ModuleArena, ModuleId, ModuleKind};
pub use output::{buffer_output, silent_output, stdout_output, OutputHandler, SharedOutput};
pub use protocol::{ProtocolAdapter, ProtocolError, RemoteRequest, WireValue};
pub use runtime::{Runtime, RuntimeBuilder, RuntimeConfig, TerminationHandle};
pub use value::{Application, Record, Value};
