//! Tree-walking interpreter.
//!
//! All evaluation goes through [`Interpreter::eval`] (resolve mode) or
//! [`Interpreter::eval_reference`] (reference mode). The two differ only for
//! query nodes: resolve mode evaluates a specifier it builds, reference mode
//! yields the specifier itself so it can be handed to a command or a remote
//! target unevaluated.
//!
//! # Arena threading
//!
//! Function values carry the arena their body lives in. Calling one swaps
//! the interpreter's arena for the callee's for the duration of the call;
//! the scope guard swaps it back.
//!
//! # Control flow
//!
//! Every step returns [`EvalResult`]. Errors, `return` and termination all
//! travel as [`ControlAction`]; only `try` inspects them, and only the
//! error arm is caught.

mod command;
mod function_call;
mod scope_guard;

pub use scope_guard::ScopedInterpreter;

use std::sync::Arc;

use bushel_ir::builtin_terms::{Commands, Constants, Parameters, Types};
use bushel_ir::{ExprId, ExprKind, FunctionParameter, InsertionKind, Resource, SharedArena, TermId};

use crate::context::Context;
use crate::dispatch::{Arguments, BlockBody, Function, ScriptBody, Signature};
use crate::errors::{error_value, ControlAction, ErrorKind, EvalResult, RuntimeError};
use crate::module::{Module, ModuleId, ModuleKind};
use crate::runtime::Runtime;
use crate::stack::ensure_sufficient_stack;
use crate::value::{Application, InsertionSpecifier, Record, Value};

/// Whether a query node is evaluated where it appears.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Mode {
    Resolve,
    Reference,
}

/// Evaluates one program (or library) against a [`Runtime`].
pub struct Interpreter<'rt> {
    pub(crate) rt: &'rt mut Runtime,
    pub(crate) context: Context,
    /// Arena of the code currently being evaluated.
    pub(crate) arena: SharedArena,
    /// Value of the most recently completed sequence statement (`that`).
    pub(crate) last_result: Value,
    /// Script-function activations currently on the frame stack.
    pub(crate) call_depth: usize,
}

impl<'rt> Interpreter<'rt> {
    /// An interpreter for code in `arena`, defining functions into `module`.
    ///
    /// The module stack starts with the core module at the bottom and
    /// `module` above it.
    pub fn new(rt: &'rt mut Runtime, arena: SharedArena, module: ModuleId) -> Self {
        let mut context = Context::new(Value::Module(rt.core));
        if module != rt.core {
            context.modules.push(Value::Module(module));
        }
        Interpreter {
            rt,
            context,
            arena,
            last_result: Value::Null,
            call_depth: 0,
        }
    }

    pub fn runtime(&self) -> &Runtime {
        self.rt
    }

    pub fn runtime_mut(&mut self) -> &mut Runtime {
        self.rt
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Evaluate `id`, resolving any specifier it produces.
    #[inline]
    pub fn eval(&mut self, id: ExprId) -> EvalResult {
        self.eval_as(id, Mode::Resolve)
    }

    /// Evaluate `id`, leaving a specifier it produces unevaluated.
    #[inline]
    pub fn eval_reference(&mut self, id: ExprId) -> EvalResult {
        self.eval_as(id, Mode::Reference)
    }

    /// Fail with `Terminated` once termination has been requested.
    #[inline]
    pub fn check_termination(&self) -> Result<(), ControlAction> {
        if self.rt.termination.is_requested() {
            Err(ControlAction::Terminated)
        } else {
            Ok(())
        }
    }

    #[tracing::instrument(level = "trace", skip_all)]
    fn eval_as(&mut self, id: ExprId, mode: Mode) -> EvalResult {
        self.check_termination()?;
        let location = self.arena[id].location;
        self.context.locations.push(location);
        let result = ensure_sufficient_stack(|| self.eval_inner(id, mode));
        self.context.locations.pop();
        result.map_err(|action| action.located(location))
    }

    fn eval_inner(&mut self, id: ExprId, mode: Mode) -> EvalResult {
        let arena = Arc::clone(&self.arena);
        match &arena[id].kind {
            ExprKind::Sequence(items) => {
                for &item in items {
                    self.last_result = self.eval(item)?;
                }
                Ok(self.last_result.clone())
            }
            ExprKind::That => {
                let value = self.last_result.clone();
                self.resolve_if(value, mode)
            }
            ExprKind::It => {
                let value = self.context.target().clone();
                self.resolve_if(value, mode)
            }
            ExprKind::Null => Ok(Value::Null),

            ExprKind::Integer(i) => Ok(Value::Integer(*i)),
            ExprKind::Real(r) => Ok(Value::Real(*r)),
            ExprKind::String(s) => Ok(Value::string(s.as_str())),
            ExprKind::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for &item in items {
                    values.push(self.eval(item)?);
                }
                Ok(Value::from(values))
            }
            ExprKind::Record(entries) => self.eval_record(entries),

            ExprKind::Variable(variable) => Ok(self
                .context
                .lookup_variable(variable)
                .cloned()
                .unwrap_or(Value::Null)),
            ExprKind::Type(ty) => Ok(Value::Type(ty.clone())),
            ExprKind::Constant(constant) => Ok(match Constants::from_id(constant) {
                Some(Constants::True) => Value::Boolean(true),
                Some(Constants::False) => Value::Boolean(false),
                None => Value::Constant(constant.clone()),
            }),
            ExprKind::Resource(term) | ExprKind::Use(term) => self.eval_resource(term),

            ExprKind::Specifier(specifier) => {
                let built = self.build_specifier(specifier)?;
                self.resolve_if(built, mode)
            }
            ExprKind::Insertion { parent, kind } => self.eval_insertion(*parent, *kind),
            ExprKind::Reference(operand) => self.eval_reference(*operand),
            ExprKind::Get(operand) => {
                let value = self.eval_reference(*operand)?;
                self.run_command(Arguments::new(Commands::Get.id()).with(Parameters::Direct.id(), value))
            }

            ExprKind::Command { command, arguments } => {
                let mut call = Arguments::new(command.clone());
                for (parameter, value) in arguments {
                    let value = self.eval(*value)?;
                    call.insert(parameter.clone(), value);
                }
                self.run_command(call)
            }
            ExprKind::Prefix { op, operand } => {
                let operand = self.eval(*operand)?;
                self.run_command(Arguments::new(op.command().id()).with(Parameters::Direct.id(), operand))
            }
            ExprKind::Infix { op, lhs, rhs } => {
                let lhs = self.eval(*lhs)?;
                let rhs = self.eval(*rhs)?;
                self.run_command(
                    Arguments::new(op.command().id())
                        .with(Parameters::Lhs.id(), lhs)
                        .with(Parameters::Rhs.id(), rhs),
                )
            }

            ExprKind::Let { variable, initial } => {
                let value = match initial {
                    Some(initial) => self.eval(*initial)?,
                    None => Value::Null,
                };
                self.context.frames.top_mut().bind(variable.clone(), value.clone());
                Ok(value)
            }
            ExprKind::Set { target, value } => self.eval_set(*target, *value),

            ExprKind::Return(value) => {
                let value = match value {
                    Some(value) => self.eval(*value)?,
                    None => Value::Null,
                };
                Err(ControlAction::Return(value))
            }
            ExprKind::Raise(error) => match self.eval(*error)? {
                Value::Error(error) => Err(ControlAction::Error(Box::new((*error).clone()))),
                other => Err(RuntimeError::raised(other).into()),
            },
            ExprKind::Try { body, handle } => self.eval_try(*body, *handle),
            ExprKind::If {
                condition,
                then,
                otherwise,
            } => {
                if self.eval(*condition)?.truthy() {
                    self.eval(*then)
                } else if let Some(otherwise) = otherwise {
                    self.eval(*otherwise)
                } else {
                    Ok(Value::Null)
                }
            }
            ExprKind::RepeatWhile { condition, body } => {
                let mut result = Value::Null;
                while self.eval(*condition)?.truthy() {
                    result = self.eval(*body)?;
                }
                Ok(result)
            }
            ExprKind::RepeatTimes { times, body } => self.eval_repeat_times(*times, *body),
            ExprKind::RepeatFor {
                variable,
                container,
                body,
            } => self.eval_repeat_for(variable, *container, *body),
            ExprKind::Tell { target, body } => {
                let target = self.eval_reference(*target)?;
                if !target.is_command_target() {
                    return Err(ErrorKind::NotAModule {
                        value: target.to_string(),
                    }
                    .into());
                }
                tracing::debug!(target = %target, "tell");
                let mut scoped = self.with_tell(target);
                scoped.eval(*body)
            }

            ExprKind::Function {
                name,
                parameters,
                body,
            } => self.define_function(name, parameters, *body),
            ExprKind::Block { arguments, body } => Ok(Value::Function(Arc::new(Function::block(
                BlockBody {
                    arena: Arc::clone(&self.arena),
                    body: *body,
                    variables: arguments.clone(),
                },
            )))),
        }
    }

    fn resolve_if(&mut self, value: Value, mode: Mode) -> EvalResult {
        match (mode, value) {
            (Mode::Resolve, Value::Specifier(specifier)) => self.evaluate_specifier(&specifier),
            (_, value) => Ok(value),
        }
    }

    /// Record literal. A bare property name as key becomes the property
    /// itself; other keys are evaluated in reference mode.
    fn eval_record(&mut self, entries: &[(ExprId, ExprId)]) -> EvalResult {
        let arena = Arc::clone(&self.arena);
        let mut record = Record::new();
        for &(key, value) in entries {
            let key = match &arena[key].kind {
                ExprKind::Specifier(specifier)
                    if specifier.parent.is_none() && specifier.kind.is_property() =>
                {
                    Value::Property(specifier.term.clone())
                }
                _ => self.eval_reference(key)?,
            };
            let value = self.eval(value)?;
            record.insert(key, value);
        }
        Ok(Value::record(record))
    }

    fn eval_insertion(&mut self, parent: Option<ExprId>, kind: InsertionKind) -> EvalResult {
        let parent = match parent {
            Some(parent) => self.eval_reference(parent)?,
            None => self.context.target().clone(),
        };
        Ok(Value::Insertion(Arc::new(InsertionSpecifier { parent, kind })))
    }

    fn eval_set(&mut self, target: ExprId, value: ExprId) -> EvalResult {
        let arena = Arc::clone(&self.arena);
        if let ExprKind::Variable(variable) = &arena[target].kind {
            let variable = variable.clone();
            let value = self.eval(value)?;
            self.context.frames.top_mut().assign(&variable, value.clone());
            return Ok(value);
        }
        let reference = self.eval_reference(target)?;
        let value = self.eval(value)?;
        self.run_command(
            Arguments::new(Commands::Set.id())
                .with(Parameters::Direct.id(), reference)
                .with(Parameters::SetTo.id(), value),
        )
    }

    fn eval_try(&mut self, body: ExprId, handle: ExprId) -> EvalResult {
        match self.eval(body) {
            Err(ControlAction::Error(error)) => {
                tracing::debug!(error = %error, "handling error");
                let it = match error.raised.clone() {
                    Some(raised) => raised,
                    None => error_value(*error),
                };
                let mut scoped = self.with_target(it);
                scoped.eval(handle)
            }
            other => other,
        }
    }

    fn eval_repeat_times(&mut self, times: ExprId, body: ExprId) -> EvalResult {
        let times = self.eval(times)?;
        let Some(limit) = times.as_real() else {
            return Err(ErrorKind::Uncoercible {
                value: times.to_string(),
                type_name: Types::Number.name().to_owned(),
            }
            .into());
        };
        let mut result = Value::Null;
        let mut count = 0.0;
        while count < limit {
            result = self.eval(body)?;
            count += 1.0;
        }
        Ok(result)
    }

    /// `repeat for <variable> in <container>`: walks `item 1` through
    /// `item <length>` of the container.
    fn eval_repeat_for(&mut self, variable: &TermId, container: ExprId, body: ExprId) -> EvalResult {
        let container = self.eval(container)?;
        let length = self.numeric_length(&container)?;
        let mut result = Value::Null;
        for index in 1..=length {
            let element = self.element_at(&container, index)?;
            self.context.frames.top_mut().bind(variable.clone(), element);
            result = self.eval(body)?;
        }
        Ok(result)
    }

    /// Compile a function definition into the defining module.
    fn define_function(
        &mut self,
        name: &TermId,
        parameters: &[FunctionParameter],
        body: ExprId,
    ) -> EvalResult {
        let mut signature = Signature::new(name.clone());
        let mut bindings = Vec::with_capacity(parameters.len());
        for parameter in parameters {
            let ty = match parameter.type_ {
                Some(ty) => match self.eval(ty)? {
                    Value::Type(ty) => ty,
                    other => {
                        return Err(ErrorKind::TypeObjectRequired {
                            value: other.to_string(),
                        }
                        .into())
                    }
                },
                None => Types::Item.id(),
            };
            signature = signature.with_parameter(parameter.parameter.clone(), ty);
            bindings.push((parameter.parameter.clone(), parameter.variable.clone()));
        }
        let function = Arc::new(Function::script(
            signature,
            ScriptBody {
                arena: Arc::clone(&self.arena),
                body,
                bindings,
            },
        ));
        let module = self.defining_module()?;
        self.rt
            .modules
            .get_mut(module)?
            .functions
            .add(Arc::clone(&function));
        tracing::debug!(function = %function, "defined function");
        Ok(Value::Function(function))
    }

    /// Topmost script or library module on the module stack.
    fn defining_module(&self) -> Result<ModuleId, ErrorKind> {
        for entry in self.context.modules.iter_top_down() {
            if let Value::Module(id) = entry {
                if !self.rt.modules.get(*id)?.is_core() {
                    return Ok(*id);
                }
            }
        }
        Err(ErrorKind::NotAModule {
            value: Types::CoreModule.name().to_owned(),
        })
    }

    fn eval_resource(&mut self, term: &TermId) -> EvalResult {
        let resource = self
            .rt
            .terms
            .lookup_id(term)
            .and_then(|term| term.resource.clone())
            .ok_or_else(|| ErrorKind::MissingResource {
                resource: self.rt.term_name(term),
            })?;
        match resource {
            Resource::Core => Ok(Value::Module(self.rt.core)),
            Resource::ApplicationByName { name } => {
                self.rt.import_terminology(&name);
                Ok(Value::application(Application::Named(name)))
            }
            Resource::ApplicationById { bundle_id } => {
                self.rt.import_terminology(&bundle_id);
                Ok(Value::application(Application::BundleId(bundle_id)))
            }
            Resource::Library { name, locator } => self.load_library(name, locator),
        }
    }

    /// Run a library once per run and hand back its module.
    fn load_library(&mut self, name: String, locator: String) -> EvalResult {
        if let Some(&module) = self.rt.libraries.get(&locator) {
            return Ok(Value::Module(module));
        }
        let program = self
            .rt
            .resources
            .load_library(&locator)
            .ok_or_else(|| ErrorKind::MissingResource {
                resource: name.clone(),
            })?;
        self.rt.terms.merge(&program.terms);
        let module = self.rt.modules.insert(Module::new(ModuleKind::Library {
            name,
            locator: locator.clone(),
        }));
        self.rt.libraries.insert(locator, module);
        tracing::debug!(library = %program.name, "running library");

        let depth = self.call_depth;
        let use_site = self.context.current_location();
        let mut library = Interpreter::new(&mut *self.rt, Arc::clone(&program.arena), module);
        library.call_depth = depth;
        match library.eval(program.root) {
            Ok(_) | Err(ControlAction::Return(_)) => Ok(Value::Module(module)),
            Err(action) => Err(action.relocated(use_site)),
        }
    }
}
