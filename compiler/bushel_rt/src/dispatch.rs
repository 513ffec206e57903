//! Command dispatch: functions, argument lists and overload resolution.
//!
//! A command invocation carries its arguments keyed by parameter term.
//! Each module keeps a [`FunctionSet`]; the interpreter asks every module
//! on the module stack, top down, for its [`FunctionSet::best_match`] and
//! calls the first one found.

use std::fmt;
use std::sync::Arc;

use bushel_ir::builtin_terms::Parameters;
use bushel_ir::{ExprId, SharedArena, TermId};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::{ErrorKind, EvalResult};
use crate::interpreter::Interpreter;
use crate::reflection::TypeTree;
use crate::value::{term_display_name, Value};

/// Signature of built-in command implementations.
pub type NativeFn = fn(&mut Interpreter<'_>, &Arguments) -> EvalResult;

/// A command identity plus the declared type of each parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Signature {
    pub command: TermId,
    /// `(parameter, type)` in declaration order.
    pub parameters: Vec<(TermId, TermId)>,
}

impl Signature {
    pub fn new(command: TermId) -> Self {
        Signature {
            command,
            parameters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: TermId, ty: TermId) -> Self {
        self.parameters.push((parameter, ty));
        self
    }

    pub fn type_of(&self, parameter: &TermId) -> Option<&TermId> {
        self.parameters
            .iter()
            .find(|(p, _)| p == parameter)
            .map(|(_, ty)| ty)
    }

    fn declares_target(&self) -> bool {
        self.parameters.iter().any(|(p, _)| p.is_target_parameter())
    }

    /// The first ordinary parameter, which a direct argument binds to when
    /// the function does not declare the direct parameter itself.
    pub fn first_parameter(&self) -> Option<&(TermId, TermId)> {
        self.parameters
            .iter()
            .find(|(p, _)| !p.is_target_parameter() && !p.is_direct_parameter())
    }

    /// Declared type a supplied argument is checked against.
    fn declared_type_for<'a>(&'a self, parameter: &TermId, arguments: &Arguments) -> Option<&'a TermId> {
        if let Some(ty) = self.type_of(parameter) {
            return Some(ty);
        }
        if parameter.is_direct_parameter() {
            return self
                .first_parameter()
                .filter(|(first, _)| !arguments.contains(first))
                .map(|(_, ty)| ty);
        }
        None
    }
}

/// Body of a script-defined function.
#[derive(Clone)]
pub struct ScriptBody {
    pub arena: SharedArena,
    pub body: ExprId,
    /// `(parameter, variable)` pairs in declaration order.
    pub bindings: Vec<(TermId, TermId)>,
}

/// Body of an anonymous block, run with positional arguments.
#[derive(Clone)]
pub struct BlockBody {
    pub arena: SharedArena,
    pub body: ExprId,
    pub variables: Vec<TermId>,
}

#[derive(Clone)]
pub enum Implementation {
    Native(NativeFn),
    Script(ScriptBody),
    Block(BlockBody),
}

#[derive(Clone)]
pub struct Function {
    pub signature: Signature,
    pub implementation: Implementation,
}

impl Function {
    pub fn native(signature: Signature, f: NativeFn) -> Self {
        Function {
            signature,
            implementation: Implementation::Native(f),
        }
    }

    pub fn script(signature: Signature, body: ScriptBody) -> Self {
        Function {
            signature,
            implementation: Implementation::Script(body),
        }
    }

    pub fn block(body: BlockBody) -> Self {
        Function {
            signature: Signature::new(bushel_ir::builtin_terms::Commands::Run.id()),
            implementation: Implementation::Block(body),
        }
    }

    pub fn is_block(&self) -> bool {
        matches!(self.implementation, Implementation::Block(_))
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.implementation {
            Implementation::Block(_) => write!(f, "block"),
            Implementation::Native(_) => {
                write!(f, "built-in {}", term_display_name(&self.signature.command))
            }
            Implementation::Script(_) => {
                write!(f, "function {}", term_display_name(&self.signature.command))
            }
        }
    }
}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Function")
            .field("signature", &self.signature)
            .field("kind", &self.to_string())
            .finish()
    }
}

/// Arguments of one command invocation.
#[derive(Clone, Debug)]
pub struct Arguments {
    pub command: TermId,
    values: SmallVec<[(TermId, Value); 4]>,
}

impl Arguments {
    pub fn new(command: TermId) -> Self {
        Arguments {
            command,
            values: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with(mut self, parameter: TermId, value: Value) -> Self {
        self.insert(parameter, value);
        self
    }

    /// Set an argument, replacing any earlier value for the parameter.
    pub fn insert(&mut self, parameter: TermId, value: Value) {
        match self.values.iter_mut().find(|(p, _)| *p == parameter) {
            Some(entry) => entry.1 = value,
            None => self.values.push((parameter, value)),
        }
    }

    pub fn get(&self, parameter: &TermId) -> Option<&Value> {
        self.values
            .iter()
            .find(|(p, _)| p == parameter)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, parameter: &TermId) -> bool {
        self.get(parameter).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&TermId, &Value)> {
        self.values.iter().map(|(p, v)| (p, v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The required argument for `parameter`.
    pub fn require(&self, parameter: &TermId) -> Result<&Value, ErrorKind> {
        self.get(parameter).ok_or_else(|| ErrorKind::MissingParameter {
            command: term_display_name(&self.command),
            parameter: term_display_name(parameter),
        })
    }

    pub fn param(&self, parameter: Parameters) -> Result<&Value, ErrorKind> {
        self.require(&parameter.id())
    }

    /// The implicit receiver, or null when there is none.
    pub fn target(&self) -> &Value {
        self.get(&Parameters::Target.id()).unwrap_or(&Value::Null)
    }

    /// The direct argument, falling back to the implicit receiver.
    pub fn direct_or_target(&self) -> &Value {
        self.get(&Parameters::Direct.id())
            .unwrap_or_else(|| self.target())
    }

    /// A numeric argument as `f64`.
    pub fn number(&self, parameter: &TermId) -> Result<f64, ErrorKind> {
        let value = self.require(parameter)?;
        value.as_real().ok_or_else(|| ErrorKind::WrongParameterType {
            command: term_display_name(&self.command),
            parameter: term_display_name(parameter),
            expected: "number".to_owned(),
            actual: term_display_name(&value.type_id()),
        })
    }
}

/// `(typeScore, countScore)`; compared lexicographically.
type Score = (i64, i64);

/// Score `function` against `arguments`, or `None` if it cannot accept them.
///
/// Every supplied argument must be null or an instance of the declared
/// type; exact type matches score a point each. An undeclared target
/// parameter matches anything. The count score penalises declared but
/// unused parameters.
pub fn score(function: &Function, arguments: &Arguments, types: &TypeTree) -> Option<Score> {
    let signature = &function.signature;
    let declares_target = signature.declares_target();
    let mut type_score = 0;
    for (parameter, value) in arguments.iter() {
        let declared = match signature.declared_type_for(parameter, arguments) {
            Some(ty) => ty,
            None if parameter.is_target_parameter() && !declares_target => continue,
            None => return None,
        };
        if value.is_null() {
            continue;
        }
        let actual = value.type_id();
        if actual == *declared {
            type_score += 1;
        } else if !types.is_a(&actual, declared) {
            return None;
        }
    }
    let declared_count = signature.parameters.len() + usize::from(!declares_target);
    let count_score = i64::try_from(arguments.len()).ok()? - i64::try_from(declared_count).ok()?;
    Some((type_score, count_score))
}

/// Functions grouped by command.
#[derive(Clone, Debug, Default)]
pub struct FunctionSet {
    by_command: FxHashMap<TermId, Vec<Arc<Function>>>,
}

impl FunctionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, function: Arc<Function>) {
        self.by_command
            .entry(function.signature.command.clone())
            .or_default()
            .push(function);
    }

    pub fn candidates(&self, command: &TermId) -> &[Arc<Function>] {
        self.by_command
            .get(command)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.by_command.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_command.is_empty()
    }

    /// The highest-scoring candidate for `arguments.command`.
    ///
    /// Ties go to the later-registered candidate (`>=`), so a redefinition
    /// overrides an earlier function with the same signature.
    pub fn best_match(&self, arguments: &Arguments, types: &TypeTree) -> Option<Arc<Function>> {
        let mut best: Option<(Score, &Arc<Function>)> = None;
        for candidate in self.candidates(&arguments.command) {
            let Some(score) = score(candidate, arguments, types) else {
                continue;
            };
            if best.as_ref().map_or(true, |(leader, _)| score >= *leader) {
                best = Some((score, candidate));
            }
        }
        best.map(|(_, function)| Arc::clone(function))
    }
}
