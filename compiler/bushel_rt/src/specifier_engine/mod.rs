//! Building and evaluating object queries.
//!
//! # Building
//!
//! A specifier node builds its parent first, in reference mode, so the
//! whole chain stays available to a remote encoder. Selector data are
//! evaluated as ordinary values. `whose` operands are built with the
//! specimen placeholder as the target, so a relative operand such as
//! `name` ends up rooted at the element under test. A parentless specifier
//! is anchored at the current target by copying its chain, never by
//! mutating it.
//!
//! # Evaluation
//!
//! A chain rooted at an application is sent whole as a `get` command.
//! Anything else is walked root first, one step per node. When a step
//! fails because the member does not exist, the same step is retried
//! against the global scope before the original error surfaces.

use std::sync::Arc;

use bushel_ir::builtin_terms::{Commands, Parameters, Properties, Types};
use bushel_ir::{BinaryOp, SpecifierExpr, SpecifierKind, TermId, TestComponent};

use crate::dispatch::Arguments;
use crate::errors::{ControlAction, ErrorKind, EvalResult};
use crate::interpreter::Interpreter;
use crate::protocol::ProtocolError;
use crate::reflection::TypeTree;
use crate::value::{
    term_display_name, test_comparison, with_container, Application, Container,
    InsertionSpecifier, Position, RootKind, Specifier, TestSpecifier, Value,
};

/// Selector data of the wrong shape for its form.
fn invalid_shape(form: &'static str, expected: &'static str, actual: &Value) -> ErrorKind {
    ErrorKind::InvalidSpecifierDataShape {
        form,
        expected,
        actual: actual.to_string(),
    }
}

fn index_datum(form: &'static str, datum: &Value) -> Result<i64, ErrorKind> {
    datum
        .as_index()
        .ok_or_else(|| invalid_shape(form, "an integer", datum))
}

/// The application a value ultimately lives in, if it is remote.
fn remote_root(value: &Value) -> Option<&Arc<Application>> {
    match value {
        Value::Application(application) => Some(application),
        Value::Specifier(specifier) => match specifier.root_ancestor() {
            Value::Application(application) => Some(application),
            _ => None,
        },
        _ => None,
    }
}

impl Interpreter<'_> {
    /// Build the query a specifier node describes.
    pub(crate) fn build_specifier(&mut self, expr: &SpecifierExpr) -> EvalResult {
        let parent = match expr.parent {
            Some(parent) => self.eval_reference(parent)?,
            None => Value::Root(RootKind::Container),
        };
        let mut test = match &expr.kind {
            SpecifierKind::Test(component) => {
                let mut scoped = self.with_target(Value::Root(RootKind::Specimen));
                Some(Arc::new(scoped.build_test(component)?))
            }
            _ => None,
        };
        let kind = expr.kind.try_map(
            |datum| self.eval(*datum),
            |_| {
                test.take().ok_or_else(|| {
                    ControlAction::from(invalid_shape("whose", "a test clause", &Value::Null))
                })
            },
        )?;

        let specifier = Arc::new(Specifier::new(parent, expr.term.clone(), kind));
        let specifier = if expr.parent.is_none() {
            specifier.qualified(self.context.target())
        } else {
            specifier
        };
        Ok(Value::Specifier(specifier))
    }

    /// A `whose` clause. A bare operand is read as `operand = true`.
    fn build_test(&mut self, component: &TestComponent) -> Result<TestSpecifier, ControlAction> {
        match component {
            TestComponent::Operand(operand) => {
                let operand = self.eval_reference(*operand)?;
                Ok(TestSpecifier::new(BinaryOp::Equal, operand, Value::Boolean(true)))
            }
            TestComponent::Predicate { op, lhs, rhs } => {
                let lhs = self.build_test_operand(lhs)?;
                let rhs = self.build_test_operand(rhs)?;
                Ok(TestSpecifier::new(*op, lhs, rhs))
            }
        }
    }

    fn build_test_operand(&mut self, component: &TestComponent) -> EvalResult {
        match component {
            TestComponent::Operand(operand) => self.eval_reference(*operand),
            predicate @ TestComponent::Predicate { .. } => {
                Ok(Value::Test(Arc::new(self.build_test(predicate)?)))
            }
        }
    }

    /// Evaluate a query, locally or by delegating it to its application.
    pub fn evaluate_specifier(&mut self, specifier: &Arc<Specifier>) -> EvalResult {
        let specifier = specifier.qualified(self.context.target());
        if let Value::Application(application) = specifier.root_ancestor() {
            let application = Arc::clone(application);
            return self.remote_get(&application, Value::Specifier(specifier));
        }
        self.evaluate_local(&specifier)
    }

    /// Evaluate an insertion location; only remote targets understand them.
    pub fn evaluate_insertion(&mut self, insertion: &Arc<InsertionSpecifier>) -> EvalResult {
        if let Value::Application(application) = insertion.root_ancestor() {
            let application = Arc::clone(application);
            return self.remote_get(&application, Value::Insertion(Arc::clone(insertion)));
        }
        Err(ErrorKind::InsertionSpecifierEvaluated {
            location: insertion.to_string(),
        }
        .into())
    }

    /// `get <subject>` sent to `application`.
    fn remote_get(&mut self, application: &Arc<Application>, subject: Value) -> EvalResult {
        let arguments =
            Arguments::new(Commands::Get.id()).with(Parameters::Direct.id(), subject);
        match self.send_remote(application, &arguments)? {
            Some(value) => Ok(value),
            None => Err(ErrorKind::RemoteCommandError {
                remote: application.to_string(),
                command: Commands::Get.name().to_owned(),
                reason: ProtocolError::EventNotHandled,
            }
            .into()),
        }
    }

    /// Walk a chain root first.
    fn evaluate_local(&mut self, specifier: &Specifier) -> EvalResult {
        let parent = match &specifier.parent {
            Value::Specifier(parent) => self.evaluate_local(parent)?,
            other => other.clone(),
        };
        if let Some(application) = remote_root(&parent) {
            let application = Arc::clone(application);
            let step = Specifier::new(parent, specifier.term.clone(), specifier.kind.clone());
            return self.remote_get(&application, Value::specifier(step));
        }
        self.step_with_fallback(&parent, specifier)
    }

    fn step_with_fallback(&mut self, parent: &Value, specifier: &Specifier) -> EvalResult {
        match self.step(parent, specifier) {
            Err(ControlAction::Error(error))
                if error.kind.is_missing_member() && !matches!(parent, Value::Global) =>
            {
                tracing::trace!(specifier = %specifier, "retrying against the global scope");
                self.step(&Value::Global, specifier).map_err(|retry| match retry {
                    ControlAction::Error(_) => ControlAction::Error(error),
                    other => other,
                })
            }
            other => other,
        }
    }

    /// Apply one node of a chain to its evaluated parent.
    fn step(&mut self, parent: &Value, specifier: &Specifier) -> EvalResult {
        let class = &specifier.term;
        let value = match &specifier.kind {
            SpecifierKind::Property => return self.property_of(parent, class),
            SpecifierKind::Simple(Value::String(name)) | SpecifierKind::Name(Value::String(name)) => {
                self.on_container(parent, class, "name", |c, types| c.element_named(class, name, types))?
            }
            SpecifierKind::Simple(datum) => {
                let index = datum
                    .as_index()
                    .ok_or_else(|| invalid_shape("simple", "an integer or a string", datum))?;
                self.on_container(parent, class, "index", |c, types| c.element_at(class, index, types))?
            }
            SpecifierKind::Index(datum) => {
                let index = index_datum("index", datum)?;
                self.on_container(parent, class, "index", |c, types| c.element_at(class, index, types))?
            }
            SpecifierKind::Name(datum) => return Err(invalid_shape("name", "a string", datum).into()),
            SpecifierKind::Id(datum) => {
                self.on_container(parent, class, "id", |c, types| c.element_with_id(class, datum, types))?
            }
            SpecifierKind::All => {
                Value::from(self.on_container(parent, class, "every", |c, types| c.elements(class, types))?)
            }
            SpecifierKind::First => self.positioned(parent, class, Position::First)?,
            SpecifierKind::Middle => self.positioned(parent, class, Position::Middle)?,
            SpecifierKind::Last => self.positioned(parent, class, Position::Last)?,
            SpecifierKind::Random => self.positioned(parent, class, Position::Random)?,
            kind @ (SpecifierKind::Previous | SpecifierKind::Next) => {
                return Err(ErrorKind::UnsupportedIndexForm {
                    container: parent.to_string(),
                    form: kind.form_name(),
                    class: self.rt.term_name(class),
                }
                .into())
            }
            SpecifierKind::Range { from, thru } => {
                let from = index_datum("range", from)?;
                let thru = index_datum("range", thru)?;
                Value::from(self.on_container(parent, class, "range", |c, types| {
                    c.elements_in_range(class, from, thru, types)
                })?)
            }
            SpecifierKind::Test(test) => {
                let candidates =
                    self.on_container(parent, class, "whose", |c, types| c.elements(class, types))?;
                let mut matching = Vec::new();
                for candidate in candidates {
                    if self.test_matches(test, &candidate)? {
                        matching.push(candidate);
                    }
                }
                Value::from(matching)
            }
        };
        Ok(value)
    }

    fn positioned(&self, parent: &Value, class: &TermId, position: Position) -> Result<Value, ErrorKind> {
        let form = match position {
            Position::First => "first",
            Position::Middle => "middle",
            Position::Last => "last",
            Position::Random => "some",
        };
        self.on_container(parent, class, form, |c, types| c.element_positioned(class, position, types))
    }

    /// Run an element accessor against `parent`'s container view.
    fn on_container<R>(
        &self,
        parent: &Value,
        class: &TermId,
        form: &'static str,
        f: impl FnOnce(&dyn Container, &TypeTree) -> Result<R, ErrorKind>,
    ) -> Result<R, ErrorKind> {
        let types = &self.rt.types;
        with_container(parent, &self.rt.globals, |container| f(container, types)).unwrap_or_else(
            || {
                Err(ErrorKind::UnsupportedIndexForm {
                    container: parent.to_string(),
                    form,
                    class: term_display_name(class),
                })
            },
        )
    }

    /// Read a property of an evaluated object.
    pub fn property_of(&mut self, object: &Value, property: &TermId) -> EvalResult {
        if Properties::Class.is(property) {
            return Ok(Value::Type(object.type_id()));
        }
        if let Some(value) =
            with_container(object, &self.rt.globals, |container| container.property(property)).flatten()
        {
            return Ok(value);
        }
        if let (Some(Properties::Message), Value::Error(error)) = (Properties::from_id(property), object) {
            return Ok(Value::string(error.kind.to_string()));
        }
        Err(ErrorKind::NoPropertyExists {
            container: object.to_string(),
            property: self.rt.term_name(property),
        }
        .into())
    }

    /// The `length` of a container, as `repeat for` needs it.
    pub(crate) fn numeric_length(&mut self, container: &Value) -> Result<i64, ControlAction> {
        let property = Properties::Length.id();
        match self.property_of(container, &property) {
            Ok(Value::Integer(length)) => Ok(length),
            Ok(_) | Err(ControlAction::Error(_)) => Err(ErrorKind::NoNumericPropertyExists {
                container: container.to_string(),
                property: self.rt.term_name(&property),
            }
            .into()),
            Err(other) => Err(other),
        }
    }

    /// `item <index> of <container>`.
    pub(crate) fn element_at(&mut self, container: &Value, index: i64) -> EvalResult {
        let item = Types::Item.id();
        Ok(self.on_container(container, &item, "index", |c, types| c.element_at(&item, index, types))?)
    }

    /// Whether `specimen` satisfies a `whose` clause.
    fn test_matches(&mut self, test: &TestSpecifier, specimen: &Value) -> Result<bool, ControlAction> {
        if test.op.is_logical() {
            let lhs = self.clause_matches(&test.lhs, specimen)?;
            let rhs = self.clause_matches(&test.rhs, specimen)?;
            return Ok(match test.op {
                BinaryOp::And => lhs && rhs,
                BinaryOp::Or => lhs || rhs,
                _ => lhs != rhs,
            });
        }
        let lhs = self.test_operand(&test.lhs, specimen)?;
        let rhs = self.test_operand(&test.rhs, specimen)?;
        Ok(test_comparison(test.op, &lhs, &rhs))
    }

    fn clause_matches(&mut self, clause: &Value, specimen: &Value) -> Result<bool, ControlAction> {
        match clause {
            Value::Test(test) => self.test_matches(test, specimen),
            operand => Ok(self.test_operand(operand, specimen)?.truthy()),
        }
    }

    /// Resolve a clause operand against the element under test.
    ///
    /// Members the specimen lacks read as null, so `whose` skips elements
    /// instead of failing on them.
    fn test_operand(&mut self, operand: &Value, specimen: &Value) -> EvalResult {
        match operand {
            Value::Root(RootKind::Specimen) => Ok(specimen.clone()),
            Value::Specifier(specifier)
                if matches!(specifier.root_ancestor(), Value::Root(RootKind::Specimen)) =>
            {
                let rooted = Arc::new(specifier.with_root(specimen.clone()));
                match self.evaluate_specifier(&rooted) {
                    Err(ControlAction::Error(error)) if error.kind.is_missing_member() => {
                        Ok(Value::Null)
                    }
                    other => other,
                }
            }
            other => Ok(other.clone()),
        }
    }

    /// Assign a property through a query.
    ///
    /// Remote chains are sent as a `set` command; locally only global
    /// properties are writable.
    pub fn set_property(&mut self, specifier: &Arc<Specifier>, value: Value) -> EvalResult {
        let specifier = specifier.qualified(self.context.target());
        if let Value::Application(application) = specifier.root_ancestor() {
            let application = Arc::clone(application);
            let arguments = Arguments::new(Commands::Set.id())
                .with(Parameters::Direct.id(), Value::Specifier(Arc::clone(&specifier)))
                .with(Parameters::SetTo.id(), value);
            return match self.send_remote(&application, &arguments)? {
                Some(result) => Ok(result),
                None => Err(ErrorKind::RemoteCommandError {
                    remote: application.to_string(),
                    command: Commands::Set.name().to_owned(),
                    reason: ProtocolError::EventNotHandled,
                }
                .into()),
            };
        }
        if !specifier.kind.is_property() {
            return Err(ErrorKind::NonPropertyIsNotWritable {
                specifier: specifier.to_string(),
            }
            .into());
        }
        let parent = match &specifier.parent {
            Value::Specifier(parent) => self.evaluate_specifier(parent)?,
            other => other.clone(),
        };
        match parent {
            Value::Global => {
                self.rt.globals.set(specifier.term.clone(), value.clone())?;
                Ok(value)
            }
            other => Err(ErrorKind::NoWritablePropertyExists {
                container: other.to_string(),
                property: self.rt.term_name(&specifier.term),
            }
            .into()),
        }
    }
}
