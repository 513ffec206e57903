//! The global scope object at the bottom of the target stack.

use bushel_ir::builtin_terms::Properties;
use bushel_ir::TermId;
use rustc_hash::FxHashMap;

use super::{term_display_name, Value};
use crate::errors::ErrorKind;
use crate::module::ModuleId;

/// Global properties: the built-in constants, the running script, and
/// whatever the host or the script defines.
#[derive(Clone, Debug, Default)]
pub struct GlobalScope {
    properties: FxHashMap<TermId, Value>,
    top_script: Option<ModuleId>,
}

impl GlobalScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_properties(properties: impl IntoIterator<Item = (TermId, Value)>) -> Self {
        GlobalScope {
            properties: properties.into_iter().collect(),
            top_script: None,
        }
    }

    pub fn get(&self, property: &TermId) -> Option<Value> {
        match Properties::from_id(property) {
            Some(Properties::Pi) => Some(Value::Real(std::f64::consts::PI)),
            Some(Properties::E) => Some(Value::Real(std::f64::consts::E)),
            Some(Properties::TopScript) => Some(self.top_script.map_or(Value::Null, Value::Module)),
            _ => self.properties.get(property).cloned(),
        }
    }

    /// Assign or create a global property. Built-in constants are read-only.
    pub fn set(&mut self, property: TermId, value: Value) -> Result<(), ErrorKind> {
        if matches!(
            Properties::from_id(&property),
            Some(Properties::Pi | Properties::E | Properties::TopScript)
        ) {
            return Err(ErrorKind::NoWritablePropertyExists {
                container: "global scope".to_owned(),
                property: term_display_name(&property),
            });
        }
        self.properties.insert(property, value);
        Ok(())
    }

    pub fn set_top_script(&mut self, module: Option<ModuleId>) {
        self.top_script = module;
    }

    pub fn top_script(&self) -> Option<ModuleId> {
        self.top_script
    }
}
