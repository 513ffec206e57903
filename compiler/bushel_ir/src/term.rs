//! Terms: identity-bearing language symbols.

use crate::address::SemanticAddress;
use crate::dictionary::TermDictionary;
use crate::term_id::{SyntacticRole, TermId};
use crate::term_name::TermName;

/// What a resource term is bound to.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Resource {
    /// The built-in core module.
    Core,
    /// An application located by its display name.
    ApplicationByName { name: String },
    /// An application located by bundle identifier.
    ApplicationById { bundle_id: String },
    /// A script library; `locator` is handed to the resource loader.
    Library { name: String, locator: String },
}

impl Resource {
    /// Key under which the loader caches this resource's terminology.
    pub fn locator(&self) -> Option<&str> {
        match self {
            Resource::Core => None,
            Resource::ApplicationByName { name } => Some(name),
            Resource::ApplicationById { bundle_id } => Some(bundle_id),
            Resource::Library { locator, .. } => Some(locator),
        }
    }

    pub fn is_application(&self) -> bool {
        matches!(
            self,
            Resource::ApplicationByName { .. } | Resource::ApplicationById { .. }
        )
    }
}

/// A named, identity-bearing language symbol.
///
/// A term may introduce a scope of its own (a command's parameters live in
/// its nested dictionary). Commands never export that scope: a parameter is
/// meaningless outside its command.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Term {
    pub id: TermId,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<TermName>,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "TermDictionary::is_empty"))]
    pub dictionary: TermDictionary,
    #[cfg_attr(feature = "serde", serde(default))]
    exports: bool,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub resource: Option<Resource>,
}

impl Term {
    pub fn new(role: SyntacticRole, address: SemanticAddress, name: Option<TermName>) -> Self {
        Term {
            id: TermId::new(role, address),
            name,
            dictionary: TermDictionary::new(),
            exports: false,
            resource: None,
        }
    }

    /// A term with a display name.
    pub fn named(id: TermId, name: &str) -> Self {
        Term {
            id,
            name: Some(TermName::new(name)),
            dictionary: TermDictionary::new(),
            exports: false,
            resource: None,
        }
    }

    #[must_use]
    pub fn with_dictionary(mut self, dictionary: TermDictionary) -> Self {
        self.dictionary = dictionary;
        self
    }

    /// Make this term's nested dictionary visible from the enclosing scope.
    ///
    /// Ignored for commands.
    #[must_use]
    pub fn exporting(mut self, exports: bool) -> Self {
        self.set_exports(exports);
        self
    }

    #[must_use]
    pub fn with_resource(mut self, resource: Resource) -> Self {
        self.resource = Some(resource);
        self
    }

    pub fn set_exports(&mut self, exports: bool) {
        self.exports = exports && self.id.role != SyntacticRole::Command;
    }

    pub fn exports(&self) -> bool {
        self.exports && self.id.role != SyntacticRole::Command
    }

    pub fn role(&self) -> SyntacticRole {
        self.id.role
    }

    /// The display name, or the address's short name when unnamed.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.to_string(),
            None => self.id.address.short_name(),
        }
    }
}
