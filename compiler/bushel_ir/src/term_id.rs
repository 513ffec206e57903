//! Term identity: a syntactic role paired with a semantic address.

use std::fmt;

use crate::address::{Pathname, SemanticAddress};

/// The grammatical role a term plays.
///
/// Declaration order is the identity sort order.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum SyntacticRole {
    Type,
    Property,
    Constant,
    Command,
    Parameter,
    Variable,
    Resource,
}

impl SyntacticRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            SyntacticRole::Type => "type",
            SyntacticRole::Property => "property",
            SyntacticRole::Constant => "constant",
            SyntacticRole::Command => "command",
            SyntacticRole::Parameter => "parameter",
            SyntacticRole::Variable => "variable",
            SyntacticRole::Resource => "resource",
        }
    }

    /// Rank used when two terms claim the same display name.
    ///
    /// `type > property > constant`; every other role ranks equally, in which
    /// case the newer term wins.
    pub const fn name_precedence(self) -> u8 {
        match self {
            SyntacticRole::Type => 3,
            SyntacticRole::Property => 2,
            SyntacticRole::Constant => 1,
            _ => 0,
        }
    }
}

impl fmt::Display for SyntacticRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stable identity of a term.
///
/// Hashable and totally ordered (role first, then address) so that exporting
/// term lists sort deterministically.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TermId {
    pub role: SyntacticRole,
    pub address: SemanticAddress,
}

impl TermId {
    pub const fn new(role: SyntacticRole, address: SemanticAddress) -> Self {
        TermId { role, address }
    }

    pub fn variable(name: &str) -> Self {
        TermId::new(SyntacticRole::Variable, SemanticAddress::path(name))
    }

    pub fn command(path: &str) -> Self {
        TermId::new(SyntacticRole::Command, SemanticAddress::path(path))
    }

    pub fn parameter(path: &str) -> Self {
        TermId::new(SyntacticRole::Parameter, SemanticAddress::path(path))
    }

    pub fn type_(path: &str) -> Self {
        TermId::new(SyntacticRole::Type, SemanticAddress::path(path))
    }

    pub fn property(path: &str) -> Self {
        TermId::new(SyntacticRole::Property, SemanticAddress::path(path))
    }

    pub fn constant(path: &str) -> Self {
        TermId::new(SyntacticRole::Constant, SemanticAddress::path(path))
    }

    pub fn resource(name: &str) -> Self {
        TermId::new(SyntacticRole::Resource, SemanticAddress::resource(name))
    }

    #[inline]
    pub fn is(&self, role: SyntacticRole) -> bool {
        self.role == role
    }

    /// The direct (unnamed) parameter, code `----`.
    pub fn is_direct_parameter(&self) -> bool {
        self.role == SyntacticRole::Parameter && self.address == SemanticAddress::code(*b"----")
    }

    /// The implicit receiver parameter, `.target` at any depth.
    pub fn is_target_parameter(&self) -> bool {
        self.role == SyntacticRole::Parameter
            && self
                .address
                .as_pathname()
                .and_then(|path| path.last())
                .is_some_and(|last| last == ".target")
    }

    /// Address of the command a parameter belongs to, if the address says.
    ///
    /// `cmd/param` belongs to `cmd`; a three-code parameter belongs to the
    /// command named by its first two codes.
    pub fn command_address(&self) -> Option<SemanticAddress> {
        if self.role != SyntacticRole::Parameter {
            return None;
        }
        match &self.address {
            SemanticAddress::Pathname(path) if path.segments().len() > 1 => {
                let parent = &path.segments()[..path.segments().len() - 1];
                Some(SemanticAddress::Pathname(Pathname::new(parent.iter().cloned())))
            }
            SemanticAddress::Code3(class, id, _) => Some(SemanticAddress::Code2(*class, *id)),
            _ => None,
        }
    }
}

impl fmt::Display for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.role, self.address)
    }
}

impl fmt::Debug for TermId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::Code;
    use pretty_assertions::assert_eq;

    #[test]
    fn parameter_helpers() {
        let direct = TermId::new(SyntacticRole::Parameter, SemanticAddress::code(*b"----"));
        assert!(direct.is_direct_parameter());
        assert!(!direct.is_target_parameter());
        assert!(TermId::parameter(".target").is_target_parameter());
        assert!(TermId::parameter("operators/.target").is_target_parameter());

        let nested = TermId::parameter("math/round/to");
        assert_eq!(nested.command_address(), Some(SemanticAddress::path("math/round")));
        assert_eq!(TermId::parameter("to").command_address(), None);

        let coded = TermId::new(
            SyntacticRole::Parameter,
            SemanticAddress::Code3(
                Code::from_bytes(*b"core"),
                Code::from_bytes(*b"setd"),
                Code::from_bytes(*b"data"),
            ),
        );
        assert_eq!(coded.command_address(), Some(SemanticAddress::code2(*b"coresetd")));
    }

    #[test]
    fn orders_by_role_then_address() {
        let mut ids = vec![TermId::variable("a"), TermId::type_("z"), TermId::property("b")];
        ids.sort();
        assert_eq!(ids, vec![TermId::type_("z"), TermId::property("b"), TermId::variable("a")]);
    }
}
