//! Well-known terms shared by the interpreter and the core module.
//!
//! Each enum names one role's built-in terms and maps them to stable
//! addresses. Terms that exist in the remote protocol use its codes;
//! language-only terms use pathnames.
//!
//! ```ignore
//! use bushel_ir::builtin_terms::Types;
//!
//! assert_eq!(Types::Integer.id().to_string(), "type ae4:long");
//! assert_eq!(Types::from_id(&Types::Integer.id()), Some(Types::Integer));
//! ```

use crate::address::SemanticAddress;
use crate::dictionary::TermDictionary;
use crate::term::{Resource, Term};
use crate::term_id::{SyntacticRole, TermId};

const fn code(c: [u8; 4]) -> SemanticAddress {
    SemanticAddress::code(c)
}

fn path(p: &str) -> SemanticAddress {
    SemanticAddress::path(p)
}

macro_rules! builtin_terms {
    (
        $(#[$meta:meta])*
        pub enum $name:ident : $role:ident {
            $($variant:ident => $address:expr, $display:literal;)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum $name {
            $($variant,)*
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)*];
            pub const ROLE: SyntacticRole = SyntacticRole::$role;

            pub fn address(self) -> SemanticAddress {
                match self {
                    $($name::$variant => $address,)*
                }
            }

            pub fn id(self) -> TermId {
                TermId::new(Self::ROLE, self.address())
            }

            /// Display name in scripts.
            pub const fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $display,)*
                }
            }

            pub fn from_id(id: &TermId) -> Option<Self> {
                if id.role != Self::ROLE {
                    return None;
                }
                Self::ALL.iter().copied().find(|b| b.address() == id.address)
            }

            /// Whether `id` names this built-in.
            pub fn is(self, id: &TermId) -> bool {
                id.role == Self::ROLE && id.address == self.address()
            }

            pub fn term(self) -> Term {
                Term::named(self.id(), self.name())
            }
        }
    };
}

builtin_terms! {
    /// Built-in types.
    pub enum Types: Type {
        Item => code(*b"cobj"), "item";
        Boolean => code(*b"bool"), "boolean";
        Integer => code(*b"long"), "integer";
        Real => code(*b"doub"), "real";
        Number => code(*b"nmbr"), "number";
        String => code(*b"ctxt"), "string";
        List => code(*b"list"), "list";
        Record => code(*b"reco"), "record";
        Specifier => code(*b"obj "), "specifier";
        TestSpecifier => path("test specifier"), "test specifier";
        InsertionSpecifier => code(*b"insl"), "insertion specifier";
        Type => code(*b"type"), "type";
        Constant => code(*b"enum"), "constant";
        Property => code(*b"prop"), "property";
        Null => code(*b"null"), "null";
        Application => code(*b"capp"), "application";
        Function => path("function"), "function";
        Script => code(*b"scpt"), "script";
        CoreModule => path("core"), "core";
        Global => path("global"), "global";
        Error => path("error"), "error";
        Root => path("root"), "root";
    }
}

builtin_terms! {
    /// Built-in properties.
    pub enum Properties: Property {
        Name => code(*b"pnam"), "name";
        Id => code(*b"ID  "), "id";
        Class => code(*b"pcls"), "class";
        Properties => code(*b"pALL"), "properties";
        Length => code(*b"leng"), "length";
        Reverse => code(*b"rvse"), "reverse";
        Rest => code(*b"rest"), "rest";
        Contents => code(*b"pcnt"), "contents";
        Message => path("error/message"), "message";
        Pi => path("math/pi"), "pi";
        E => path("math/e"), "e";
        TopScript => path("top script"), "top script";
    }
}

builtin_terms! {
    /// Built-in constants.
    pub enum Constants: Constant {
        True => code(*b"true"), "true";
        False => code(*b"fals"), "false";
    }
}

builtin_terms! {
    /// Built-in commands, including the commands operators dispatch to.
    pub enum Commands: Command {
        Get => SemanticAddress::code2(*b"coregetd"), "get";
        Set => SemanticAddress::code2(*b"coresetd"), "set";
        Run => path("run"), "run";
        Delay => SemanticAddress::code2(*b"sysodela"), "delay";
        Log => path("log"), "log";
        Not => path("operators/not"), "not";
        Negate => path("operators/negate"), "negate";
        And => path("operators/and"), "and";
        Or => path("operators/or"), "or";
        Xor => path("operators/xor"), "xor";
        Equal => path("operators/equal"), "=";
        NotEqual => path("operators/not equal"), "≠";
        Less => path("operators/less"), "<";
        LessEqual => path("operators/less equal"), "≤";
        Greater => path("operators/greater"), ">";
        GreaterEqual => path("operators/greater equal"), "≥";
        StartsWith => path("operators/starts with"), "starts with";
        EndsWith => path("operators/ends with"), "ends with";
        Contains => path("operators/contains"), "contains";
        NotContains => path("operators/not contains"), "does not contain";
        ContainedBy => path("operators/contained by"), "is in";
        NotContainedBy => path("operators/not contained by"), "is not in";
        IsA => path("operators/is a"), "is a";
        IsNotA => path("operators/is not a"), "is not a";
        Add => path("operators/add"), "+";
        Subtract => path("operators/subtract"), "-";
        Multiply => path("operators/multiply"), "*";
        Divide => path("operators/divide"), "/";
        Concatenate => path("operators/concatenate"), "&";
        Coerce => path("operators/coerce"), "as";
    }
}

builtin_terms! {
    /// Built-in parameters.
    pub enum Parameters: Parameter {
        Direct => code(*b"----"), "direct";
        Target => path(".target"), "target";
        Lhs => path("operators/.lhs"), "left";
        Rhs => path("operators/.rhs"), "right";
        SetTo => code(*b"data"), "to";
    }
}

/// A dictionary with a term for every built-in.
pub fn builtin_dictionary() -> TermDictionary {
    let mut dictionary = TermDictionary::new();
    dictionary.add_all(Types::ALL.iter().map(|t| t.term()));
    dictionary.add_all(Properties::ALL.iter().map(|p| p.term()));
    dictionary.add_all(Constants::ALL.iter().map(|c| c.term()));
    dictionary.add_all(Commands::ALL.iter().map(|c| c.term()));
    dictionary.add(Term::named(TermId::resource("core"), "core").with_resource(Resource::Core));
    dictionary
}
