//! Binary and unary operators.
//!
//! Operators carry no semantics of their own: each maps to a built-in
//! command, and evaluation dispatches that command through the module stack
//! so scripts and libraries can overload them.

use crate::builtin_terms::Commands;

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum BinaryOp {
    // Logical
    Or,
    Xor,
    And,

    // Comparison
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    StartsWith,
    EndsWith,
    Contains,
    NotContains,
    ContainedBy,
    NotContainedBy,

    // Type tests
    IsA,
    IsNotA,

    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Other
    Concatenate,
    Coerce,
}

impl BinaryOp {
    /// Returns the source-level spelling, used in error messages.
    pub const fn as_symbol(self) -> &'static str {
        self.command().name()
    }

    /// The command this operator dispatches to.
    pub const fn command(self) -> Commands {
        match self {
            Self::Or => Commands::Or,
            Self::Xor => Commands::Xor,
            Self::And => Commands::And,
            Self::Equal => Commands::Equal,
            Self::NotEqual => Commands::NotEqual,
            Self::Less => Commands::Less,
            Self::LessEqual => Commands::LessEqual,
            Self::Greater => Commands::Greater,
            Self::GreaterEqual => Commands::GreaterEqual,
            Self::StartsWith => Commands::StartsWith,
            Self::EndsWith => Commands::EndsWith,
            Self::Contains => Commands::Contains,
            Self::NotContains => Commands::NotContains,
            Self::ContainedBy => Commands::ContainedBy,
            Self::NotContainedBy => Commands::NotContainedBy,
            Self::IsA => Commands::IsA,
            Self::IsNotA => Commands::IsNotA,
            Self::Add => Commands::Add,
            Self::Subtract => Commands::Subtract,
            Self::Multiply => Commands::Multiply,
            Self::Divide => Commands::Divide,
            Self::Concatenate => Commands::Concatenate,
            Self::Coerce => Commands::Coerce,
        }
    }

    /// `and`, `or`, `xor`: combine two predicates in a test clause.
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::Or | Self::Xor | Self::And)
    }

    /// Operators a test clause may compare with.
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessEqual
                | Self::Greater
                | Self::GreaterEqual
                | Self::StartsWith
                | Self::EndsWith
                | Self::Contains
                | Self::NotContains
                | Self::ContainedBy
                | Self::NotContainedBy
        )
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum UnaryOp {
    Not,
    Negate,
}

impl UnaryOp {
    pub const fn command(self) -> Commands {
        match self {
            Self::Not => Commands::Not,
            Self::Negate => Commands::Negate,
        }
    }
}
