//! Object-query forms shared by the expression tree and runtime specifiers.

/// How a specifier selects from its parent.
///
/// `D` is the type of selector data (an expression id in the tree, a value
/// at runtime); `P` is the type of a test clause.
#[derive(Clone, PartialEq, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum SpecifierKind<D, P> {
    /// Index or name, decided by the datum's type.
    Simple(D),
    Index(D),
    Name(D),
    Id(D),
    All,
    First,
    Middle,
    Last,
    Random,
    Previous,
    Next,
    Range {
        from: D,
        thru: D,
    },
    Test(P),
    Property,
}

impl<D, P> SpecifierKind<D, P> {
    /// Form name used in error messages and logs.
    pub const fn form_name(&self) -> &'static str {
        match self {
            Self::Simple(_) => "simple",
            Self::Index(_) => "index",
            Self::Name(_) => "name",
            Self::Id(_) => "id",
            Self::All => "every",
            Self::First => "first",
            Self::Middle => "middle",
            Self::Last => "last",
            Self::Random => "some",
            Self::Previous => "previous",
            Self::Next => "next",
            Self::Range { .. } => "range",
            Self::Test(_) => "whose",
            Self::Property => "property",
        }
    }

    pub const fn is_property(&self) -> bool {
        matches!(self, Self::Property)
    }

    /// Convert selector data and test clause, keeping the form.
    pub fn try_map<D2, P2, E>(
        &self,
        mut data: impl FnMut(&D) -> Result<D2, E>,
        test: impl FnOnce(&P) -> Result<P2, E>,
    ) -> Result<SpecifierKind<D2, P2>, E> {
        Ok(match self {
            Self::Simple(d) => SpecifierKind::Simple(data(d)?),
            Self::Index(d) => SpecifierKind::Index(data(d)?),
            Self::Name(d) => SpecifierKind::Name(data(d)?),
            Self::Id(d) => SpecifierKind::Id(data(d)?),
            Self::All => SpecifierKind::All,
            Self::First => SpecifierKind::First,
            Self::Middle => SpecifierKind::Middle,
            Self::Last => SpecifierKind::Last,
            Self::Random => SpecifierKind::Random,
            Self::Previous => SpecifierKind::Previous,
            Self::Next => SpecifierKind::Next,
            Self::Range { from, thru } => SpecifierKind::Range {
                from: data(from)?,
                thru: data(thru)?,
            },
            Self::Test(p) => SpecifierKind::Test(test(p)?),
            Self::Property => SpecifierKind::Property,
        })
    }
}

/// Where an insertion specifier points relative to its parent.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum InsertionKind {
    Beginning,
    End,
    Before,
    After,
}

impl InsertionKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Beginning => "beginning",
            Self::End => "end",
            Self::Before => "before",
            Self::After => "after",
        }
    }
}
