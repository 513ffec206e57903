//! Source locations.
//!
//! Every expression node carries a [`SourceLocation`]: the source it was
//! parsed from plus a compact byte span inside it. The source identity is what
//! lets the runtime tell whether an error raised inside an imported library
//! still points at text the caller can see.

use std::fmt;

/// Source location span.
///
/// Layout: 8 bytes total
/// - start: u32 - byte offset from source start
/// - end: u32 - byte offset (exclusive)
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Span {
    pub start: u32,
    pub end: u32,
}

impl Span {
    /// Dummy span for synthesized nodes.
    pub const DUMMY: Span = Span { start: 0, end: 0 };

    #[inline]
    pub const fn new(start: u32, end: u32) -> Self {
        Span { start, end }
    }
}

impl fmt::Debug for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

/// Identity of one loaded source text (a script or a library).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default, Debug, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(transparent)]
pub struct SourceId(u32);

impl SourceId {
    /// The main script of a run.
    pub const MAIN: SourceId = SourceId(0);

    #[inline]
    pub const fn new(raw: u32) -> Self {
        SourceId(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// A span within a particular source.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceLocation {
    pub source: SourceId,
    pub span: Span,
}

impl SourceLocation {
    pub const DUMMY: SourceLocation = SourceLocation {
        source: SourceId::MAIN,
        span: Span::DUMMY,
    };

    #[inline]
    pub const fn new(source: SourceId, span: Span) -> Self {
        SourceLocation { source, span }
    }

    /// Whether this location lies in the same source as `other`.
    #[inline]
    pub fn same_source(&self, other: &SourceLocation) -> bool {
        self.source == other.source
    }
}

impl fmt::Debug for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}@{:?}", self.source.0, self.span)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source {} at {}..{}", self.source.0, self.span.start, self.span.end)
    }
}
