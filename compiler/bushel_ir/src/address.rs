//! Semantic addresses: the portable half of a term's identity.
//!
//! An address is independent of the display name. It is either a
//! hierarchical pathname, a tuple of one to three four-character codes (the
//! remote automation protocol's native addressing), or an opaque resource
//! name. Every address has a normalized `scheme:name` string form.

use std::fmt;
use std::str::FromStr;

use smallvec::SmallVec;

/// A four-character code, stored as the big-endian bytes of its characters.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Code(u32);

impl Code {
    #[inline]
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        Code(u32::from_be_bytes(bytes))
    }

    #[inline]
    pub const fn from_raw(raw: u32) -> Self {
        Code(raw)
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Parse exactly four ASCII characters.
    pub fn parse(text: &str) -> Option<Code> {
        let bytes: [u8; 4] = text.as_bytes().try_into().ok()?;
        bytes.is_ascii().then(|| Code::from_bytes(bytes))
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.to_bytes() {
            let c = if byte.is_ascii_graphic() || byte == b' ' {
                char::from(byte)
            } else {
                '?'
            };
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{self}'")
    }
}

/// Ordered list of name segments, rendered `a/b/c`.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct Pathname {
    segments: SmallVec<[String; 2]>,
}

impl Pathname {
    pub const SEPARATOR: char = '/';

    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Pathname {
            segments: segments.into_iter().map(Into::into).collect(),
        }
    }

    /// Split a `/`-separated string; empty segments are dropped.
    pub fn parse(text: &str) -> Self {
        Pathname::new(text.split(Self::SEPARATOR).filter(|s| !s.is_empty()))
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn last(&self) -> Option<&str> {
        self.segments.last().map(String::as_str)
    }

    /// A pathname one level deeper.
    #[must_use]
    pub fn appending(&self, segment: impl Into<String>) -> Pathname {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Pathname { segments }
    }
}

impl fmt::Display for Pathname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                write!(f, "{}", Self::SEPARATOR)?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Pathname {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// The portable identity of a term, independent of its display name.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub enum SemanticAddress {
    Pathname(Pathname),
    Code1(Code),
    Code2(Code, Code),
    Code3(Code, Code, Code),
    Resource(String),
}

impl SemanticAddress {
    /// Pathname address from `/`-separated text.
    pub fn path(text: &str) -> Self {
        SemanticAddress::Pathname(Pathname::parse(text))
    }

    pub const fn code(code: [u8; 4]) -> Self {
        SemanticAddress::Code1(Code::from_bytes(code))
    }

    /// Two-code address from an eight-character string such as `coregetd`.
    pub const fn code2(codes: [u8; 8]) -> Self {
        SemanticAddress::Code2(
            Code::from_bytes([codes[0], codes[1], codes[2], codes[3]]),
            Code::from_bytes([codes[4], codes[5], codes[6], codes[7]]),
        )
    }

    pub fn resource(name: impl Into<String>) -> Self {
        SemanticAddress::Resource(name.into())
    }

    /// The scheme prefix of the normalized form.
    pub const fn scheme(&self) -> &'static str {
        match self {
            SemanticAddress::Pathname(_) => "id",
            SemanticAddress::Code1(_) => "ae4",
            SemanticAddress::Code2(..) => "ae8",
            SemanticAddress::Code3(..) => "ae12",
            SemanticAddress::Resource(_) => "res",
        }
    }

    /// Whether this address is expressible in the remote protocol's codes.
    pub const fn is_code(&self) -> bool {
        matches!(
            self,
            SemanticAddress::Code1(_) | SemanticAddress::Code2(..) | SemanticAddress::Code3(..)
        )
    }

    pub fn as_pathname(&self) -> Option<&Pathname> {
        match self {
            SemanticAddress::Pathname(path) => Some(path),
            _ => None,
        }
    }

    /// The final name component, used as a fallback display name.
    pub fn short_name(&self) -> String {
        match self {
            SemanticAddress::Pathname(path) => path.last().unwrap_or_default().to_owned(),
            SemanticAddress::Resource(name) => name.clone(),
            _ => self.to_string(),
        }
    }
}

impl fmt::Display for SemanticAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.scheme())?;
        match self {
            SemanticAddress::Pathname(path) => write!(f, "{path}"),
            SemanticAddress::Code1(a) => write!(f, "{a}"),
            SemanticAddress::Code2(a, b) => write!(f, "{a}{b}"),
            SemanticAddress::Code3(a, b, c) => write!(f, "{a}{b}{c}"),
            SemanticAddress::Resource(name) => f.write_str(name),
        }
    }
}

impl fmt::Debug for SemanticAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

/// Error when parsing the normalized `scheme:name` form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressParseError {
    MissingScheme(String),
    UnknownScheme(String),
    BadCodes(String),
}

impl fmt::Display for AddressParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressParseError::MissingScheme(text) => {
                write!(f, "semantic address `{text}` has no scheme")
            }
            AddressParseError::UnknownScheme(scheme) => {
                write!(f, "unknown semantic address scheme `{scheme}`")
            }
            AddressParseError::BadCodes(text) => {
                write!(f, "`{text}` is not a sequence of four-character codes")
            }
        }
    }
}

impl std::error::Error for AddressParseError {}

fn split_codes<const N: usize>(text: &str) -> Option<[Code; N]> {
    if text.len() != N * 4 || !text.is_ascii() {
        return None;
    }
    let mut codes = [Code::from_raw(0); N];
    for (i, code) in codes.iter_mut().enumerate() {
        *code = Code::parse(&text[i * 4..i * 4 + 4])?;
    }
    Some(codes)
}

impl FromStr for SemanticAddress {
    type Err = AddressParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let (scheme, name) = text
            .split_once(':')
            .ok_or_else(|| AddressParseError::MissingScheme(text.to_owned()))?;
        let bad = || AddressParseError::BadCodes(name.to_owned());
        Ok(match scheme {
            "id" => SemanticAddress::Pathname(Pathname::parse(name)),
            "ae4" => {
                let [a] = split_codes::<1>(name).ok_or_else(bad)?;
                SemanticAddress::Code1(a)
            }
            "ae8" => {
                let [a, b] = split_codes::<2>(name).ok_or_else(bad)?;
                SemanticAddress::Code2(a, b)
            }
            "ae12" => {
                let [a, b, c] = split_codes::<3>(name).ok_or_else(bad)?;
                SemanticAddress::Code3(a, b, c)
            }
            "res" => SemanticAddress::Resource(name.to_owned()),
            other => return Err(AddressParseError::UnknownScheme(other.to_owned())),
        })
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for SemanticAddress {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for SemanticAddress {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
