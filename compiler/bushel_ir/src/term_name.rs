//! Display names of terms.

use std::fmt;

use smallvec::SmallVec;

/// A case- and whitespace-normalized display name, stored as words.
///
/// Whitespace separates words. Punctuation and symbols form words of their
/// own, except `_ . - ?`, which stay attached to the surrounding word.
#[derive(Clone, Eq, PartialEq, Hash, PartialOrd, Ord, Default)]
pub struct TermName {
    words: SmallVec<[String; 3]>,
}

fn breaks_word(c: char) -> bool {
    (c.is_ascii_punctuation() || !(c.is_alphanumeric() || c.is_whitespace() || c.is_ascii()))
        && !matches!(c, '_' | '.' | '-' | '?')
}

impl TermName {
    pub fn new(text: &str) -> Self {
        let mut words = SmallVec::new();
        for chunk in text.split_whitespace() {
            let mut current = String::new();
            for c in chunk.chars() {
                if breaks_word(c) {
                    if !current.is_empty() {
                        words.push(std::mem::take(&mut current));
                    }
                    words.push(c.to_string());
                } else {
                    current.extend(c.to_lowercase());
                }
            }
            if !current.is_empty() {
                words.push(current);
            }
        }
        TermName { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl From<&str> for TermName {
    fn from(text: &str) -> Self {
        TermName::new(text)
    }
}

impl fmt::Display for TermName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, word) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(word)?;
        }
        Ok(())
    }
}

impl fmt::Debug for TermName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.to_string())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TermName {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TermName {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(TermName::new(&text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collapses_whitespace_and_case() {
        let name = TermName::new("  Front   Window ");
        assert_eq!(name.words(), &["front".to_owned(), "window".to_owned()]);
        assert_eq!(name.to_string(), "front window");
        assert_eq!(name, TermName::new("front window"));
    }

    #[test]
    fn punctuation_breaks_words() {
        assert_eq!(TermName::new("a≠b").to_string(), "a ≠ b");
        assert_eq!(TermName::new("x,y").to_string(), "x , y");
    }

    #[test]
    fn connector_characters_stay_in_word() {
        assert_eq!(TermName::new("is_ok? file-name v1.2").words().len(), 3);
    }
}
