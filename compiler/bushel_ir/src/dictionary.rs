//! Term dictionaries.
//!
//! An insertion-ordered collection of [`Term`]s indexed by identity and by
//! display name. Conflicts are resolved deterministically:
//!
//! - **Same identity**: the newer term replaces the older one, but the
//!   nested dictionaries of both are merged, so a term imported from two
//!   sources accumulates the combined scope.
//! - **Same display name, different identity**: `type` beats `property`
//!   beats `constant`, regardless of insertion order. Any other pairing is
//!   won by the newer term. The losing term stays reachable by identity
//!   and through [`TermDictionary::lookup_name_role`].
//!
//! Terms whose nested scope is exported are tracked in a list kept sorted
//! by identity, used to flatten nested scopes into name resolution.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::term::Term;
use crate::term_id::{SyntacticRole, TermId};
use crate::term_name::TermName;

#[derive(Clone, Default)]
pub struct TermDictionary {
    contents: Vec<Term>,
    by_id: FxHashMap<TermId, usize>,
    by_name: FxHashMap<TermName, usize>,
    exporting: Vec<TermId>,
}

/// Whether the incumbent `old` keeps a display name against `new`.
fn old_keeps_name(old: SyntacticRole, new: SyntacticRole) -> bool {
    let (old, new) = (old.name_precedence(), new.name_precedence());
    new > 0 && old > new
}

impl TermDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let mut dictionary = Self::new();
        dictionary.add_all(terms);
        dictionary
    }

    pub fn len(&self) -> usize {
        self.contents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contents.is_empty()
    }

    /// Terms in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.contents.iter()
    }

    /// Identities of exporting terms, sorted and unique.
    pub fn exporting_terms(&self) -> &[TermId] {
        &self.exporting
    }

    pub fn lookup_id(&self, id: &TermId) -> Option<&Term> {
        self.by_id.get(id).map(|&index| &self.contents[index])
    }

    pub fn lookup_name(&self, name: &TermName) -> Option<&Term> {
        self.by_name.get(name).map(|&index| &self.contents[index])
    }

    /// Role-filtered name lookup.
    ///
    /// Finds a term that lost its display name to a higher-precedence or
    /// newer term, as long as the role disambiguates it.
    pub fn lookup_name_role(&self, name: &TermName, role: SyntacticRole) -> Option<&Term> {
        match self.lookup_name(name) {
            Some(term) if term.role() == role => Some(term),
            _ => self
                .contents
                .iter()
                .rev()
                .find(|term| term.role() == role && term.name.as_ref() == Some(name)),
        }
    }

    /// Name lookup that also searches exported nested scopes.
    ///
    /// The dictionary's own terms come first, then each exporting term's
    /// nested dictionary in identity order.
    pub fn resolve(&self, name: &TermName) -> Option<&Term> {
        if let Some(term) = self.lookup_name(name) {
            return Some(term);
        }
        self.exporting
            .iter()
            .filter_map(|id| self.lookup_id(id))
            .find_map(|term| term.dictionary.resolve(name))
    }

    pub fn add(&mut self, term: Term) {
        let index = match self.by_id.get(&term.id).copied() {
            Some(index) => {
                let merged = Self::merge_same_identity(&self.contents[index], term);
                let vacated = self.contents[index].name.clone().filter(|old_name| {
                    merged.name.as_ref() != Some(old_name)
                        && self.by_name.get(old_name) == Some(&index)
                });
                self.contents[index] = merged;
                if let Some(old_name) = vacated {
                    self.by_name.remove(&old_name);
                    self.reindex_name(old_name);
                }
                index
            }
            None => {
                let index = self.contents.len();
                self.by_id.insert(term.id.clone(), index);
                self.contents.push(term);
                index
            }
        };

        self.index_name(index);
        self.track_exports(index);
    }

    pub fn add_all(&mut self, terms: impl IntoIterator<Item = Term>) {
        for term in terms {
            self.add(term);
        }
    }

    /// Add every term of `other`, with `other` winning identity conflicts.
    pub fn merge(&mut self, other: &TermDictionary) {
        for term in &other.contents {
            self.add(term.clone());
        }
    }

    fn merge_same_identity(old: &Term, mut new: Term) -> Term {
        if !old.dictionary.is_empty() {
            let mut nested = old.dictionary.clone();
            nested.merge(&new.dictionary);
            new.dictionary = nested;
        }
        if new.name.is_none() {
            new.name.clone_from(&old.name);
        }
        if new.resource.is_none() {
            new.resource.clone_from(&old.resource);
        }
        new
    }

    /// Hand a vacated display name to the best remaining holder, replaying
    /// the usual precedence over insertion order.
    fn reindex_name(&mut self, name: TermName) {
        let winner = self
            .contents
            .iter()
            .enumerate()
            .filter(|(_, term)| term.name.as_ref() == Some(&name))
            .fold(None, |winner: Option<(usize, SyntacticRole)>, (index, term)| match winner {
                Some((_, role)) if old_keeps_name(role, term.role()) => winner,
                _ => Some((index, term.role())),
            });
        if let Some((index, _)) = winner {
            self.by_name.insert(name, index);
        }
    }

    fn index_name(&mut self, index: usize) {
        let Some(name) = self.contents[index].name.clone() else {
            return;
        };
        let new_role = self.contents[index].role();
        match self.by_name.get(&name).copied() {
            Some(existing) if existing != index => {
                if !old_keeps_name(self.contents[existing].role(), new_role) {
                    self.by_name.insert(name, index);
                }
            }
            Some(_) => {}
            None => {
                self.by_name.insert(name, index);
            }
        }
    }

    fn track_exports(&mut self, index: usize) {
        let term = &self.contents[index];
        let position = self.exporting.binary_search(&term.id);
        match (term.exports(), position) {
            (true, Err(insert_at)) => self.exporting.insert(insert_at, term.id.clone()),
            (false, Ok(found)) => {
                self.exporting.remove(found);
            }
            _ => {}
        }
    }
}

impl PartialEq for TermDictionary {
    fn eq(&self, other: &Self) -> bool {
        self.contents == other.contents
    }
}

impl fmt::Debug for TermDictionary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.contents.iter().map(|t| &t.id)).finish()
    }
}

impl FromIterator<Term> for TermDictionary {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        Self::from_terms(iter)
    }
}

impl<'a> IntoIterator for &'a TermDictionary {
    type Item = &'a Term;
    type IntoIter = std::slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for TermDictionary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(&self.contents)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for TermDictionary {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<Term>::deserialize(deserializer).map(TermDictionary::from_terms)
    }
}
