use std::collections::HashMap;

use crate::TermId;

/// Canonical storage for every distinct term seen by the index.
///
/// Forward and inverted entries refer to terms by `TermId`; the spelling lives
/// here exactly once. Terms are never removed, so a handle stays valid for the
/// lifetime of the pool.
#[derive(Debug, Default)]
pub struct TermPool {
    dictionary: HashMap<String, TermId>,
    terms: Vec<String>,
}

impl TermPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for `term`, storing it on first sighting.
    pub fn intern(&mut self, term: &str) -> TermId {
        if let Some(&id) = self.dictionary.get(term) {
            return id;
        }
        let id = self.terms.len() as TermId;
        self.terms.push(term.to_string());
        self.dictionary.insert(term.to_string(), id);
        id
    }

    pub fn lookup(&self, term: &str) -> Option<TermId> {
        self.dictionary.get(term).copied()
    }

    /// Canonical spelling of a handle issued by this pool.
    pub fn resolve(&self, id: TermId) -> &str {
        &self.terms[id as usize]
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interns_each_spelling_once() {
        let mut pool = TermPool::new();
        let cat = pool.intern("cat");
        let dog = pool.intern("dog");
        assert_ne!(cat, dog);
        assert_eq!(pool.intern("cat"), cat);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.resolve(dog), "dog");
        assert_eq!(pool.lookup("cat"), Some(cat));
        assert_eq!(pool.lookup("bird"), None);
    }
}
