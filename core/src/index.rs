use serde::{Deserialize, Serialize};
use std::collections::{btree_map, BTreeMap, HashMap};
use std::iter::Copied;

use crate::error::{InvalidDocumentReason, Result, SearchError};
use crate::terms::TermPool;
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};

pub type TermId = u32;
pub type DocId = i32;

/// Ascending ids of the indexed documents.
pub type DocumentIds<'a> = Copied<btree_map::Keys<'a, DocId, DocMeta>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentStatus {
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub rating: i32,
    pub status: DocumentStatus,
}

/// Truncating integer mean; zero for no ratings.
pub fn average_rating(ratings: &[i32]) -> i32 {
    if ratings.is_empty() {
        return 0;
    }
    let sum: i64 = ratings.iter().map(|&r| i64::from(r)).sum();
    (sum / ratings.len() as i64) as i32
}

/// Forward and inverted term-frequency maps kept as mirrors of each other.
///
/// For every `(doc, term, tf)` in `forward` the same triple is in `postings`
/// and vice versa. A term with no remaining documents has no `postings` entry.
#[derive(Debug, Default)]
pub struct InvertedIndex {
    pool: TermPool,
    stop_words: StopWords,
    forward: BTreeMap<DocId, BTreeMap<TermId, f64>>,
    postings: HashMap<TermId, BTreeMap<DocId, f64>>,
    docs: BTreeMap<DocId, DocMeta>,
}

impl InvertedIndex {
    pub fn new(stop_words: StopWords) -> Self {
        Self { stop_words, ..Self::default() }
    }

    pub fn stop_words(&self) -> &StopWords {
        &self.stop_words
    }

    pub fn terms(&self) -> &TermPool {
        &self.pool
    }

    /// Index a document. Every word is validated before anything is mutated,
    /// so a rejected document leaves the index untouched.
    pub fn insert(&mut self, id: DocId, text: &str, meta: DocMeta) -> Result<usize> {
        if id < 0 {
            return Err(SearchError::InvalidDocument { id, reason: InvalidDocumentReason::Negative });
        }
        if self.docs.contains_key(&id) {
            return Err(SearchError::InvalidDocument { id, reason: InvalidDocumentReason::Duplicate });
        }
        let mut words = Vec::new();
        for word in split_into_words(text) {
            if !is_valid_word(word) {
                return Err(SearchError::InvalidTerm(word.to_string()));
            }
            if !self.stop_words.contains(word) {
                words.push(word);
            }
        }

        let inv_word_count = 1.0 / words.len() as f64;
        let mut frequencies: BTreeMap<TermId, f64> = BTreeMap::new();
        for word in &words {
            let term = self.pool.intern(word);
            *frequencies.entry(term).or_insert(0.0) += inv_word_count;
        }
        for (&term, &tf) in &frequencies {
            self.postings.entry(term).or_default().insert(id, tf);
        }
        self.forward.insert(id, frequencies);
        self.docs.insert(id, meta);
        Ok(words.len())
    }

    pub fn remove(&mut self, id: DocId) -> Result<()> {
        if self.docs.remove(&id).is_none() {
            return Err(SearchError::UnknownDocument(id));
        }
        for term in self.forward.remove(&id).unwrap_or_default().into_keys() {
            if let Some(docs) = self.postings.get_mut(&term) {
                docs.remove(&id);
                if docs.is_empty() {
                    self.postings.remove(&term);
                }
            }
        }
        Ok(())
    }

    pub fn contains(&self, id: DocId) -> bool {
        self.docs.contains_key(&id)
    }

    pub fn meta(&self, id: DocId) -> Option<&DocMeta> {
        self.docs.get(&id)
    }

    pub fn document_count(&self) -> usize {
        self.docs.len()
    }

    pub fn document_ids(&self) -> DocumentIds<'_> {
        self.docs.keys().copied()
    }

    pub fn word_frequencies(&self, id: DocId) -> WordFrequencies<'_> {
        WordFrequencies { terms: self.forward.get(&id), pool: &self.pool }
    }

    /// Documents containing `term` with the term's frequency in each.
    /// `None` when no indexed document contains it.
    pub fn postings(&self, term: &str) -> Option<&BTreeMap<DocId, f64>> {
        let id = self.pool.lookup(term)?;
        self.postings.get(&id)
    }

    /// Canonical spelling of `term` if `id` contains it.
    pub fn term_in_document(&self, id: DocId, term: &str) -> Option<&str> {
        let term_id = self.pool.lookup(term)?;
        self.forward.get(&id)?.contains_key(&term_id).then(|| self.pool.resolve(term_id))
    }

    /// ln(N / df). Only called with non-empty postings.
    pub fn inverse_document_freq(&self, postings: &BTreeMap<DocId, f64>) -> f64 {
        (self.document_count() as f64 / postings.len() as f64).ln()
    }
}

/// Read-only view of one document's forward entry.
#[derive(Clone, Copy)]
pub struct WordFrequencies<'a> {
    terms: Option<&'a BTreeMap<TermId, f64>>,
    pool: &'a TermPool,
}

impl<'a> WordFrequencies<'a> {
    pub fn iter(&self) -> impl Iterator<Item = (&'a str, f64)> + Clone + 'a {
        let pool = self.pool;
        self.terms
            .into_iter()
            .flatten()
            .map(move |(&term, &tf)| (pool.resolve(term), tf))
    }

    pub fn get(&self, term: &str) -> Option<f64> {
        let id = self.pool.lookup(term)?;
        self.terms?.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.terms.map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTUAL: DocMeta = DocMeta { rating: 0, status: DocumentStatus::Actual };

    #[test]
    fn average_rating_truncates() {
        assert_eq!(average_rating(&[1, 3, 2]), 2);
        assert_eq!(average_rating(&[1, 2]), 1);
        assert_eq!(average_rating(&[-1, -2]), -1);
        assert_eq!(average_rating(&[]), 0);
    }

    #[test]
    fn frequencies_sum_to_one_and_mirror() {
        let mut index = InvertedIndex::new(StopWords::default());
        index.insert(1, "fluffy cat fluffy tail", ACTUAL).unwrap();
        let freqs = index.word_frequencies(1);
        assert_eq!(freqs.len(), 3);
        assert_eq!(freqs.get("fluffy"), Some(0.5));
        let total: f64 = freqs.iter().map(|(_, tf)| tf).sum();
        assert!((total - 1.0).abs() < 1e-12);
        for (term, tf) in freqs.iter() {
            assert_eq!(index.postings(term).unwrap()[&1], tf);
        }
    }

    #[test]
    fn rejected_document_leaves_no_trace() {
        let mut index = InvertedIndex::new(StopWords::default());
        let err = index.insert(1, "good bad\u{7}", ACTUAL).unwrap_err();
        assert_eq!(err, SearchError::InvalidTerm("bad\u{7}".into()));
        assert_eq!(index.document_count(), 0);
        assert!(index.terms().is_empty());
        assert!(index.postings("good").is_none());
    }

    #[test]
    fn document_of_only_stop_words_has_empty_entry() {
        let mut index = InvertedIndex::new(StopWords::new(["in", "the"]).unwrap());
        assert_eq!(index.insert(3, "in the", ACTUAL).unwrap(), 0);
        assert!(index.contains(3));
        assert!(index.word_frequencies(3).is_empty());
    }

    #[test]
    fn remove_prunes_empty_postings() {
        let mut index = InvertedIndex::new(StopWords::default());
        index.insert(1, "cat dog", ACTUAL).unwrap();
        index.insert(2, "cat", ACTUAL).unwrap();
        index.remove(1).unwrap();
        assert!(index.postings("dog").is_none());
        assert_eq!(index.postings("cat").unwrap().len(), 1);
        assert_eq!(index.remove(1), Err(SearchError::UnknownDocument(1)));
    }
}
