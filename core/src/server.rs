use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::debug;

use crate::config::{EngineConfig, ExecutionPolicy};
use crate::error::{Result, SearchError};
use crate::index::{average_rating, DocId, DocMeta, DocumentIds, DocumentStatus, InvertedIndex, WordFrequencies};
use crate::query::Query;
use crate::ranker::{find_all_documents, sort_hits, DocumentFilter, SearchHit};
use crate::tokenizer::{split_into_words, StopWords};

/// In-memory TF-IDF search engine.
///
/// Queries take `&self` and may run from many threads at once. Adding and
/// removing documents takes `&mut self`, so structural changes can never
/// overlap an in-flight query.
pub struct SearchServer {
    index: InvertedIndex,
    config: EngineConfig,
}

impl SearchServer {
    pub fn new<I, S>(stop_words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(stop_words, EngineConfig::default())
    }

    pub fn with_config<I, S>(stop_words: I, config: EngineConfig) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stop_words = StopWords::new(stop_words)?;
        Ok(Self { index: InvertedIndex::new(stop_words), config })
    }

    /// Stop words given as one space-separated string.
    pub fn from_stop_words_text(text: &str) -> Result<Self> {
        Self::with_config(split_into_words(text), EngineConfig::default())
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stop_words(&self) -> &StopWords {
        self.index.stop_words()
    }

    pub fn add_document(&mut self, id: DocId, text: &str, status: DocumentStatus, ratings: &[i32]) -> Result<()> {
        let meta = DocMeta { rating: average_rating(ratings), status };
        let words = self.index.insert(id, text, meta)?;
        debug!(id, words, ?status, rating = meta.rating, "document added");
        Ok(())
    }

    /// Removal is always sequential: it needs `&mut self` and touches only the
    /// removed document's terms.
    pub fn remove_document(&mut self, id: DocId) -> Result<()> {
        self.index.remove(id)?;
        debug!(id, "document removed");
        Ok(())
    }

    /// Top documents with status `Actual`, scored sequentially.
    pub fn find_top_documents(&self, raw_query: &str) -> Result<Vec<SearchHit>> {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, DocumentStatus::Actual)
    }

    pub fn find_top_documents_filtered<P: DocumentFilter>(&self, raw_query: &str, filter: P) -> Result<Vec<SearchHit>> {
        self.find_top_documents_with(ExecutionPolicy::Sequential, raw_query, filter)
    }

    /// Rank documents accepted by `filter` against `raw_query`, best first, at
    /// most `max_results` of them.
    pub fn find_top_documents_with<P: DocumentFilter>(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        filter: P,
    ) -> Result<Vec<SearchHit>> {
        let query = Query::parse(raw_query, self.index.stop_words())?;
        let mut hits = find_all_documents(&self.index, &query, policy, &self.config, &filter);
        let matched = hits.len();
        sort_hits(&mut hits, self.config.relevance_epsilon);
        hits.truncate(self.config.max_results);
        debug!(
            plus = query.plus.len(),
            minus = query.minus.len(),
            ?policy,
            matched,
            returned = hits.len(),
            "query ranked"
        );
        Ok(hits)
    }

    pub fn match_document(&self, raw_query: &str, id: DocId) -> Result<(Vec<&str>, DocumentStatus)> {
        self.match_document_with(ExecutionPolicy::Sequential, raw_query, id)
    }

    /// Plus terms of the query found in document `id`, in term order, with the
    /// document's status. The term list is empty if any minus term is present.
    pub fn match_document_with(
        &self,
        policy: ExecutionPolicy,
        raw_query: &str,
        id: DocId,
    ) -> Result<(Vec<&str>, DocumentStatus)> {
        let meta = self.index.meta(id).ok_or(SearchError::UnknownDocument(id))?;
        let query = Query::parse(raw_query, self.index.stop_words())?;

        let present = |term: &&str| self.index.term_in_document(id, term).is_some();
        let excluded = match policy {
            ExecutionPolicy::Sequential => query.minus.iter().any(present),
            ExecutionPolicy::Parallel => query.minus.par_iter().any(present),
        };
        if excluded {
            return Ok((Vec::new(), meta.status));
        }

        let canonical = |term: &&str| self.index.term_in_document(id, term);
        let matched: Vec<&str> = match policy {
            ExecutionPolicy::Sequential => query.plus.iter().filter_map(canonical).collect(),
            ExecutionPolicy::Parallel => query.plus.par_iter().filter_map(canonical).collect(),
        };
        Ok((matched, meta.status))
    }

    /// Term frequencies of document `id`; empty for an unknown id.
    pub fn word_frequencies(&self, id: DocId) -> WordFrequencies<'_> {
        self.index.word_frequencies(id)
    }

    /// Inverted entry of `term`, if any indexed document contains it.
    pub fn document_frequencies(&self, term: &str) -> Option<&BTreeMap<DocId, f64>> {
        self.index.postings(term)
    }

    pub fn document_ids(&self) -> DocumentIds<'_> {
        self.index.document_ids()
    }

    pub fn document_count(&self) -> usize {
        self.index.document_count()
    }
}

impl<'a> IntoIterator for &'a SearchServer {
    type Item = DocId;
    type IntoIter = DocumentIds<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.document_ids()
    }
}
