use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::accumulator::ShardedAccumulator;
use crate::config::{EngineConfig, ExecutionPolicy};
use crate::index::{DocId, DocumentStatus, InvertedIndex};
use crate::query::Query;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: DocId,
    pub relevance: f64,
    pub rating: i32,
}

/// Decides which documents may be scored by a query.
pub trait DocumentFilter: Sync {
    fn accept(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool;
}

impl DocumentFilter for DocumentStatus {
    fn accept(&self, _id: DocId, status: DocumentStatus, _rating: i32) -> bool {
        *self == status
    }
}

impl<F> DocumentFilter for F
where
    F: Fn(DocId, DocumentStatus, i32) -> bool + Sync,
{
    fn accept(&self, id: DocId, status: DocumentStatus, rating: i32) -> bool {
        self(id, status, rating)
    }
}

/// Score every document matching the query's plus terms, then drop documents
/// containing any minus term. Minus terms are applied after all scoring has
/// finished and ignore the filter.
pub fn find_all_documents<P: DocumentFilter + ?Sized>(
    index: &InvertedIndex,
    query: &Query<'_>,
    policy: ExecutionPolicy,
    config: &EngineConfig,
    filter: &P,
) -> Vec<SearchHit> {
    let relevance: ShardedAccumulator<DocId, f64> = ShardedAccumulator::new(policy.shard_count(config));

    let accumulate = |term: &&str| {
        let Some(postings) = index.postings(term) else { return };
        let idf = index.inverse_document_freq(postings);
        for (&id, &tf) in postings {
            let Some(meta) = index.meta(id) else { continue };
            if filter.accept(id, meta.status, meta.rating) {
                *relevance.at(id) += tf * idf;
            }
        }
    };
    match policy {
        ExecutionPolicy::Sequential => query.plus.iter().for_each(accumulate),
        ExecutionPolicy::Parallel => query.plus.par_iter().for_each(accumulate),
    }

    for term in &query.minus {
        let Some(postings) = index.postings(term) else { continue };
        for &id in postings.keys() {
            relevance.erase(id);
        }
    }

    relevance
        .drain()
        .into_iter()
        .filter_map(|(id, relevance)| {
            let meta = index.meta(id)?;
            Some(SearchHit { id, relevance, rating: meta.rating })
        })
        .collect()
}

/// Order by relevance descending. Hits whose relevance lies within `epsilon`
/// of the first hit of their run are ties and are ordered by rating
/// descending, then by ascending id. Tied hits never fall back to their exact
/// relevance bits, which differ with the order parallel workers add terms.
pub fn sort_hits(hits: &mut [SearchHit], epsilon: f64) {
    hits.sort_by(|a, b| {
        b.relevance
            .total_cmp(&a.relevance)
            .then(b.rating.cmp(&a.rating))
            .then(a.id.cmp(&b.id))
    });
    let mut start = 0;
    while start < hits.len() {
        let head = hits[start].relevance;
        let run = hits[start..].iter().take_while(|hit| head - hit.relevance < epsilon).count();
        hits[start..start + run].sort_by(|a, b| b.rating.cmp(&a.rating).then(a.id.cmp(&b.id)));
        start += run;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(id: DocId, relevance: f64, rating: i32) -> SearchHit {
        SearchHit { id, relevance, rating }
    }

    #[test]
    fn sorts_by_relevance_then_rating() {
        let mut hits = vec![hit(1, 0.2, 9), hit(2, 0.9, 1), hit(3, 0.5, 0), hit(4, 0.5 + 1e-8, -3), hit(5, 0.5, 7)];
        sort_hits(&mut hits, 1e-6);
        let ids: Vec<DocId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![2, 5, 3, 4, 1]);
    }

    #[test]
    fn equal_hits_keep_id_order() {
        let mut hits = vec![hit(9, 0.3, 1), hit(4, 0.3, 1), hit(6, 0.3, 1)];
        sort_hits(&mut hits, 1e-6);
        let ids: Vec<DocId> = hits.iter().map(|h| h.id).collect();
        assert_eq!(ids, vec![4, 6, 9]);
    }

    #[test]
    fn last_bit_relevance_difference_does_not_reorder_ties() {
        let x = 0.471_234_567_f64;
        let next = f64::from_bits(x.to_bits() + 1);
        let mut a = vec![hit(0, x, 1), hit(1, next, 1)];
        let mut b = vec![hit(0, next, 1), hit(1, x, 1)];
        sort_hits(&mut a, 1e-6);
        sort_hits(&mut b, 1e-6);
        let ids = |hits: &[SearchHit]| hits.iter().map(|h| h.id).collect::<Vec<_>>();
        assert_eq!(ids(&a), vec![0, 1]);
        assert_eq!(ids(&b), vec![0, 1]);
    }

    #[test]
    fn status_and_closure_filters() {
        assert!(DocumentStatus::Banned.accept(1, DocumentStatus::Banned, 0));
        assert!(!DocumentStatus::Banned.accept(1, DocumentStatus::Actual, 0));
        let even = |id: DocId, _: DocumentStatus, _: i32| id % 2 == 0;
        assert!(even.accept(2, DocumentStatus::Removed, 0));
        assert!(!even.accept(3, DocumentStatus::Actual, 0));
    }
}
