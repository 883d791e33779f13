use rayon::prelude::*;

use crate::error::Result;
use crate::flatten::{Flattened, FlattenedRefs};
use crate::ranker::SearchHit;
use crate::server::SearchServer;

/// Run every query on the rayon pool. Results keep the order of `queries`;
/// the first failing query fails the batch.
pub fn process_queries<Q>(server: &SearchServer, queries: &[Q]) -> Result<Vec<Vec<SearchHit>>>
where
    Q: AsRef<str> + Sync,
{
    queries
        .par_iter()
        .map(|query| server.find_top_documents(query.as_ref()))
        .collect()
}

pub fn process_queries_joined<Q>(server: &SearchServer, queries: &[Q]) -> Result<JoinedResults>
where
    Q: AsRef<str> + Sync,
{
    process_queries(server, queries).map(JoinedResults::from)
}

/// Per-query result lists presented as one sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JoinedResults {
    batches: Vec<Vec<SearchHit>>,
}

impl JoinedResults {
    pub fn iter(&self) -> FlattenedRefs<'_, Vec<SearchHit>> {
        Flattened::new(&self.batches)
    }

    pub fn batches(&self) -> &[Vec<SearchHit>] {
        &self.batches
    }

    pub fn len(&self) -> usize {
        self.batches.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.iter().all(Vec::is_empty)
    }
}

impl From<Vec<Vec<SearchHit>>> for JoinedResults {
    fn from(batches: Vec<Vec<SearchHit>>) -> Self {
        Self { batches }
    }
}

impl<'a> IntoIterator for &'a JoinedResults {
    type Item = &'a SearchHit;
    type IntoIter = FlattenedRefs<'a, Vec<SearchHit>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
