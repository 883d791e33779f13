use std::collections::{BTreeSet, HashSet};

use tracing::info;

use crate::error::Result;
use crate::index::DocId;
use crate::server::SearchServer;

/// Remove every document whose set of terms (frequencies ignored) equals that
/// of a document with a smaller id. Returns the removed ids, ascending.
pub fn remove_duplicates(server: &mut SearchServer) -> Result<Vec<DocId>> {
    let mut seen: HashSet<BTreeSet<&str>> = HashSet::new();
    let mut duplicates = Vec::new();
    for id in server.document_ids() {
        let signature: BTreeSet<&str> = server.word_frequencies(id).iter().map(|(term, _)| term).collect();
        if !seen.insert(signature) {
            duplicates.push(id);
        }
    }
    drop(seen);

    for &id in &duplicates {
        server.remove_document(id)?;
        info!(id, "found duplicate document");
    }
    Ok(duplicates)
}
