use std::fmt;

use thiserror::Error;

use crate::DocId;

/// Why a document id was refused by `add_document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidDocumentReason {
    Negative,
    Duplicate,
}

impl fmt::Display for InvalidDocumentReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidDocumentReason::Negative => f.write_str("id is negative"),
            InvalidDocumentReason::Duplicate => f.write_str("id is already indexed"),
        }
    }
}

/// Errors surfaced by the search engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SearchError {
    #[error("Invalid document {id}: {reason}")]
    InvalidDocument { id: DocId, reason: InvalidDocumentReason },

    #[error("Invalid term {0:?}: contains a control character")]
    InvalidTerm(String),

    #[error("Invalid query term {0:?}")]
    InvalidQuery(String),

    #[error("Unknown document: {0}")]
    UnknownDocument(DocId),
}

pub type Result<T> = std::result::Result<T, SearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SearchError::InvalidDocument { id: -1, reason: InvalidDocumentReason::Negative };
        assert_eq!(err.to_string(), "Invalid document -1: id is negative");
        assert_eq!(SearchError::UnknownDocument(7).to_string(), "Unknown document: 7");
        assert_eq!(SearchError::InvalidQuery("--x".into()).to_string(), "Invalid query term \"--x\"");
    }
}
