use std::collections::BTreeSet;

use crate::error::{Result, SearchError};
use crate::tokenizer::{is_valid_word, split_into_words, StopWords};

/// A parsed query: terms a document should contain and terms that exclude it.
/// Slices borrow from the raw query text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query<'q> {
    pub plus: BTreeSet<&'q str>,
    pub minus: BTreeSet<&'q str>,
}

#[derive(Debug, PartialEq, Eq)]
struct QueryWord<'q> {
    text: &'q str,
    is_minus: bool,
}

fn parse_query_word(word: &str) -> Result<QueryWord<'_>> {
    let (text, is_minus) = match word.strip_prefix('-') {
        Some(rest) => (rest, true),
        None => (word, false),
    };
    if text.is_empty() || text.starts_with('-') || !is_valid_word(text) {
        return Err(SearchError::InvalidQuery(word.to_string()));
    }
    Ok(QueryWord { text, is_minus })
}

impl<'q> Query<'q> {
    /// Parse `raw` into plus and minus sets. Stop words are dropped from both;
    /// a `-word` whose `word` is a stop word is dropped rather than excluded.
    pub fn parse(raw: &'q str, stop_words: &StopWords) -> Result<Self> {
        let mut query = Query::default();
        for word in split_into_words(raw) {
            let parsed = parse_query_word(word)?;
            if stop_words.contains(parsed.text) {
                continue;
            }
            if parsed.is_minus {
                query.minus.insert(parsed.text);
            } else {
                query.plus.insert(parsed.text);
            }
        }
        Ok(query)
    }

    pub fn is_empty(&self) -> bool {
        self.plus.is_empty() && self.minus.is_empty()
    }
}
