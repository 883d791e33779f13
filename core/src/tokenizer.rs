use std::collections::BTreeSet;

use crate::error::{Result, SearchError};

/// Split text into space-delimited words.
///
/// Runs of spaces collapse, leading and trailing spaces are trimmed and no empty
/// slice is ever produced. Only the ASCII space separates words; any other
/// whitespace stays inside the word it touches. The returned iterator is
/// `Clone`, so a caller can restart it without re-scanning anything up front.
pub fn split_into_words(text: &str) -> impl Iterator<Item = &str> + Clone + '_ {
    text.split(' ').filter(|word| !word.is_empty())
}

/// A word is valid when it holds no control characters (code points below the space).
pub fn is_valid_word(word: &str) -> bool {
    !word.bytes().any(|b| b < b' ')
}

/// Words excluded from both indexing and querying. Fixed at construction.
#[derive(Debug, Clone, Default)]
pub struct StopWords {
    words: BTreeSet<String>,
}

impl StopWords {
    /// Build the set from any collection of words; empty entries are dropped and
    /// duplicates collapse. Fails if any word contains a control character.
    pub fn new<I, S>(words: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for word in words {
            let word = word.as_ref();
            if word.is_empty() {
                continue;
            }
            if !is_valid_word(word) {
                return Err(SearchError::InvalidTerm(word.to_string()));
            }
            set.insert(word.to_string());
        }
        Ok(Self { words: set })
    }

    /// Build the set from a single space-separated string.
    pub fn from_text(text: &str) -> Result<Self> {
        Self::new(split_into_words(text))
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.words.iter().map(String::as_str)
    }
}
