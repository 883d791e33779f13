use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Parameters of a synthetic corpus.
pub struct CorpusShape {
    pub seed: u64,
    pub dictionary_size: usize,
    pub max_word_len: usize,
    pub documents: usize,
    pub queries: usize,
    pub words: usize,
    pub minus_prob: f64,
}

/// Random lowercase words, documents built from them, and queries over them.
pub struct Corpus {
    pub dictionary: Vec<String>,
    pub documents: Vec<String>,
    pub queries: Vec<String>,
}

impl Corpus {
    pub fn generate(shape: &CorpusShape) -> Self {
        let mut rng = StdRng::seed_from_u64(shape.seed);
        let dictionary = generate_dictionary(&mut rng, shape.dictionary_size, shape.max_word_len.max(1));
        let documents = (0..shape.documents)
            .map(|_| generate_query(&mut rng, &dictionary, shape.words, 0.0))
            .collect();
        let queries = (0..shape.queries)
            .map(|_| generate_query(&mut rng, &dictionary, shape.words, shape.minus_prob))
            .collect();
        tracing::debug!(words = dictionary.len(), "generated corpus");
        Self { dictionary, documents, queries }
    }
}

fn generate_word(rng: &mut StdRng, max_len: usize) -> String {
    let len = rng.random_range(1..=max_len);
    (0..len).map(|_| char::from(rng.random_range(b'a'..=b'z'))).collect()
}

fn generate_dictionary(rng: &mut StdRng, count: usize, max_len: usize) -> Vec<String> {
    let mut words: Vec<String> = (0..count).map(|_| generate_word(rng, max_len)).collect();
    words.sort();
    words.dedup();
    words
}

fn generate_query(rng: &mut StdRng, dictionary: &[String], word_count: usize, minus_prob: f64) -> String {
    if dictionary.is_empty() {
        return String::new();
    }
    let mut query = String::new();
    for _ in 0..word_count {
        if !query.is_empty() {
            query.push(' ');
        }
        if rng.random::<f64>() < minus_prob {
            query.push('-');
        }
        query.push_str(&dictionary[rng.random_range(0..dictionary.len())]);
    }
    query
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(seed: u64) -> CorpusShape {
        CorpusShape { seed, dictionary_size: 50, max_word_len: 6, documents: 20, queries: 5, words: 8, minus_prob: 0.3 }
    }

    #[test]
    fn same_seed_same_corpus() {
        let a = Corpus::generate(&shape(7));
        let b = Corpus::generate(&shape(7));
        assert_eq!(a.documents, b.documents);
        assert_eq!(a.queries, b.queries);
    }

    #[test]
    fn words_are_lowercase_and_bounded() {
        let corpus = Corpus::generate(&shape(1));
        assert!(corpus.dictionary.windows(2).all(|w| w[0] < w[1]));
        for word in &corpus.dictionary {
            assert!((1..=6).contains(&word.len()));
            assert!(word.bytes().all(|b| b.is_ascii_lowercase()));
        }
        for doc in &corpus.documents {
            assert_eq!(doc.split(' ').count(), 8);
            assert!(!doc.contains('-'));
        }
    }
}
