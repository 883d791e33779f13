use serde::{Deserialize, Serialize};

/// Tunables of a `SearchServer`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Cap on the number of documents returned by a top-K query.
    pub max_results: usize,
    /// Relevance differences below this are ties, broken by rating.
    pub relevance_epsilon: f64,
    /// Accumulator shards used by parallel queries. Sequential queries use one.
    pub parallel_shards: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_results: 5,
            relevance_epsilon: 1e-6,
            parallel_shards: 240,
        }
    }
}

/// How the scoring phase of a query is executed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionPolicy {
    #[default]
    Sequential,
    Parallel,
}

impl ExecutionPolicy {
    pub fn shard_count(self, config: &EngineConfig) -> usize {
        match self {
            ExecutionPolicy::Sequential => 1,
            ExecutionPolicy::Parallel => config.parallel_shards.max(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: EngineConfig = serde_json::from_str(r#"{ "max_results": 10 }"#).unwrap();
        assert_eq!(config.max_results, 10);
        assert_eq!(config.parallel_shards, 240);
        assert_eq!(config.relevance_epsilon, 1e-6);
    }

    #[test]
    fn shard_count_follows_policy() {
        let config = EngineConfig::default();
        assert_eq!(ExecutionPolicy::Sequential.shard_count(&config), 1);
        assert_eq!(ExecutionPolicy::Parallel.shard_count(&config), 240);
    }
}
