use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use search_core::dedup::remove_duplicates;
use search_core::{DocId, DocumentStatus, EngineConfig, ExecutionPolicy, SearchHit, SearchServer};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

mod generator;
mod timing;

use timing::LogDuration;

#[derive(Debug, Deserialize)]
struct InputDoc {
    id: DocId,
    text: String,
    #[serde(default = "default_status")]
    status: DocumentStatus,
    #[serde(default)]
    ratings: Vec<i32>,
}
fn default_status() -> DocumentStatus { DocumentStatus::Actual }

#[derive(Parser)]
#[command(name = "searchctl")]
#[command(about = "Load documents into an in-memory TF-IDF index and query it", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index documents and run queries against them
    Search {
        #[command(flatten)]
        source: Source,
        /// Query to run; repeat for several
        #[arg(long = "query", required = true)]
        queries: Vec<String>,
        /// Only rank documents with this status
        #[arg(long, value_enum, default_value_t = Status::Actual)]
        status: Status,
        /// Score each query across the thread pool
        #[arg(long, default_value_t = false)]
        parallel: bool,
    },
    /// Index documents and drop those repeating an earlier document's term set
    Dedup {
        #[command(flatten)]
        source: Source,
    },
    /// Compare sequential and parallel ranking on a synthetic corpus
    Bench {
        #[arg(long, default_value_t = 5489)]
        seed: u64,
        #[arg(long, default_value_t = 1000)]
        dictionary_size: usize,
        #[arg(long, default_value_t = 10)]
        max_word_len: usize,
        #[arg(long, default_value_t = 10_000)]
        documents: usize,
        #[arg(long, default_value_t = 100)]
        queries: usize,
        /// Words per generated document and per generated query
        #[arg(long, default_value_t = 70)]
        words: usize,
        /// Probability that a generated query word is a minus word
        #[arg(long, default_value_t = 0.0)]
        minus_prob: f64,
    },
}

#[derive(clap::Args)]
struct Source {
    /// Input path (JSON/JSONL file or a directory of them)
    #[arg(long)]
    input: String,
    /// Space-separated stop words
    #[arg(long, default_value = "")]
    stop_words: String,
    /// JSON file with engine settings
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Status {
    Actual,
    Irrelevant,
    Banned,
    Removed,
}

impl From<Status> for DocumentStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Actual => DocumentStatus::Actual,
            Status::Irrelevant => DocumentStatus::Irrelevant,
            Status::Banned => DocumentStatus::Banned,
            Status::Removed => DocumentStatus::Removed,
        }
    }
}

#[derive(Serialize)]
struct SearchResponse<'a> {
    query: &'a str,
    took_s: f64,
    results: Vec<SearchHit>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Search { source, queries, status, parallel } => {
            let server = build_server(&source)?;
            let policy = if parallel { ExecutionPolicy::Parallel } else { ExecutionPolicy::Sequential };
            for query in &queries {
                let start = std::time::Instant::now();
                let results = server.find_top_documents_with(policy, query, DocumentStatus::from(status))?;
                let response = SearchResponse { query, took_s: start.elapsed().as_secs_f64(), results };
                println!("{}", serde_json::to_string_pretty(&response)?);
            }
            Ok(())
        }
        Commands::Dedup { source } => {
            let mut server = build_server(&source)?;
            let removed = remove_duplicates(&mut server)?;
            tracing::info!(removed = removed.len(), remaining = server.document_count(), "duplicates removed");
            println!("{}", serde_json::to_string(&removed)?);
            Ok(())
        }
        Commands::Bench { seed, dictionary_size, max_word_len, documents, queries, words, minus_prob } => {
            let corpus = generator::Corpus::generate(&generator::CorpusShape {
                seed,
                dictionary_size,
                max_word_len,
                documents,
                queries,
                words,
                minus_prob,
            });
            run_bench(&corpus)
        }
    }
}

fn build_server(source: &Source) -> Result<SearchServer> {
    let config = match &source.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let stop_words: Vec<&str> = source.stop_words.split(' ').collect();
    let mut server = SearchServer::with_config(stop_words, config)?;
    let docs = load_documents(Path::new(&source.input))?;
    for doc in &docs {
        server
            .add_document(doc.id, &doc.text, doc.status, &doc.ratings)
            .with_context(|| format!("indexing document {}", doc.id))?;
    }
    tracing::info!(num_docs = server.document_count(), "ingested documents");
    Ok(server)
}

fn load_config(path: &Path) -> Result<EngineConfig> {
    let f = File::open(path).with_context(|| format!("opening config {}", path.display()))?;
    let config = serde_json::from_reader(BufReader::new(f))?;
    Ok(config)
}

fn load_documents(input_path: &Path) -> Result<Vec<InputDoc>> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input_path.is_dir() {
        for entry in WalkDir::new(input_path).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input_path.is_file() {
        files.push(input_path.to_path_buf());
    } else {
        anyhow::bail!("input {} does not exist", input_path.display());
    }

    let mut docs = Vec::new();
    for file in files {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            read_jsonl(&file, &mut docs)?;
        } else {
            read_json(&file, &mut docs)?;
        }
    }
    Ok(docs)
}

fn read_jsonl(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        docs.push(serde_json::from_str(&line)?);
    }
    Ok(())
}

fn read_json(file: &Path, docs: &mut Vec<InputDoc>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                docs.push(serde_json::from_value(v)?);
            }
        }
        serde_json::Value::Object(_) => docs.push(serde_json::from_value(json)?),
        _ => {}
    }
    Ok(())
}

fn run_bench(corpus: &generator::Corpus) -> Result<()> {
    let mut server = SearchServer::new([corpus.dictionary.first().map(String::as_str).unwrap_or("")])?;
    {
        let _timer = LogDuration::new("index synthetic documents");
        for (id, text) in corpus.documents.iter().enumerate() {
            server.add_document(id as DocId, text, DocumentStatus::Actual, &[1, 2, 3])?;
        }
    }
    for policy in [ExecutionPolicy::Sequential, ExecutionPolicy::Parallel] {
        let _timer = LogDuration::new(format!("{policy:?}"));
        let mut total_relevance = 0.0;
        for query in &corpus.queries {
            for hit in server.find_top_documents_with(policy, query, DocumentStatus::Actual)? {
                total_relevance += hit.relevance;
            }
        }
        tracing::info!(?policy, total_relevance, "bench run finished");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn loads_json_and_jsonl_from_directory() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.json"),
            r#"[{"id": 1, "text": "cat in the city", "ratings": [1, 3, 2]},
                {"id": 2, "text": "dog", "status": "BANNED"}]"#,
        )
        .unwrap();
        fs::write(dir.path().join("b.jsonl"), "{\"id\": 3, \"text\": \"fluffy cat\"}\n\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let docs = load_documents(dir.path()).unwrap();
        let ids: Vec<DocId> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(docs[1].status, DocumentStatus::Banned);
        assert_eq!(docs[0].ratings, vec![1, 3, 2]);
        assert!(docs[2].ratings.is_empty());
    }

    #[test]
    fn builds_server_with_config_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("docs.jsonl");
        let lines: Vec<String> = (0..8).map(|id| format!("{{\"id\": {id}, \"text\": \"cat and dog{id}\"}}")).collect();
        fs::write(&input, lines.join("\n")).unwrap();
        let config = dir.path().join("engine.json");
        fs::write(&config, r#"{ "max_results": 3 }"#).unwrap();

        let source = Source {
            input: input.to_string_lossy().to_string(),
            stop_words: "and".into(),
            config: Some(config),
        };
        let server = build_server(&source).unwrap();
        assert_eq!(server.document_count(), 8);
        assert_eq!(server.find_top_documents("cat").unwrap().len(), 3);
        assert!(server.find_top_documents("and").unwrap().is_empty());
    }

    #[test]
    fn missing_input_is_an_error() {
        assert!(load_documents(Path::new("/definitely/not/here")).is_err());
    }
}
