use std::collections::HashSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{info, warn};

use vb_bench::{benchmark_queries, BenchmarkOptions};
use vb_core::loader::DEFAULT_ARTICLES_PATH;
use vb_core::{load_articles, Article, DateInput};
use vb_inference::embeddings::article_text;
use vb_inference::{create_model, EmbeddingGenerator, InferenceConfig};
use vb_storage::{get_article_metadata, prepare_date_for_db, truthy, MemoryStore, TargetFormat};

mod logging;

const PREVIEW_COMPONENTS: usize = 5;
const PREVIEW_ARTICLES: usize = 10;

#[derive(Parser, Debug)]
#[command(author, version, about = "Prepare article metadata for vector databases and benchmark queries", long_about = None)]
pub struct Cli {
    /// JSON file holding an array of articles
    #[arg(long, global = true, default_value = DEFAULT_ARTICLES_PATH)]
    articles: PathBuf,
    #[arg(long, help = "Embedding model. Available models: dummy (default), ollama")]
    model: Option<String>,
    /// Embedding server URL; a path component names the model
    #[arg(long)]
    model_url: Option<String>,
    /// Model name on the embedding server
    #[arg(long)]
    model_name: Option<String>,
    /// Vector length for the dummy model
    #[arg(long)]
    dimension: Option<usize>,
    /// More log output (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Load the articles file and summarize it
    Load,
    /// Show how a date is stored for a database
    ParseDate {
        /// Date string or Unix timestamp
        value: String,
        #[arg(long, default_value = "generic")]
        db: TargetFormat,
    },
    /// Print the metadata of each article as JSON lines
    Metadata {
        #[arg(long, default_value = "generic")]
        db: TargetFormat,
        /// Only the first N articles
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Embed a piece of text
    Embed { text: String },
    /// Index the articles in memory and time queries against them
    Bench {
        #[arg(long, default_value = "generic")]
        db: TargetFormat,
        /// Results requested per query
        #[arg(long, default_value_t = 10)]
        limit: usize,
        /// Only print the final report
        #[arg(long)]
        quiet: bool,
        /// Queries to run instead of the standard set
        queries: Vec<String>,
    },
}

impl Cli {
    fn inference_config(&self) -> InferenceConfig {
        let mut config = InferenceConfig::from_env();
        if let Some(model) = &self.model {
            config = config.with_model(model);
        }
        if let Some(url) = &self.model_url {
            config = config.with_model_url(url);
        }
        if let Some(name) = &self.model_name {
            config = config.with_model_name(name);
        }
        if let Some(dimension) = self.dimension {
            config = config.with_dimension(dimension);
        }
        config
    }

    fn load(&self) -> Result<Vec<Article>> {
        load_articles(&self.articles)
            .with_context(|| format!("loading articles from {}", self.articles.display()))
    }

    fn generator(&self) -> Result<EmbeddingGenerator> {
        let config = self.inference_config();
        let model = create_model(&config)
            .with_context(|| format!("initializing embedding model '{}'", config.model))?;
        Ok(EmbeddingGenerator::new(model))
    }
}

fn parse_date_input(value: &str) -> DateInput {
    value
        .trim()
        .parse::<i64>()
        .map(DateInput::Timestamp)
        .unwrap_or_else(|_| DateInput::Text(value.to_string()))
}

/// Store key for an article: its id as written, or its position when the id
/// is missing or not a scalar.
fn point_id(index: usize, id: &Value) -> String {
    match id {
        Value::Number(n) => n.to_string(),
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => format!("#{}", index),
    }
}

fn evergreen_count(articles: &[Article]) -> usize {
    articles.iter().filter(|a| truthy(&a.evergreen)).count()
}

fn summarize(articles: &[Article]) {
    println!("{} articles", articles.len());
    println!("  evergreen: {}", evergreen_count(articles));
    let with_body = articles.iter().filter(|a| a.body_content.is_some()).count();
    println!("  with body content: {}", with_body);
    for article in articles.iter().take(PREVIEW_ARTICLES) {
        println!("- [{}] {}", article.id, article.title);
    }
}

fn bench(cli: &Cli, target: &TargetFormat, limit: usize, quiet: bool, queries: &[String]) -> Result<()> {
    let articles = cli.load()?;
    let generator = cli.generator()?;
    let mut store = MemoryStore::new(target.name(), generator.dimension());

    let texts: Vec<String> = articles.iter().map(article_text).collect();
    let text_refs: Vec<&str> = texts.iter().map(String::as_str).collect();
    let embeddings = generator.embed_batch(&text_refs, !quiet)?;

    let mut seen = HashSet::new();
    for (index, (article, embedding)) in articles.iter().zip(&embeddings).enumerate() {
        let metadata = get_article_metadata(article, target)
            .with_context(|| format!("preparing metadata for article {}", article.id))?;
        let id = point_id(index, &metadata.id);
        if !seen.insert(id.clone()) {
            warn!("Duplicate article id {}; replacing the earlier entry", id);
        }
        store.upsert(id, embedding, metadata)?;
    }
    info!("🏦 Indexed {} articles into '{}'", store.len(), store.collection());

    let custom: Vec<&str> = queries.iter().map(String::as_str).collect();
    let result = benchmark_queries(
        |query| -> Result<usize> {
            let embedding = generator.embed(query)?;
            Ok(store.query(&embedding, limit)?.len())
        },
        (!custom.is_empty()).then_some(custom.as_slice()),
        BenchmarkOptions { verbose: !quiet },
    )?;

    println!("\n{}", result);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    match &cli.command {
        Commands::Load => {
            let articles = cli.load()?;
            summarize(&articles);
        }
        Commands::ParseDate { value, db } => {
            let date = prepare_date_for_db(&parse_date_input(value), db)?;
            println!("{}", serde_json::to_string(&date)?);
        }
        Commands::Metadata { db, limit } => {
            let articles = cli.load()?;
            let limit = limit.unwrap_or(articles.len());
            for article in articles.iter().take(limit) {
                let metadata = get_article_metadata(article, db)
                    .with_context(|| format!("preparing metadata for article {}", article.id))?;
                println!("{}", serde_json::to_string(&metadata.to_json()?)?);
            }
        }
        Commands::Embed { text } => {
            let generator = cli.generator()?;
            let embedding = generator.embed(text)?;
            println!("model: {}", generator.model_name());
            println!("dimension: {}", embedding.len());
            let preview = &embedding[..embedding.len().min(PREVIEW_COMPONENTS)];
            println!("first {} values: {:?}", preview.len(), preview);
        }
        Commands::Bench { db, limit, quiet, queries } => {
            bench(&cli, db, *limit, *quiet, queries)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_bench_args() {
        let cli = Cli::try_parse_from([
            "vecbench", "--model", "dummy", "bench", "--db", "Pinecone", "--limit", "3", "hiking", "cycling",
        ])
        .unwrap();

        match cli.command {
            Commands::Bench { db, limit, quiet, queries } => {
                assert_eq!(db, TargetFormat::Pinecone);
                assert_eq!(limit, 3);
                assert!(!quiet);
                assert_eq!(queries, vec!["hiking", "cycling"]);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_flags_override_config() {
        let cli = Cli::try_parse_from([
            "vecbench", "--model", "ollama", "--model-url", "http://host:1/m", "load",
        ])
        .unwrap();
        let config = cli.inference_config();
        assert_eq!(config.model, "ollama");
        assert_eq!(config.model_url.as_deref(), Some("http://host:1/m"));
    }

    #[test]
    fn test_point_ids() {
        assert_eq!(point_id(0, &Value::from(2)), "2");
        assert_eq!(point_id(0, &Value::from("2")), "2");
        assert_eq!(point_id(0, &Value::from(" 7 ")), "7");
        assert_eq!(point_id(3, &Value::Null), "#3");
        assert_eq!(point_id(4, &Value::from("")), "#4");
        assert_ne!(point_id(0, &Value::Null), point_id(1, &Value::Null));
    }

    #[test]
    fn test_evergreen_count_uses_truthiness() {
        let articles: Vec<Article> = serde_json::from_value(serde_json::json!([
            {"id": 1, "evergreen": true},
            {"id": 2, "evergreen": 1},
            {"id": 3, "evergreen": "yes"},
            {"id": 4, "evergreen": 0},
            {"id": 5}
        ]))
        .unwrap();
        assert_eq!(evergreen_count(&articles), 3);
    }

    #[test]
    fn test_parse_date_input() {
        assert_eq!(parse_date_input("1760630940"), DateInput::Timestamp(1760630940));
        assert_eq!(parse_date_input("2025-10-16"), DateInput::Text("2025-10-16".into()));
    }
}
