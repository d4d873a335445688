//! graph_rag CLI - main entry point

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use graph_rag::commands;
use graph_rag::Config;

#[derive(Parser)]
#[command(name = "graph_rag")]
#[command(about = "Knowledge-graph RAG over Neo4j + Qdrant", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to a YAML config file (defaults to ./config.yml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer a question using hybrid graph + vector retrieval
    Ask {
        /// The question to answer
        question: String,

        /// YAML file with prior conversation turns (human/assistant pairs)
        #[arg(long)]
        history: Option<PathBuf>,

        /// Print the assembled retrieval context before the answer
        #[arg(long, default_value_t = false)]
        show_context: bool,

        /// How many passages the vector search returns
        #[arg(long)]
        top_k: Option<usize>,
    },

    /// Create the full-text entity index and the passage collection
    Setup,

    /// Load entities, relationships, and passages from a YAML seed file
    Seed {
        /// Seed file path
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("graph_rag=info".parse()?))
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load()?,
    };

    match cli.command {
        Commands::Ask {
            question,
            history,
            show_context,
            top_k,
        } => {
            if let Some(top_k) = top_k {
                config.retrieval.vector_top_k = top_k;
            }
            commands::ask::run(&config, &question, history.as_deref(), show_context).await?;
        }
        Commands::Setup => commands::setup::run(&config).await?,
        Commands::Seed { file } => commands::seed::run(&config, &file).await?,
    }

    Ok(())
}
