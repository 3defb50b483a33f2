use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use actionsmith::catalog::{ActionRegistry, ActionResolver, MetadataCache};
use actionsmith::config::Config;
use actionsmith::github::GithubClient;
use actionsmith::storage::{BlobStore, SqliteStore};
use actionsmith::workflow::{compile, WorkflowStore};
use actionsmith::Result;

#[derive(Parser)]
#[command(name = "actionsmith")]
#[command(about = "GitHub Actions workflow builder", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an action reference and print its metadata
    Action {
        /// Reference in owner/repo[@ref] form
        reference: String,
    },
    /// List the resolved standard and recommended action sets
    Actions,
    /// Compile the saved workflow to GitHub Actions YAML
    Compile {
        /// Write the document to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    actionsmith::telemetry::init_tracing();

    if let Err(e) = run().await {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load();

    let store: Arc<dyn BlobStore> = Arc::new(SqliteStore::open(&config.database_path())?);
    let cache = MetadataCache::new(store.clone());
    cache.load().await;

    let host = Arc::new(GithubClient::new(&config.github));
    let mut registry = ActionRegistry::new(ActionResolver::new(host, cache));

    match cli.command {
        Commands::Action { reference } => {
            let action = registry.get(&reference).await?;
            println!("{}", serde_json::to_string_pretty(&*action)?);
        }
        Commands::Actions => {
            registry.populate_initial().await?;
            for action in registry.standard().iter().chain(registry.recommended()) {
                println!(
                    "{:<28} {}",
                    action.id,
                    action.description.as_deref().unwrap_or("")
                );
            }
        }
        Commands::Compile { output } => {
            registry.populate_initial().await?;
            let workflows = WorkflowStore::new(store);
            let workflow = workflows.load(&registry).await?;
            let yaml = compile(&workflow)?;
            match output {
                Some(path) => std::fs::write(path, yaml)?,
                None => print!("{}", yaml),
            }
        }
    }

    Ok(())
}
