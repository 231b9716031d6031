//! Mimir - a federated query layer for lexicographic linked data
//!
//! Command-line interface: load a catalog, populate the local store
//! from a file, and run federated operations against the configured
//! sources.

use clap::{Parser, Subcommand};
use mimir::catalog::Catalog;
use mimir::federation::Federator;
use mimir::loaders::{self, SearchKind, SearchOptions, SearchSort};
use mimir::store::{FileLocalData, LocalStore};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mimir", version, about = "Federated queries over lexicographic linked data")]
struct Cli {
    /// Path to the catalog configuration (DCAT JSON)
    #[arg(long)]
    catalog: PathBuf,

    /// Enabled dataset IRIs; the first one designates the statistics
    /// source
    #[arg(long = "dataset")]
    datasets: Vec<String>,

    /// Local RDF data file (Turtle or JSON-LD) served by the in-process
    /// store
    #[arg(long)]
    local_data: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Free-text search across all configured sources
    Search {
        key: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Restrict to one resource type: concept, sense or entry
        #[arg(long = "type")]
        kind: Option<String>,
        /// Sort alphabetically instead of by label length
        #[arg(long)]
        alphabetical: bool,
    },
    /// Resolve the preferred display name of a resource
    Name { iri: String },
    /// Classify a resource IRI
    Type { iri: String },
    /// List the top-level categories
    TopCategories,
    /// List the direct subcategories of a category
    SubCategories { iri: String },
    /// Count the senses evoking a concept (statistics source only)
    Evoking { iri: String },
    /// Serialize the local store to Turtle
    Export,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("mimir: {}", err);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let catalog_text = std::fs::read_to_string(&cli.catalog)?;
    let catalog: Catalog = serde_json::from_str(&catalog_text)?;

    let local_store = match &cli.local_data {
        Some(path) => {
            let store =
                Arc::new(LocalStore::with_persistence(Arc::new(FileLocalData::new(path)))?);
            store.populate(None).await;
            Some(store)
        }
        None => None,
    };

    let federator = Federator::from_catalog(&catalog, &cli.datasets, local_store.clone())?;

    match cli.command {
        Command::Search { key, limit, kind, alphabetical } => {
            let options = SearchOptions {
                limit,
                kind: match kind.as_deref() {
                    Some("concept") => Some(SearchKind::Concept),
                    Some("sense") => Some(SearchKind::Sense),
                    Some("entry") => Some(SearchKind::Entry),
                    _ => None,
                },
                sort: if alphabetical { Some(SearchSort::Alphabetical) } else { None },
            };
            match loaders::load_search_results(&federator, &key, options).await? {
                Some(records) => {
                    for record in records {
                        println!("{}", record.to_json());
                    }
                }
                None => println!("No search key given"),
            }
        }
        Command::Name { iri } => {
            match loaders::load_resource_name(&federator, &iri).await? {
                Some(name) => println!("{}", name.value),
                None => println!("No name found for {}", iri),
            }
        }
        Command::Type { iri } => {
            match loaders::load_resource_type(&federator, &iri).await? {
                Some(kind) => println!("{}", kind),
                None => println!("No type found for {}", iri),
            }
        }
        Command::TopCategories => {
            for term in loaders::load_top_categories(&federator).await? {
                println!("{}\t{}", term.iri, term.name);
            }
        }
        Command::SubCategories { iri } => {
            for term in loaders::load_sub_categories(&federator, &iri).await? {
                println!("{}\t{}", term.iri, term.name);
            }
        }
        Command::Evoking { iri } => {
            let count = loaders::load_concept_statistics_evoking(&federator, &iri).await?;
            println!("{}", count);
        }
        Command::Export => match &local_store {
            Some(store) => print!("{}", store.serialize_to_turtle().await?),
            None => eprintln!("No local data configured"),
        },
    }

    Ok(())
}
