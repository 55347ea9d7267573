use catalog_search::catalog::{import_seed, CatalogSeed, SledCatalogStore};
use clap::{Parser, Subcommand};
use reqwest::Client;
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "catalog-search-cli")]
#[command(about = "Catalog Search CLI", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search products with free text, e.g. "shoes under 2000"
    Search {
        #[arg(value_name = "QUERY")]
        query: String,

        #[arg(short, long, default_value = "0")]
        page: usize,

        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Rebuild the search index from the catalog
    Sync,

    /// Check server health
    Health,

    /// Load a JSON seed file into a local catalog database.
    ///
    /// The server must not be running against the same database.
    Import {
        #[arg(short, long, value_name = "SEED_JSON")]
        file: PathBuf,

        #[arg(
            short,
            long,
            env = "CATALOG_SEARCH__CATALOG__PATH",
            default_value = "./data/catalog"
        )]
        db: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let client = Client::new();

    match cli.command {
        Commands::Search { query, page, size } => {
            let mut params = vec![("q", query), ("page", page.to_string())];
            if let Some(size) = size {
                params.push(("size", size.to_string()));
            }

            let response = client
                .get(format!("{}/search", cli.endpoint))
                .query(&params)
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Sync => {
            let response = client
                .post(format!("{}/sync", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Health => {
            let response = client
                .get(format!("{}/health", cli.endpoint))
                .send()
                .await?;

            let body: serde_json::Value = response.json().await?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }

        Commands::Import { file, db } => {
            let seed = CatalogSeed::from_path(&file)?;
            let store = SledCatalogStore::new(&db)?;

            let summary = import_seed(&store, &seed).await?;
            store.flush().await?;

            println!(
                "Imported {} categories and {} products into {}",
                summary.categories,
                summary.products,
                db.display()
            );
        }
    }

    Ok(())
}
