//! Vitrine storefront CLI.
//!
//! Command-line front door for the storefront core: seed a config, browse
//! the catalog, and run hybrid product searches against it.

use clap::{Parser, Subcommand};
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use vitrine::{
    audit, catalog::load_with_fallback, default_cascade, default_catalog, AuditEvent, AuditSink,
    Catalog, EmbeddingService, HybridSearch, JsonFileStore, KeywordMatcher, ProductMatcher,
    Result, SearchQuery, StoreAction, StoreConfig, StoreEngine, TracingAuditSink, VectorCache,
};

#[derive(Parser)]
#[command(name = "vitrine")]
#[command(author, version, about = "Vitrine storefront core", long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "vitrine.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new store configuration
    Init {
        /// Output path for configuration file
        #[arg(short, long, default_value = "vitrine.toml")]
        output: String,
    },

    /// List the loaded product catalog
    Catalog,

    /// Run a hybrid product search
    Search {
        /// Free-text query
        query: String,

        /// Restrict results to one category
        #[arg(long)]
        category: Option<String>,

        /// Inclusive minimum price
        #[arg(long)]
        min_price: Option<f64>,

        /// Inclusive maximum price
        #[arg(long)]
        max_price: Option<f64>,

        /// Enable the vector stages (downloads ~90MB embedding model on first use)
        #[arg(long, default_value = "false")]
        semantic: bool,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Load config from the given path, or fall back to defaults.
fn load_config(path: &str) -> Result<StoreConfig> {
    if Path::new(path).exists() {
        info!("Loading configuration from: {}", path);
        StoreConfig::load(path)
    } else {
        info!("Using default configuration");
        Ok(StoreConfig::default())
    }
}

/// Load the product set from the configured source, or the seed catalog.
async fn load_catalog(config: &StoreConfig) -> Catalog {
    match &config.catalog.products_path {
        Some(path) => load_with_fallback(&JsonFileStore::new(path)).await,
        None => Catalog::new(default_catalog()),
    }
}

/// Keyword-only cascade for when the vector stages are unavailable.
fn keyword_only() -> HybridSearch {
    let stages: Vec<Arc<dyn ProductMatcher>> = vec![Arc::new(KeywordMatcher::new())];
    HybridSearch::new(stages)
}

fn print_product(product: &vitrine::Product) {
    println!(
        "{:<28} {:<10} {:>8.2}  {}",
        product.id, product.category, product.price, product.name
    );
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Init { output } => {
            info!("Initializing new store configuration at: {}", output);
            let config = StoreConfig::default();
            config.save(&output)?;
            info!("Configuration saved successfully");
        }

        Commands::Catalog => {
            let config = load_config(&cli.config)?;
            let catalog = load_catalog(&config).await;
            info!("Catalog holds {} products", catalog.len());
            for product in catalog.iter() {
                print_product(product);
            }
        }

        Commands::Search {
            query,
            category,
            min_price,
            max_price,
            semantic,
        } => {
            let config = load_config(&cli.config)?;
            let catalog = load_catalog(&config).await;
            let engine = Arc::new(StoreEngine::new(catalog, config.pricing.clone()));

            // The vector stages need the embedding model; keyword-only is
            // the cheap default for one-shot CLI searches.
            let hybrid = if semantic {
                info!("Initializing semantic search (downloading ~90MB model if needed)...");
                let embedding = EmbeddingService::new();
                match embedding.ensure_ready().await {
                    Ok(()) => {
                        let cache = Arc::new(VectorCache::new(config.search.vector_cache_capacity));
                        let snapshot = engine.catalog().await;
                        match cache.warm(&embedding, snapshot.products()).await {
                            Ok(added) => info!("Vector cache warmed with {} products", added),
                            Err(e) => warn!("Vector cache warm-up failed: {}", e),
                        }
                        default_cascade(&config.search, embedding, cache)
                    }
                    Err(e) => {
                        warn!("Failed to initialize semantic search: {}", e);
                        warn!("Falling back to keyword search only");
                        keyword_only()
                    }
                }
            } else {
                keyword_only()
            };

            let mut search_query =
                SearchQuery::new(&query, config.search.score_threshold, config.search.limit)
                    .with_price_range(min_price, max_price);
            if let Some(category) = category {
                search_query = search_query.with_category(category);
            }

            let snapshot = engine.catalog().await;
            let result = hybrid.search(&search_query, &snapshot).await;
            info!(
                source = result.source.as_str(),
                hits = result.hits.len(),
                "Search complete"
            );

            let sink: Arc<dyn AuditSink> = Arc::new(TracingAuditSink);
            audit(
                &sink,
                AuditEvent::SearchExecuted {
                    query: query.clone(),
                    source: result.source,
                    hits: result.hits.len(),
                },
            );

            engine
                .dispatch(StoreAction::ApplySearchResult(result))
                .await;

            let state = engine.snapshot().await;
            for product in &state.view {
                print_product(product);
            }
        }
    }

    Ok(())
}
