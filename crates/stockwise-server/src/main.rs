//! Stockwise — retail stock insight server.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod routes;
mod state;

use state::AppState;
use stockwise_chat::{LLMConfig, LlmSummarizer};
use stockwise_core::StockwiseConfig;
use stockwise_infer::EmbedderBackend;
use stockwise_runtime::InsightService;

fn resolve_data_dir() -> PathBuf {
    std::env::var("STOCKWISE_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_help() {
    println!("Stockwise — retail stock insights over a product catalog");
    println!();
    println!("Usage: stockwise [command]");
    println!();
    println!("Commands:");
    println!("  (none) | serve           Start the HTTP server");
    println!("  ask <query...>           Print one insight for the query");
    println!("  check [catalog]          Load the catalog, build the index, print stock alerts");
    println!("  help                     Show this help message");
}

fn build_embedder(config: &StockwiseConfig) -> anyhow::Result<Arc<dyn EmbedderBackend>> {
    stockwise_infer::create_embedder(
        config.embedder,
        &config.data_paths.models,
        config.embedding_dim,
    )
    .map_err(|e| anyhow::anyhow!("Failed to create embedder: {}", e))
}

fn build_service(config: &StockwiseConfig) -> anyhow::Result<InsightService> {
    let embedder = build_embedder(config)?;
    let llm_config = LLMConfig::load(&config.data_paths.llm_config_file);
    let summarizer = LlmSummarizer::new(llm_config, config.summary_timeout)?;

    InsightService::bootstrap(config, embedder, Arc::new(summarizer))
        .map_err(|e| anyhow::anyhow!("Failed to start insight service: {}", e))
}

/// `ask <query...>`: one insight, printed to stdout.
async fn ask(config: &StockwiseConfig, query: &str) -> anyhow::Result<()> {
    let service = build_service(config)?;
    match service.generate_insight(query, None).await {
        Ok(insight) => {
            println!("{}", insight.insight);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// `check [catalog]`: validate the catalog and print its stock report.
fn check(mut config: StockwiseConfig, catalog: Option<PathBuf>) -> anyhow::Result<()> {
    if let Some(path) = catalog {
        config.data_paths.catalog = path;
    }

    let records = stockwise_catalog::load(&config.data_paths.catalog)?;
    let embedder = build_embedder(&config)?;
    let retriever = stockwise_retrieval::Retriever::build(records, embedder)?;
    let report = stockwise_catalog::analyze_stock(retriever.records(), config.low_stock_threshold);

    println!("Catalog: {}", config.data_paths.catalog.display());
    println!(
        "  products indexed: {} ({} embedder, dim {})",
        retriever.len(),
        retriever.embedder().name(),
        retriever.embedder().dimension()
    );
    for remark in &report.remarks {
        println!("  {}", remark);
    }
    Ok(())
}

async fn serve(config: StockwiseConfig) -> anyhow::Result<()> {
    let port = config.port;
    let service = build_service(&config)?;

    let state = Arc::new(AppState::new(service));
    let app = routes::build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Stockwise server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("serve");

    if matches!(command, "--help" | "-h" | "help") {
        print_help();
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());
    let config = StockwiseConfig::from_env(&data_dir)?;

    match command {
        "serve" => serve(config).await,
        "ask" => {
            let query = args[2..].join(" ");
            if query.trim().is_empty() {
                eprintln!("Usage: stockwise ask <query...>");
                std::process::exit(1);
            }
            ask(&config, &query).await
        }
        "check" => check(config, args.get(2).map(PathBuf::from)),
        other => {
            eprintln!("Unknown command: {}. Use 'stockwise help' for usage.", other);
            std::process::exit(1);
        }
    }
}
