use anyhow::Result;
use axum::Router;
use clap::Parser;
use engine::persist::{load_catalog, IndexPaths};
use engine::{CatalogIndex, MapVectors, WordVectors};
use server::build_app;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Index directory path; omit to start with an empty catalog
    #[arg(long)]
    index: Option<String>,
    /// Word-vector JSON file enabling the semantic ranking term
    #[arg(long)]
    vectors: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let vectors: Option<Arc<dyn WordVectors>> = match &args.vectors {
        Some(path) => {
            let loaded = MapVectors::from_json_file(path)?;
            tracing::info!(words = loaded.len(), "loaded word vectors");
            Some(Arc::new(loaded))
        }
        None => {
            tracing::warn!("no word vectors file, semantic scoring disabled");
            None
        }
    };

    let catalog = match &args.index {
        Some(dir) => {
            let catalog = load_catalog(&IndexPaths::new(dir), vectors)?;
            tracing::info!(index = %dir, num_docs = catalog.len(), "loaded index");
            catalog
        }
        None => {
            tracing::warn!("no index directory given, starting empty");
            match vectors {
                Some(v) => CatalogIndex::with_vectors(v),
                None => CatalogIndex::new(),
            }
        }
    };

    let app: Router = build_app(catalog);
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
