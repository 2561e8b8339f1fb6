use std::{path::PathBuf, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use common::{
    storage::{
        qdrant::QdrantClient,
        types::{collection::Collection, distance::DistanceMetric},
        vector_store::VectorStore,
    },
    utils::{config::get_config, embedding::EmbeddingProvider},
};
use ingestion_pipeline::{IngestionPipeline, IngestionRequest};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Embed every PDF in a folder into a vector store collection.
#[derive(Debug, Parser)]
#[command(name = "ingest")]
#[command(version)]
struct Cli {
    /// Folder containing the PDF documents
    #[arg(long)]
    folder: PathBuf,

    /// Target collection
    #[arg(long)]
    collection: String,

    /// Tenant that owns the ingested documents
    #[arg(long, env = "TENANT_ID")]
    tenant: String,

    #[arg(long)]
    category: Option<String>,

    #[arg(long)]
    subcategory: Option<String>,

    /// Create the collection first when it does not exist
    #[arg(long)]
    create: bool,

    /// Vector size for a created collection; defaults to the embedder's dimension
    #[arg(long, requires = "create")]
    vector_size: Option<u64>,

    /// Distance metric for a created collection
    #[arg(long, default_value = "COSINE")]
    distance: DistanceMetric,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr, the report to stdout
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    let cli = Cli::parse();
    let config = get_config().context("loading configuration")?;

    let store: Arc<dyn VectorStore> = Arc::new(QdrantClient::from_config(&config)?);
    let embedding_provider = Arc::new(EmbeddingProvider::from_config(&config).await?);
    info!(
        embedding_backend = embedding_provider.backend_label(),
        embedding_dimension = embedding_provider.dimension(),
        "Embedding provider initialized"
    );

    if cli.create {
        let vector_size = cli
            .vector_size
            .unwrap_or(embedding_provider.dimension() as u64);
        let outcome =
            Collection::ensure_created(store.as_ref(), &cli.collection, vector_size, cli.distance)
                .await
                .with_context(|| format!("creating collection '{}'", cli.collection))?;
        info!(collection = %cli.collection, outcome = ?outcome, "Collection ready");
    }

    let request = IngestionRequest::new(&cli.folder, &cli.collection, &cli.tenant)?
        .with_category(cli.category)
        .with_subcategory(cli.subcategory);

    let pipeline = IngestionPipeline::new(store, embedding_provider, &config);
    let report = pipeline.ingest(&request).await?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_full_invocation() {
        let cli = Cli::try_parse_from([
            "ingest",
            "--folder",
            "/data/pdfs",
            "--collection",
            "docs",
            "--tenant",
            "acme",
            "--category",
            "finance",
            "--create",
            "--vector-size",
            "384",
            "--distance",
            "dot",
        ])
        .expect("parse");

        assert_eq!(cli.folder, PathBuf::from("/data/pdfs"));
        assert_eq!(cli.tenant, "acme");
        assert_eq!(cli.category.as_deref(), Some("finance"));
        assert!(cli.create);
        assert_eq!(cli.vector_size, Some(384));
        assert_eq!(cli.distance, DistanceMetric::DotProduct);
    }

    #[test]
    fn test_vector_size_requires_create() {
        let result = Cli::try_parse_from([
            "ingest",
            "--folder",
            "/data",
            "--collection",
            "docs",
            "--tenant",
            "acme",
            "--vector-size",
            "384",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_distance_is_rejected() {
        let result = Cli::try_parse_from([
            "ingest",
            "--folder",
            "/data",
            "--collection",
            "docs",
            "--tenant",
            "acme",
            "--distance",
            "manhattan",
        ]);
        assert!(result.is_err());
    }
}
