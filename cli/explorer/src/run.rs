//! Main execution logic for the kbx CLI.

use std::sync::Arc;

use anyhow::Result;
use kbx_api::{create_router, serve, shutdown_signal, AppState, ServerConfig};
use kbx_error::KbxError;
use kbx_explorer::storage::{ObjectStoreStorage, S3Config, S3Storage};
use kbx_explorer::{Explorer, ExplorerConfig, SchemaConfig, TreeQuery};
use kbx_traits::BackupStore;
use kbx_types::{parse_date_time, StorageNode, TopicFilter};
use tracing::{info, Level};
use tracing_subscriber::fmt;

use crate::args::{Backend, Command, ServeArgs, StoreArgs, TreeArgs};

/// Initialize logging.
pub fn init_logging(level: Level) -> Result<()> {
    let subscriber = fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr); // Log to stderr so stdout is clean for output

    subscriber.init();

    Ok(())
}

/// Execute the selected subcommand.
pub async fn execute(command: Command) -> Result<()> {
    match command {
        Command::Serve(args) => run_serve(args).await,
        Command::Tree(args) => {
            let nodes = run_tree(args).await?;
            println!("{}", serde_json::to_string_pretty(&nodes)?);
            Ok(())
        }
    }
}

async fn run_serve(args: ServeArgs) -> Result<()> {
    let explorer = build_explorer(&args.store).await?;
    info!(
        backend = ?args.store.backend,
        root_key = %explorer.root_key(),
        "Explorer ready"
    );

    let config = ServerConfig::default()
        .with_listen(args.listen)
        .with_request_timeout_secs(args.request_timeout_secs);
    let router = create_router(AppState::new(explorer), &config);

    serve(router, config.listen, shutdown_signal()).await?;
    Ok(())
}

async fn run_tree(args: TreeArgs) -> Result<Vec<StorageNode>> {
    let from = args.from.as_deref().map(parse_date_time).transpose()?;
    let until = args.until.as_deref().map(parse_date_time).transpose()?;

    let mut query = TreeQuery::new()
        .with_topics(TopicFilter::parse(&args.topics)?)
        .with_bounds(from, until)?;
    if let Some(pattern) = args.search {
        query = query.with_search_pattern(pattern);
    }

    let explorer = build_explorer(&args.store).await?;
    Ok(explorer.query_tree(query).await?)
}

/// Build the explorer over the configured backend.
async fn build_explorer(args: &StoreArgs) -> Result<Explorer> {
    let store = build_store(args).await?;

    let config = ExplorerConfig::new()
        .with_root_key(&args.root_key)
        .with_schema(
            SchemaConfig::new()
                .with_partition_pattern(&args.partition_pattern)
                .with_leaf_pattern(&args.leaf_pattern),
        )
        .with_max_concurrent_requests(args.concurrency)
        .with_max_parallel_branches(args.parallel_branches);

    Ok(Explorer::new(store, config)?)
}

async fn build_store(args: &StoreArgs) -> Result<Arc<dyn BackupStore>> {
    match args.backend {
        Backend::S3 => {
            let bucket = args.bucket.as_deref().unwrap_or_default();
            let mut s3_config = S3Config::new(bucket);

            if let Some(region) = &args.region {
                s3_config = s3_config.with_region(region);
            }

            if let Some(endpoint) = &args.s3_endpoint {
                s3_config = s3_config.with_endpoint(endpoint);
            }

            match (&args.access_key, &args.secret_key) {
                (Some(access_key), Some(secret_key)) => {
                    s3_config = s3_config.with_credentials(access_key, secret_key);
                }
                (None, None) => {}
                _ => {
                    return Err(KbxError::Config(
                        "--access-key and --secret-key must be given together".to_string(),
                    )
                    .into())
                }
            }

            if let Some(profile) = &args.profile {
                s3_config = s3_config.with_profile(profile);
            }

            Ok(Arc::new(S3Storage::from_config(&s3_config).await?))
        }
        Backend::Local => {
            let root = args
                .local_root
                .as_deref()
                .filter(|root| !root.trim().is_empty())
                .ok_or_else(|| {
                    KbxError::Config("--local-root is required when backend=local".to_string())
                })?;
            Ok(Arc::new(ObjectStoreStorage::local(root)?))
        }
    }
}
