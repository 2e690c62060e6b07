//! CLI argument definitions for kbx.

use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand, ValueEnum};
use kbx_explorer::{DEFAULT_LEAF_PATTERN, DEFAULT_PARTITION_PATTERN, DEFAULT_ROOT_KEY};

/// Kafka backup explorer.
///
/// Browses Kafka topic backups written to object storage below a
/// `topic/year=/month=/day=/hour=/` hierarchy, pruning by topic and time
/// window and optionally searching the decompressed data files.
///
/// ## Examples
///
/// Serve the REST API:
///   kbx serve -b kafka-backup --listen 0.0.0.0:8080
///
/// One query against a local copy of the bucket:
///   kbx tree --backend local --local-root ./backup \
///       --topics neptunedb-security --from 2023-11-01 --until 2023-11-04 \
///       --search "gs.event.db.datachange"
#[derive(Parser, Debug)]
#[command(name = "kbx")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Log level
    #[arg(long, value_enum, default_value = "info", global = true)]
    pub log_level: LogLevel,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// Run one query and print the tree as JSON to stdout
    Tree(TreeArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Address to listen on
    #[arg(long, env = "KBX_LISTEN", default_value = "0.0.0.0:8080")]
    pub listen: SocketAddr,

    /// Requests running longer are answered with 408 (must be >= 1)
    #[arg(long, default_value = "60", value_parser = parse_positive_u64)]
    pub request_timeout_secs: u64,
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Comma separated topics (`*` or `ALL` for every topic)
    #[arg(long, default_value = "ALL")]
    pub topics: String,

    /// Start of the window, inclusive (e.g. 2023-11-03 or 2023-11-03T14:00)
    #[arg(long)]
    pub from: Option<String>,

    /// End of the window, exclusive
    #[arg(long)]
    pub until: Option<String>,

    /// Regex searched in data file content; without it only directories are listed
    #[arg(long)]
    pub search: Option<String>,
}

/// Storage and explorer options shared by all subcommands.
#[derive(Args, Debug)]
pub struct StoreArgs {
    // === Storage Backend ===
    /// Storage backend
    #[arg(long, value_enum, env = "KBX_BACKEND", default_value = "s3")]
    pub backend: Backend,

    /// S3 bucket name (required for the s3 backend)
    #[arg(short, long, env = "KBX_S3_BUCKET")]
    pub bucket: Option<String>,

    /// Directory holding the backup (required for the local backend)
    #[arg(long, env = "KBX_LOCAL_ROOT")]
    pub local_root: Option<String>,

    /// Custom S3 endpoint URL (for LocalStack)
    #[arg(long, env = "KBX_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// AWS access key ID
    #[arg(long, env = "AWS_ACCESS_KEY_ID")]
    pub access_key: Option<String>,

    /// AWS secret access key
    #[arg(long, env = "AWS_SECRET_ACCESS_KEY")]
    pub secret_key: Option<String>,

    /// AWS profile name
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    // === Key Layout ===
    /// Key every query starts from
    #[arg(long, env = "KBX_ROOT_KEY", default_value = DEFAULT_ROOT_KEY)]
    pub root_key: String,

    /// Regex classifying partition keys (named groups topic, year, month, day, hour)
    #[arg(long, env = "KBX_PARTITION_PATTERN", default_value = DEFAULT_PARTITION_PATTERN)]
    pub partition_pattern: String,

    /// Regex classifying data file keys (partition groups plus fileName)
    #[arg(long, env = "KBX_LEAF_PATTERN", default_value = DEFAULT_LEAF_PATTERN)]
    pub leaf_pattern: String,

    // === Parallelism Options ===
    /// Maximum concurrent storage requests (must be >= 1)
    #[arg(long, default_value = "10", value_parser = parse_positive_usize)]
    pub concurrency: usize,

    /// Maximum sibling branches visited at once (must be >= 1)
    #[arg(long, default_value = "8", value_parser = parse_positive_usize)]
    pub parallel_branches: usize,
}

/// Storage backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// Amazon S3 or an S3-compatible endpoint
    S3,
    /// Local directory
    Local,
}

/// Log level argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    /// Trace level (most verbose)
    Trace,
    /// Debug level
    Debug,
    /// Info level (default)
    Info,
    /// Warning level
    Warn,
    /// Error level (least verbose)
    Error,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Parse a positive usize (>= 1).
fn parse_positive_usize(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}

/// Parse a positive u64 (>= 1).
fn parse_positive_u64(s: &str) -> Result<u64, String> {
    let value: u64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if value < 1 {
        return Err(format!("{} is not in 1..", value));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_defaults() {
        let cli = Cli::try_parse_from(["kbx", "tree", "--bucket", "kafka-backup"]).unwrap();
        let Command::Tree(args) = cli.command else {
            panic!("expected tree subcommand");
        };

        assert_eq!(args.topics, "ALL");
        assert_eq!(args.store.backend, Backend::S3);
        assert_eq!(args.store.root_key, DEFAULT_ROOT_KEY);
        assert_eq!(args.store.partition_pattern, DEFAULT_PARTITION_PATTERN);
        assert_eq!(args.store.concurrency, 10);
        assert_eq!(args.store.parallel_branches, 8);
    }

    #[test]
    fn test_serve_listen_address() {
        let cli = Cli::try_parse_from([
            "kbx",
            "serve",
            "--backend",
            "local",
            "--local-root",
            "/tmp/backup",
            "--listen",
            "127.0.0.1:9090",
        ])
        .unwrap();
        let Command::Serve(args) = cli.command else {
            panic!("expected serve subcommand");
        };

        assert_eq!(args.listen, "127.0.0.1:9090".parse::<SocketAddr>().unwrap());
        assert_eq!(args.request_timeout_secs, 60);
        assert_eq!(args.store.backend, Backend::Local);
    }

    #[test]
    fn test_zero_concurrency_is_rejected() {
        let result = Cli::try_parse_from(["kbx", "tree", "--concurrency", "0"]);
        assert!(result.is_err());
    }
}
