//! Cluster access command line tool
//!
//! Offline inspection of the access configuration: policy decisions,
//! sidecar endpoint rewriting and stored compaction history.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cluster_access::config::{Config, ConfigError, DatacenterAvailability};
use cluster_access::policy::{AccessPolicy, AccessibleDatacenters};
use cluster_access::selector::enforce_local_node;
use cluster_access::storage::{open_store, CompactionStore, StorageError};

/// Cluster access - topology-aware management access for Cassandra clusters
#[derive(Parser, Debug)]
#[command(name = "cluster-access")]
#[command(about = "Inspect management access decisions for Cassandra clusters")]
struct Args {
    /// Configuration file path (YAML format)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the datacenter availability mode (all, local, each, sidecar)
    #[arg(long)]
    availability: Option<DatacenterAvailability>,

    /// Override the address of the co-located node
    #[arg(long)]
    local_node_address: Option<String>,

    /// Override the node a sidecar contacts instead of loopback
    #[arg(long)]
    enforced_local_node: Option<String>,

    /// Log level
    #[arg(long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check whether a node may be contacted directly
    CheckAccess {
        /// Datacenter of the node
        #[arg(short, long)]
        datacenter: String,
        /// Address of the node
        #[arg(short, long)]
        address: String,
    },
    /// Show the endpoints that would actually be contacted
    SidecarEndpoints {
        /// Candidate endpoints
        endpoints: Vec<String>,
    },
    /// Print the last stored compactions of a node
    StoredCompactions {
        /// Cluster name
        #[arg(long)]
        cluster: String,
        /// Node hostname
        #[arg(long)]
        host: String,
    },
    /// Print the effective configuration
    ShowConfig,
}

/// Load the configuration file, then apply command line overrides
fn load_config(args: &Args) -> Result<Config, ConfigError> {
    // Load configuration from file if specified, otherwise use defaults
    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    // Override config with command line arguments
    if let Some(availability) = args.availability {
        config.access.datacenter_availability = availability;
    }
    if let Some(address) = &args.local_node_address {
        config.access.local_node_address = Some(address.clone());
    }
    if let Some(node) = &args.enforced_local_node {
        config.access.enforced_local_node = Some(node.clone());
    }
    if let Some(level) = &args.log_level {
        config.log.level = level.clone();
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    // Initialize logging
    let level = match config.log.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(
        "Datacenter availability: {}",
        config.access.datacenter_availability
    );

    match args.command {
        Command::CheckAccess {
            datacenter,
            address,
        } => {
            let accessible =
                AccessibleDatacenters::new(config.access.initial_accessible_datacenters());
            let policy = AccessPolicy::from_config(&config.access, accessible);
            let allowed = policy.is_directly_accessible(&datacenter, &address);
            println!(
                "{} in {}: {}",
                address,
                datacenter,
                if allowed { "direct" } else { "stored" }
            );
        }
        Command::SidecarEndpoints { endpoints } => {
            let actual = enforce_local_node(
                config.access.is_in_sidecar_mode(),
                config.access.enforced_local_node.as_deref(),
                &endpoints,
            );
            for endpoint in actual {
                println!("{}", endpoint);
            }
        }
        Command::StoredCompactions { cluster, host } => {
            let store = open_store(&config.storage).ok_or(StorageError::Unavailable)?;
            let compactions = store.list_compactions(&cluster, &host).await?;
            info!("{} stored compactions for {}", compactions.len(), host);
            println!("{}", serde_json::to_string_pretty(&compactions)?);
        }
        Command::ShowConfig => {
            print!("{}", serde_yaml::to_string(&config)?);
        }
    }

    Ok(())
}
