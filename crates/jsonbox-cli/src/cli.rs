use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use jsonbox_server::ServerConfig;
use jsonbox_store::DEFAULT_MAX_TOTAL_BYTES;

#[derive(Parser)]
#[command(
    name = "jsonbox",
    about = "jsonbox: budgeted JSON document storage over HTTP",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the HTTP server
    Serve(ServeArgs),
    /// Show storage usage against the budget
    Usage(StoreArgs),
    /// Store a JSON file under a path
    Put(PutArgs),
    /// Print the document stored under a path
    Get(GetArgs),
}

/// Location and budget of a local storage directory.
#[derive(Args, Clone, Debug)]
pub struct StoreArgs {
    #[arg(long, default_value = "storage")]
    pub root: PathBuf,
    #[arg(long, default_value_t = DEFAULT_MAX_TOTAL_BYTES)]
    pub max_bytes: u64,
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// TOML config file; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    #[arg(long)]
    pub root: Option<PathBuf>,
    #[arg(long)]
    pub max_bytes: Option<u64>,
}

impl ServeArgs {
    /// Overlay the command-line flags onto `config`.
    pub fn apply(&self, mut config: ServerConfig) -> ServerConfig {
        if let Some(bind) = self.bind {
            config.bind_addr = bind;
        }
        if let Some(root) = &self.root {
            config.storage_root = root.clone();
        }
        if let Some(max_bytes) = self.max_bytes {
            config.max_total_bytes = max_bytes;
        }
        config
    }
}

#[derive(Args, Debug)]
pub struct PutArgs {
    pub path: String,
    pub file: PathBuf,
    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Args, Debug)]
pub struct GetArgs {
    pub path: String,
    #[command(flatten)]
    pub store: StoreArgs,
}
