//! CLI module for recall-cache
//!
//! Provides subcommands over the configured value store:
//! - `store` / `get`: typed values through the instrumented cache
//! - `replay`: the recorded history of an operation
//! - `fetch` / `requests`: the expiring fetch cache
//! - `demo`: a store/get/replay walkthrough

pub mod cache;
pub mod demo;
pub mod fetch;

use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::cache::TypedCache;
use crate::domain::store::ValueStore;
use crate::domain::DomainError;
use crate::infrastructure::logging;
use crate::infrastructure::metrics;
use crate::infrastructure::store::{StoreConfig, StoreFactory, StoreType};

/// recall-cache - Instrumented key-value cache with call replay
#[derive(Parser)]
#[command(name = "recall-cache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Print Prometheus metrics to stderr before exiting
    #[arg(long, global = true)]
    pub print_metrics: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Store a value and print its key
    Store {
        value: String,

        /// How to interpret the value
        #[arg(long, value_enum, default_value = "str")]
        kind: ValueKind,
    },

    /// Print the value stored under a key
    Get {
        key: String,

        /// How to decode the stored bytes
        #[arg(long = "as", value_enum, default_value = "string")]
        read_as: ReadAs,
    },

    /// Print the call history of an operation
    Replay {
        #[arg(default_value = crate::domain::instrument::STORE_IDENTITY)]
        identity: String,
    },

    /// Print the body of a URL through the fetch cache
    Fetch { url: String },

    /// Print how many times a URL was requested
    Requests { url: String },

    /// Run the store/get/replay walkthrough
    Demo,
}

impl Command {
    /// Whether the command reads state left behind by an earlier run
    pub fn needs_persistent_store(&self) -> bool {
        !matches!(self, Command::Demo)
    }
}

/// Rejects a process-local store for commands that only make sense
/// across invocations
pub fn check_backend(command: &Command, store: &StoreConfig) -> Result<(), DomainError> {
    if store.backend == StoreType::InMemory && command.needs_persistent_store() {
        return Err(DomainError::configuration(
            "The in_memory store is emptied when the process exits; \
             configure store.backend = \"redis\" or run `demo`",
        ));
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ValueKind {
    Str,
    Int,
    Float,
    Bytes,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReadAs {
    String,
    Int,
    Float,
    Bytes,
}

/// Shared state built once per invocation
#[derive(Debug, Clone)]
pub struct Context {
    pub config: AppConfig,
    pub store: Arc<dyn ValueStore>,
}

impl Context {
    pub fn new(config: AppConfig, store: Arc<dyn ValueStore>) -> Self {
        Self { config, store }
    }

    /// Typed cache for writing, flushed first when `flush_on_start` is set
    pub async fn typed_cache(&self) -> anyhow::Result<TypedCache> {
        if self.config.store.flush_on_start {
            Ok(TypedCache::connect(self.store.clone()).await?)
        } else {
            Ok(TypedCache::new(self.store.clone()))
        }
    }
}

/// Run the parsed command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = AppConfig::load()?;
    logging::init_logging(&config.logging);

    if std::env::var("STORE_TYPE").is_ok() {
        config.store = StoreConfig::from_env()?;
    }

    check_backend(&cli.command, &config.store)?;

    let metrics = if cli.print_metrics {
        metrics::init_metrics()
    } else {
        None
    };

    let store = StoreFactory::new().create(&config.store).await?;
    info!(backend = %config.store.backend, "Value store ready");

    let context = Context::new(config, store);

    match cli.command {
        Command::Store { value, kind } => cache::store(&context, &value, kind).await?,
        Command::Get { key, read_as } => cache::get(&context, &key, read_as).await?,
        Command::Replay { identity } => cache::replay(&context, &identity).await?,
        Command::Fetch { url } => fetch::fetch(&context, &url).await?,
        Command::Requests { url } => fetch::requests(&context, &url).await?,
        Command::Demo => demo::run(&context).await?,
    }

    if let Some(metrics) = metrics {
        eprintln!("{}", metrics.render());
    }

    Ok(())
}
