use crate::config::{ConfigError, ServiceConfig};
use crate::runtime_config::RuntimeConfig;
use crate::server::{HttpServer, ServerHandle, SurveyService};
use crate::store::{CorruptStorePolicy, StoreWriter};
use crate::survey::validate_body;
use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Command-line interface for the survey intake service
#[derive(Parser)]
#[command(name = "survey-intake")]
#[command(about = "Survey submission intake service", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server until SIGINT or SIGTERM
    Serve(ServeArgs),
    /// Validate a submission body without storing it
    Check {
        /// JSON file holding one submission request body
        #[arg(short, long)]
        body: PathBuf,
    },
}

/// Flags for `serve`. Each one overrides the config file and environment.
#[derive(Args, Debug, Default, Clone)]
pub struct ServeArgs {
    /// YAML config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Listen address, e.g. 0.0.0.0:8080
    #[arg(long)]
    pub addr: Option<String>,

    /// Directory holding the store file
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Store file name inside the data directory
    #[arg(long)]
    pub store_file: Option<String>,

    /// What to do when the store file cannot be parsed (reject or overwrite)
    #[arg(long)]
    pub on_corrupt_store: Option<CorruptStorePolicy>,
}

/// Resolve defaults, then the config file, then `SURVEY_*` variables, then flags.
///
/// # Errors
///
/// Returns an error if the config file is unreadable, a variable is invalid or
/// the merged result fails [`ServiceConfig::validate`].
pub fn resolve_config(args: &ServeArgs) -> Result<ServiceConfig, ConfigError> {
    let base = match &args.config {
        Some(path) => ServiceConfig::load(path)?,
        None => ServiceConfig::default(),
    };
    let mut cfg = base.apply_env()?;

    if let Some(addr) = &args.addr {
        cfg.server.addr = addr.clone();
    }
    if let Some(dir) = &args.data_dir {
        cfg.store.data_dir = dir.clone();
    }
    if let Some(name) = &args.store_file {
        cfg.store.file_name = name.clone();
    }
    if let Some(policy) = args.on_corrupt_store {
        cfg.store.on_corrupt = policy;
    }

    cfg.validate()?;
    Ok(cfg)
}

/// Parse the command line and run the chosen command.
///
/// # Errors
///
/// Returns an error if configuration fails, the server cannot start, or
/// `check` finds the body invalid.
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Serve(args) => {
            let config = resolve_config(&args)?;
            let running = start(&config, RuntimeConfig::from_env())?;
            wait_for_shutdown(running)
        }
        Commands::Check { body } => check_body(&body),
    }
}

/// A started server together with the writer that owns its store.
pub struct RunningService {
    pub server: ServerHandle,
    pub writer: StoreWriter,
}

impl RunningService {
    /// Stop accepting connections, then wait for every append already queued
    /// on the writer to reach the store file.
    ///
    /// # Errors
    ///
    /// Returns an error if the writer exited before it could be drained.
    pub fn shutdown(self) -> anyhow::Result<()> {
        self.server.stop();
        info!("Server stopped");
        let appended = self
            .writer
            .flush()
            .context("store writer exited before draining")?;
        info!(appended = appended, "Store writer drained");
        Ok(())
    }
}

/// Configure the runtime, spawn the store writer and bind the listener.
///
/// # Errors
///
/// Returns an error if the writer coroutine cannot be spawned or the address
/// cannot be bound.
pub fn start(config: &ServiceConfig, runtime: RuntimeConfig) -> anyhow::Result<RunningService> {
    runtime.apply();

    let store = config.file_store();
    info!(
        addr = %config.server.addr,
        store_path = %store.path().display(),
        on_corrupt = %store.policy(),
        stack_size = runtime.stack_size,
        "Starting survey intake"
    );

    // SAFETY: StoreWriter::spawn() is unsafe because it spawns a may coroutine.
    // The runtime stack size was applied just above.
    let writer = unsafe { StoreWriter::spawn(store, runtime.stack_size) }
        .context("failed to spawn store writer")?;

    let service = SurveyService::new(Arc::new(writer.clone()));
    let server = HttpServer(service)
        .start(config.server.addr.as_str())
        .with_context(|| format!("failed to bind {}", config.server.addr))?;
    info!(addr = %server.addr(), "Listening");
    Ok(RunningService { server, writer })
}

#[cfg(unix)]
fn wait_for_shutdown(running: RunningService) -> anyhow::Result<()> {
    use signal_hook::consts::{SIGINT, SIGTERM};
    use signal_hook::iterator::Signals;

    let mut signals =
        Signals::new([SIGINT, SIGTERM]).context("failed to install signal handlers")?;
    if let Some(signal) = signals.forever().next() {
        info!(signal = signal, "Shutdown signal received");
    }
    running.shutdown()
}

#[cfg(not(unix))]
fn wait_for_shutdown(running: RunningService) -> anyhow::Result<()> {
    running
        .server
        .join()
        .map_err(|e| anyhow!("server coroutine panicked: {e:?}"))
}

/// Validate the submission body stored at `body` and print the outcome.
///
/// # Errors
///
/// Returns the client-facing validation message when the body is rejected.
pub fn check_body(body: &Path) -> anyhow::Result<()> {
    let bytes =
        std::fs::read(body).with_context(|| format!("failed to read {}", body.display()))?;
    match validate_body(&bytes) {
        Ok(_) => {
            println!("ok");
            Ok(())
        }
        Err(err) => Err(anyhow!("{}", err.public_message())),
    }
}
