//! `pensiond` — entry point for running the pension verification service.

mod config;
mod seed;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use config::ServiceConfig;
use pension_evidence::FsEvidenceStore;
use pension_rpc::{AppState, RpcServer, TokenTable};
use pension_store::{AccountStore, Ledger, MemoryLedger};
use pension_store_lmdb::LmdbLedger;
use pension_verification::{AlwaysMatch, SyncReconciler, VerificationEngine};

#[derive(Parser)]
#[command(name = "pensiond", about = "Pension verification service daemon")]
struct Cli {
    /// Data directory for ledger storage.
    #[arg(long, env = "PENSION_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Directory for stored evidence images.
    #[arg(long, env = "PENSION_UPLOADS_DIR")]
    uploads_dir: Option<PathBuf>,

    /// RPC server port.
    #[arg(long, env = "PENSION_RPC_PORT")]
    port: Option<u16>,

    /// Re-verification cadence in days.
    #[arg(long, env = "PENSION_CADENCE_DAYS")]
    cadence_days: Option<u32>,

    /// Run with an in-memory ledger (development only).
    #[arg(long, env = "PENSION_EPHEMERAL")]
    ephemeral: bool,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "PENSION_LOG_LEVEL")]
    log_level: String,

    /// Path to a TOML configuration file. If provided, file settings are
    /// used as the base; CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Run the verification service.
    #[command(name = "server")]
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
    /// Create demo accounts for local development.
    Seed,
}

#[derive(clap::Subcommand)]
enum ServerAction {
    /// Run the server.
    Run,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config: Option<ServiceConfig> = if let Some(ref config_path) = cli.config {
        match std::fs::read_to_string(config_path) {
            Ok(contents) => match toml::from_str::<ServiceConfig>(&contents) {
                Ok(cfg) => Some(cfg),
                Err(e) => {
                    eprintln!("Failed to parse config file: {e}, using CLI defaults");
                    None
                }
            },
            Err(e) => {
                eprintln!(
                    "Failed to read config file {}: {e}, using CLI defaults",
                    config_path.display()
                );
                None
            }
        }
    } else {
        None
    };

    let base = file_config.unwrap_or_default();
    let config = ServiceConfig {
        data_dir: cli.data_dir.unwrap_or(base.data_dir),
        uploads_dir: cli.uploads_dir.unwrap_or(base.uploads_dir),
        rpc_port: cli.port.unwrap_or(base.rpc_port),
        verification_cadence_days: cli.cadence_days.unwrap_or(base.verification_cadence_days),
        max_image_mb: base.max_image_mb,
        log_level: cli.log_level,
        ephemeral: cli.ephemeral || base.ephemeral,
    };

    pension_utils::init_tracing(&config.log_level);

    match cli.command {
        Command::Server {
            action: ServerAction::Run,
        } => {
            tracing::info!(
                port = config.rpc_port,
                cadence_days = config.verification_cadence_days,
                ephemeral = config.ephemeral,
                "starting pension verification service"
            );
            let state = build_state(&config)?;
            RpcServer::new(config.rpc_port).start(state).await?;
            tracing::info!("pensiond exited cleanly");
        }
        Command::Seed => {
            let ledger = open_ledger(&config)?;
            seed::create_demo_accounts(ledger.as_ref())?;
        }
    }

    Ok(())
}

fn open_ledger(config: &ServiceConfig) -> anyhow::Result<Arc<dyn Ledger>> {
    if config.ephemeral {
        tracing::warn!("running with an in-memory ledger; state dies with the process");
        Ok(Arc::new(MemoryLedger::new()))
    } else {
        let path = config.data_dir.join("ledger");
        let ledger = LmdbLedger::open(&path)
            .map_err(|e| anyhow::anyhow!("cannot open ledger at {}: {e}", path.display()))?;
        Ok(Arc::new(ledger))
    }
}

fn build_state(config: &ServiceConfig) -> anyhow::Result<AppState> {
    let params = config.params();
    let ledger = open_ledger(config)?;
    let evidence = Arc::new(
        FsEvidenceStore::open(&config.uploads_dir, params.max_image_bytes)
            .map_err(|e| anyhow::anyhow!("cannot open uploads dir: {e}"))?,
    );

    let engine = Arc::new(VerificationEngine::new(
        ledger.clone(),
        evidence.clone(),
        Arc::new(AlwaysMatch),
        params.clone(),
    ));
    let reconciler = Arc::new(SyncReconciler::new(ledger.clone(), evidence, params));

    // Stand-in for the external credential service: a static token per
    // account, logged at startup. Production wires a real SessionResolver.
    let sessions = Arc::new(TokenTable::new());
    for account in ledger.iter_accounts()? {
        let token = format!("token-{}", account.id.as_u64());
        tracing::info!(email = %account.email, token = %token, "dev session token registered");
        sessions.insert(token, account.id);
    }

    Ok(AppState::new(ledger, engine, reconciler, sessions))
}
