use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

const DEFAULT_CONFIG_PATH: &str = "config.toml";

#[derive(Parser)]
#[command(name = "tingxie", about = "Chinese dictation service with silence trimming")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP service (default)
    Serve {
        /// Override `server.host:server.port`, e.g. 0.0.0.0:8000
        #[arg(long)]
        bind: Option<String>,
    },
    /// Trim leading and trailing silence from a WAV file
    Trim {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn load_config(path: &Path) -> Result<tingxie_core::AppConfig> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        return Ok(tingxie_core::AppConfig::default());
    }
    tingxie_core::AppConfig::load_from_file(path)
        .with_context(|| format!("failed to load config from {:?}", path))
}

fn init_tracing(log_level: &str) -> Result<()> {
    let env_filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config)?;
    init_tracing(&config.general.log_level)?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Serve { bind } => serve(config, bind).await,
        Command::Trim { input, output } => trim_file(&config, &input, &output),
    }
}

async fn serve(config: tingxie_core::AppConfig, bind: Option<String>) -> Result<()> {
    tracing::info!("tingxie starting");

    let engine_name = config.engine.name.clone();
    let engine = tingxie_engine::EngineRegistry::new()
        .build(&engine_name, config.engine.settings_for(&engine_name))
        .await
        .with_context(|| format!("failed to initialize engine '{engine_name}'"))?;

    let state = tingxie_server::AppState::from_config(&config, Arc::from(engine));
    if !state.has_default_api_key() {
        tracing::warn!(
            "no default API key ({} unset); requests must supply 'api_key'",
            config.engine.api_key_env
        );
    }
    match state.trim_params() {
        Some(params) => tracing::info!(margin_ms = params.margin_ms, "silence trimming enabled"),
        None => tracing::info!("silence trimming disabled"),
    }

    let addr = bind.unwrap_or_else(|| config.server.bind_addr());
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let app = tingxie_server::router(Arc::new(state), config.server.max_upload_bytes);

    tingxie_server::serve(listener, app, shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("shutting down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for ctrl-c: {e}");
        std::future::pending::<()>().await;
    }
}

fn trim_file(config: &tingxie_core::AppConfig, input: &Path, output: &Path) -> Result<()> {
    let bytes =
        std::fs::read(input).with_context(|| format!("failed to read {:?}", input))?;
    let descriptor = tingxie_audio::WavDescriptor::parse(&bytes)
        .with_context(|| format!("{:?} is not a usable WAV file", input))?;

    let params = tingxie_audio::TrimParams::with_margin_ms(config.trim.margin_ms);
    let result = tingxie_audio::trim_with_descriptor(&bytes, &descriptor, &params);
    std::fs::write(output, &result.audio)
        .with_context(|| format!("failed to write {:?}", output))?;

    let after = tingxie_audio::WavDescriptor::parse(&result.audio)
        .map(|d| d.duration_secs())
        .unwrap_or(0.0);
    tracing::info!(
        trimmed = result.trimmed,
        before_secs = descriptor.duration_secs(),
        after_secs = after,
        "wrote {:?}",
        output
    );
    Ok(())
}
