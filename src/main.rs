use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use talkdrill::questions::BuiltinBank;
use talkdrill::speech::{ConsoleSynthesizer, NatsRecognizer, SpeechRecognizer, UnsupportedRecognizer};
use talkdrill::store::{MemoryStore, ProgressStore, RestStore};
use talkdrill::{create_router, AppState, Config};

#[derive(Debug, Parser)]
#[command(name = "talkdrill", about = "English speaking-practice session engine")]
struct Args {
    /// Config file (TOML), without extension
    #[arg(long, default_value = "config/talkdrill")]
    config: String,

    /// Override the bind address from the config
    #[arg(long)]
    bind: Option<String>,

    /// Override the port from the config
    #[arg(long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let cfg = match Config::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("No config loaded ({}); using defaults", e);
            Config::default()
        }
    };

    info!("talkdrill v0.1.0");
    info!("Service: {}", cfg.service.name);

    let recognizer: Arc<dyn SpeechRecognizer> = match &cfg.speech.nats_url {
        Some(url) => Arc::new(
            NatsRecognizer::connect(url)
                .await
                .context("connecting to the STT bridge")?,
        ),
        None => {
            info!("No STT bridge configured; turns will use placeholder transcripts");
            Arc::new(UnsupportedRecognizer)
        }
    };

    let store: Arc<dyn ProgressStore> = match &cfg.store.base_url {
        Some(url) => Arc::new(RestStore::new(url.clone())),
        None => {
            info!("No document store configured; progress is kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let state = AppState::new(
        recognizer,
        Arc::new(ConsoleSynthesizer),
        Arc::new(BuiltinBank::new()),
        store,
    );

    let bind = args.bind.unwrap_or(cfg.service.http.bind);
    let port = args.port.unwrap_or(cfg.service.http.port);
    let addr = format!("{}:{}", bind, port);

    info!("HTTP server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;
    axum::serve(listener, create_router(state))
        .await
        .context("serving HTTP")?;

    Ok(())
}
