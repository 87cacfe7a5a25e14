use clap::Parser;
use shard_router::{create_router, NodeAddr, RouterConfig, ShardRouter};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "shard-router")]
#[command(about = "Routes record keys to live replica nodes", long_about = None)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Address to listen on, overrides the config file
    #[arg(short, long)]
    listen: Option<String>,

    /// Storage node served by this router (repeatable, replaces the config list)
    #[arg(long = "node")]
    nodes: Vec<String>,

    /// Milliseconds without a heartbeat before a node is considered dead
    #[arg(long)]
    forget_timeout_ms: Option<u64>,

    #[arg(long)]
    replication_factor: Option<usize>,

    #[arg(long)]
    min_redundancy: Option<usize>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<RouterConfig> {
        let mut config = match &self.config {
            Some(path) => RouterConfig::from_file(path)?,
            None => RouterConfig::default(),
        };

        if let Some(listen) = self.listen {
            config.listen_addr = listen;
        }
        if !self.nodes.is_empty() {
            config.nodes = self.nodes.into_iter().map(NodeAddr::from).collect();
        }
        if let Some(ms) = self.forget_timeout_ms {
            config.forget_timeout_ms = ms;
        }
        if let Some(rf) = self.replication_factor {
            config.replication_factor = rf;
        }
        if let Some(min) = self.min_redundancy {
            config.min_redundancy = min;
        }

        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shard_router=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = args.into_config()?;
    let listen_addr = config.listen_addr.clone();

    let router = Arc::new(ShardRouter::with_md5(config)?);
    let app = create_router(router);

    let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
    tracing::info!("Router listening on {}", listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
