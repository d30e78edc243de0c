//! leasekv Server Binary
//!
//! Starts the TCP store that lock managers and rate limiters connect to.

use std::sync::Arc;

use clap::Parser;
use leasekv::network::Server;
use leasekv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// leasekv Server
#[derive(Parser, Debug)]
#[command(name = "leasekv-server")]
#[command(about = "Expiring key-value store for distributed locks and rate limits")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    listen: String,

    /// Maximum concurrent connections
    #[arg(short, long, default_value = "1024")]
    max_connections: usize,

    /// Worker threads serving connections
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Idle read timeout per connection in milliseconds (must be non-zero)
    #[arg(long, default_value = "5000")]
    read_timeout_ms: u64,

    /// Expired-key sweep interval in milliseconds
    #[arg(long, default_value = "1000")]
    purge_interval_ms: u64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,leasekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("leasekv Server v{}", leasekv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_connections(args.max_connections)
        .worker_threads(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .purge_interval_ms(args.purge_interval_ms)
        .build();

    let engine = Arc::new(Engine::new());
    tracing::info!("Scripts: {}", engine.scripts().names().join(", "));

    let server = match Server::bind(config, engine) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Failed to start server: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
