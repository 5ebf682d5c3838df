//! ColKV Server Binary
//!
//! Starts a TCP store node backed by an in-memory column store.

use std::sync::Arc;

use clap::Parser;
use colkv::network::Server;
use colkv::store::ColumnStore;
use colkv::ServerConfig;
use tracing_subscriber::{fmt, EnvFilter};

/// ColKV Server
#[derive(Parser, Debug)]
#[command(name = "colkv-server")]
#[command(about = "In-memory column-family store node")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:9160")]
    listen: String,

    /// Worker threads (concurrent connections served)
    #[arg(short, long, default_value = "8")]
    workers: usize,

    /// Connection read timeout in milliseconds (0 = none)
    #[arg(long, default_value = "30000")]
    read_timeout_ms: u64,

    /// Connection write timeout in milliseconds (0 = none)
    #[arg(long, default_value = "5000")]
    write_timeout_ms: u64,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,colkv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .init();

    let args = Args::parse();

    tracing::info!("ColKV Server v{}", colkv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = ServerConfig::builder()
        .listen_addr(&args.listen)
        .workers(args.workers)
        .read_timeout_ms(args.read_timeout_ms)
        .write_timeout_ms(args.write_timeout_ms)
        .build();

    let mut server = Server::new(config, Arc::new(ColumnStore::new()));
    if let Err(e) = server.run() {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }

    tracing::info!("Server stopped");
}
