//! Hiroba presence server.
//!
//! Tracks connected users and room membership, and fans room events out to
//! every connection in the room over WebSocket.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hiroba-server
//! cargo run --bin hiroba-server -- --host 0.0.0.0 --port 3000 --typing-timeout-ms 3000
//! ```

use std::time::Duration;

use clap::Parser;
use hiroba_server::{app::App, config::ServerConfig, ui::Server};
use hiroba_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "hiroba-server")]
#[command(about = "Real-time presence and room fanout server", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Typing indicators expire after this many milliseconds
    #[arg(long, default_value = "5000")]
    typing_timeout_ms: u64,

    /// Capacity of the internal event channel
    #[arg(long, default_value = "1024")]
    event_capacity: usize,

    /// Default log level (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl From<Args> for ServerConfig {
    fn from(args: Args) -> Self {
        Self {
            host: args.host,
            port: args.port,
            typing_timeout: Duration::from_millis(args.typing_timeout_ms),
            event_capacity: args.event_capacity,
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), &args.log_level);

    let config = ServerConfig::from(args);
    let app = App::build(&config);

    let result = Server::new(app.state.clone())
        .run(&config.host, config.port)
        .await;
    app.shutdown();

    if let Err(e) = result {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
