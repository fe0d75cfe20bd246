use clap::Parser;
use std::net::SocketAddr;

use domino::config::EngineConfig;
use domino::server::{router, AppState};

#[derive(Parser, Debug)]
#[command(name = "domino-server", version, about = "Domino decision engine over HTTP")]
struct Args {
    #[arg(long, default_value = "0.0.0.0")]
    host: String,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// JSON file with engine tuning values
    #[arg(short, long)]
    config: Option<String>,

    /// Decide with the heuristics alone
    #[arg(long)]
    no_solver: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args = Args::parse();
    let mut config = match &args.config {
        Some(path) => EngineConfig::from_json_file(path)?,
        None => EngineConfig::default(),
    };
    if args.no_solver {
        config.use_endgame_solver = false;
    }
    log::info!("Engine configuration: {:?}", config);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Starting domino engine server on {}", addr);

    axum::serve(listener, router(AppState::new(config))).await?;
    Ok(())
}
