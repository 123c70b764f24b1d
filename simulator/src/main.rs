use anyhow::{Context, Result};
use clap::Parser;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tracing::info;
use waterfight_simulator::{Api, Simulator, SimulatorConfig};

#[derive(Parser, Debug)]
#[command(author, version, about = "Local water fight game server")]
struct Args {
    /// Host interface to bind (default: localhost).
    #[arg(long, default_value = "127.0.0.1")]
    host: IpAddr,

    #[arg(short, long, default_value_t = 8080)]
    port: u16,

    /// Seed for fort placement (optional).
    #[arg(long)]
    seed: Option<u64>,

    /// Number of opponents, one fort each.
    #[arg(long)]
    opponents: Option<usize>,

    /// Side length of the square board.
    #[arg(long)]
    board_size: Option<usize>,

    /// Text served by the about endpoint.
    #[arg(long)]
    author: Option<String>,
}

fn build_config(args: &Args) -> Result<SimulatorConfig> {
    let defaults = SimulatorConfig::default();
    if let Some(0) = args.opponents {
        anyhow::bail!("opponents must be > 0");
    }
    if let Some(0) = args.board_size {
        anyhow::bail!("board_size must be > 0");
    }

    Ok(SimulatorConfig {
        num_opponents: args.opponents.unwrap_or(defaults.num_opponents),
        board_size: args.board_size.unwrap_or(defaults.board_size),
        author: args.author.clone().unwrap_or(defaults.author),
        seed: args.seed.or(defaults.seed),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let args = Args::parse();

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = build_config(&args)?;
    info!(
        opponents = config.num_opponents,
        board_size = config.board_size,
        seed = ?config.seed,
        "simulator configured"
    );
    let simulator = Arc::new(Simulator::new(config));
    let router = Api::new(simulator).router();

    // Start server
    let addr = SocketAddr::new(args.host, args.port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, "simulator listening");
    axum::serve(listener, router)
        .await
        .context("axum server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_config_fields() {
        let args = Args::parse_from([
            "simulator",
            "--seed",
            "7",
            "--opponents",
            "3",
            "--author",
            "Someone",
        ]);
        let config = build_config(&args).expect("config should parse");
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.num_opponents, 3);
        assert_eq!(config.board_size, 10);
        assert_eq!(config.author, "Someone");
    }

    #[test]
    fn rejects_zero_opponents() {
        let args = Args::parse_from(["simulator", "--opponents", "0"]);
        let err = build_config(&args).unwrap_err();
        assert!(
            err.to_string().contains("opponents"),
            "unexpected error: {err}"
        );
    }
}
