use anyhow::Result;
use liquorscraper::{fetch::SodaClient, run, Config};
use reqwest::Client;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder().with_env_filter(env).init();

    std::panic::set_hook(Box::new(|info| {
        eprintln!("panic: {:?}", info);
    }));

    // ─── 2) fixed configuration, no timeout on the client ────────────
    let config = Config::default();
    let source = SodaClient::new(Client::new(), config.clone());

    // ─── 3) rebuild the output file ──────────────────────────────────
    match run(&source, &config).await {
        Ok(summary) => info!(stop = ?summary.stop, batches = summary.batches, "done"),
        Err(e) => error!("{:#}", e),
    }

    Ok(())
}
