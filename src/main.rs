use anyhow::Context;
use tracing::{info, warn, Level};
use tradeledger::core::config::{CodecConfig, Credentials, Verbosity};
use tradeledger::utils::{collect_transactions, required_credentials};
use tradeledger::{ExchangeApi, ExchangeFactory, ExchangeId};

fn load_credentials(exchange: ExchangeId) -> anyhow::Result<Credentials> {
    let names = required_credentials(exchange);
    #[cfg(feature = "env-file")]
    let credentials = Credentials::from_env_file(exchange.as_str(), names)?;
    #[cfg(not(feature = "env-file"))]
    let credentials = Credentials::from_env(exchange.as_str(), names);
    Ok(credentials)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let verbosity = Verbosity::from_env("TRADELEDGER_DEBUG");
    tracing_subscriber::fmt()
        .with_max_level(if verbosity.is_debug() {
            Level::DEBUG
        } else {
            Level::INFO
        })
        .with_writer(std::io::stderr)
        .init();

    let mut apis: Vec<Box<dyn ExchangeApi>> = Vec::new();
    for exchange in ExchangeId::ALL {
        let credentials = load_credentials(exchange)?;
        if credentials.is_empty() {
            warn!(exchange = %exchange, "No credentials configured, skipping");
            continue;
        }
        let api = ExchangeFactory::create_with_verbosity(
            exchange,
            credentials,
            CodecConfig::default(),
            verbosity,
        )
        .with_context(|| format!("Failed to configure {}", exchange))?;
        apis.push(api);
    }

    let report = collect_transactions(&apis).await;
    for transaction in &report.transactions {
        println!("{}", serde_json::to_string(transaction)?);
    }

    info!(
        exchanges = apis.len(),
        transactions = report.transactions.len(),
        failed = ?report.failed_exchanges(),
        "Collection finished"
    );
    Ok(())
}
