use anyhow::{Context, Result};
use coffee_dapp::{
    config::{Config, WalletSource},
    middleware::with_rate_limit,
    routes::build_router,
    services::{CoffeeApp, KeyWallet, NodeWallet, WalletProvider},
};
use ethers::providers::{Http, Middleware, Provider};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    tracing::info!("Starting buy-me-a-coffee v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {:?}", config.environment);

    let wallet = build_wallet(&config).await?;
    let app = Arc::new(CoffeeApp::new(wallet, config.contract_address));

    let router = with_rate_limit(
        build_router(app.clone()),
        config.rate_limit_per_second,
        config.rate_limit_burst,
    )?;

    // Start server
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Live feed: ws://{}/ws/payments", addr);
    tracing::info!("Health check: http://{}/health", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    app.shutdown().await;

    Ok(())
}

async fn build_wallet(config: &Config) -> Result<Option<Arc<dyn WalletProvider>>> {
    let provider = Provider::<Http>::try_from(config.rpc_url.as_str())
        .context("Invalid RPC_URL")?
        .interval(Duration::from_millis(config.poll_interval_ms));

    // The page assumes a fixed network; a mismatch is worth a loud warning
    match provider.get_chainid().await {
        Ok(chain_id) if chain_id.as_u64() != config.chain_id => tracing::warn!(
            "RPC reports chain {} but CHAIN_ID is {}",
            chain_id,
            config.chain_id
        ),
        Ok(chain_id) => tracing::info!("Ethereum RPC connected, chain {}", chain_id),
        Err(e) => tracing::warn!("Ethereum RPC not reachable yet: {}", e),
    }

    let wallet: Option<Arc<dyn WalletProvider>> = match &config.wallet {
        WalletSource::PrivateKey(key) => {
            Some(Arc::new(KeyWallet::new(provider, key, config.chain_id)?))
        }
        WalletSource::NodeAccounts => Some(Arc::new(NodeWallet::new(provider))),
        WalletSource::None => {
            tracing::warn!("No wallet configured, payments disabled");
            None
        }
    };

    Ok(wallet)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for ctrl+c: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down gracefully...");
}
