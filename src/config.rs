use crate::contracts::CONTRACT_ADDRESS;
use anyhow::{bail, Context, Result};
use ethers::types::Address;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Testnet,
    Production,
}

/// Where the wallet connector gets its accounts from.
#[derive(Clone, PartialEq, Eq)]
pub enum WalletSource {
    PrivateKey(String),
    NodeAccounts,
    None,
}

impl std::fmt::Debug for WalletSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WalletSource::PrivateKey(_) => f.write_str("PrivateKey(<redacted>)"),
            WalletSource::NodeAccounts => f.write_str("NodeAccounts"),
            WalletSource::None => f.write_str("None"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub host: String,
    pub port: u16,

    // Chain
    pub rpc_url: String,
    pub chain_id: u64,
    pub contract_address: Address,
    pub poll_interval_ms: u64,

    // Wallet
    pub wallet: WalletSource,

    // Rate Limiting
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let environment = Self::parse_environment(&var("ENVIRONMENT", "development"))?;

        let wallet = match lookup("WALLET_PRIVATE_KEY").filter(|k| !k.is_empty()) {
            Some(key) => WalletSource::PrivateKey(key),
            None if Self::parse_bool(&var("WALLET_NODE_ACCOUNTS", "false"))? => {
                WalletSource::NodeAccounts
            }
            None => WalletSource::None,
        };

        let contract_address = var("CONTRACT_ADDRESS", CONTRACT_ADDRESS);

        let config = Self {
            environment,
            host: var("HOST", "0.0.0.0"),
            port: var("PORT", "8080").parse().context("Invalid PORT")?,

            rpc_url: var("RPC_URL", "http://127.0.0.1:8545"),
            chain_id: var("CHAIN_ID", "31337")
                .parse()
                .context("Invalid CHAIN_ID")?,
            contract_address: Address::from_str(&contract_address)
                .with_context(|| format!("Invalid address for CONTRACT_ADDRESS: {}", contract_address))?,
            poll_interval_ms: var("POLL_INTERVAL_MS", "1000")
                .parse()
                .context("Invalid POLL_INTERVAL_MS")?,

            wallet,

            rate_limit_per_second: var("RATE_LIMIT_PER_SECOND", "10")
                .parse()
                .context("Invalid RATE_LIMIT_PER_SECOND")?,
            rate_limit_burst: var("RATE_LIMIT_BURST", "30")
                .parse()
                .context("Invalid RATE_LIMIT_BURST")?,
        };

        config.validate()?;
        Ok(config)
    }

    fn parse_environment(env: &str) -> Result<Environment> {
        match env.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "testnet" | "test" => Ok(Environment::Testnet),
            "production" | "prod" => Ok(Environment::Production),
            _ => bail!("Unknown environment: {}", env),
        }
    }

    fn parse_bool(value: &str) -> Result<bool> {
        match value.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" | "" => Ok(false),
            _ => bail!("Invalid boolean: {}", value),
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.rpc_url.starts_with("http") {
            bail!("RPC_URL must be HTTP(S) URL");
        }

        if let WalletSource::PrivateKey(key) = &self.wallet {
            if !key.starts_with("0x") {
                bail!("WALLET_PRIVATE_KEY must start with 0x");
            }
        }

        if self.rate_limit_per_second == 0 || self.rate_limit_burst == 0 {
            bail!("Rate limits must be positive");
        }

        tracing::info!(
            "Configuration validated for {:?} environment",
            self.environment
        );

        Ok(())
    }
}
