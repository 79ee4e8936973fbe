use crate::{
    error::CoffeeError,
    models::Session,
    services::{CoffeeContract, PaymentContract},
};
use async_trait::async_trait;
use ethers::{
    prelude::*,
    providers::{Http, Provider},
    types::Address,
};
use std::sync::Arc;
use tokio::sync::RwLock;

/// Account access and transaction signing, standing in for the browser's
/// injected wallet.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Asks the wallet for the accounts this page may use.
    async fn request_accounts(&self) -> Result<Vec<Address>, CoffeeError>;

    /// Binds the payment contract at `address` to `account`.
    fn bind_contract(&self, address: Address, account: Address) -> Arc<dyn PaymentContract>;

    async fn block_number(&self) -> Result<u64, CoffeeError>;
}

/// Signs locally with a private key.
pub struct KeyWallet {
    client: Arc<SignerMiddleware<Provider<Http>, LocalWallet>>,
}

impl KeyWallet {
    pub fn new(provider: Provider<Http>, private_key: &str, chain_id: u64) -> Result<Self, CoffeeError> {
        let wallet = private_key
            .parse::<LocalWallet>()
            .map_err(|e| CoffeeError::ConfigError(format!("Invalid wallet key: {}", e)))?
            .with_chain_id(chain_id);

        tracing::info!("Local wallet loaded for {:?}", wallet.address());

        Ok(Self {
            client: Arc::new(SignerMiddleware::new(provider, wallet)),
        })
    }
}

#[async_trait]
impl WalletProvider for KeyWallet {
    fn name(&self) -> &'static str {
        "local-key"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, CoffeeError> {
        Ok(vec![self.client.address()])
    }

    fn bind_contract(&self, address: Address, account: Address) -> Arc<dyn PaymentContract> {
        Arc::new(CoffeeContract::new(address, account, self.client.clone()))
    }

    async fn block_number(&self) -> Result<u64, CoffeeError> {
        let block = self.client.get_block_number().await.map_err(CoffeeError::contract)?;
        Ok(block.as_u64())
    }
}

/// Uses the node's unlocked accounts; the node signs.
pub struct NodeWallet {
    provider: Arc<Provider<Http>>,
}

impl NodeWallet {
    pub fn new(provider: Provider<Http>) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }
}

#[async_trait]
impl WalletProvider for NodeWallet {
    fn name(&self) -> &'static str {
        "node-accounts"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, CoffeeError> {
        Ok(self.provider.get_accounts().await?)
    }

    fn bind_contract(&self, address: Address, account: Address) -> Arc<dyn PaymentContract> {
        Arc::new(CoffeeContract::new(address, account, self.provider.clone()))
    }

    async fn block_number(&self) -> Result<u64, CoffeeError> {
        let block = self.provider.get_block_number().await?;
        Ok(block.as_u64())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connection {
    Connected(Address),
    Unavailable,
}

/// Tracks which account, if any, the page is logged in with.
pub struct WalletConnector {
    provider: Option<Arc<dyn WalletProvider>>,
    session: RwLock<Session>,
}

impl WalletConnector {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>) -> Self {
        let available = provider.is_some();
        Self {
            provider,
            session: RwLock::new(Session::logged_out(available)),
        }
    }

    pub fn provider(&self) -> Option<&Arc<dyn WalletProvider>> {
        self.provider.as_ref()
    }

    pub async fn session(&self) -> Session {
        self.session.read().await.clone()
    }

    pub async fn connect(&self) -> Result<Connection, CoffeeError> {
        let Some(provider) = self.provider.as_ref() else {
            tracing::warn!("No wallet provider found");
            self.session.write().await.wallet_available = false;
            return Ok(Connection::Unavailable);
        };

        let accounts = match provider.request_accounts().await {
            Ok(accounts) => accounts,
            Err(e) => {
                tracing::warn!("Account request to {} failed: {}", provider.name(), e);
                return Err(CoffeeError::ConnectionRejected(e.to_string()));
            }
        };

        let Some(account) = accounts.first().copied() else {
            tracing::warn!("{} returned no accounts", provider.name());
            return Err(CoffeeError::ConnectionRejected("no accounts returned".to_string()));
        };

        let mut session = self.session.write().await;
        session.account = Some(account);
        session.logged_in = true;
        session.wallet_available = true;

        tracing::info!("Wallet connected: {:?}", account);

        Ok(Connection::Connected(account))
    }

    /// Forgets the active account. The provider keeps whatever permission
    /// it granted.
    pub async fn disconnect(&self) {
        let mut session = self.session.write().await;
        if let Some(account) = session.account.take() {
            tracing::info!("Wallet disconnected: {:?}", account);
        }
        session.logged_in = false;
    }
}
