use crate::{
    error::CoffeeError,
    models::{PaymentForm, PaymentRecord, Session, SessionStatus, ViewEvent},
    services::{Connection, PaymentContract, PaymentLedger, Subscription, WalletConnector, WalletProvider},
};
use ethers::types::{Address, H256, U256};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex, RwLock};
use tokio::task::JoinHandle;

const EVENT_BUFFER: usize = 64;

/// Everything the page shows, owned in one place and shared with the
/// handlers.
pub struct CoffeeApp {
    wallet: WalletConnector,
    contract_address: Address,
    contract: RwLock<Option<Arc<dyn PaymentContract>>>,
    ledger: Arc<PaymentLedger>,
    form: Arc<RwLock<PaymentForm>>,
    pending: Arc<AtomicBool>,
    subscription: Mutex<Option<Subscription>>,
    events: broadcast::Sender<ViewEvent>,
    started_at: Instant,
}

/// Holds the pending flag for one submission and clears it on drop.
struct PendingGuard {
    flag: Arc<AtomicBool>,
    events: broadcast::Sender<ViewEvent>,
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
        let _ = self.events.send(ViewEvent::Pending { pending: false });
    }
}

impl CoffeeApp {
    pub fn new(wallet: Option<Arc<dyn WalletProvider>>, contract_address: Address) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);

        tracing::info!(
            "Payment page bound to contract {:?} (wallet available: {})",
            contract_address,
            wallet.is_some()
        );

        Self {
            wallet: WalletConnector::new(wallet),
            contract_address,
            contract: RwLock::new(None),
            ledger: Arc::new(PaymentLedger::new()),
            form: Arc::new(RwLock::new(PaymentForm::default())),
            pending: Arc::new(AtomicBool::new(false)),
            subscription: Mutex::new(None),
            events,
            started_at: Instant::now(),
        }
    }

    pub fn contract_address(&self) -> Address {
        self.contract_address
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    pub async fn session(&self) -> Session {
        self.wallet.session().await
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst)
    }

    pub async fn form(&self) -> PaymentForm {
        self.form.read().await.clone()
    }

    pub async fn payments(&self) -> Vec<PaymentRecord> {
        self.ledger.snapshot().await
    }

    pub async fn status(&self) -> SessionStatus {
        SessionStatus {
            session: self.session().await,
            pending: self.is_pending(),
            form: self.form().await,
            contract_address: self.contract_address,
            payments_cached: self.ledger.len().await,
        }
    }

    pub async fn subscription_active(&self) -> bool {
        self.subscription
            .lock()
            .await
            .as_ref()
            .map(Subscription::is_active)
            .unwrap_or(false)
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    /// Latest block seen by the wallet's node, if there is a wallet.
    pub async fn chain_head(&self) -> Option<Result<u64, CoffeeError>> {
        match self.wallet.provider() {
            Some(provider) => Some(provider.block_number().await),
            None => None,
        }
    }

    /// Connects the wallet, then starts the live feed and loads history.
    ///
    /// The feed is registered before the bulk read so nothing mined in
    /// between is missed; the ledger drops the overlap. Pages hear about
    /// the new session once the history is in place. A disconnect that
    /// lands while this runs wins: the feed is released and the call
    /// returns `NotConnected`.
    pub async fn connect(&self) -> Result<Connection, CoffeeError> {
        let account = match self.wallet.connect().await {
            Ok(Connection::Connected(account)) => account,
            other => {
                self.publish_session().await;
                return other;
            }
        };

        let provider = self
            .wallet
            .provider()
            .ok_or(CoffeeError::WalletUnavailable)?;
        let contract = provider.bind_contract(self.contract_address, account);
        *self.contract.write().await = Some(contract.clone());

        // A reconnect replaces the previous listener
        self.release_subscription().await;
        match self.subscribe_new_payment(contract.as_ref()).await {
            Ok(subscription) => *self.subscription.lock().await = Some(subscription),
            Err(e) => tracing::warn!("Live payment feed unavailable: {}", e),
        }

        if !self.still_connected(account).await {
            return self.abandon_connect().await;
        }

        if let Err(e) = self.refresh_payments().await {
            tracing::warn!("Failed to load payment history: {}", e);
        }

        if !self.still_connected(account).await {
            return self.abandon_connect().await;
        }

        self.publish_session().await;
        Ok(Connection::Connected(account))
    }

    /// Local only: forgets the account, stops the feed, empties the list.
    pub async fn disconnect(&self) {
        self.wallet.disconnect().await;
        *self.contract.write().await = None;
        self.release_subscription().await;
        self.ledger.clear().await;
        self.publish_session().await;
    }

    /// Registers `NewMemo` handling: each record is appended to the ledger
    /// and pushed to open pages.
    pub async fn subscribe_new_payment(
        &self,
        contract: &dyn PaymentContract,
    ) -> Result<Subscription, CoffeeError> {
        let stream = contract.new_payments().await?;
        let ledger = self.ledger.clone();
        let events = self.events.clone();

        tracing::info!("Subscribed to new payments");

        Ok(Subscription::spawn(stream, move |record| {
            let ledger = ledger.clone();
            let events = events.clone();
            async move {
                if ledger.append(record.clone()).await {
                    tracing::info!("New payment from {:?}: {}", record.from, record.name);
                    let _ = events.send(ViewEvent::Payment(record));
                } else {
                    tracing::debug!("Ignoring payment already in ledger");
                }
            }
        }))
    }

    pub async fn list_payments(&self) -> Result<Vec<PaymentRecord>, CoffeeError> {
        self.bound_contract().await?.list_payments().await
    }

    /// Replaces the cached list with the contract's history.
    pub async fn refresh_payments(&self) -> Result<usize, CoffeeError> {
        let history = self.list_payments().await?;
        self.ledger.load_history(history).await;
        Ok(self.ledger.len().await)
    }

    /// Validates and marks the submission pending, then confirms it on a
    /// background task. The form keeps the typed strings until the payment
    /// is confirmed.
    pub async fn start_payment(
        &self,
        name: impl Into<String>,
        message: impl Into<String>,
        amount: U256,
    ) -> Result<JoinHandle<Result<H256, CoffeeError>>, CoffeeError> {
        let contract = self.bound_contract().await?;

        if amount.is_zero() {
            return Err(CoffeeError::InvalidAmount("must be positive".to_string()));
        }

        let guard = self.begin_transaction()?;

        let typed = PaymentForm::new(name, message);
        let (name, message) = typed.memo_fields();
        *self.form.write().await = typed;

        let form = self.form.clone();
        Ok(tokio::spawn(async move {
            let result = contract.submit_payment(&name, &message, amount).await;

            match &result {
                Ok(tx_hash) => {
                    form.write().await.clear();
                    tracing::info!("Coffee bought by {}: {:?}", name, tx_hash);
                }
                Err(e) => tracing::warn!("Payment failed: {}", e),
            }

            drop(guard);
            result
        }))
    }

    /// Submits a payment and waits for on-chain confirmation.
    pub async fn submit_payment(
        &self,
        name: impl Into<String>,
        message: impl Into<String>,
        amount: U256,
    ) -> Result<H256, CoffeeError> {
        self.start_payment(name, message, amount)
            .await?
            .await
            .map_err(|e| CoffeeError::InternalError(format!("Payment task failed: {}", e)))?
    }

    /// Releases the live feed. Called on server shutdown.
    pub async fn shutdown(&self) {
        self.release_subscription().await;
        tracing::info!("Payment page state released");
    }

    async fn bound_contract(&self) -> Result<Arc<dyn PaymentContract>, CoffeeError> {
        let session = self.wallet.session().await;
        if !session.wallet_available {
            return Err(CoffeeError::WalletUnavailable);
        }
        if !session.logged_in {
            return Err(CoffeeError::NotConnected);
        }

        self.contract
            .read()
            .await
            .clone()
            .ok_or(CoffeeError::NotConnected)
    }

    async fn still_connected(&self, account: Address) -> bool {
        let session = self.wallet.session().await;
        session.logged_in && session.account == Some(account)
    }

    /// Undoes a connect overtaken by a disconnect.
    async fn abandon_connect(&self) -> Result<Connection, CoffeeError> {
        tracing::info!("Wallet disconnected while connecting, dropping feed");
        self.release_subscription().await;
        if !self.wallet.session().await.logged_in {
            *self.contract.write().await = None;
            self.ledger.clear().await;
        }
        Err(CoffeeError::NotConnected)
    }

    fn begin_transaction(&self) -> Result<PendingGuard, CoffeeError> {
        self.pending
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map_err(|_| CoffeeError::TransactionPending)?;

        let _ = self.events.send(ViewEvent::Pending { pending: true });

        Ok(PendingGuard {
            flag: self.pending.clone(),
            events: self.events.clone(),
        })
    }

    async fn release_subscription(&self) {
        if let Some(subscription) = self.subscription.lock().await.take() {
            subscription.unsubscribe();
            tracing::info!("Unsubscribed from new payments");
        }
    }

    async fn publish_session(&self) {
        let _ = self.events.send(ViewEvent::Session(self.session().await));
    }
}
