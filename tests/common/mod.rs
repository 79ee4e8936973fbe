#![allow(dead_code)]

use async_trait::async_trait;
use coffee_dapp::{
    error::CoffeeError,
    models::{PaymentRecord, ViewEvent},
    services::{CoffeeApp, PaymentContract, PaymentStream, WalletProvider},
};
use ethers::types::{Address, H256, U256};
use futures::channel::mpsc::UnboundedSender;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{broadcast, Semaphore};

pub const CONTRACT: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";

pub fn account() -> Address {
    Address::repeat_byte(0xa1)
}

pub fn record(name: &str, timestamp: u64) -> PaymentRecord {
    PaymentRecord {
        from: Address::repeat_byte(0x42),
        timestamp,
        name: name.to_string(),
        message: "Enjoy your coffee!".to_string(),
    }
}

/// In-memory stand-in for the deployed contract.
#[derive(Default)]
pub struct MockContract {
    history: Mutex<Vec<PaymentRecord>>,
    submissions: Mutex<Vec<(String, String, U256)>>,
    feeds: Mutex<Vec<UnboundedSender<PaymentRecord>>>,
    fail_submit: AtomicBool,
    gate: Mutex<Option<Arc<Semaphore>>>,
    feed_gate: Mutex<Option<Arc<Semaphore>>>,
    feed_requests: AtomicUsize,
}

impl MockContract {
    pub fn with_history(history: Vec<PaymentRecord>) -> Self {
        let contract = Self::default();
        *contract.history.lock().unwrap() = history;
        contract
    }

    pub fn fail_submissions(&self) {
        self.fail_submit.store(true, Ordering::SeqCst);
    }

    /// Holds submissions until the returned semaphore gets a permit.
    pub fn hold_submissions(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Holds `new_payments` calls until the returned semaphore gets a permit.
    pub fn hold_feeds(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.feed_gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    pub fn feed_requests(&self) -> usize {
        self.feed_requests.load(Ordering::SeqCst)
    }

    pub fn submissions(&self) -> Vec<(String, String, U256)> {
        self.submissions.lock().unwrap().clone()
    }

    /// Pushes a `NewMemo` notification to every open feed.
    pub fn emit(&self, record: PaymentRecord) {
        let feeds = self.feeds.lock().unwrap();
        for feed in feeds.iter() {
            let _ = feed.unbounded_send(record.clone());
        }
    }

    pub fn open_feeds(&self) -> usize {
        self.feeds
            .lock()
            .unwrap()
            .iter()
            .filter(|feed| !feed.is_closed())
            .count()
    }
}

#[async_trait]
impl PaymentContract for MockContract {
    async fn submit_payment(
        &self,
        name: &str,
        message: &str,
        amount: U256,
    ) -> Result<H256, CoffeeError> {
        let count = {
            let mut submissions = self.submissions.lock().unwrap();
            submissions.push((name.to_string(), message.to_string(), amount));
            submissions.len()
        };

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        if self.fail_submit.load(Ordering::SeqCst) {
            return Err(CoffeeError::TransactionReverted(H256::zero()));
        }

        Ok(H256::from_low_u64_be(count as u64))
    }

    async fn list_payments(&self) -> Result<Vec<PaymentRecord>, CoffeeError> {
        Ok(self.history.lock().unwrap().clone())
    }

    async fn new_payments(&self) -> Result<PaymentStream, CoffeeError> {
        self.feed_requests.fetch_add(1, Ordering::SeqCst);
        let gate = self.feed_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        let (sender, stream) = PaymentStream::channel();
        self.feeds.lock().unwrap().push(sender);
        Ok(stream)
    }
}

pub struct MockWallet {
    pub accounts: Vec<Address>,
    pub contract: Arc<MockContract>,
}

#[async_trait]
impl WalletProvider for MockWallet {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn request_accounts(&self) -> Result<Vec<Address>, CoffeeError> {
        Ok(self.accounts.clone())
    }

    fn bind_contract(&self, _address: Address, _account: Address) -> Arc<dyn PaymentContract> {
        self.contract.clone()
    }

    async fn block_number(&self) -> Result<u64, CoffeeError> {
        Ok(42)
    }
}

pub fn app_with(contract: Arc<MockContract>) -> Arc<CoffeeApp> {
    let wallet = MockWallet {
        accounts: vec![account(), Address::repeat_byte(0xb2)],
        contract,
    };
    Arc::new(CoffeeApp::new(Some(Arc::new(wallet)), CONTRACT.parse().unwrap()))
}

pub fn app_without_wallet() -> Arc<CoffeeApp> {
    Arc::new(CoffeeApp::new(None, CONTRACT.parse().unwrap()))
}

/// Waits for the next payment pushed to pages.
pub async fn next_payment(events: &mut broadcast::Receiver<ViewEvent>) -> PaymentRecord {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            if let ViewEvent::Payment(record) = events.recv().await.unwrap() {
                return record;
            }
        }
    })
    .await
    .expect("no payment event")
}

pub async fn eventually<F: Fn() -> bool>(condition: F) -> bool {
    for _ in 0..200 {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
