use crate::{contracts::BuyMeACoffee, error::CoffeeError, models::PaymentRecord};
use async_trait::async_trait;
use ethers::{
    prelude::*,
    types::{Address, H256, U256},
};
use futures::{
    channel::{mpsc, oneshot},
    Stream, StreamExt,
};
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::task::JoinHandle;

/// Calls against the deployed payment contract, bound to one account.
#[async_trait]
pub trait PaymentContract: Send + Sync {
    /// Sends a paid `buyCoffee` transaction and waits for its receipt.
    async fn submit_payment(
        &self,
        name: &str,
        message: &str,
        amount: U256,
    ) -> Result<H256, CoffeeError>;

    /// Reads the whole payment history.
    async fn list_payments(&self) -> Result<Vec<PaymentRecord>, CoffeeError>;

    /// Starts listening for `NewMemo` events.
    async fn new_payments(&self) -> Result<PaymentStream, CoffeeError>;
}

/// Records pushed by the contract. Dropping the stream stops the task
/// feeding it.
pub struct PaymentStream {
    receiver: mpsc::UnboundedReceiver<PaymentRecord>,
    feeder: Option<JoinHandle<()>>,
}

impl PaymentStream {
    pub fn channel() -> (mpsc::UnboundedSender<PaymentRecord>, Self) {
        let (sender, receiver) = mpsc::unbounded();
        (
            sender,
            Self {
                receiver,
                feeder: None,
            },
        )
    }

    pub fn with_feeder(mut self, feeder: JoinHandle<()>) -> Self {
        self.feeder = Some(feeder);
        self
    }
}

impl Stream for PaymentStream {
    type Item = PaymentRecord;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut().receiver.poll_next_unpin(cx)
    }
}

impl Drop for PaymentStream {
    fn drop(&mut self) {
        if let Some(feeder) = self.feeder.take() {
            feeder.abort();
        }
    }
}

pub struct CoffeeContract<M> {
    contract: BuyMeACoffee<M>,
    client: Arc<M>,
    address: Address,
    account: Address,
}

impl<M: Middleware + 'static> CoffeeContract<M> {
    pub fn new(address: Address, account: Address, client: Arc<M>) -> Self {
        Self {
            contract: BuyMeACoffee::new(address, client.clone()),
            client,
            address,
            account,
        }
    }
}

#[async_trait]
impl<M: Middleware + 'static> PaymentContract for CoffeeContract<M> {
    async fn submit_payment(
        &self,
        name: &str,
        message: &str,
        amount: U256,
    ) -> Result<H256, CoffeeError> {
        tracing::info!(
            "Sending {} wei to {:?} from {:?}",
            amount,
            self.address,
            self.account
        );

        let call = self
            .contract
            .buy_coffee(name.to_string(), message.to_string())
            .from(self.account)
            .value(amount);
        let pending_tx = call.send().await.map_err(CoffeeError::contract)?;

        tracing::info!("Transaction sent, waiting for confirmation...");

        let receipt = pending_tx
            .await?
            .ok_or(CoffeeError::TransactionDropped)?;

        if receipt.status != Some(1.into()) {
            return Err(CoffeeError::TransactionReverted(receipt.transaction_hash));
        }

        tracing::info!("Payment confirmed: {:?}", receipt.transaction_hash);

        Ok(receipt.transaction_hash)
    }

    async fn list_payments(&self) -> Result<Vec<PaymentRecord>, CoffeeError> {
        let memos = self
            .contract
            .get_memos()
            .call()
            .await
            .map_err(CoffeeError::contract)?;

        tracing::debug!("Fetched {} memos", memos.len());

        Ok(memos
            .into_iter()
            .map(|memo: (Address, U256, String, String)| PaymentRecord::from(memo))
            .collect())
    }

    async fn new_payments(&self) -> Result<PaymentStream, CoffeeError> {
        let contract = BuyMeACoffee::new(self.address, self.client.clone());
        let (sender, stream) = PaymentStream::channel();
        let (ready_tx, ready_rx) = oneshot::channel();

        let feeder = tokio::spawn(async move {
            let event = contract.new_memo_filter();
            let mut events = match event.stream().await {
                Ok(events) => {
                    let _ = ready_tx.send(Ok(()));
                    events
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(CoffeeError::SubscriptionError(e.to_string())));
                    return;
                }
            };

            while let Some(item) = events.next().await {
                match item {
                    Ok(memo) => {
                        if sender.unbounded_send(PaymentRecord::from(memo)).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Skipping undecodable NewMemo event: {}", e),
                }
            }

            tracing::debug!("NewMemo event stream ended");
        });

        match ready_rx.await {
            Ok(Ok(())) => Ok(stream.with_feeder(feeder)),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(CoffeeError::SubscriptionError(
                "event feeder exited before subscribing".to_string(),
            )),
        }
    }
}
