use crate::models::PaymentRecord;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Local, non-authoritative copy of the contract's payment history.
///
/// Records keep receipt order. A live record only counts as a duplicate
/// while the bulk-read history holds a copy of it not yet matched by an
/// earlier live record; identical payments are otherwise all kept.
#[derive(Default)]
pub struct PaymentLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    records: Vec<PaymentRecord>,
    /// Leading part of `records` that came from the bulk read.
    history_len: usize,
    /// History copies not yet matched by a live record.
    unmatched: HashMap<PaymentRecord, usize>,
}

impl LedgerState {
    /// Consumes one unmatched history copy of `record`, if any.
    fn match_history(&mut self, record: &PaymentRecord) -> bool {
        match self.unmatched.get_mut(record) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

impl PaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the bulk-read history. Live records already received that
    /// the history does not account for stay after it, in their original
    /// order.
    pub async fn load_history(&self, history: Vec<PaymentRecord>) {
        let mut state = self.inner.write().await;
        let history_len = state.history_len.min(state.records.len());
        let live = state.records.split_off(history_len);

        state.unmatched.clear();
        for record in &history {
            *state.unmatched.entry(record.clone()).or_insert(0) += 1;
        }

        state.history_len = history.len();
        state.records = history;

        for record in live {
            if !state.match_history(&record) {
                state.records.push(record);
            }
        }

        tracing::debug!("Payment ledger loaded with {} records", state.records.len());
    }

    /// Appends one live record. Returns false if the history already
    /// accounted for it.
    pub async fn append(&self, record: PaymentRecord) -> bool {
        let mut state = self.inner.write().await;
        if state.match_history(&record) {
            return false;
        }
        state.records.push(record);
        true
    }

    pub async fn snapshot(&self) -> Vec<PaymentRecord> {
        self.inner.read().await.records.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn clear(&self) {
        let mut state = self.inner.write().await;
        state.records.clear();
        state.history_len = 0;
        state.unmatched.clear();
    }
}
