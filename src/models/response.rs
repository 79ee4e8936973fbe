use super::{PaymentForm, Session};
use chrono::{DateTime, Utc};
use ethers::types::{Address, H256};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    pub timestamp: DateTime<Utc>,
    pub request_id: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub session: Session,
    pub pending: bool,
    pub form: PaymentForm,
    pub contract_address: Address,
    pub payments_cached: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PaymentReceipt {
    pub tx_hash: H256,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub ethereum_rpc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    pub wallet_available: bool,
    pub subscription_active: bool,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}
