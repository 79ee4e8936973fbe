use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use ethers::types::H256;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CoffeeError {
    #[error("No wallet provider available")]
    WalletUnavailable,

    #[error("Wallet not connected")]
    NotConnected,

    #[error("Connection request rejected: {0}")]
    ConnectionRejected(String),

    #[error("A transaction is already pending")]
    TransactionPending,

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("RPC error: {0}")]
    RpcError(#[from] ethers::providers::ProviderError),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("Transaction dropped from mempool")]
    TransactionDropped,

    #[error("Transaction reverted: {0:?}")]
    TransactionReverted(H256),

    #[error("Subscription error: {0}")]
    SubscriptionError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("Anyhow error: {0}")]
    AnyhowError(#[from] anyhow::Error),
}

impl CoffeeError {
    pub fn contract(err: impl std::fmt::Display) -> Self {
        CoffeeError::ContractError(err.to_string())
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CoffeeError::WalletUnavailable => "WALLET_UNAVAILABLE",
            CoffeeError::NotConnected => "NOT_CONNECTED",
            CoffeeError::ConnectionRejected(_) => "CONNECTION_REJECTED",
            CoffeeError::TransactionPending => "TRANSACTION_PENDING",
            CoffeeError::InvalidAmount(_) => "INVALID_AMOUNT",
            CoffeeError::RpcError(_) | CoffeeError::ContractError(_) => "UPSTREAM_ERROR",
            CoffeeError::TransactionDropped => "TRANSACTION_DROPPED",
            CoffeeError::TransactionReverted(_) => "TRANSACTION_REVERTED",
            _ => "INTERNAL_ERROR",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            CoffeeError::WalletUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            CoffeeError::NotConnected => StatusCode::UNAUTHORIZED,
            CoffeeError::ConnectionRejected(_) => StatusCode::FORBIDDEN,
            CoffeeError::TransactionPending => StatusCode::CONFLICT,
            CoffeeError::InvalidAmount(_) => StatusCode::BAD_REQUEST,
            CoffeeError::RpcError(_)
            | CoffeeError::ContractError(_)
            | CoffeeError::TransactionDropped
            | CoffeeError::TransactionReverted(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub timestamp: chrono::DateTime<Utc>,
    pub request_id: String,
}

impl IntoResponse for CoffeeError {
    fn into_response(self) -> Response {
        let request_id = Uuid::new_v4().to_string();
        let status = self.status();
        let error_code = self.error_code();

        let body = ErrorResponse {
            success: false,
            error: self.to_string(),
            error_code: error_code.to_string(),
            timestamp: Utc::now(),
            request_id,
        };

        tracing::error!(
            error = ?self,
            error_code = error_code,
            "Request failed"
        );

        (status, Json(body)).into_response()
    }
}
