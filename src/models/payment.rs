use crate::contracts::{Memo, NewMemoFilter};
use crate::error::CoffeeError;
use chrono::{DateTime, Utc};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};

pub const DEFAULT_NAME: &str = "Anonymous";
pub const DEFAULT_MESSAGE: &str = "Enjoy your coffee!";

/// One accepted payment as stored by the contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub from: Address,
    /// Block timestamp in seconds.
    pub timestamp: u64,
    pub name: String,
    pub message: String,
}

impl PaymentRecord {
    pub fn sent_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

fn seconds(timestamp: U256) -> u64 {
    timestamp.min(U256::from(u64::MAX)).as_u64()
}

impl From<Memo> for PaymentRecord {
    fn from(memo: Memo) -> Self {
        Self {
            from: memo.from,
            timestamp: seconds(memo.timestamp),
            name: memo.name,
            message: memo.message,
        }
    }
}

/// `getMemos()` rows decode as plain tuples.
impl From<(Address, U256, String, String)> for PaymentRecord {
    fn from((from, timestamp, name, message): (Address, U256, String, String)) -> Self {
        Self {
            from,
            timestamp: seconds(timestamp),
            name,
            message,
        }
    }
}

impl From<NewMemoFilter> for PaymentRecord {
    fn from(event: NewMemoFilter) -> Self {
        Self {
            from: event.from,
            timestamp: seconds(event.timestamp),
            name: event.name,
            message: event.message,
        }
    }
}

/// The strings last typed into the payment form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentForm {
    pub name: String,
    pub message: String,
}

impl PaymentForm {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Name and message as sent to the contract, with empty fields defaulted.
    pub fn memo_fields(&self) -> (String, String) {
        (
            or_default(&self.name, DEFAULT_NAME),
            or_default(&self.message, DEFAULT_MESSAGE),
        )
    }

    pub fn clear(&mut self) {
        self.name.clear();
        self.message.clear();
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

/// The fixed amounts offered by the send buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoffeeSize {
    Small,
    Regular,
    Large,
}

impl CoffeeSize {
    pub const ALL: [CoffeeSize; 3] = [CoffeeSize::Small, CoffeeSize::Regular, CoffeeSize::Large];

    pub fn amount_eth(&self) -> &'static str {
        match self {
            CoffeeSize::Small => "0.001",
            CoffeeSize::Regular => "0.003",
            CoffeeSize::Large => "0.005",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CoffeeSize::Small => "Small coffee",
            CoffeeSize::Regular => "Regular coffee",
            CoffeeSize::Large => "Large coffee",
        }
    }

    pub fn value(&self) -> &'static str {
        match self {
            CoffeeSize::Small => "small",
            CoffeeSize::Regular => "regular",
            CoffeeSize::Large => "large",
        }
    }

    pub fn wei(&self) -> Result<U256, CoffeeError> {
        parse_amount(self.amount_eth())
    }
}

/// Parses a decimal ETH amount into wei. Zero is not a payment.
pub fn parse_amount(eth: &str) -> Result<U256, CoffeeError> {
    let wei = ethers::utils::parse_ether(eth.trim())
        .map_err(|e| CoffeeError::InvalidAmount(format!("{}: {}", eth, e)))?;

    if wei.is_zero() {
        return Err(CoffeeError::InvalidAmount(format!("{}: must be positive", eth)));
    }

    Ok(wei)
}
