use ethers::types::Address;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub account: Option<Address>,
    pub logged_in: bool,
    pub wallet_available: bool,
}

impl Session {
    pub fn logged_out(wallet_available: bool) -> Self {
        Self {
            account: None,
            logged_in: false,
            wallet_available,
        }
    }

    /// Whether the send buttons may be used.
    pub fn can_transact(&self) -> bool {
        self.wallet_available && self.logged_in && self.account.is_some()
    }
}
