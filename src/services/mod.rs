pub mod app;
pub mod contract;
pub mod ledger;
pub mod subscription;
pub mod wallet;

pub use app::CoffeeApp;
pub use contract::{CoffeeContract, PaymentContract, PaymentStream};
pub use ledger::PaymentLedger;
pub use subscription::Subscription;
pub use wallet::{Connection, KeyWallet, NodeWallet, WalletConnector, WalletProvider};
