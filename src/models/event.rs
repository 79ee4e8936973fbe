use super::{PaymentRecord, Session};
use serde::{Deserialize, Serialize};

/// Pushed to open pages over the live feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ViewEvent {
    Payment(PaymentRecord),
    Pending { pending: bool },
    Session(Session),
}
