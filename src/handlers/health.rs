use crate::{models::HealthStatus, services::CoffeeApp};
use axum::{extract::State, Json};
use chrono::Utc;
use std::sync::Arc;

pub async fn health_check(State(app): State<Arc<CoffeeApp>>) -> Json<HealthStatus> {
    let block_number = match app.chain_head().await {
        Some(Ok(block)) => Some(block),
        Some(Err(e)) => {
            tracing::warn!("Chain head check failed: {}", e);
            None
        }
        None => None,
    };
    let ethereum_ok = block_number.is_some();
    let session = app.session().await;

    let status = if ethereum_ok && session.wallet_available {
        "healthy"
    } else if ethereum_ok || session.wallet_available {
        "degraded"
    } else {
        "unhealthy"
    };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        ethereum_rpc: ethereum_ok,
        block_number,
        wallet_available: session.wallet_available,
        subscription_active: app.subscription_active().await,
        uptime_seconds: app.uptime_seconds(),
        timestamp: Utc::now(),
    })
}
