use crate::{
    error::CoffeeError,
    models::{parse_amount, ApiResponse, PaymentReceipt, PaymentRecord, SessionStatus},
    services::CoffeeApp,
};
use axum::{extract::State, Json};
use chrono::Utc;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct PaymentRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    /// Decimal ETH, e.g. "0.001"
    pub amount: String,
}

fn respond<T>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse {
        success: true,
        data,
        timestamp: Utc::now(),
        request_id: Uuid::new_v4().to_string(),
    })
}

pub async fn get_session(State(app): State<Arc<CoffeeApp>>) -> Json<ApiResponse<SessionStatus>> {
    respond(app.status().await)
}

pub async fn list_payments(
    State(app): State<Arc<CoffeeApp>>,
) -> Json<ApiResponse<Vec<PaymentRecord>>> {
    respond(app.payments().await)
}

pub async fn submit_payment(
    State(app): State<Arc<CoffeeApp>>,
    Json(request): Json<PaymentRequest>,
) -> Result<Json<ApiResponse<PaymentReceipt>>, CoffeeError> {
    let amount = parse_amount(&request.amount)?;
    let tx_hash = app
        .submit_payment(request.name, request.message, amount)
        .await?;

    Ok(respond(PaymentReceipt { tx_hash }))
}

pub async fn connect(
    State(app): State<Arc<CoffeeApp>>,
) -> Result<Json<ApiResponse<SessionStatus>>, CoffeeError> {
    app.connect().await?;
    Ok(respond(app.status().await))
}

pub async fn disconnect(State(app): State<Arc<CoffeeApp>>) -> Json<ApiResponse<SessionStatus>> {
    app.disconnect().await;
    respond(app.status().await)
}
