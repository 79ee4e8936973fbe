use crate::{
    models::CoffeeSize,
    services::CoffeeApp,
    views::{render_page, PageView},
};
use axum::{
    extract::State,
    response::{Html, Redirect},
    Form,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub struct CoffeeForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub message: String,
    pub size: CoffeeSize,
}

pub async fn index(State(app): State<Arc<CoffeeApp>>) -> Html<String> {
    let view = PageView::capture(&app).await;
    Html(render_page(&view))
}

pub async fn connect_wallet(State(app): State<Arc<CoffeeApp>>) -> Redirect {
    if let Err(e) = app.connect().await {
        tracing::warn!("Connect failed: {}", e);
    }
    Redirect::to("/")
}

pub async fn disconnect_wallet(State(app): State<Arc<CoffeeApp>>) -> Redirect {
    app.disconnect().await;
    Redirect::to("/")
}

/// Starts the payment and returns straight away; the page shows the
/// pending state until the feed reports it cleared.
pub async fn buy_coffee(
    State(app): State<Arc<CoffeeApp>>,
    Form(form): Form<CoffeeForm>,
) -> Redirect {
    let started = match form.size.wei() {
        Ok(amount) => app.start_payment(form.name, form.message, amount).await,
        Err(e) => Err(e),
    };

    // Dropping the handle leaves the confirmation running
    if let Err(e) = started {
        tracing::warn!("Payment not started: {}", e);
    }

    Redirect::to("/")
}
