mod common;

use coffee_dapp::{
    error::CoffeeError,
    models::{CoffeeSize, ViewEvent, DEFAULT_MESSAGE, DEFAULT_NAME},
    services::Connection,
    views::{render_page, PageView},
};
use common::*;
use ethers::types::U256;
use std::sync::Arc;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

#[tokio::test]
async fn empty_fields_are_defaulted_before_the_contract_call() {
    let contract = Arc::new(MockContract::default());
    let app = app_with(contract.clone());
    app.connect().await.unwrap();

    let amount = CoffeeSize::Small.wei().unwrap();
    assert_ok!(app.submit_payment("", "", amount).await);

    assert_eq!(
        contract.submissions(),
        vec![(
            "Anonymous".to_string(),
            "Enjoy your coffee!".to_string(),
            U256::from(1_000_000_000_000_000u64)
        )]
    );
}

#[tokio::test]
async fn typed_fields_pass_through() {
    let contract = Arc::new(MockContract::default());
    let app = app_with(contract.clone());
    app.connect().await.unwrap();

    app.submit_payment("Ada", "", U256::exp10(15)).await.unwrap();
    app.submit_payment("", "cheers", U256::exp10(15)).await.unwrap();

    let submissions = contract.submissions();
    assert_eq!(submissions[0].0, "Ada");
    assert_eq!(submissions[0].1, DEFAULT_MESSAGE);
    assert_eq!(submissions[1].0, DEFAULT_NAME);
    assert_eq!(submissions[1].1, "cheers");
}

#[tokio::test]
async fn success_clears_form_and_pending() {
    let contract = Arc::new(MockContract::default());
    let app = app_with(contract.clone());
    app.connect().await.unwrap();

    let tx_hash = app
        .submit_payment("Ada", "flat white", U256::exp10(15))
        .await
        .unwrap();

    assert!(!tx_hash.is_zero());
    assert!(!app.is_pending());
    assert_eq!(app.form().await.name, "");
    assert_eq!(app.form().await.message, "");
}

#[tokio::test]
async fn failure_resets_pending_and_keeps_form() {
    let contract = Arc::new(MockContract::default());
    contract.fail_submissions();
    let app = app_with(contract.clone());
    app.connect().await.unwrap();

    let result = app.submit_payment("Ada", "flat white", U256::exp10(15)).await;

    assert!(matches!(result, Err(CoffeeError::TransactionReverted(_))));
    assert!(!app.is_pending());
    let form = app.form().await;
    assert_eq!(form.name, "Ada");
    assert_eq!(form.message, "flat white");
}

#[tokio::test]
async fn only_one_submission_in_flight() {
    let contract = Arc::new(MockContract::default());
    let gate = contract.hold_submissions();
    let app = app_with(contract.clone());
    app.connect().await.unwrap();

    let first = app.start_payment("A", "", U256::exp10(15)).await.unwrap();
    assert!(app.is_pending());
    assert!(app.status().await.pending);

    let second = app.start_payment("B", "", U256::exp10(15)).await;
    assert!(matches!(second, Err(CoffeeError::TransactionPending)));

    gate.add_permits(1);
    assert_ok!(first.await.unwrap());
    assert!(!app.is_pending());

    // Ready for the next click
    gate.add_permits(1);
    assert_ok!(app.submit_payment("C", "", U256::exp10(15)).await);
    let names: Vec<_> = contract.submissions().into_iter().map(|s| s.0).collect();
    assert_eq!(names, vec!["A", "C"]);
}

#[tokio::test]
async fn submitting_requires_a_connection() {
    let contract = Arc::new(MockContract::default());
    let app = app_with(contract.clone());

    let result = app.submit_payment("", "", U256::exp10(15)).await;
    assert!(matches!(result, Err(CoffeeError::NotConnected)));
    assert!(!app.is_pending());
    assert!(contract.submissions().is_empty());

    app.connect().await.unwrap();
    let zero = app.submit_payment("", "", U256::zero()).await;
    assert!(matches!(zero, Err(CoffeeError::InvalidAmount(_))));
    assert!(!app.is_pending());
}

#[tokio::test]
async fn missing_wallet_disables_actions() {
    let app = app_without_wallet();

    assert_eq!(app.connect().await.unwrap(), Connection::Unavailable);
    let session = app.session().await;
    assert!(!session.wallet_available);
    assert!(!session.logged_in);

    let result = app.submit_payment("", "", U256::exp10(15)).await;
    assert!(matches!(result, Err(CoffeeError::WalletUnavailable)));

    let view = PageView::capture(&app).await;
    assert!(view.send_disabled());
    assert!(app.chain_head().await.is_none());
}

#[tokio::test]
async fn connect_records_first_account_and_loads_history() {
    let contract = Arc::new(MockContract::with_history(vec![
        record("A", 1),
        record("B", 2),
    ]));
    let app = app_with(contract.clone());

    assert_eq!(app.connect().await.unwrap(), Connection::Connected(account()));

    let session = app.session().await;
    assert_eq!(session.account, Some(account()));
    assert!(session.logged_in);

    let names: Vec<_> = app.payments().await.into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["A", "B"]);
    assert!(app.subscription_active().await);
}

#[tokio::test]
async fn notifications_append_in_receipt_order() {
    let contract = Arc::new(MockContract::default());
    let app = app_with(contract.clone());
    app.connect().await.unwrap();
    let mut events = app.subscribe_events();

    contract.emit(record("A", 10));
    contract.emit(record("B", 11));

    assert_eq!(next_payment(&mut events).await.name, "A");
    assert_eq!(next_payment(&mut events).await.name, "B");

    let payments = app.payments().await;
    assert_eq!(payments.len(), 2);

    let html = render_page(&PageView::capture(&app).await);
    let a = html.find("<strong>A</strong>").unwrap();
    let b = html.find("<strong>B</strong>").unwrap();
    assert!(a < b);
}

#[tokio::test]
async fn notification_for_a_loaded_payment_is_not_duplicated() {
    let contract = Arc::new(MockContract::with_history(vec![record("A", 10)]));
    let app = app_with(contract.clone());
    app.connect().await.unwrap();
    let mut events = app.subscribe_events();

    contract.emit(record("A", 10));
    contract.emit(record("B", 11));

    // B is only handled after A, so A has been considered by now
    assert_eq!(next_payment(&mut events).await.name, "B");

    let names: Vec<_> = app.payments().await.into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
async fn reconnecting_keeps_a_single_listener() {
    let contract = Arc::new(MockContract::default());
    let app = app_with(contract.clone());

    app.connect().await.unwrap();
    app.connect().await.unwrap();
    app.connect().await.unwrap();

    assert!(eventually(|| contract.open_feeds() == 1).await);

    let mut events = app.subscribe_events();
    contract.emit(record("A", 10));
    next_payment(&mut events).await;
    assert_eq!(app.payments().await.len(), 1);
}

#[tokio::test]
async fn disconnect_clears_session_and_releases_listener() {
    let contract = Arc::new(MockContract::with_history(vec![record("A", 1)]));
    let app = app_with(contract.clone());

    // Never connected
    app.disconnect().await;
    assert!(!app.session().await.logged_in);

    app.connect().await.unwrap();
    app.disconnect().await;

    let session = app.session().await;
    assert_eq!(session.account, None);
    assert!(!session.logged_in);
    assert!(session.wallet_available);
    assert!(app.payments().await.is_empty());
    assert!(!app.subscription_active().await);
    assert!(eventually(|| contract.open_feeds() == 0).await);

    assert_err!(app.list_payments().await);
}

#[tokio::test]
async fn shutdown_releases_listener() {
    let contract = Arc::new(MockContract::default());
    let app = app_with(contract.clone());
    app.connect().await.unwrap();
    assert_eq!(contract.open_feeds(), 1);

    app.shutdown().await;

    assert!(eventually(|| contract.open_feeds() == 0).await);
}

#[tokio::test]
async fn logged_in_session_is_published_after_history_loads() {
    let contract = Arc::new(MockContract::with_history(vec![record("A", 1), record("B", 2)]));
    let app = app_with(contract.clone());
    let mut events = app.subscribe_events();

    let watcher = {
        let app = app.clone();
        tokio::spawn(async move {
            loop {
                if let ViewEvent::Session(session) = events.recv().await.unwrap() {
                    if session.logged_in {
                        return app.payments().await;
                    }
                }
            }
        })
    };

    app.connect().await.unwrap();

    let seen = tokio::time::timeout(Duration::from_secs(5), watcher)
        .await
        .unwrap()
        .unwrap();
    let names: Vec<_> = seen.into_iter().map(|r| r.name).collect();
    assert_eq!(names, vec!["A", "B"]);
}

#[tokio::test]
async fn disconnect_during_connect_leaves_no_listener() {
    let contract = Arc::new(MockContract::with_history(vec![record("A", 1)]));
    let gate = contract.hold_feeds();
    let app = app_with(contract.clone());

    let connecting = {
        let app = app.clone();
        tokio::spawn(async move { app.connect().await })
    };
    assert!(eventually(|| contract.feed_requests() == 1).await);

    app.disconnect().await;
    gate.add_permits(1);

    let result = connecting.await.unwrap();
    assert!(matches!(result, Err(CoffeeError::NotConnected)));

    assert!(!app.session().await.logged_in);
    assert!(!app.subscription_active().await);
    assert!(eventually(|| contract.open_feeds() == 0).await);
    assert!(app.payments().await.is_empty());
    assert_err!(app.list_payments().await);
}

#[tokio::test]
async fn actions_require_a_logged_in_session() {
    let contract = Arc::new(MockContract::default());
    let app = app_with(contract.clone());
    app.connect().await.unwrap();
    app.disconnect().await;

    assert!(matches!(
        app.list_payments().await,
        Err(CoffeeError::NotConnected)
    ));
    assert!(matches!(
        app.submit_payment("Ada", "", U256::exp10(15)).await,
        Err(CoffeeError::NotConnected)
    ));
    assert!(contract.submissions().is_empty());
}
