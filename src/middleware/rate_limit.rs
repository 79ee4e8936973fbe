use axum::Router;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};

/// Milliseconds between replenished requests for a rate of `per_second`.
pub fn replenish_interval_ms(per_second: u64) -> u64 {
    (1000 / per_second.max(1)).max(1)
}

/// Applies a per-client-IP limit of `per_second` sustained requests with
/// bursts up to `burst`. The router must be served with
/// `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn with_rate_limit(router: Router, per_second: u64, burst: u32) -> anyhow::Result<Router> {
    let interval_ms = replenish_interval_ms(per_second);
    let config = GovernorConfigBuilder::default()
        .per_millisecond(interval_ms)
        .burst_size(burst)
        .finish()
        .ok_or_else(|| anyhow::anyhow!("Invalid rate limit configuration"))?;

    tracing::info!(
        "Rate limit: {} req/s (one every {}ms), burst {}",
        per_second,
        interval_ms,
        burst
    );

    Ok(router.layer(GovernorLayer {
        config: Box::leak(Box::new(config)),
    }))
}
