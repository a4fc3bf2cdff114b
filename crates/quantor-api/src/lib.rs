mod auth;
mod backtest_routes;
pub mod config;
mod request_id;
mod response;
mod security_headers;
pub mod state;

use std::sync::Arc;
use std::time::Duration;

use axum::{middleware, Router};
use tower::ServiceBuilder;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use config::Config;
use state::AppState;

/// Builds the full axum [`Router`] for the service: routes, rate limiting,
/// request tracing, request ids, and security headers. Split out from
/// [`run_server`] so tests can exercise it with `tower::ServiceExt::oneshot`
/// without binding a socket.
pub fn build_router(state: AppState) -> Router {
    let governor_conf: &'static _ = Box::leak(Box::new(
        GovernorConfigBuilder::default()
            .per_second(state.config.rate_limit_per_minute.max(1) as u64 / 60 + 1)
            .burst_size(state.config.rate_limit_per_minute.max(1))
            .finish()
            .expect("rate limit config is always valid"),
    ));

    let max_request_time = state.config.max_request_time;

    backtest_routes::backtest_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::auth_middleware,
        ))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(middleware::from_fn(request_id::request_id_middleware))
                .layer(middleware::from_fn(
                    security_headers::security_headers_middleware,
                ))
                .layer(CorsLayer::permissive())
                .layer(GovernorLayer {
                    config: governor_conf,
                })
                .layer(request_timeout_layer(max_request_time)),
        )
        .with_state(state)
}

/// Loads configuration, wires up the scheduler and data provider, spawns
/// the scheduler's consumer loop, and serves HTTP until the process is
/// killed.
pub async fn run_server() -> anyhow::Result<()> {
    let config = Config::from_env();

    let data_provider = Arc::new(quantor_market_data::MarketDataProvider::new(
        config.data_cache_dir.clone(),
    ));
    let sandbox_config = quantor_sandbox::SandboxConfig::from_env();
    let orchestrator = Arc::new(quantor_orchestrator::Orchestrator::new(
        data_provider,
        sandbox_config,
    ));
    let scheduler = Arc::new(quantor_scheduler::Scheduler::new(orchestrator));

    let consumer = scheduler.clone();
    tokio::spawn(async move { (*consumer).clone().run().await });

    let state = AppState::new(scheduler, config.clone());
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "quantor-api listening");

    axum::serve(listener, app)
        .await
        .map_err(anyhow::Error::from)
}

/// Request-timeout middleware layer, separated out so `build_router` tests
/// can opt out of it (it makes failing-fast assertions in tests awkward).
pub fn request_timeout_layer(max_request_time: Duration) -> tower::timeout::TimeoutLayer {
    tower::timeout::TimeoutLayer::new(max_request_time)
}
