//! In-process stand-in for the FX quote/trade API, with knobs for injecting latency and failures.
use axum::{
    debug_handler,
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use metrics::counter;
use serde_json::Value;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::debug;

pub const API_PREFIX: &str = "/api";

/// Which endpoints answer every request with 500.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailMode {
    Quotes,
    Trades,
    Both,
}

impl FailMode {
    fn quotes(self) -> bool {
        matches!(self, FailMode::Quotes | FailMode::Both)
    }

    fn trades(self) -> bool {
        matches!(self, FailMode::Trades | FailMode::Both)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockConfig {
    /// Added before every response.
    pub delay: Duration,
    pub fail: Option<FailMode>,
    /// Requests beyond this rate get 503.
    pub max_tps: Option<NonZeroU32>,
}

struct AppState {
    config: MockConfig,
    limiter: Option<DefaultDirectRateLimiter>,
    quotes: RwLock<HashSet<String>>,
}

impl AppState {
    fn new(config: MockConfig) -> Self {
        let limiter = config
            .max_tps
            .map(|tps| RateLimiter::direct(Quota::per_second(tps)));
        Self {
            config,
            limiter,
            quotes: RwLock::new(HashSet::new()),
        }
    }

    /// Shared prelude for both endpoints: delay, then rate cap, then forced failure.
    async fn admit(&self, forced_failure: bool) -> Result<(), StatusCode> {
        if !self.config.delay.is_zero() {
            tokio::time::sleep(self.config.delay).await;
        }
        if let Some(limiter) = &self.limiter {
            if limiter.check().is_err() {
                return Err(StatusCode::SERVICE_UNAVAILABLE);
            }
        }
        if forced_failure {
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
        Ok(())
    }

    fn knows_quote(&self, quote_id: &str) -> bool {
        self.quotes
            .read()
            .map(|quotes| quotes.contains(quote_id))
            .unwrap_or(false)
    }

    fn remember_quote(&self, quote_id: String) -> Result<(), StatusCode> {
        self.quotes
            .write()
            .map(|mut quotes| {
                quotes.insert(quote_id);
            })
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
    }
}

pub fn router(config: MockConfig) -> Router {
    let state = Arc::new(AppState::new(config));
    Router::new()
        .route(&format!("{API_PREFIX}/quotes"), post(create_quote))
        .route(&format!("{API_PREFIX}/trades"), post(create_trade))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serves until the listener fails.
pub async fn run(listener: TcpListener, config: MockConfig) -> std::io::Result<()> {
    axum::serve(listener, router(config)).await
}

/// Binds an ephemeral local port, serves on a background task and returns the address.
pub async fn spawn(config: MockConfig) -> std::io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        if let Err(err) = run(listener, config).await {
            tracing::error!("Mock service stopped: {err}");
        }
    });
    Ok(addr)
}

fn string_field<'a>(body: &'a Value, field: &str) -> Option<&'a str> {
    body.get(field).and_then(Value::as_str)
}

#[debug_handler]
async fn create_quote(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    counter!("mock-service.quotes").increment(1);
    let fail = state.config.fail.is_some_and(FailMode::quotes);
    state.admit(fail).await?;

    let quote_id = string_field(&body, "quoteId").ok_or(StatusCode::BAD_REQUEST)?;
    state.remember_quote(quote_id.to_string())?;
    debug!("Quote {quote_id} created");
    Ok(Json(body))
}

#[debug_handler]
async fn create_trade(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    counter!("mock-service.trades").increment(1);
    let fail = state.config.fail.is_some_and(FailMode::trades);
    state.admit(fail).await?;

    let trade_id = string_field(&body, "tradeId").ok_or(StatusCode::BAD_REQUEST)?;
    let quote_id = string_field(&body, "quoteId").ok_or(StatusCode::BAD_REQUEST)?;
    if !state.knows_quote(quote_id) {
        debug!("Trade {trade_id} references unknown quote {quote_id}");
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    Ok(Json(body))
}
