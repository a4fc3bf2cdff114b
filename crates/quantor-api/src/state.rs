use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;

use crate::auth::Jwks;
use crate::config::Config;

/// Small, short-lived, idempotent cache of fetched JWKS documents, keyed by
/// the JWKS URL. Sized 4 — this process only ever talks to one issuer in
/// practice, but a handful of slots costs nothing and survives a URL change
/// without a restart.
const JWKS_CACHE_SIZE: usize = 4;

/// Shared application state, handed to every route and middleware via
/// `axum::extract::State`.
#[derive(Clone)]
pub struct AppState {
    pub scheduler: Arc<quantor_scheduler::Scheduler>,
    pub config: Arc<Config>,
    pub jwks_cache: Arc<Mutex<LruCache<String, Jwks>>>,
    pub http_client: reqwest::Client,
}

impl AppState {
    pub fn new(scheduler: Arc<quantor_scheduler::Scheduler>, config: Config) -> Self {
        Self {
            scheduler,
            config: Arc::new(config),
            jwks_cache: Arc::new(Mutex::new(LruCache::new(
                NonZeroUsize::new(JWKS_CACHE_SIZE).unwrap(),
            ))),
            http_client: reqwest::Client::new(),
        }
    }
}
