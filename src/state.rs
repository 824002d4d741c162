//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use crate::application::services::{AuthService, LinkService, ResolverService, StatsService};
use crate::config::Config;
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::infrastructure::cache::CacheService;
use crate::infrastructure::queue::{ClickPublisher, ClickQueue};
use crate::infrastructure::rate_limit::{CounterStore, FixedWindowLimiter, RateLimitPolicy};

/// Rate limit scope of the public redirect route, keyed by client address.
pub const REDIRECT_SCOPE: &str = "rl:ip";
/// Rate limit scope of the management API, keyed by identity.
pub const API_SCOPE: &str = "rl:user";

/// Non-connection settings the HTTP layer depends on.
#[derive(Debug, Clone)]
pub struct StateSettings {
    pub base_url: String,
    pub behind_proxy: bool,
    pub cache_ttl_seconds: u64,
    pub jwt_access_secret: String,
    pub redirect_max_requests: u64,
    pub api_max_requests: u64,
    pub rate_limit_window_seconds: u64,
}

impl StateSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            base_url: config.base_url.clone(),
            behind_proxy: config.behind_proxy,
            cache_ttl_seconds: config.cache_ttl_seconds,
            jwt_access_secret: config.jwt_access_secret.clone(),
            redirect_max_requests: config.rate_limit_redirect_rpm,
            api_max_requests: config.rate_limit_api_rpm,
            rate_limit_window_seconds: config.rate_limit_window_seconds,
        }
    }
}

/// Handles shared by every request.
///
/// All clients are constructed once at startup and passed in explicitly.
#[derive(Clone)]
pub struct AppState {
    pub resolver: Arc<ResolverService>,
    pub link_service: Arc<LinkService>,
    pub auth_service: Arc<AuthService>,
    pub stats_service: Arc<StatsService>,
    pub redirect_limiter: Arc<FixedWindowLimiter>,
    pub api_limiter: Arc<FixedWindowLimiter>,
    pub links: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub click_queue: Arc<dyn ClickQueue>,
    pub base_url: String,
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires services and limiters from the given clients.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        stats: Arc<dyn StatsRepository>,
        cache: Arc<dyn CacheService>,
        counters: Arc<dyn CounterStore>,
        click_queue: Arc<dyn ClickQueue>,
        settings: &StateSettings,
    ) -> Self {
        let publisher = Arc::new(ClickPublisher::new(click_queue.clone()));

        let resolver = Arc::new(ResolverService::new(
            links.clone(),
            cache.clone(),
            publisher,
            settings.cache_ttl_seconds,
        ));
        let link_service = Arc::new(LinkService::new(
            links.clone(),
            cache.clone(),
            settings.cache_ttl_seconds,
        ));
        let auth_service = Arc::new(AuthService::new(&settings.jwt_access_secret));
        let stats_service = Arc::new(StatsService::new(stats));

        let redirect_limiter = Arc::new(FixedWindowLimiter::new(
            counters.clone(),
            RateLimitPolicy::new(
                REDIRECT_SCOPE,
                settings.redirect_max_requests,
                settings.rate_limit_window_seconds,
            ),
        ));
        let api_limiter = Arc::new(FixedWindowLimiter::new(
            counters,
            RateLimitPolicy::new(
                API_SCOPE,
                settings.api_max_requests,
                settings.rate_limit_window_seconds,
            ),
        ));

        Self {
            resolver,
            link_service,
            auth_service,
            stats_service,
            redirect_limiter,
            api_limiter,
            links,
            cache,
            click_queue,
            base_url: settings.base_url.clone(),
            behind_proxy: settings.behind_proxy,
        }
    }
}
