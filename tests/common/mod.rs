#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;
use shortlink_service::application::services::AccessClaims;
use shortlink_service::domain::click_event::ClickEvent;
use shortlink_service::domain::entities::{NewShortLink, ShortLink};
use shortlink_service::domain::repositories::{
    ClickEventRepository, LinkClickStats, LinkRepository, OwnerClickSummary, ShortcodeCount,
    StatsRepository, UserAgentCount,
};
use shortlink_service::error::AppError;
use shortlink_service::infrastructure::cache::CacheService;
use shortlink_service::infrastructure::queue::{ClickQueue, Delivery, QueueConsumer, QueueError};
use shortlink_service::infrastructure::rate_limit::{CounterStore, CounterStoreError};
use shortlink_service::routes::router;
use shortlink_service::state::{AppState, StateSettings};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tower::Layer;

pub const JWT_SECRET: &str = "test-access-secret";
pub const BASE_URL: &str = "http://s.test";

/// Inserts a fixed peer address, standing in for `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer(pub SocketAddr);

impl Default for MockConnectInfoLayer {
    fn default() -> Self {
        Self("127.0.0.1:12345".parse().unwrap())
    }
}

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService {
            inner,
            addr: self.0,
        }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
    addr: SocketAddr,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        req.extensions_mut().insert(ConnectInfo(self.addr));
        self.inner.call(req)
    }
}

// ---------------------------------------------------------------------------
// Record store
// ---------------------------------------------------------------------------

/// Link store that counts `find_by_code` calls.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: Mutex<HashMap<String, ShortLink>>,
    lookups: AtomicUsize,
    unavailable: AtomicBool,
}

impl MemoryLinkRepository {
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn insert(&self, shortcode: &str, long_url: &str, owner_id: Option<&str>) {
        let link = ShortLink::new(
            shortcode.to_string(),
            long_url.to_string(),
            true,
            owner_id.map(str::to_string),
            Utc::now(),
        );
        self.links
            .lock()
            .unwrap()
            .insert(shortcode.to_string(), link);
    }

    pub fn get(&self, shortcode: &str) -> Option<ShortLink> {
        self.links.lock().unwrap().get(shortcode).cloned()
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", json!({})));
        }
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn find_by_code(&self, shortcode: &str) -> Result<Option<ShortLink>, AppError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self.get(shortcode))
    }

    async fn create(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        self.check_available()?;
        let mut links = self.links.lock().unwrap();
        if links.contains_key(&new_link.shortcode) {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "shortcode": new_link.shortcode }),
            ));
        }

        let link = ShortLink::new(
            new_link.shortcode.clone(),
            new_link.long_url,
            true,
            new_link.owner_id,
            Utc::now(),
        );
        links.insert(new_link.shortcode, link.clone());
        Ok(link)
    }

    async fn list_active_by_owner(&self, owner_id: &str) -> Result<Vec<ShortLink>, AppError> {
        self.check_available()?;
        let mut links: Vec<ShortLink> = self
            .links
            .lock()
            .unwrap()
            .values()
            .filter(|l| l.is_active && l.is_owned_by(owner_id))
            .cloned()
            .collect();
        links.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(links)
    }

    async fn deactivate(&self, shortcode: &str) -> Result<bool, AppError> {
        self.check_available()?;
        let mut links = self.links.lock().unwrap();
        match links.get_mut(shortcode) {
            Some(link) if link.is_active => {
                link.is_active = false;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn health_check(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

/// Cache that keeps entries forever and records the TTLs it was given.
/// Invalidated codes hold a tombstone (`None`) that fills cannot replace.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, Option<String>>>,
    ttls: Mutex<Vec<u64>>,
    unavailable: AtomicBool,
}

impl MemoryCache {
    pub fn get(&self, shortcode: &str) -> Option<String> {
        self.entries.lock().unwrap().get(shortcode).cloned().flatten()
    }

    pub fn is_tombstoned(&self, shortcode: &str) -> bool {
        matches!(self.entries.lock().unwrap().get(shortcode), Some(None))
    }

    pub fn put(&self, shortcode: &str, long_url: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(shortcode.to_string(), Some(long_url.to_string()));
    }

    pub fn ttls(&self) -> Vec<u64> {
        self.ttls.lock().unwrap().clone()
    }

    /// Simulates an unreachable cache: reads miss and writes are dropped.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn is_down(&self) -> bool {
        self.unavailable.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, shortcode: &str) -> Option<String> {
        if self.is_down() {
            return None;
        }
        self.get(shortcode)
    }

    async fn set_url(&self, shortcode: &str, long_url: &str, ttl_seconds: u64) {
        if self.is_down() {
            return;
        }
        self.put(shortcode, long_url);
        self.ttls.lock().unwrap().push(ttl_seconds);
    }

    async fn fill_url(&self, shortcode: &str, long_url: &str, ttl_seconds: u64) {
        if self.is_down() {
            return;
        }
        let mut entries = self.entries.lock().unwrap();
        if !entries.contains_key(shortcode) {
            entries.insert(shortcode.to_string(), Some(long_url.to_string()));
            self.ttls.lock().unwrap().push(ttl_seconds);
        }
    }

    async fn invalidate(&self, shortcode: &str) {
        if self.is_down() {
            return;
        }
        self.entries.lock().unwrap().insert(shortcode.to_string(), None);
    }

    async fn health_check(&self) -> bool {
        !self.is_down()
    }
}

// ---------------------------------------------------------------------------
// Counter store
// ---------------------------------------------------------------------------

/// Counter store with key expiry driven by the tokio clock, so tests can
/// advance time with `tokio::time::advance`.
#[derive(Default)]
pub struct MemoryCounterStore {
    counters: Mutex<HashMap<String, (u64, Option<Instant>)>>,
    unavailable: AtomicBool,
}

impl MemoryCounterStore {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), CounterStoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CounterStoreError("connection refused".to_string()));
        }
        Ok(())
    }

    fn purge_expired(counters: &mut HashMap<String, (u64, Option<Instant>)>, key: &str) {
        let expired = matches!(counters.get(key), Some((_, Some(at))) if *at <= Instant::now());
        if expired {
            counters.remove(key);
        }
    }
}

#[async_trait]
impl CounterStore for MemoryCounterStore {
    async fn incr(&self, key: &str) -> Result<u64, CounterStoreError> {
        self.check_available()?;
        let mut counters = self.counters.lock().unwrap();
        Self::purge_expired(&mut counters, key);
        let entry = counters.entry(key.to_string()).or_insert((0, None));
        entry.0 += 1;
        Ok(entry.0)
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> Result<(), CounterStoreError> {
        self.check_available()?;
        let mut counters = self.counters.lock().unwrap();
        if let Some(entry) = counters.get_mut(key) {
            entry.1 = Some(Instant::now() + Duration::from_secs(ttl_seconds));
        }
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<i64, CounterStoreError> {
        self.check_available()?;
        let mut counters = self.counters.lock().unwrap();
        Self::purge_expired(&mut counters, key);
        Ok(match counters.get(key) {
            None => -2,
            Some((_, None)) => -1,
            Some((_, Some(at))) => {
                let left = at.saturating_duration_since(Instant::now());
                left.as_secs_f64().ceil() as i64
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

struct Message {
    id: String,
    payload: Vec<u8>,
    redelivered: bool,
}

#[derive(Default)]
struct BrokerState {
    next_id: u64,
    ready: VecDeque<Message>,
    /// Delivered but unsettled, keyed by id: (consumer, payload).
    pending: HashMap<String, (String, Vec<u8>)>,
    dead: Vec<Vec<u8>>,
    deliveries: usize,
    cancelled: bool,
}

/// In-process broker with per-consumer pending lists and crash redelivery.
#[derive(Default)]
pub struct MemoryBroker {
    state: Mutex<BrokerState>,
    unavailable: AtomicBool,
}

impl MemoryBroker {
    /// Joins the broker as `name`.
    pub fn consumer(self: &Arc<Self>, name: &str) -> MemoryConsumer {
        MemoryConsumer {
            broker: Arc::clone(self),
            name: name.to_string(),
        }
    }

    /// Hands every unsettled delivery of `consumer` back to the queue.
    pub fn crash(&self, consumer: &str) {
        let mut state = self.state.lock().unwrap();
        let orphaned: Vec<String> = state
            .pending
            .iter()
            .filter(|(_, (owner, _))| owner == consumer)
            .map(|(id, _)| id.clone())
            .collect();

        for id in orphaned {
            if let Some((_, payload)) = state.pending.remove(&id) {
                state.ready.push_back(Message {
                    id,
                    payload,
                    redelivered: true,
                });
            }
        }
    }

    /// Makes every consumer's next `receive` report cancellation.
    pub fn cancel(&self) {
        self.state.lock().unwrap().cancelled = true;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn ready_len(&self) -> usize {
        self.state.lock().unwrap().ready.len()
    }

    pub fn pending_len(&self) -> usize {
        self.state.lock().unwrap().pending.len()
    }

    pub fn dead_letters(&self) -> Vec<Vec<u8>> {
        self.state.lock().unwrap().dead.clone()
    }

    /// Total number of deliveries handed out, redeliveries included.
    pub fn deliveries(&self) -> usize {
        self.state.lock().unwrap().deliveries
    }

    /// Payloads waiting to be delivered.
    pub fn ready_payloads(&self) -> Vec<Vec<u8>> {
        self.state
            .lock()
            .unwrap()
            .ready
            .iter()
            .map(|m| m.payload.clone())
            .collect()
    }

    fn enqueue(&self, payload: Vec<u8>) {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("{}-0", state.next_id);
        state.ready.push_back(Message {
            id,
            payload,
            redelivered: false,
        });
    }

    fn check_available(&self) -> Result<(), QueueError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(QueueError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ClickQueue for MemoryBroker {
    async fn publish(&self, payload: Vec<u8>) -> Result<(), QueueError> {
        self.check_available()?;
        self.enqueue(payload);
        Ok(())
    }

    async fn health_check(&self) -> bool {
        !self.unavailable.load(Ordering::SeqCst)
    }
}

pub struct MemoryConsumer {
    broker: Arc<MemoryBroker>,
    name: String,
}

#[async_trait]
impl QueueConsumer for MemoryConsumer {
    async fn receive(&self, max: usize) -> Result<Option<Vec<Delivery>>, QueueError> {
        self.broker.check_available()?;

        let batch = {
            let mut state = self.broker.state.lock().unwrap();
            if state.cancelled {
                return Ok(None);
            }

            let mut batch = Vec::new();
            while batch.len() < max {
                let Some(message) = state.ready.pop_front() else {
                    break;
                };
                state
                    .pending
                    .insert(message.id.clone(), (self.name.clone(), message.payload.clone()));
                state.deliveries += 1;
                batch.push(Delivery {
                    id: message.id,
                    payload: message.payload,
                    redelivered: message.redelivered,
                });
            }
            batch
        };

        if batch.is_empty() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        Ok(Some(batch))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), QueueError> {
        self.broker.check_available()?;
        self.broker.state.lock().unwrap().pending.remove(&delivery.id);
        Ok(())
    }

    async fn reject(&self, delivery: &Delivery, requeue: bool) -> Result<(), QueueError> {
        self.broker.check_available()?;
        let removed = self.broker.state.lock().unwrap().pending.remove(&delivery.id);
        if let Some((_, payload)) = removed {
            if requeue {
                self.broker.enqueue(payload);
            } else {
                self.broker.state.lock().unwrap().dead.push(payload);
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Event store
// ---------------------------------------------------------------------------

/// Click store that can be told to fail its next writes.
#[derive(Default)]
pub struct MemoryClickStore {
    events: Mutex<Vec<ClickEvent>>,
    failures_left: AtomicUsize,
}

impl MemoryClickStore {
    pub fn fail_next(&self, count: usize) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<ClickEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Stores `event` directly, bypassing the queue.
    pub fn record(&self, event: ClickEvent) {
        self.events.lock().unwrap().push(event);
    }

    /// Resolves once at least `count` events are stored.
    pub async fn wait_for(self: Arc<Self>, count: usize) {
        while self.len() < count {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }
}

#[async_trait]
impl ClickEventRepository for MemoryClickStore {
    async fn create(&self, event: &ClickEvent) -> Result<(), AppError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(AppError::internal("Database error", json!({})));
        }

        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }
}

/// Analytics computed over a [`MemoryClickStore`], with link ownership taken
/// from a [`MemoryLinkRepository`].
pub struct MemoryStatsRepository {
    clicks: Arc<MemoryClickStore>,
    links: Arc<MemoryLinkRepository>,
    unavailable: AtomicBool,
}

impl MemoryStatsRepository {
    pub fn new(clicks: Arc<MemoryClickStore>, links: Arc<MemoryLinkRepository>) -> Self {
        Self {
            clicks,
            links,
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), AppError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::internal("Database error", json!({})));
        }
        Ok(())
    }

    fn rank<'a>(keys: impl Iterator<Item = &'a str>, top: i64) -> Vec<(String, i64)> {
        let mut counts: HashMap<String, i64> = HashMap::new();
        for key in keys {
            *counts.entry(key.to_string()).or_default() += 1;
        }
        let mut ranked: Vec<(String, i64)> = counts.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(top as usize);
        ranked
    }
}

#[async_trait]
impl StatsRepository for MemoryStatsRepository {
    async fn link_stats(
        &self,
        shortcode: &str,
        last_day: DateTime<Utc>,
        last_week: DateTime<Utc>,
        top: i64,
    ) -> Result<LinkClickStats, AppError> {
        self.check_available()?;
        let events: Vec<ClickEvent> = self
            .clicks
            .events()
            .into_iter()
            .filter(|e| e.shortcode == shortcode)
            .collect();

        Ok(LinkClickStats {
            total_clicks: events.len() as i64,
            clicks_last_day: events.iter().filter(|e| e.timestamp >= last_day).count() as i64,
            clicks_last_week: events.iter().filter(|e| e.timestamp >= last_week).count() as i64,
            top_user_agents: Self::rank(events.iter().map(|e| e.user_agent.as_str()), top)
                .into_iter()
                .map(|(user_agent, count)| UserAgentCount { user_agent, count })
                .collect(),
        })
    }

    async fn owner_summary(
        &self,
        owner_id: &str,
        last_day: DateTime<Utc>,
        top: i64,
    ) -> Result<OwnerClickSummary, AppError> {
        self.check_available()?;
        let events: Vec<ClickEvent> = self
            .clicks
            .events()
            .into_iter()
            .filter(|e| {
                self.links
                    .get(&e.shortcode)
                    .is_some_and(|link| link.is_owned_by(owner_id))
            })
            .collect();
        let ranked = Self::rank(events.iter().map(|e| e.shortcode.as_str()), i64::MAX);

        Ok(OwnerClickSummary {
            total_clicks: events.len() as i64,
            clicked_links: ranked.len() as i64,
            clicks_last_day: events.iter().filter(|e| e.timestamp >= last_day).count() as i64,
            top_shortcodes: ranked
                .into_iter()
                .take(top as usize)
                .map(|(shortcode, count)| ShortcodeCount { shortcode, count })
                .collect(),
        })
    }
}

// ---------------------------------------------------------------------------
// Application
// ---------------------------------------------------------------------------

pub fn test_settings() -> StateSettings {
    StateSettings {
        base_url: BASE_URL.to_string(),
        behind_proxy: false,
        cache_ttl_seconds: 3600,
        jwt_access_secret: JWT_SECRET.to_string(),
        redirect_max_requests: 1000,
        api_max_requests: 1000,
        rate_limit_window_seconds: 60,
    }
}

/// Full router over in-memory backends, with handles to inspect them.
pub struct TestApp {
    pub server: TestServer,
    pub links: Arc<MemoryLinkRepository>,
    pub cache: Arc<MemoryCache>,
    pub counters: Arc<MemoryCounterStore>,
    pub broker: Arc<MemoryBroker>,
    pub clicks: Arc<MemoryClickStore>,
    pub stats: Arc<MemoryStatsRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_settings(test_settings())
    }

    pub fn with_settings(settings: StateSettings) -> Self {
        Self::with_peer(settings, MockConnectInfoLayer::default())
    }

    pub fn with_peer(settings: StateSettings, peer: MockConnectInfoLayer) -> Self {
        let links = Arc::new(MemoryLinkRepository::default());
        let cache = Arc::new(MemoryCache::default());
        let counters = Arc::new(MemoryCounterStore::default());
        let broker = Arc::new(MemoryBroker::default());
        let clicks = Arc::new(MemoryClickStore::default());
        let stats = Arc::new(MemoryStatsRepository::new(clicks.clone(), links.clone()));

        let state = AppState::new(
            links.clone(),
            stats.clone(),
            cache.clone(),
            counters.clone(),
            broker.clone(),
            &settings,
        );

        let app = router(state).layer(peer);
        let server = TestServer::new(app).unwrap();

        Self {
            server,
            links,
            cache,
            counters,
            broker,
            clicks,
            stats,
        }
    }

    /// Waits until the detached click publishes have landed on the broker.
    pub async fn wait_for_clicks(&self, count: usize) {
        for _ in 0..200 {
            if self.broker.ready_len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!(
            "expected {count} published clicks, found {}",
            self.broker.ready_len()
        );
    }
}

/// Signs an access token for `user_id`, valid for an hour.
pub fn access_token(user_id: &str) -> String {
    let claims = AccessClaims {
        user_id: user_id.to_string(),
        email: format!("{user_id}@example.com"),
        exp: (Utc::now().timestamp() + 3600) as u64,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_bytes()),
    )
    .unwrap()
}

pub fn bearer(user_id: &str) -> String {
    format!("Bearer {}", access_token(user_id))
}
