//! Per-route, per-client fixed-window rate limiting.
//!
//! Each `RateLimitLayer` instance owns its own buckets, so attaching one layer
//! per route gives every route an independent budget. A client's window opens
//! at its first request; at most `requests_per_window` requests are admitted
//! until `window` has elapsed, then the budget is restored in full.
//!
//! The budget inside a window is a governor limiter whose replenish period is
//! the whole window, so it never refills before the window closes; closing the
//! window swaps in a fresh limiter.

use crate::domain::config::RateLimitConfig;
use crate::domain::error::{ApiError, GatewayError};
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;
use governor::{
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
    Quota, RateLimiter,
};
use std::net::{IpAddr, SocketAddr};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::{Layer, Service};
use tracing::{debug, warn};

/// One client's budget on one route
struct ClientBucket {
    limiter: RateLimiter<NotKeyed, InMemoryState, DefaultClock>,
    window_start: Instant,
    last_seen: Instant,
}

impl ClientBucket {
    fn new(quota: Quota, now: Instant) -> Self {
        Self {
            limiter: RateLimiter::direct(quota),
            window_start: now,
            last_seen: now,
        }
    }

    /// `Err` carries the time left until this client's window closes.
    fn check(&mut self, quota: Quota, window: Duration, now: Instant) -> Result<(), Duration> {
        self.last_seen = now;
        if now.duration_since(self.window_start) >= window {
            self.limiter = RateLimiter::direct(quota);
            self.window_start = now;
        }
        match self.limiter.check() {
            Ok(_) => Ok(()),
            Err(_) => Err((self.window_start + window).saturating_duration_since(now)),
        }
    }
}

/// Rate limiter state shared across requests to one route
pub struct RateLimitState {
    buckets: DashMap<IpAddr, ClientBucket>,
    /// `None` when rate limiting is disabled
    quota: Option<Quota>,
    config: RateLimitConfig,
}

impl RateLimitState {
    pub fn new(config: RateLimitConfig) -> Result<Self, GatewayError> {
        let quota = if config.enabled {
            Some(quota_for(&config)?)
        } else {
            None
        };
        Ok(Self {
            buckets: DashMap::new(),
            quota,
            config,
        })
    }

    /// `Err` carries the wait until the next request from `ip` is admitted.
    pub fn check(&self, ip: IpAddr) -> Result<(), Duration> {
        let Some(quota) = self.quota else {
            return Ok(());
        };

        let now = Instant::now();
        let mut bucket = self.buckets.entry(ip).or_insert_with(|| {
            debug!(ip = %ip, "[sl-04] Creating new rate limit bucket");
            ClientBucket::new(quota, now)
        });
        bucket.check(quota, self.config.window, now)
    }

    /// Drop buckets idle for longer than `max_age`.
    pub fn cleanup(&self, max_age: Duration) {
        let now = Instant::now();
        self.buckets
            .retain(|_, bucket| now.duration_since(bucket.last_seen) <= max_age);
    }

    /// Clients currently tracked on this route.
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}

fn quota_for(config: &RateLimitConfig) -> Result<Quota, GatewayError> {
    let burst = NonZeroU32::new(config.requests_per_window)
        .ok_or_else(|| GatewayError::Config("requests_per_window cannot be 0".into()))?;
    let quota = Quota::with_period(config.window)
        .ok_or_else(|| GatewayError::Config("rate limit window cannot be 0".into()))?;
    Ok(quota.allow_burst(burst))
}

/// Rate limit layer
#[derive(Clone)]
pub struct RateLimitLayer {
    state: Arc<RateLimitState>,
}

impl RateLimitLayer {
    pub fn new(config: RateLimitConfig) -> Result<Self, GatewayError> {
        Ok(Self {
            state: Arc::new(RateLimitState::new(config)?),
        })
    }

    pub fn state(&self) -> Arc<RateLimitState> {
        Arc::clone(&self.state)
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            state: Arc::clone(&self.state),
        }
    }
}

/// Rate limit service
#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    state: Arc<RateLimitState>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let state = Arc::clone(&self.state);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ip = extract_client_ip(&req, state.config().trust_forwarded_headers);

            match state.check(ip) {
                Ok(()) => inner.call(req).await,
                Err(retry_after) => {
                    let retry_ms = u64::try_from(retry_after.as_millis()).unwrap_or(u64::MAX);
                    warn!(
                        ip = %ip,
                        path = %req.uri().path(),
                        retry_after_ms = retry_ms,
                        "[sl-04] Rate limit exceeded"
                    );
                    Ok(ApiError::rate_limited(retry_ms).into_response())
                }
            }
        })
    }
}

/// Client address used as the limiter key.
fn extract_client_ip<B>(req: &Request<B>, trust_forwarded: bool) -> IpAddr {
    if trust_forwarded {
        // First entry of X-Forwarded-For is the original client
        if let Some(ip) = req
            .headers()
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return ip;
        }

        if let Some(ip) = req
            .headers()
            .get("x-real-ip")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return ip;
        }
    }

    if let Some(connect_info) = req.extensions().get::<ConnectInfo<SocketAddr>>() {
        return connect_info.0.ip();
    }

    // No peer info (in-process callers)
    IpAddr::from([127, 0, 0, 1])
}

/// Periodically evict idle clients from every route's limiter.
pub async fn cleanup_task(states: Vec<Arc<RateLimitState>>, interval: Duration, max_age: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        for state in &states {
            state.cleanup(max_age);
        }
    }
}
