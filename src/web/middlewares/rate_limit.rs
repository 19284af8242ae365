use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    num::NonZeroU32,
    sync::Arc,
    time::Duration,
};

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::{
    Quota, RateLimiter,
    clock::{Clock, DefaultClock},
    middleware::StateInformationMiddleware,
    state::keyed::DefaultKeyedStateStore,
};

use crate::web::{AppState, error::WebError};

pub const REQUESTS_PER_WINDOW: u32 = 120;
pub const WINDOW: Duration = Duration::from_secs(60);

const FORWARDED_FOR: &str = "x-forwarded-for";
const RATE_LIMIT: HeaderName = HeaderName::from_static("ratelimit");
const RATE_LIMIT_POLICY: HeaderName = HeaderName::from_static("ratelimit-policy");

/// Idle keys are dropped once the table grows past this.
const MAX_TRACKED_CLIENTS: usize = 10_000;

type KeyedLimiter =
    RateLimiter<IpAddr, DefaultKeyedStateStore<IpAddr>, DefaultClock, StateInformationMiddleware>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

/// Per client IP budget of `limit` requests per minute.
#[derive(Clone)]
pub struct IpRateLimiter {
    limiter: Arc<KeyedLimiter>,
    clock: DefaultClock,
    limit: u32,
}

impl fmt::Debug for IpRateLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IpRateLimiter")
            .field("limit", &self.limit)
            .finish_non_exhaustive()
    }
}

impl IpRateLimiter {
    pub fn per_minute(limit: u32) -> Self {
        let limit = NonZeroU32::new(limit).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::keyed(Quota::per_minute(limit))
            .with_middleware::<StateInformationMiddleware>();

        Self {
            limiter: Arc::new(limiter),
            clock: DefaultClock::default(),
            limit: limit.get(),
        }
    }

    pub fn check(&self, ip: IpAddr) -> RateDecision {
        if self.limiter.len() > MAX_TRACKED_CLIENTS {
            self.limiter.retain_recent();
        }

        match self.limiter.check_key(&ip) {
            Ok(snapshot) => RateDecision::Allowed {
                remaining: snapshot.remaining_burst_capacity(),
            },
            Err(not_until) => RateDecision::Limited {
                retry_after: not_until.wait_time_from(self.clock.now()),
            },
        }
    }

    /// Seconds until the budget is full again.
    fn reset_secs(&self, remaining: u32) -> u64 {
        let used = u64::from(self.limit.saturating_sub(remaining));
        (WINDOW.as_secs() * used).div_ceil(u64::from(self.limit))
    }

    /// `RateLimit` / `RateLimit-Policy` as in the IETF draft 7 header format.
    fn write_headers(&self, headers: &mut HeaderMap, remaining: u32, reset_secs: u64) {
        let policy = format!("{};w={}", self.limit, WINDOW.as_secs());
        let state = format!(
            "limit={}, remaining={}, reset={}",
            self.limit, remaining, reset_secs
        );

        if let Ok(value) = HeaderValue::from_str(&policy) {
            headers.insert(RATE_LIMIT_POLICY, value);
        }
        if let Ok(value) = HeaderValue::from_str(&state) {
            headers.insert(RATE_LIMIT, value);
        }
    }
}

/// The service sits behind one proxy: the client is the last hop it appended,
/// else the peer address.
pub fn client_ip(req: &Request) -> IpAddr {
    req.headers()
        .get(FORWARDED_FOR)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.rsplit(',').next())
        .and_then(|v| v.trim().parse().ok())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

pub async fn rate_limit_fn(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let limiter = state.rate_limiter();
    let ip = client_ip(&req);

    match limiter.check(ip) {
        RateDecision::Allowed { remaining } => {
            let mut response = next.run(req).await;
            limiter.write_headers(response.headers_mut(), remaining, limiter.reset_secs(remaining));
            response
        }
        RateDecision::Limited { retry_after } => {
            let retry_after_secs = retry_after.as_secs().max(1);
            tracing::warn!("rate limit hit by {}", ip);

            let mut response = WebError::rate_limited(retry_after_secs).into_response();
            limiter.write_headers(response.headers_mut(), 0, retry_after_secs);
            response
                .headers_mut()
                .insert(RETRY_AFTER, HeaderValue::from(retry_after_secs));
            response
        }
    }
}
