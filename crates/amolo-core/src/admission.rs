//! Admission control: fixed-window rate limiting per client IP.
//!
//! The counter table is the only state shared across requests. Each check
//! runs its read-check-increment inside a single `DashMap` entry guard and
//! never awaits, so two concurrent requests from the same client cannot both
//! pass the boundary.

use std::net::IpAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, warn};

/// Advisory message returned with rejected requests.
pub const RATE_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Manually advanced clock for deterministic tests.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<Instant>>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: Arc::new(Mutex::new(Instant::now())),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        *now += by;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Limiter configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionConfig {
    /// Accepted requests per window per client.
    pub max_requests: u32,
    /// Window length.
    pub window: Duration,
    /// Table size above which expired windows are evicted.
    pub cleanup_threshold: usize,
}

impl Default for AdmissionConfig {
    fn default() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(15 * 60),
            cleanup_threshold: 10_000,
        }
    }
}

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdmissionDecision {
    pub accepted: bool,
    pub limit: u32,
    /// Requests left in the current window after this one.
    pub remaining: u32,
    /// Time until the current window ends.
    pub reset_after: Duration,
}

#[derive(Debug, Clone, Copy)]
struct WindowState {
    count: u32,
    started: Instant,
}

/// Per-client fixed-window limiter.
pub struct AdmissionControl {
    windows: DashMap<IpAddr, WindowState>,
    config: AdmissionConfig,
    clock: Arc<dyn Clock>,
}

impl AdmissionControl {
    /// Create a limiter backed by the wall clock.
    #[must_use]
    pub fn new(config: AdmissionConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    #[must_use]
    pub fn with_clock(config: AdmissionConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            windows: DashMap::new(),
            config,
            clock,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &AdmissionConfig {
        &self.config
    }

    /// Count one request from `client` and decide whether to admit it.
    ///
    /// Rejected requests are not counted.
    pub fn check(&self, client: IpAddr) -> AdmissionDecision {
        let now = self.clock.now();
        let limit = self.config.max_requests;

        let mut entry = self.windows.entry(client).or_insert(WindowState {
            count: 0,
            started: now,
        });
        let window = entry.value_mut();

        if now.duration_since(window.started) >= self.config.window {
            window.count = 0;
            window.started = now;
        }

        let accepted = window.count < limit;
        if accepted {
            window.count += 1;
        }

        let remaining = limit.saturating_sub(window.count);
        let reset_after = self
            .config
            .window
            .saturating_sub(now.duration_since(window.started));
        drop(entry);

        if self.windows.len() > self.config.cleanup_threshold {
            self.evict_expired(now);
        }

        if accepted {
            debug!(client = %client, remaining, "Request admitted");
        } else {
            warn!(
                client = %client,
                reset_after_secs = reset_after.as_secs(),
                "Rate limit exceeded"
            );
        }

        AdmissionDecision {
            accepted,
            limit,
            remaining,
            reset_after,
        }
    }

    /// Number of clients with a tracked window.
    #[must_use]
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    fn evict_expired(&self, now: Instant) {
        let window = self.config.window;
        self.windows
            .retain(|_client, state| now.duration_since(state.started) < window);
    }
}

impl std::fmt::Debug for AdmissionControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdmissionControl")
            .field("config", &self.config)
            .field("tracked_clients", &self.windows.len())
            .finish_non_exhaustive()
    }
}
