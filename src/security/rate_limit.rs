//! Per-caller admission control with fixed-window counters.
//!
//! Every request is keyed by `category:identifier`. The first request opens
//! a window of `window_ms`; up to `max_requests` are admitted inside it and
//! the rest are denied until the window has passed.
//!
//! # Known limitation
//! Windows are fixed, not sliding. A burst straddling a window boundary can
//! be admitted up to `2 * max_requests` times in a short span.
//!
//! State lives in process memory only; a restart forgets every counter.

use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::RateLimitConfig;
use crate::security::clock::{Clock, SystemClock};

/// Category used when a request names no known category.
pub const DEFAULT_CATEGORY: &str = "default";

/// Window length and request cap for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RateLimitPolicy {
    pub window_ms: u64,
    pub max_requests: u32,
}

impl RateLimitPolicy {
    pub const fn new(window_ms: u64, max_requests: u32) -> Self {
        Self {
            window_ms,
            max_requests,
        }
    }
}

/// Policies the gateway ships with: 30 searches, 20 chat messages and
/// 10 other requests per minute.
pub fn builtin_policies() -> HashMap<String, RateLimitPolicy> {
    HashMap::from([
        ("search".to_string(), RateLimitPolicy::new(60_000, 30)),
        ("chat".to_string(), RateLimitPolicy::new(60_000, 20)),
        (DEFAULT_CATEGORY.to_string(), RateLimitPolicy::new(60_000, 10)),
    ])
}

/// Outcome of a single admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RateLimitDecision {
    pub admitted: bool,
    /// Cap of the policy that was applied.
    pub limit: u32,
    pub remaining: u32,
    /// End of the current window, epoch milliseconds.
    pub window_reset_at: u64,
    /// Only set on denial.
    pub retry_after_secs: Option<u64>,
}

impl RateLimitDecision {
    /// The denial carried by this decision, if any.
    pub fn denial(&self) -> Option<AdmissionDenied> {
        if self.admitted {
            None
        } else {
            Some(AdmissionDenied {
                retry_after_secs: self.retry_after_secs.unwrap_or_default(),
            })
        }
    }
}

/// A caller exceeded its window. Recoverable by retrying later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("rate limit exceeded, retry after {retry_after_secs}s")]
pub struct AdmissionDenied {
    pub retry_after_secs: u64,
}

/// Snapshot of one tracked key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntrySnapshot {
    pub key: String,
    pub count: u32,
    pub reset_in_secs: u64,
}

/// Read-only view of the limiter store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStats {
    pub total_entries: usize,
    pub active_entries: usize,
    pub expired_entries: usize,
    pub entries: Vec<EntrySnapshot>,
}

/// Admission control as seen by request handlers.
///
/// The in-memory [`RateLimiter`] is the only implementation shipped here; a
/// multi-instance deployment would put a shared store behind this trait.
pub trait AdmissionControl: Send + Sync {
    fn check(&self, identifier: &str, category: &str) -> RateLimitDecision;

    /// Clears one key when both parts are given, everything otherwise.
    fn reset(&self, identifier: Option<&str>, category: Option<&str>);

    fn stats(&self) -> RateLimitStats;
}

#[derive(Debug, Clone, Copy)]
struct RateLimitEntry {
    count: u32,
    window_reset_at: u64,
}

impl RateLimitEntry {
    fn is_expired(&self, now: u64) -> bool {
        now > self.window_reset_at
    }
}

/// In-memory fixed-window rate limiter.
pub struct RateLimiter {
    entries: DashMap<String, RateLimitEntry>,
    policies: HashMap<String, RateLimitPolicy>,
    default_policy: RateLimitPolicy,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Build a limiter from explicit policies. A `default` entry in
    /// `policies` wins over `default_policy`.
    pub fn new(
        mut policies: HashMap<String, RateLimitPolicy>,
        default_policy: RateLimitPolicy,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let default_policy = policies
            .remove(DEFAULT_CATEGORY)
            .unwrap_or(default_policy);

        Self {
            entries: DashMap::new(),
            policies,
            default_policy,
            clock,
        }
    }

    /// Built-in policies overlaid with the configured ones, on the wall clock.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::from_config_with_clock(config, Arc::new(SystemClock))
    }

    pub fn from_config_with_clock(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let mut policies = builtin_policies();
        policies.insert(DEFAULT_CATEGORY.to_string(), config.default);
        policies.extend(config.categories.iter().map(|(k, v)| (k.clone(), *v)));
        Self::new(policies, config.default, clock)
    }

    /// Policy applied to `category`.
    pub fn policy_for(&self, category: &str) -> RateLimitPolicy {
        self.policies
            .get(category)
            .copied()
            .unwrap_or(self.default_policy)
    }

    /// Drop every entry whose window has passed.
    pub fn cleanup(&self) {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            tracing::trace!(evicted, "Evicted expired rate limit entries");
        }
    }

    fn key(identifier: &str, category: &str) -> String {
        format!("{category}:{identifier}")
    }
}

impl AdmissionControl for RateLimiter {
    fn check(&self, identifier: &str, category: &str) -> RateLimitDecision {
        let policy = self.policy_for(category);

        // Must run before the entry guard below is taken: retain locks every shard.
        self.cleanup();

        let now = self.clock.now_millis();
        let mut entry = self
            .entries
            .entry(Self::key(identifier, category))
            .or_insert(RateLimitEntry {
                count: 0,
                window_reset_at: now.saturating_add(policy.window_ms),
            });

        if entry.count == 0 || entry.is_expired(now) {
            *entry = RateLimitEntry {
                count: 1,
                window_reset_at: now.saturating_add(policy.window_ms),
            };
            return RateLimitDecision {
                admitted: true,
                limit: policy.max_requests,
                remaining: policy.max_requests.saturating_sub(1),
                window_reset_at: entry.window_reset_at,
                retry_after_secs: None,
            };
        }

        if entry.count >= policy.max_requests {
            let wait_ms = entry.window_reset_at.saturating_sub(now);
            return RateLimitDecision {
                admitted: false,
                limit: policy.max_requests,
                remaining: 0,
                window_reset_at: entry.window_reset_at,
                retry_after_secs: Some(wait_ms.div_ceil(1000)),
            };
        }

        entry.count += 1;
        RateLimitDecision {
            admitted: true,
            limit: policy.max_requests,
            remaining: policy.max_requests - entry.count,
            window_reset_at: entry.window_reset_at,
            retry_after_secs: None,
        }
    }

    fn reset(&self, identifier: Option<&str>, category: Option<&str>) {
        match (identifier, category) {
            (Some(identifier), Some(category)) => {
                self.entries.remove(&Self::key(identifier, category));
            }
            _ => self.entries.clear(),
        }
    }

    fn stats(&self) -> RateLimitStats {
        let now = self.clock.now_millis();
        let mut total_entries = 0;
        let mut entries = Vec::new();

        for item in self.entries.iter() {
            total_entries += 1;
            if item.is_expired(now) {
                continue;
            }
            entries.push(EntrySnapshot {
                key: item.key().clone(),
                count: item.count,
                reset_in_secs: item.window_reset_at.saturating_sub(now).div_ceil(1000),
            });
        }
        entries.sort_by(|a, b| a.key.cmp(&b.key));

        RateLimitStats {
            total_entries,
            active_entries: entries.len(),
            expired_entries: total_entries - entries.len(),
            entries,
        }
    }
}
