//! Duplicate insert suppression
//!
//! Drag-and-drop front ends can deliver the same drop twice in quick
//! succession. `InsertDeduper` is a small expiring key set the caller layer
//! consults before asking the tree to insert.
//!
//! # Keys
//!
//! A request is keyed as `<kind>-<parent|root>-<bucket>` where
//! `bucket = now_ms / window_ms`. A second request with the same key inside
//! the window is suppressed. Expired keys are purged on every call, so the
//! set never grows past the requests of one window.
//!
//! # Example
//!
//! ```rust
//! use formsmith_core::models::FieldKind;
//! use formsmith_core::operations::{InsertDeduper, ManualClock};
//!
//! let clock = ManualClock::new(1_000);
//! let mut deduper = InsertDeduper::new(clock.clone(), 100);
//!
//! assert!(deduper.try_acquire(FieldKind::Text, None));
//! assert!(!deduper.try_acquire(FieldKind::Text, None));
//!
//! clock.advance(100);
//! assert!(deduper.try_acquire(FieldKind::Text, None));
//! ```

use crate::models::{FieldId, FieldKind};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Millisecond time source
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock backed by `chrono::Utc`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock; clones share the same time
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Arc<AtomicI64>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn advance(&self, ms: i64) {
        self.now.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, ms: i64) {
        self.now.store(ms, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// Expiring set of recent insert requests
#[derive(Debug)]
pub struct InsertDeduper<C: Clock = SystemClock> {
    clock: C,
    window_ms: i64,
    /// key → expiry timestamp (ms)
    seen: HashMap<String, i64>,
}

impl InsertDeduper<SystemClock> {
    /// Deduper on the wall clock
    pub fn with_window(window_ms: u64) -> Self {
        Self::new(SystemClock, window_ms)
    }
}

impl<C: Clock> InsertDeduper<C> {
    pub fn new(clock: C, window_ms: u64) -> Self {
        Self {
            clock,
            window_ms: i64::try_from(window_ms).unwrap_or(i64::MAX).max(1),
            seen: HashMap::new(),
        }
    }

    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Record an insert request
    ///
    /// Returns `false` when an identical request was already recorded in the
    /// current window.
    pub fn try_acquire(&mut self, kind: FieldKind, parent_id: Option<FieldId>) -> bool {
        let now = self.clock.now_ms();
        self.purge_at(now);

        let key = Self::request_key(kind, parent_id, now / self.window_ms);
        if self.seen.contains_key(&key) {
            debug!("Suppressed duplicate insert request {}", key);
            return false;
        }

        self.seen.insert(key, now + self.window_ms);
        true
    }

    /// Drop expired keys
    pub fn purge(&mut self) {
        let now = self.clock.now_ms();
        self.purge_at(now);
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn purge_at(&mut self, now: i64) {
        self.seen.retain(|_, expires_at| *expires_at > now);
    }

    fn request_key(kind: FieldKind, parent_id: Option<FieldId>, bucket: i64) -> String {
        match parent_id {
            Some(parent) => format!("{}-{}-{}", kind, parent, bucket),
            None => format!("{}-root-{}", kind, bucket),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_request_suppressed_within_window() {
        let clock = ManualClock::new(10_000);
        let mut deduper = InsertDeduper::new(clock.clone(), 100);

        assert!(deduper.try_acquire(FieldKind::Email, Some(FieldId::new(3))));
        clock.advance(20);
        assert!(!deduper.try_acquire(FieldKind::Email, Some(FieldId::new(3))));
    }

    #[test]
    fn test_different_kind_or_parent_not_suppressed() {
        let clock = ManualClock::new(10_000);
        let mut deduper = InsertDeduper::new(clock, 100);

        assert!(deduper.try_acquire(FieldKind::Email, None));
        assert!(deduper.try_acquire(FieldKind::Text, None));
        assert!(deduper.try_acquire(FieldKind::Email, Some(FieldId::new(1))));
        assert_eq!(deduper.len(), 3);
    }

    #[test]
    fn test_next_window_accepts_again() {
        let clock = ManualClock::new(10_050);
        let mut deduper = InsertDeduper::new(clock.clone(), 100);

        assert!(deduper.try_acquire(FieldKind::Number, None));
        clock.set(10_100);
        assert!(deduper.try_acquire(FieldKind::Number, None));
    }

    #[test]
    fn test_expired_keys_are_purged() {
        let clock = ManualClock::new(0);
        let mut deduper = InsertDeduper::new(clock.clone(), 100);

        for offset in 0..5 {
            clock.set(offset * 1_000);
            assert!(deduper.try_acquire(FieldKind::Checkbox, None));
            // Only the request of the current window survives
            assert_eq!(deduper.len(), 1);
        }

        clock.advance(1_000);
        deduper.purge();
        assert!(deduper.is_empty());
    }

    #[test]
    fn test_zero_window_is_clamped() {
        let deduper = InsertDeduper::new(ManualClock::new(0), 0);
        assert_eq!(deduper.window_ms(), 1);
    }
}
