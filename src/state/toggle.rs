//! Process-wide activation flag with debounced flipping.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Sentinel for "never flipped".
const NEVER: u64 = u64::MAX;

pub struct ToggleState {
    active: AtomicBool,
    /// Milliseconds since `origin` of the last accepted flip.
    last_flip_ms: AtomicU64,
    origin: Instant,
    debounce: Duration,
}

impl ToggleState {
    pub fn new(debounce: Duration) -> Self {
        Self {
            active: AtomicBool::new(true),
            last_flip_ms: AtomicU64::new(NEVER),
            origin: Instant::now(),
            debounce,
        }
    }

    #[inline(always)]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Flips the flag unless the previous flip is within the debounce window.
    ///
    /// Returns the new state, or `None` when the press was debounced.
    pub fn try_flip(&self, now: Instant) -> Option<bool> {
        let now_ms = now.saturating_duration_since(self.origin).as_millis() as u64;
        let last = self.last_flip_ms.load(Ordering::Acquire);

        if last != NEVER && now_ms.saturating_sub(last) < self.debounce.as_millis() as u64 {
            return None;
        }

        // Only the winner of the CAS flips
        self.last_flip_ms
            .compare_exchange(last, now_ms, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;

        let previous = self.active.fetch_xor(true, Ordering::AcqRel);
        Some(!previous)
    }
}
