//! Opt-in timings and counters, switched on with `FFLT_METRICS=1`.
//!
//! Everything is reported as `tracing` events on the `fflt::metrics` target,
//! so `FFLT_LOG=fflt::metrics=info` is needed to actually see them.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

const ENV_VAR: &str = "FFLT_METRICS";

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Read `FFLT_METRICS` once at startup.
pub fn init() {
    let on = std::env::var(ENV_VAR)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false);
    ENABLED.store(on, Ordering::Relaxed);
}

/// Whether metrics are being collected.
#[inline]
pub fn enabled() -> bool {
    ENABLED.load(Ordering::Relaxed)
}

/// Report how many items an operation handled (files, candidates, ...).
pub fn count(label: &'static str, items: usize) {
    if enabled() {
        tracing::info!(target: "fflt::metrics", label, items = items as u64, "count");
    }
}

/// Measures the span between [`Timer::start`] and drop.
pub struct Timer {
    label: &'static str,
    started: Instant,
}

impl Timer {
    /// Returns `None` when metrics are off.
    #[inline]
    pub fn start(label: &'static str) -> Option<Self> {
        enabled().then(|| Self {
            label,
            started: Instant::now(),
        })
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let elapsed_us = self.started.elapsed().as_micros() as u64;
        tracing::info!(target: "fflt::metrics", label = self.label, elapsed_us, "timing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_is_none_when_disabled() {
        ENABLED.store(false, Ordering::Relaxed);
        assert!(Timer::start("noop").is_none());
        count("noop", 3);
    }
}
