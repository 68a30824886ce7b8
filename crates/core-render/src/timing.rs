//! Frame pacing helpers.
//!
//! The engine is synchronous; these two helpers exist only so a driver can
//! sequence visual updates (e.g. let a caret blink restart or a scroll settle
//! before the next step). They never guard shared state.
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Nominal animation-frame interval (60 Hz).
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

static FRAMES_AWAITED: AtomicU64 = AtomicU64::new(0);

/// Resume on the next animation-frame tick.
pub async fn delay() {
    tokio::time::sleep(FRAME_INTERVAL).await;
    FRAMES_AWAITED.fetch_add(1, Ordering::Relaxed);
}

/// Resume after `ms` milliseconds.
pub async fn sleep(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// Number of completed `delay()` calls in this process.
pub fn frames_awaited() -> u64 {
    FRAMES_AWAITED.load(Ordering::Relaxed)
}
