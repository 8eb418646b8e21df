//! Frame pacing for the render loop.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Source of display-frame ticks.
#[async_trait]
pub trait FrameSource: Send {
    /// Wait for the next frame. `None` means the source has ended and the
    /// loop should stop.
    async fn next_frame(&mut self) -> Option<Instant>;
}

/// Paces frames at a fixed display refresh rate.
///
/// Ticks missed while a frame was being drawn are skipped, not replayed, so
/// a slow frame coalesces into the next one.
#[derive(Debug)]
pub struct DisplayClock {
    interval: Interval,
}

impl DisplayClock {
    /// Clock ticking `refresh_rate_hz` times per second (at least once).
    #[must_use]
    pub fn new(refresh_rate_hz: u32) -> Self {
        let period = Duration::from_secs_f64(1.0 / f64::from(refresh_rate_hz.max(1)));
        let mut interval = tokio::time::interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval }
    }

    /// Time between ticks.
    #[must_use]
    pub fn period(&self) -> Duration {
        self.interval.period()
    }
}

#[async_trait]
impl FrameSource for DisplayClock {
    async fn next_frame(&mut self) -> Option<Instant> {
        Some(self.interval.tick().await)
    }
}

/// Frames driven by an external vsync signal.
///
/// Each `()` sent on the paired sender is one frame. Dropping every sender
/// ends the source.
#[derive(Debug)]
pub struct TickChannel {
    rx: mpsc::UnboundedReceiver<()>,
}

impl TickChannel {
    /// Create a tick sender and the frame source it drives.
    #[must_use]
    pub fn new() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }
}

#[async_trait]
impl FrameSource for TickChannel {
    async fn next_frame(&mut self) -> Option<Instant> {
        self.rx.recv().await.map(|()| Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_refresh_rate_sets_period() {
        assert_eq!(DisplayClock::new(50).period(), Duration::from_millis(20));
        assert_eq!(DisplayClock::new(0).period(), Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_tick_channel_ends_when_sender_dropped() {
        let (tx, mut frames) = TickChannel::new();
        tx.send(()).expect("send");
        drop(tx);

        assert!(frames.next_frame().await.is_some());
        assert!(frames.next_frame().await.is_none());
    }
}
