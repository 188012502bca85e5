use std::time::{Duration, Instant};

/// Decides when the preview loop should draw the next frame.
///
/// Without an interval every redraw renders and pacing is left to the
/// surface's present mode.
#[derive(Debug, Clone)]
pub struct FrameScheduler {
    interval: Option<Duration>,
    last_frame: Option<Instant>,
}

impl FrameScheduler {
    pub fn new(interval: Option<Duration>) -> Self {
        Self {
            interval: interval.filter(|value| !value.is_zero()),
            last_frame: None,
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn ready_for_frame(&self, now: Instant) -> bool {
        match self.next_deadline() {
            Some(deadline) => now >= deadline,
            None => true,
        }
    }

    /// Earliest instant the next frame may render, if capped.
    pub fn next_deadline(&self) -> Option<Instant> {
        let interval = self.interval?;
        let last = self.last_frame?;
        Some(last + interval)
    }

    pub fn mark_rendered(&mut self, now: Instant) {
        self.last_frame = Some(now);
    }
}

/// Per-second counters reported at debug level.
#[derive(Debug)]
pub(crate) struct FrameStats {
    window_start: Instant,
    presented: u64,
    skipped: u64,
    throttled: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StatsReport {
    pub presented: u64,
    pub skipped: u64,
    pub throttled: u64,
    pub elapsed: Duration,
}

impl FrameStats {
    const REPORT_EVERY: Duration = Duration::from_secs(1);

    pub(crate) fn new(now: Instant) -> Self {
        Self {
            window_start: now,
            presented: 0,
            skipped: 0,
            throttled: 0,
        }
    }

    pub(crate) fn record_presented(&mut self) {
        self.presented += 1;
    }

    pub(crate) fn record_skipped(&mut self) {
        self.skipped += 1;
    }

    pub(crate) fn record_throttled(&mut self) {
        self.throttled += 1;
    }

    /// Returns and resets the counters once a full reporting window elapsed.
    pub(crate) fn take_report(&mut self, now: Instant) -> Option<StatsReport> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < Self::REPORT_EVERY {
            return None;
        }
        let report = StatsReport {
            presented: self.presented,
            skipped: self.skipped,
            throttled: self.throttled,
            elapsed,
        };
        *self = Self::new(now);
        Some(report)
    }
}
