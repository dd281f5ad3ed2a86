use std::time::{Duration, Instant};

/// Timer refresh cadence; fine enough for sub-second display
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// How often the foreground loop writes live elapsed time back to disk
pub const CHECKPOINT_INTERVAL: Duration = Duration::from_secs(10);

/// Paces the host loop and tells it when to checkpoint
#[derive(Debug)]
pub struct Ticker {
    interval: Duration,
    checkpoint_every: Duration,
    last_checkpoint: Instant,
}

impl Ticker {
    pub fn new(interval: Duration, checkpoint_every: Duration) -> Self {
        Self {
            interval,
            checkpoint_every,
            last_checkpoint: Instant::now(),
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True once per checkpoint period
    pub fn checkpoint_due(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_checkpoint) >= self.checkpoint_every {
            self.last_checkpoint = now;
            true
        } else {
            false
        }
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new(TICK_INTERVAL, CHECKPOINT_INTERVAL)
    }
}
