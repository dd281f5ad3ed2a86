use chrono::{DateTime, Local};

/// Source of wall-clock time for the timer and the task store
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

/// Real local time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Seconds between two instants, as a float
pub fn seconds_between(start: DateTime<Local>, end: DateTime<Local>) -> f64 {
    let delta = end.signed_duration_since(start);
    match delta.num_microseconds() {
        Some(micros) => micros as f64 / 1_000_000.0,
        None => delta.num_milliseconds() as f64 / 1000.0,
    }
}

/// Hand-driven clock for simulating time in tests
///
/// Clones share the same instant, so a test can keep one handle and
/// advance time under a component that owns another.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<DateTime<Local>>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(start)),
        }
    }

    pub fn advance_secs(&self, secs: f64) {
        let micros = (secs * 1_000_000.0).round() as i64;
        self.now.set(self.now.get() + chrono::Duration::microseconds(micros));
    }

    pub fn set(&self, at: DateTime<Local>) {
        self.now.set(at);
    }
}

#[cfg(test)]
impl Default for ManualClock {
    fn default() -> Self {
        use chrono::TimeZone;
        Self::new(Local.with_ymd_and_hms(2026, 10, 19, 9, 0, 0).unwrap())
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_between() {
        let clock = ManualClock::default();
        let start = clock.now();
        clock.advance_secs(90.25);
        assert_eq!(seconds_between(start, clock.now()), 90.25);
        assert_eq!(seconds_between(clock.now(), start), -90.25);
    }

    #[test]
    fn test_manual_clock_clones_share_time() {
        let clock = ManualClock::default();
        let handle = clock.clone();
        let start = clock.now();

        handle.advance_secs(10.0);
        assert_eq!(seconds_between(start, clock.now()), 10.0);
    }
}
