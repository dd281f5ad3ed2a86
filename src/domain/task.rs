use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default task duration in seconds (10 minutes)
pub const DEFAULT_DURATION_SECS: f64 = 600.0;

/// A focus task with a countdown target and accumulated time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FocusTask {
    /// Unique ID, assigned at creation
    pub id: Uuid,
    /// Task name (trimmed, never empty)
    pub name: String,
    /// Target duration in seconds
    pub duration: f64,
    /// Time spent so far in seconds
    pub elapsed_time: f64,
    /// Whether the task has been completed
    pub is_completed: bool,
    /// When the task was completed (only set for history entries)
    pub completed_at: Option<DateTime<Local>>,
    /// When the task was created
    pub created_at: DateTime<Local>,
}

impl FocusTask {
    pub fn new(name: String, duration: f64, created_at: DateTime<Local>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            duration,
            elapsed_time: 0.0,
            is_completed: false,
            completed_at: None,
            created_at,
        }
    }

    /// Seconds left until the target duration (never negative)
    pub fn remaining_time(&self) -> f64 {
        remaining(self.duration, self.elapsed_time)
    }

    /// Ratio of elapsed to duration, clamped to 0.0..=1.0
    pub fn progress(&self) -> f64 {
        progress(self.duration, self.elapsed_time)
    }

    pub fn formatted_elapsed(&self) -> String {
        format_clock(self.elapsed_time)
    }

    pub fn formatted_duration(&self) -> String {
        format_clock(self.duration)
    }

    /// Mark as completed at the given time
    pub fn mark_completed(&mut self, at: DateTime<Local>) {
        self.is_completed = true;
        self.completed_at = Some(at);
    }

    /// Clear elapsed time and completion state
    pub fn reset(&mut self) {
        self.elapsed_time = 0.0;
        self.is_completed = false;
        self.completed_at = None;
    }
}

/// Remaining seconds for a countdown, floored at zero
pub fn remaining(duration: f64, elapsed: f64) -> f64 {
    (duration - elapsed).max(0.0)
}

/// Countdown progress in 0.0..=1.0 (0.0 when duration is not positive)
pub fn progress(duration: f64, elapsed: f64) -> f64 {
    if duration <= 0.0 {
        return 0.0;
    }
    (elapsed / duration).clamp(0.0, 1.0)
}

/// Format seconds as "M:SS" (e.g., "10:00", "0:07", "72:30")
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(duration: f64) -> FocusTask {
        FocusTask::new("Test".to_string(), duration, Local::now())
    }

    #[test]
    fn test_task_new() {
        let t = task(DEFAULT_DURATION_SECS);
        assert_eq!(t.name, "Test");
        assert_eq!(t.duration, 600.0);
        assert_eq!(t.elapsed_time, 0.0);
        assert!(!t.is_completed);
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_remaining_plus_elapsed_equals_duration() {
        let mut t = task(600.0);
        for elapsed in [0.0, 0.5, 100.0, 599.9, 600.0] {
            t.elapsed_time = elapsed;
            assert!((t.remaining_time() + t.elapsed_time - t.duration).abs() < 1e-9);
        }

        t.elapsed_time = 750.0;
        assert_eq!(t.remaining_time(), 0.0);
    }

    #[test]
    fn test_progress_is_clamped() {
        let mut t = task(600.0);
        assert_eq!(t.progress(), 0.0);

        t.elapsed_time = 300.0;
        assert_eq!(t.progress(), 0.5);

        t.elapsed_time = 1200.0;
        assert_eq!(t.progress(), 1.0);

        // Zero duration never divides
        t.duration = 0.0;
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn test_mark_completed_and_reset() {
        let mut t = task(600.0);
        t.elapsed_time = 42.0;
        let now = Local::now();

        t.mark_completed(now);
        assert!(t.is_completed);
        assert_eq!(t.completed_at, Some(now));

        t.reset();
        assert_eq!(t.elapsed_time, 0.0);
        assert!(!t.is_completed);
        assert!(t.completed_at.is_none());
    }

    #[test]
    fn test_record_uses_camel_case_keys() {
        let mut t = task(600.0);
        t.mark_completed(Local::now());
        let json = serde_json::to_string(&t).unwrap();

        for key in ["\"elapsedTime\"", "\"isCompleted\"", "\"completedAt\"", "\"createdAt\""] {
            assert!(json.contains(key), "missing {} in {}", key, json);
        }
        assert!(!json.contains("elapsed_time"));

        let back: FocusTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(600.0), "10:00");
        assert_eq!(format_clock(7.9), "0:07");
        assert_eq!(format_clock(4350.0), "72:30");
        assert_eq!(format_clock(-3.0), "0:00");

        let mut t = task(600.0);
        t.elapsed_time = 65.0;
        assert_eq!(t.formatted_elapsed(), "1:05");
        assert_eq!(t.formatted_duration(), "10:00");
    }
}
