use crate::clock::{seconds_between, Clock};
use crate::domain::task::{format_clock, progress, remaining};
use chrono::{DateTime, Local};
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

/// Countdown lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// No task bound
    Idle,
    /// Bound and counting
    Running,
    /// Bound, frozen at the accumulated time
    Paused,
}

/// Emitted by a tick that reached the target duration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimerCompletion {
    pub task_id: Uuid,
    /// Final elapsed seconds, clamped to the duration
    pub elapsed: f64,
}

/// Read-only view of the timer for display
#[derive(Debug, Clone, PartialEq)]
pub struct TimerSnapshot {
    pub active_task_id: Option<Uuid>,
    pub state: TimerState,
    pub is_running: bool,
    pub elapsed: f64,
    pub remaining: f64,
    pub progress: f64,
}

impl TimerSnapshot {
    pub fn formatted_remaining(&self) -> String {
        format_clock(self.remaining)
    }

    pub fn formatted_elapsed(&self) -> String {
        format_clock(self.elapsed)
    }
}

/// Single countdown bound to one task id at a time
///
/// The engine never holds a task, only its id. Lookups go through the
/// task store. Ticking is a flag: while it is cleared, `tick` does
/// nothing, so pausing or stopping takes effect immediately.
pub struct TimerEngine {
    clock: Rc<dyn Clock>,
    active_task_id: Option<Uuid>,
    elapsed_time: f64,
    is_running: bool,
    task_duration: f64,
    accumulated_time: f64,
    start_time: Option<DateTime<Local>>,
    ticking: bool,
}

impl TimerEngine {
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            clock,
            active_task_id: None,
            elapsed_time: 0.0,
            is_running: false,
            task_duration: 0.0,
            accumulated_time: 0.0,
            start_time: None,
            ticking: false,
        }
    }

    pub fn active_task_id(&self) -> Option<Uuid> {
        self.active_task_id
    }

    /// Elapsed seconds for the current session, as of the last tick
    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn is_running(&self) -> bool {
        self.is_running
    }

    pub fn state(&self) -> TimerState {
        match (self.active_task_id, self.is_running) {
            (None, _) => TimerState::Idle,
            (Some(_), true) => TimerState::Running,
            (Some(_), false) => TimerState::Paused,
        }
    }

    pub fn remaining_time(&self) -> f64 {
        remaining(self.task_duration, self.elapsed_time)
    }

    pub fn progress(&self) -> f64 {
        progress(self.task_duration, self.elapsed_time)
    }

    /// Bind to a task and start counting from `current_elapsed`
    ///
    /// Any previous binding is overwritten without reconciliation; the
    /// caller saves the old task's time first.
    pub fn start(&mut self, task_id: Uuid, duration: f64, current_elapsed: f64) {
        self.active_task_id = Some(task_id);
        self.task_duration = duration;
        self.accumulated_time = current_elapsed;
        self.elapsed_time = current_elapsed;
        self.start_time = Some(self.clock.now());
        self.is_running = true;
        self.ticking = true;

        debug!(%task_id, duration, current_elapsed, "timer started");
    }

    /// Freeze at the current elapsed time, keeping the task bound
    pub fn pause(&mut self) {
        if !self.is_running {
            return;
        }
        self.is_running = false;
        self.accumulated_time = self.elapsed_time;
        self.ticking = false;

        debug!(elapsed = self.elapsed_time, "timer paused");
    }

    /// Continue a paused timer from its accumulated time
    pub fn resume(&mut self) {
        if self.is_running || self.active_task_id.is_none() {
            return;
        }
        self.start_time = Some(self.clock.now());
        self.is_running = true;
        self.ticking = true;

        debug!(elapsed = self.accumulated_time, "timer resumed");
    }

    /// Unbind and zero everything; always safe to call
    pub fn stop(&mut self) {
        self.ticking = false;
        self.is_running = false;
        self.active_task_id = None;
        self.elapsed_time = 0.0;
        self.accumulated_time = 0.0;
        self.task_duration = 0.0;
        self.start_time = None;
    }

    /// Start the bound task's countdown over, leaving the timer running
    pub fn restart(&mut self, duration: f64) {
        if self.active_task_id.is_none() {
            return;
        }
        self.accumulated_time = 0.0;
        self.elapsed_time = 0.0;
        self.task_duration = duration;
        self.start_time = Some(self.clock.now());

        if !self.is_running {
            self.is_running = true;
            self.ticking = true;
        }

        debug!(duration, "timer restarted");
    }

    /// Recompute elapsed time; returns the completion when the target is hit
    ///
    /// The completing id is captured before the engine stops, so the
    /// returned event always names the task that finished.
    pub fn tick(&mut self) -> Option<TimerCompletion> {
        if !self.ticking {
            return None;
        }
        let start_time = self.start_time?;

        self.elapsed_time = self.accumulated_time + seconds_between(start_time, self.clock.now());

        if self.elapsed_time < self.task_duration {
            return None;
        }

        self.elapsed_time = self.task_duration;
        let completion = self.active_task_id.map(|task_id| TimerCompletion {
            task_id,
            elapsed: self.elapsed_time,
        });
        self.stop();

        if let Some(done) = &completion {
            debug!(task_id = %done.task_id, "timer completed");
        }
        completion
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            active_task_id: self.active_task_id,
            state: self.state(),
            is_running: self.is_running,
            elapsed: self.elapsed_time,
            remaining: self.remaining_time(),
            progress: self.progress(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use pretty_assertions::assert_eq;

    fn engine() -> (TimerEngine, ManualClock) {
        let clock = ManualClock::default();
        (TimerEngine::new(Rc::new(clock.clone())), clock)
    }

    /// Advance simulated time in 0.1s steps, collecting completions
    fn run_for(engine: &mut TimerEngine, clock: &ManualClock, secs: f64) -> Vec<TimerCompletion> {
        let steps = (secs * 10.0).round() as u64;
        let mut fired = Vec::new();
        for _ in 0..steps {
            clock.advance_secs(0.1);
            fired.extend(engine.tick());
        }
        fired
    }

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-6, "expected {expected}, got {actual}");
    }

    #[test]
    fn test_new_engine_is_idle() {
        let (engine, _) = engine();
        assert_eq!(engine.state(), TimerState::Idle);
        assert!(engine.active_task_id().is_none());
        assert_eq!(engine.progress(), 0.0);
        assert_eq!(engine.remaining_time(), 0.0);
    }

    #[test]
    fn test_start_binds_task() {
        let (mut engine, clock) = engine();
        let id = Uuid::new_v4();
        engine.start(id, 600.0, 120.0);

        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(engine.active_task_id(), Some(id));
        assert_eq!(engine.elapsed_time(), 120.0);

        clock.advance_secs(30.0);
        engine.tick();
        assert_close(engine.elapsed_time(), 150.0);
        assert_close(engine.remaining_time(), 450.0);
        assert_close(engine.progress(), 0.25);
    }

    #[test]
    fn test_completion_fires_once_and_unbinds() {
        let (mut engine, clock) = engine();
        let id = Uuid::new_v4();
        engine.start(id, 600.0, 0.0);

        let fired = run_for(&mut engine, &clock, 600.0);
        assert_eq!(fired, vec![TimerCompletion { task_id: id, elapsed: 600.0 }]);
        assert!(engine.active_task_id().is_none());
        assert_eq!(engine.state(), TimerState::Idle);

        // Further ticks stay silent
        assert!(run_for(&mut engine, &clock, 5.0).is_empty());
    }

    #[test]
    fn test_overshoot_is_clamped() {
        let (mut engine, clock) = engine();
        let id = Uuid::new_v4();
        engine.start(id, 600.0, 0.0);

        clock.advance_secs(601.0);
        let done = engine.tick().unwrap();
        assert_eq!(done.elapsed, 600.0);
        assert_eq!(done.task_id, id);
    }

    #[test]
    fn test_pause_resume_preserves_elapsed() {
        let (mut engine, clock) = engine();
        engine.start(Uuid::new_v4(), 600.0, 0.0);

        run_for(&mut engine, &clock, 100.0);
        engine.pause();
        assert_close(engine.elapsed_time(), 100.0);
        assert_eq!(engine.state(), TimerState::Paused);

        // Time spent paused does not count
        clock.advance_secs(300.0);
        assert!(engine.tick().is_none());
        assert_close(engine.elapsed_time(), 100.0);

        engine.resume();
        run_for(&mut engine, &clock, 50.0);
        assert_close(engine.elapsed_time(), 150.0);
    }

    #[test]
    fn test_pause_cancels_pending_completion() {
        let (mut engine, clock) = engine();
        engine.start(Uuid::new_v4(), 10.0, 9.9);
        engine.pause();

        clock.advance_secs(60.0);
        assert!(engine.tick().is_none());
        assert!(engine.active_task_id().is_some());
    }

    #[test]
    fn test_invalid_operations_are_noops() {
        let (mut engine, _) = engine();

        engine.pause();
        engine.resume();
        engine.restart(300.0);
        engine.stop();
        engine.stop();
        assert_eq!(engine.snapshot(), TimerEngine::new(Rc::new(ManualClock::default())).snapshot());

        // Resume while already running changes nothing
        let id = Uuid::new_v4();
        engine.start(id, 600.0, 10.0);
        engine.resume();
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(engine.elapsed_time(), 10.0);
    }

    #[test]
    fn test_stop_clears_everything() {
        let (mut engine, clock) = engine();
        engine.start(Uuid::new_v4(), 600.0, 0.0);
        run_for(&mut engine, &clock, 5.0);

        engine.stop();
        let snap = engine.snapshot();
        assert_eq!(snap.state, TimerState::Idle);
        assert_eq!(snap.elapsed, 0.0);
        assert_eq!(snap.remaining, 0.0);
        assert!(!snap.is_running);
    }

    #[test]
    fn test_restart_from_paused_leaves_running() {
        let (mut engine, clock) = engine();
        engine.start(Uuid::new_v4(), 600.0, 0.0);
        run_for(&mut engine, &clock, 200.0);
        engine.pause();

        engine.restart(900.0);
        assert_eq!(engine.state(), TimerState::Running);
        assert_eq!(engine.elapsed_time(), 0.0);

        run_for(&mut engine, &clock, 90.0);
        assert_close(engine.elapsed_time(), 90.0);
        assert_close(engine.progress(), 0.1);
    }

    #[test]
    fn test_start_overwrites_previous_binding() {
        let (mut engine, clock) = engine();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        engine.start(first, 600.0, 0.0);
        run_for(&mut engine, &clock, 10.0);
        engine.start(second, 300.0, 0.0);

        assert_eq!(engine.active_task_id(), Some(second));
        assert_eq!(engine.elapsed_time(), 0.0);
    }

    #[test]
    fn test_snapshot_formatting() {
        let (mut engine, clock) = engine();
        engine.start(Uuid::new_v4(), 600.0, 0.0);
        clock.advance_secs(65.0);
        engine.tick();

        let snap = engine.snapshot();
        assert_eq!(snap.formatted_elapsed(), "1:05");
        assert_eq!(snap.formatted_remaining(), "8:55");
    }
}
