use crate::clock::Clock;
use crate::domain::task::{progress, remaining};
use crate::domain::{total_time_today, HistoryGroup};
use crate::notifications::SoundPlayer;
use crate::persistence::KeyValueStore;
use crate::settings::SettingsStore;
use crate::task_store::TaskStore;
use crate::timer::{TimerCompletion, TimerEngine, TimerSnapshot};
use std::rc::Rc;
use tracing::debug;
use uuid::Uuid;

/// Menu bar title when no task is bound to the timer
pub const IDLE_TITLE: &str = "Focus Friend";

/// One active task as the UI should show it
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub id: Uuid,
    pub name: String,
    pub duration: f64,
    /// Live session time for the timer's task, stored time otherwise
    pub elapsed: f64,
    pub remaining: f64,
    pub progress: f64,
    pub is_active: bool,
    pub is_running: bool,
}

/// Everything a UI needs to render one frame
#[derive(Debug, Clone, PartialEq)]
pub struct AppSnapshot {
    pub tasks: Vec<TaskRow>,
    pub timer: TimerSnapshot,
    pub total_time_today: f64,
    pub can_add_task: bool,
    pub title: String,
}

/// Wires the task store, timer, settings and alarm together
///
/// Every action that pauses, stops or completes the bound task first
/// copies the timer's live elapsed time into the task store, so no
/// session time is lost.
pub struct FocusApp {
    tasks: TaskStore,
    timer: TimerEngine,
    settings: SettingsStore,
    sound: Box<dyn SoundPlayer>,
    clock: Rc<dyn Clock>,
}

impl FocusApp {
    pub fn new(
        tasks: TaskStore,
        timer: TimerEngine,
        settings: SettingsStore,
        sound: Box<dyn SoundPlayer>,
        clock: Rc<dyn Clock>,
    ) -> Self {
        Self {
            tasks,
            timer,
            settings,
            sound,
            clock,
        }
    }

    /// Build every component on top of one shared storage backend
    pub fn open<S: KeyValueStore + 'static>(
        storage: Rc<S>,
        clock: Rc<dyn Clock>,
        sound: Box<dyn SoundPlayer>,
    ) -> Self {
        let tasks = TaskStore::load(Box::new(storage.clone()), clock.clone());
        let settings = SettingsStore::load(Box::new(storage));
        let timer = TimerEngine::new(clock.clone());
        Self::new(tasks, timer, settings, sound, clock)
    }

    pub fn task_store(&self) -> &TaskStore {
        &self.tasks
    }

    pub fn timer(&self) -> &TimerEngine {
        &self.timer
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut SettingsStore {
        &mut self.settings
    }

    fn is_active(&self, id: Uuid) -> bool {
        self.timer.active_task_id() == Some(id)
    }

    /// Copy the live session time into the bound task
    fn reconcile(&mut self) {
        if let Some(id) = self.timer.active_task_id() {
            self.tasks.update_elapsed_time(id, self.timer.elapsed_time());
        }
    }

    /// Add a task with the configured default duration
    pub fn add_task(&mut self, name: &str) -> Option<Uuid> {
        let duration = self.settings.default_duration();
        self.tasks.add_task(name, duration)
    }

    /// Bind the timer to a task and start counting from its stored time
    ///
    /// A task bound but paused is resumed instead. Switching away from
    /// another task saves that task's time first.
    pub fn start_task(&mut self, id: Uuid) {
        if self.is_active(id) {
            self.timer.resume();
            return;
        }
        let Some(task) = self.tasks.task(id) else {
            return;
        };
        let (duration, elapsed) = (task.duration, task.elapsed_time);

        if self.timer.active_task_id().is_some() {
            self.reconcile();
            self.timer.stop();
        }
        self.timer.start(id, duration, elapsed);
    }

    /// Pause a running task, resume a paused one, or start an unbound one
    pub fn toggle_task(&mut self, id: Uuid) {
        if !self.is_active(id) {
            self.start_task(id);
        } else if self.timer.is_running() {
            self.reconcile();
            self.timer.pause();
        } else {
            self.timer.resume();
        }
    }

    /// Save the task's time and unbind the timer
    pub fn stop_task(&mut self, id: Uuid) {
        if self.is_active(id) {
            self.reconcile();
            self.timer.stop();
        }
    }

    /// Finish a task by hand, saving any live time first
    pub fn complete_task(&mut self, id: Uuid) {
        self.stop_task(id);
        self.tasks.complete_task(id);
    }

    pub fn delete_task(&mut self, id: Uuid) {
        if self.is_active(id) {
            self.timer.stop();
        }
        self.tasks.delete_task(id);
    }

    /// Zero the task's time; a bound timer is stopped
    pub fn reset_task(&mut self, id: Uuid) {
        self.tasks.reset_timer(id);
        if self.is_active(id) {
            self.timer.stop();
        }
    }

    /// Start the bound task's countdown over from zero
    pub fn restart_task(&mut self, id: Uuid) {
        if !self.is_active(id) {
            return;
        }
        if let Some(duration) = self.tasks.task(id).map(|t| t.duration) {
            self.timer.restart(duration);
        }
    }

    pub fn rename_task(&mut self, id: Uuid, name: &str) {
        self.tasks.rename_task(id, name);
    }

    /// Change a task's target; a bound timer picks it up on its next start
    pub fn set_task_duration(&mut self, id: Uuid, duration: f64) {
        if duration > 0.0 {
            self.tasks.set_duration(id, duration);
        }
    }

    pub fn move_task_up(&mut self, id: Uuid) {
        self.tasks.move_task_up(id);
    }

    pub fn move_task_down(&mut self, id: Uuid) {
        self.tasks.move_task_down(id);
    }

    pub fn history(&self) -> Vec<HistoryGroup> {
        self.tasks.completed_tasks_grouped_by_date()
    }

    pub fn clear_history(&mut self) {
        self.tasks.clear_history();
    }

    /// Save the running session's time without interrupting it
    pub fn checkpoint(&mut self) {
        if self.timer.is_running() {
            self.reconcile();
        }
    }

    /// Save live time and release the timer (used on shutdown)
    pub fn suspend(&mut self) {
        self.reconcile();
        self.timer.stop();
    }

    /// Advance the timer and handle a completed countdown
    ///
    /// The alarm always plays. If the task was deleted while its timer
    /// ran, there is nothing to move to history and the completion is
    /// dropped.
    pub fn tick(&mut self) -> Option<TimerCompletion> {
        let done = self.timer.tick()?;

        self.sound.play(self.settings.alarm_sound());

        if let Some(stored) = self.tasks.task(done.task_id).map(|t| t.elapsed_time) {
            // Time already on record is never lowered by the clamp
            self.tasks.update_elapsed_time(done.task_id, done.elapsed.max(stored));
            self.tasks.complete_task(done.task_id);
        } else {
            debug!(task_id = %done.task_id, "completed task no longer active, dropping");
        }
        Some(done)
    }

    /// Name of the bound task, or the app name when idle
    pub fn title(&self) -> String {
        self.timer
            .active_task_id()
            .and_then(|id| self.tasks.task(id))
            .map(|task| task.name.clone())
            .unwrap_or_else(|| IDLE_TITLE.to_string())
    }

    pub fn snapshot(&self) -> AppSnapshot {
        let rows = self
            .tasks
            .tasks()
            .iter()
            .map(|task| {
                let is_active = self.is_active(task.id);
                let (elapsed, remaining, progress) = if is_active {
                    let live = self.timer.elapsed_time();
                    (live, remaining(task.duration, live), progress(task.duration, live))
                } else {
                    (task.elapsed_time, task.remaining_time(), task.progress())
                };
                TaskRow {
                    id: task.id,
                    name: task.name.clone(),
                    duration: task.duration,
                    elapsed,
                    remaining,
                    progress,
                    is_active,
                    is_running: is_active && self.timer.is_running(),
                }
            })
            .collect();

        let live = self
            .timer
            .active_task_id()
            .map(|id| (id, self.timer.elapsed_time()));

        AppSnapshot {
            tasks: rows,
            timer: self.timer.snapshot(),
            total_time_today: total_time_today(
                self.tasks.tasks(),
                self.tasks.completed_tasks(),
                live,
                self.clock.now(),
            ),
            can_add_task: self.tasks.can_add_task(),
            title: self.title(),
        }
    }
}
