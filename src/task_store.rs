use crate::clock::Clock;
use crate::domain::{group_by_day, FocusTask, HistoryGroup};
use crate::persistence::{save_json, KeyValueStore, COMPLETED_TASKS_KEY, TASKS_KEY};
use serde::de::DeserializeOwned;
use std::rc::Rc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Maximum number of active tasks
pub const MAX_TASKS: usize = 3;

/// Ordered active tasks plus most-recent-first history
///
/// A task lives in exactly one of the two lists. It only leaves the
/// active list through `delete_task`/`delete_task_at` (gone for good) or
/// `complete_task` (moved to the front of history).
pub struct TaskStore {
    tasks: Vec<FocusTask>,
    completed_tasks: Vec<FocusTask>,
    storage: Box<dyn KeyValueStore>,
    clock: Rc<dyn Clock>,
}

impl TaskStore {
    /// Load both lists from storage; unreadable blobs start empty
    pub fn load(storage: Box<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        let tasks = load_list(storage.as_ref(), TASKS_KEY);
        let completed_tasks = load_list(storage.as_ref(), COMPLETED_TASKS_KEY);
        debug!(active = tasks.len(), history = completed_tasks.len(), "tasks loaded");

        Self {
            tasks,
            completed_tasks,
            storage,
            clock,
        }
    }

    pub fn tasks(&self) -> &[FocusTask] {
        &self.tasks
    }

    pub fn completed_tasks(&self) -> &[FocusTask] {
        &self.completed_tasks
    }

    pub fn task(&self, id: Uuid) -> Option<&FocusTask> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn can_add_task(&self) -> bool {
        self.tasks.len() < MAX_TASKS
    }

    fn index_of(&self, id: Uuid) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Append a new task; ignored when full or the name is blank
    pub fn add_task(&mut self, name: &str, duration: f64) -> Option<Uuid> {
        let name = name.trim();
        if !self.can_add_task() || name.is_empty() {
            debug!(name, "add_task rejected");
            return None;
        }

        let task = FocusTask::new(name.to_string(), duration, self.clock.now());
        let id = task.id;
        info!(%id, name, duration, "task added");
        self.tasks.push(task);
        self.save();
        Some(id)
    }

    /// Replace the active task with the same id
    pub fn update_task(&mut self, task: FocusTask) {
        if let Some(index) = self.index_of(task.id) {
            self.tasks[index] = task;
            self.save();
        }
    }

    /// Change a task's name; blank names are ignored
    pub fn rename_task(&mut self, id: Uuid, name: &str) {
        let name = name.trim();
        if name.is_empty() {
            return;
        }
        if let Some(mut task) = self.task(id).cloned() {
            task.name = name.to_string();
            self.update_task(task);
        }
    }

    pub fn delete_task(&mut self, id: Uuid) {
        if let Some(index) = self.index_of(id) {
            self.delete_task_at(index);
        }
    }

    pub fn delete_task_at(&mut self, index: usize) {
        if index >= self.tasks.len() {
            return;
        }
        let task = self.tasks.remove(index);
        info!(id = %task.id, name = %task.name, "task deleted");
        self.save();
    }

    /// Move a task to the front of history
    ///
    /// Unknown ids are ignored, so completing twice never duplicates a
    /// history entry.
    pub fn complete_task(&mut self, id: Uuid) {
        let Some(index) = self.index_of(id) else {
            debug!(%id, "complete_task: not active");
            return;
        };

        let mut task = self.tasks.remove(index);
        task.mark_completed(self.clock.now());
        info!(%id, name = %task.name, elapsed = task.elapsed_time, "task completed");
        self.completed_tasks.insert(0, task);
        self.save();
    }

    pub fn update_elapsed_time(&mut self, id: Uuid, elapsed: f64) {
        if let Some(index) = self.index_of(id) {
            self.tasks[index].elapsed_time = elapsed;
            self.save();
        }
    }

    pub fn move_task_up(&mut self, id: Uuid) {
        match self.index_of(id) {
            Some(index) if index > 0 => {
                self.tasks.swap(index, index - 1);
                self.save();
            }
            _ => {}
        }
    }

    pub fn move_task_down(&mut self, id: Uuid) {
        match self.index_of(id) {
            Some(index) if index + 1 < self.tasks.len() => {
                self.tasks.swap(index, index + 1);
                self.save();
            }
            _ => {}
        }
    }

    pub fn set_duration(&mut self, id: Uuid, duration: f64) {
        if let Some(index) = self.index_of(id) {
            self.tasks[index].duration = duration;
            self.save();
        }
    }

    /// Zero elapsed time and clear completion state
    pub fn reset_timer(&mut self, id: Uuid) {
        if let Some(index) = self.index_of(id) {
            self.tasks[index].reset();
            self.save();
        }
    }

    pub fn completed_tasks_grouped_by_date(&self) -> Vec<HistoryGroup> {
        group_by_day(&self.completed_tasks)
    }

    pub fn clear_history(&mut self) {
        info!(count = self.completed_tasks.len(), "history cleared");
        self.completed_tasks.clear();
        self.save();
    }

    /// Persist both lists; failures are logged and in-memory state wins
    fn save(&self) {
        if let Err(e) = save_json(self.storage.as_ref(), TASKS_KEY, &self.tasks) {
            warn!(error = %e, "failed to save tasks");
        }
        if let Err(e) = save_json(self.storage.as_ref(), COMPLETED_TASKS_KEY, &self.completed_tasks) {
            warn!(error = %e, "failed to save completed tasks");
        }
    }
}

fn load_list<T: DeserializeOwned>(storage: &dyn KeyValueStore, key: &str) -> Vec<T> {
    match storage.load(key) {
        Ok(Some(json)) => serde_json::from_str(&json).unwrap_or_else(|e| {
            warn!(key, error = %e, "failed to decode stored list");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            warn!(key, error = %e, "failed to load stored list");
            Vec::new()
        }
    }
}
