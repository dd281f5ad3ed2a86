pub mod settings;
pub mod task;
pub mod views;

pub use settings::{AppSettings, AVAILABLE_DURATIONS, AVAILABLE_SOUNDS};
pub use task::{format_clock, FocusTask};
pub use views::{day_header, group_by_day, total_time_today, HistoryGroup};
