use super::task::FocusTask;
use chrono::{DateTime, Local, NaiveDate};

/// Completed tasks that share a calendar day
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryGroup {
    pub date: NaiveDate,
    pub tasks: Vec<FocusTask>,
}

/// Day a history entry belongs to (completion day, else creation day)
fn history_day(task: &FocusTask) -> NaiveDate {
    task.completed_at.unwrap_or(task.created_at).date_naive()
}

/// Group history by calendar day, newest day first
///
/// Within a group the incoming order is kept, so a most-recent-first
/// history stays most-recent-first inside each day.
pub fn group_by_day(history: &[FocusTask]) -> Vec<HistoryGroup> {
    let mut groups: Vec<HistoryGroup> = Vec::new();

    for task in history {
        let date = history_day(task);
        match groups.iter_mut().find(|g| g.date == date) {
            Some(group) => group.tasks.push(task.clone()),
            None => groups.push(HistoryGroup {
                date,
                tasks: vec![task.clone()],
            }),
        }
    }

    groups.sort_by(|a, b| b.date.cmp(&a.date));
    groups
}

/// Total focus seconds for today
///
/// Counts every active task plus history entries completed today. The
/// live session elapsed replaces the stored value for the active task.
pub fn total_time_today(
    tasks: &[FocusTask],
    history: &[FocusTask],
    live: Option<(uuid::Uuid, f64)>,
    now: DateTime<Local>,
) -> f64 {
    let today = now.date_naive();

    let active: f64 = tasks
        .iter()
        .map(|task| match live {
            Some((id, elapsed)) if id == task.id => elapsed,
            _ => task.elapsed_time,
        })
        .sum();

    let completed: f64 = history
        .iter()
        .filter(|task| task.completed_at.map(|at| at.date_naive()) == Some(today))
        .map(|task| task.elapsed_time)
        .sum();

    active + completed
}

/// Header text for a history day ("Today", "Yesterday", or "Mon, Oct 19")
pub fn day_header(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else if Some(date) == today.pred_opt() {
        "Yesterday".to_string()
    } else {
        date.format("%a, %b %-d").to_string()
    }
}
