//! Project summary aggregation.
//!
//! Derived, ephemeral read models for the dashboard-style `summary` command:
//! counts by coarse status, an overall completion percentage, and a bounded
//! slice of urgent tasks. Pure functions of the task list plus a passed-in
//! clock; nothing here touches disk.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::fields::{Priority, Status};
use crate::task::Task;

/// Default urgency window in days. Call sites may widen it via `--window`.
pub const DEFAULT_URGENT_WINDOW_DAYS: i64 = 3;

/// Default cap on the urgent-task slice.
pub const DEFAULT_URGENT_CAP: usize = 5;

/// Counts by coarse status plus overall completion percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectSummary {
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
    pub not_started: usize,
    pub awaiting_decision: usize,
    /// `round(completed / total * 100)`, 0 when there are no tasks.
    pub progress: u32,
}

/// Full report for the summary view.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectReport {
    pub summary: ProjectSummary,
    pub urgent_tasks: Vec<Task>,
    pub target_opening: Option<NaiveDate>,
    pub last_updated: DateTime<Utc>,
}

/// Compute status counts and the completion percentage.
pub fn summarize(tasks: &[Task]) -> ProjectSummary {
    let total = tasks.len();
    let count = |s: Status| tasks.iter().filter(|t| t.status == s).count();
    let completed = count(Status::Completed);
    let progress = if total > 0 {
        ((completed as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };
    ProjectSummary {
        total,
        completed,
        in_progress: count(Status::InProgress),
        not_started: count(Status::NotStarted),
        awaiting_decision: count(Status::AwaitingDecision),
        progress,
    }
}

/// Whether a task needs attention: elevated priority, or due within the
/// window (overdue included).
pub fn is_urgent(task: &Task, today: NaiveDate, window_days: i64) -> bool {
    matches!(task.priority, Priority::Critical | Priority::High)
        || task.due_date <= today + Duration::days(window_days)
}

/// Build the full project report.
///
/// `now` is passed rather than read so the report stays a pure function of
/// its inputs.
pub fn project_report(
    tasks: &[Task],
    window_days: i64,
    urgent_cap: usize,
    target_opening: Option<NaiveDate>,
    now: DateTime<Utc>,
) -> ProjectReport {
    let today = now.date_naive();
    let mut urgent_tasks: Vec<Task> = tasks
        .iter()
        .filter(|t| is_urgent(t, today, window_days))
        .cloned()
        .collect();
    urgent_tasks.truncate(urgent_cap);
    ProjectReport {
        summary: summarize(tasks),
        urgent_tasks,
        target_opening,
        last_updated: now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn task(id: u64, status: Status, priority: Priority, due: NaiveDate) -> Task {
        let now = Utc::now();
        Task {
            id,
            title: format!("task {id}"),
            owner: "Crew".into(),
            due_date: due,
            priority,
            status,
            category: "general".into(),
            progress: 0,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn empty_list_summarizes_to_zeroes() {
        let s = summarize(&[]);
        assert_eq!(
            s,
            ProjectSummary {
                total: 0,
                completed: 0,
                in_progress: 0,
                not_started: 0,
                awaiting_decision: 0,
                progress: 0,
            }
        );
    }

    #[test]
    fn worked_example_four_tasks_fifty_percent() {
        let far = d(2099, 1, 1);
        let tasks = vec![
            task(1, Status::Completed, Priority::Low, far),
            task(2, Status::Completed, Priority::Low, far),
            task(3, Status::InProgress, Priority::Low, far),
            task(4, Status::NotStarted, Priority::Low, far),
        ];
        let s = summarize(&tasks);
        assert_eq!(s.total, 4);
        assert_eq!(s.completed, 2);
        assert_eq!(s.in_progress, 1);
        assert_eq!(s.not_started, 1);
        assert_eq!(s.awaiting_decision, 0);
        assert_eq!(s.progress, 50);
    }

    #[test]
    fn all_completed_is_one_hundred_percent() {
        let far = d(2099, 1, 1);
        let tasks: Vec<Task> = (1..=3)
            .map(|i| task(i, Status::Completed, Priority::Low, far))
            .collect();
        assert_eq!(summarize(&tasks).progress, 100);
    }

    #[test]
    fn urgency_by_priority_or_due_window() {
        let today = d(2025, 10, 1);
        let soon = task(1, Status::NotStarted, Priority::Low, d(2025, 10, 3));
        let later = task(2, Status::NotStarted, Priority::Low, d(2025, 10, 20));
        let critical = task(3, Status::NotStarted, Priority::Critical, d(2025, 12, 1));
        let overdue = task(4, Status::NotStarted, Priority::Low, d(2025, 9, 1));
        assert!(is_urgent(&soon, today, 3));
        assert!(!is_urgent(&later, today, 3));
        assert!(is_urgent(&later, today, 30));
        assert!(is_urgent(&critical, today, 3));
        assert!(is_urgent(&overdue, today, 3));
    }

    #[test]
    fn report_caps_urgent_slice_in_input_order() {
        let now = Utc::now();
        let today = now.date_naive();
        let tasks: Vec<Task> = (1..=8)
            .map(|i| task(i, Status::NotStarted, Priority::Critical, today))
            .collect();
        let report = project_report(&tasks, DEFAULT_URGENT_WINDOW_DAYS, DEFAULT_URGENT_CAP, None, now);
        assert_eq!(report.urgent_tasks.len(), DEFAULT_URGENT_CAP);
        let ids: Vec<u64> = report.urgent_tasks.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
        assert_eq!(report.summary.total, 8);
    }
}
