//! Enumerations and field types for build-out tracking.
//!
//! This module defines the structured field types shared by the plan parser,
//! the store and the CLI: task priorities, the coarse status set used for
//! aggregate counting, and normalization from loosely-worded source text.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Task priority. Unrecognized source text normalizes to `Medium`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum Priority {
    Low,
    Medium,
    High,
    Critical,
}

/// Coarse task status used for aggregate counting.
///
/// Source documents carry wordier statuses ("Awaiting vendor quote",
/// "Scheduled for next week"); those normalize onto this set via
/// [`normalize_status`] and the original wording is not retained.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum Status {
    #[serde(rename = "Not Started")]
    NotStarted,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Awaiting Decision")]
    AwaitingDecision,
    #[serde(rename = "Completed")]
    Completed,
}

/// Available sorting options for task lists.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SortKey {
    Due,
    Priority,
    Id,
}

/// Which task collections a listing draws from.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum Source {
    Plan,
    Store,
    All,
}

/// Format a priority for table display.
pub fn format_priority(p: Priority) -> &'static str {
    match p {
        Priority::Low => "Low",
        Priority::Medium => "Medium",
        Priority::High => "High",
        Priority::Critical => "Critical",
    }
}

/// Format a status for table display.
pub fn format_status(s: Status) -> &'static str {
    match s {
        Status::NotStarted => "Not Started",
        Status::InProgress => "In Progress",
        Status::AwaitingDecision => "Awaiting Decision",
        Status::Completed => "Completed",
    }
}

/// Normalize a raw priority string: case-insensitive exact match against the
/// four known levels, anything else falls back to `Medium`.
pub fn normalize_priority(s: &str) -> Priority {
    match s.trim().to_lowercase().as_str() {
        "critical" => Priority::Critical,
        "high" => Priority::High,
        "medium" => Priority::Medium,
        "low" => Priority::Low,
        _ => Priority::Medium,
    }
}

/// Normalize a raw status string onto the coarse status set.
///
/// Keyword containment, checked in order: "progress" wins over "awaiting"
/// so "awaiting progress report" style wordings land on `In Progress`.
pub fn normalize_status(s: &str) -> Status {
    let s = s.trim().to_lowercase();
    if s.contains("progress") {
        Status::InProgress
    } else if s.contains("completed") || s.contains("done") {
        Status::Completed
    } else if s.contains("not started") || s.contains("scheduled") {
        Status::NotStarted
    } else if s.contains("awaiting") || s.contains("decision") {
        Status::AwaitingDecision
    } else {
        Status::NotStarted
    }
}

/// Numeric rank for priority sorting (Critical first).
pub fn priority_rank(p: Priority) -> u8 {
    match p {
        Priority::Critical => 0,
        Priority::High => 1,
        Priority::Medium => 2,
        Priority::Low => 3,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn priority_normalizes_case_insensitively() {
        assert_eq!(normalize_priority("CRITICAL"), Priority::Critical);
        assert_eq!(normalize_priority("  high "), Priority::High);
        assert_eq!(normalize_priority("low"), Priority::Low);
    }

    #[test]
    fn unknown_priority_falls_back_to_medium() {
        assert_eq!(normalize_priority("urgent!!"), Priority::Medium);
        assert_eq!(normalize_priority(""), Priority::Medium);
        assert_eq!(normalize_priority("P1"), Priority::Medium);
    }

    #[test]
    fn status_keyword_containment_order() {
        assert_eq!(normalize_status("In Progress"), Status::InProgress);
        assert_eq!(normalize_status("work in progress (60%)"), Status::InProgress);
        assert_eq!(normalize_status("Completed"), Status::Completed);
        assert_eq!(normalize_status("Done last week"), Status::Completed);
        assert_eq!(normalize_status("Not Started"), Status::NotStarted);
        assert_eq!(normalize_status("Scheduled for Monday"), Status::NotStarted);
        assert_eq!(normalize_status("Awaiting vendor"), Status::AwaitingDecision);
        assert_eq!(normalize_status("Decision pending"), Status::AwaitingDecision);
    }

    #[test]
    fn unknown_status_falls_back_to_not_started() {
        assert_eq!(normalize_status("???"), Status::NotStarted);
        assert_eq!(normalize_status(""), Status::NotStarted);
    }

    #[test]
    fn progress_beats_awaiting_when_both_present() {
        // "awaiting progress update" contains both keywords.
        assert_eq!(normalize_status("awaiting progress update"), Status::InProgress);
    }

    #[test]
    fn status_serializes_with_display_wording() {
        let json = serde_json::to_string(&Status::NotStarted).unwrap();
        assert_eq!(json, "\"Not Started\"");
        let back: Status = serde_json::from_str("\"Awaiting Decision\"").unwrap();
        assert_eq!(back, Status::AwaitingDecision);
    }
}
