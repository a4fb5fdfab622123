//! Markdown plan parser.
//!
//! The build-out plan is a markdown document containing one pipe-delimited
//! action-item table. This module locates that table, normalizes each row
//! into a [`Task`] and fills in the derived fields (category, notes,
//! progress) the table does not carry. The plan is read-only seed data and
//! is re-parsed on every call; there is no cache to invalidate.
//!
//! The parser never fails to its caller: unreadable files, a missing table
//! header or malformed rows all degrade to fewer (or zero) tasks, with a
//! warning on the log.

use std::fs;
use std::path::Path;

use chrono::{Duration, Local, NaiveDate, Utc};
use rand::Rng;
use tracing::warn;

use crate::fields::{normalize_priority, normalize_status, Status};
use crate::task::Task;

/// Ordered keyword rules for deriving a category from a task title.
///
/// First matching rule wins, so order matters: plumbing sits ahead of
/// construction so "Install sink" classifies by the fixture, not the verb.
const CATEGORY_RULES: &[(&[&str], &str)] = &[
    (&["kitchen", "ducting", "equipment"], "kitchen"),
    (&["bar", "liquor"], "bar"),
    (&["electrical", "fixture"], "electrical"),
    (&["paint", "acoustic", "finish"], "finishing"),
    (&["bathroom", "washing", "sink", "plumb"], "plumbing"),
    (&["door", "veneer", "install"], "construction"),
    (&["terrace", "glass"], "exterior"),
];

/// Parse the markdown plan file into normalized tasks.
///
/// Returns an empty list when the file cannot be read or contains no
/// action-item table; neither case is an error to the caller.
pub fn parse_plan_tasks(path: &Path) -> Vec<Task> {
    let text = match fs::read_to_string(path) {
        Ok(t) => t,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "plan file unreadable, continuing without plan tasks");
            return Vec::new();
        }
    };
    parse_plan_text(&text)
}

/// Parse plan text. Split from the file wrapper so tests can feed strings.
pub fn parse_plan_text(text: &str) -> Vec<Task> {
    let lines: Vec<&str> = text.lines().collect();
    let header = lines.iter().position(|l| {
        l.contains("Action Item") && l.contains("Owner") && l.contains("Due Date")
    });
    let Some(header) = header else {
        warn!("no action-item table header found in plan");
        return Vec::new();
    };

    let today = Local::now().date_naive();
    let now = Utc::now();
    let mut tasks: Vec<Task> = Vec::new();

    // Header and the markdown separator row are skipped.
    for raw in lines.iter().skip(header + 2) {
        let line = raw.trim();
        if !line.starts_with('|') {
            continue;
        }
        let cols: Vec<&str> = line
            .split('|')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .collect();
        if cols.len() < 5 {
            continue;
        }
        let first = cols[0].to_lowercase();
        if first.contains("action item") || first.chars().all(|c| c == '-' || c == ':') {
            continue;
        }

        let title = cols[0].to_string();
        let status = normalize_status(cols[4]);
        let task = Task {
            id: tasks.len() as u64 + 1,
            owner: cols[1].to_string(),
            due_date: normalize_due(cols[2], today),
            priority: normalize_priority(cols[3]),
            status,
            category: derive_category(&title),
            progress: progress_for_status(status),
            notes: derive_notes(&title),
            title,
            created_at: now,
            updated_at: now,
        };
        tasks.push(task);
    }
    tasks
}

/// Normalize a due-date cell to a calendar date.
///
/// Strips a trailing parenthetical annotation ("(tentative)") and tries the
/// date formats seen in real plan documents. Unparseable cells synthesize
/// today plus 0..=29 days so downstream sorting still has something to work
/// with; callers must not rely on the exact value.
pub fn normalize_due(raw: &str, today: NaiveDate) -> NaiveDate {
    let cleaned = raw.split('(').next().unwrap_or(raw).trim();
    const FORMATS: &[&str] = &[
        "%Y-%m-%d",
        "%Y/%m/%d",
        "%d/%m/%Y",
        "%b %d, %Y",
        "%B %d, %Y",
        "%d %b %Y",
        "%d %B %Y",
    ];
    for fmt in FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(cleaned, fmt) {
            return d;
        }
    }
    today + Duration::days(rand::thread_rng().gen_range(0..30))
}

/// Derive a category from title keywords. Defaults to "general".
pub fn derive_category(title: &str) -> String {
    let lower = title.to_lowercase();
    for (keywords, category) in CATEGORY_RULES {
        if keywords.iter().any(|k| lower.contains(k)) {
            return (*category).to_string();
        }
    }
    "general".to_string()
}

/// Derive a dependency or decision hint from the title, or empty.
pub fn derive_notes(title: &str) -> String {
    let lower = title.to_lowercase();
    if lower.contains("post-") || lower.contains("after") {
        "Depends on completion of earlier work".to_string()
    } else if lower.contains("finalize") || lower.contains("decide") {
        "Decision required before work can proceed".to_string()
    } else {
        String::new()
    }
}

/// Progress estimate as a function of status.
///
/// In Progress rows carry no percentage in the plan, so a 20..=80 estimate
/// stands in; the other statuses map deterministically.
pub fn progress_for_status(status: Status) -> u8 {
    match status {
        Status::Completed => 100,
        Status::NotStarted => 0,
        Status::AwaitingDecision => 10,
        Status::InProgress => rand::thread_rng().gen_range(20..=80),
    }
}
