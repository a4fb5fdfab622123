//! Command implementations for the CLI interface.
//!
//! This module contains all the command handlers, from basic CRUD against
//! the store to the merged plan/store listings and the project summary view.
//! Handlers report user errors via stderr and a non-zero exit; fault-tolerant
//! degradation (unreadable plan, corrupt store) happens a layer down.

use clap::Subcommand;
use clap_complete::{generate, Shell};

use std::path::Path;

use chrono::{Duration, Local, NaiveDate, Utc};

use crate::config::ContactDirectory;
use crate::fields::*;
use crate::parser::{derive_category, parse_plan_tasks};
use crate::store::{
    DecisionPatch, NewDecision, NewTask, Store, StoreError, TaskPatch,
};
use crate::summary::{
    project_report, DEFAULT_URGENT_CAP, DEFAULT_URGENT_WINDOW_DAYS,
};
use crate::task::{Decision, DecisionOption, Task};

#[derive(Subcommand)]
pub enum Commands {
    /// Add a new task to the store.
    Add {
        /// Short title for the task.
        title: String,
        /// Contractor or person(s) responsible.
        #[arg(long)]
        owner: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: String,
        /// Priority: low | medium | high | critical.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Status: not-started | in-progress | awaiting-decision | completed.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Category. Derived from title keywords when omitted.
        #[arg(long)]
        category: Option<String>,
        /// Free-text notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// List tasks (plan and store merged) with optional filters.
    List {
        /// Filter by status.
        #[arg(long, value_enum)]
        status: Option<Status>,
        /// Filter by priority.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Filter by category.
        #[arg(long)]
        category: Option<String>,
        /// Only urgent tasks (elevated priority or due inside the window).
        #[arg(long)]
        urgent: bool,
        /// Urgency window in days.
        #[arg(long, default_value_t = DEFAULT_URGENT_WINDOW_DAYS)]
        window: i64,
        /// Which collections to draw from: plan | store | all.
        #[arg(long, value_enum, default_value_t = Source::All)]
        source: Source,
        /// Sort key.
        #[arg(long, value_enum, default_value_t = SortKey::Due)]
        sort: SortKey,
        /// Limit number of rows printed.
        #[arg(long)]
        limit: Option<usize>,
    },

    /// View a single task by ID.
    View {
        /// Task ID to view.
        id: u64,
    },

    /// Update fields on a stored task.
    Update {
        /// Task ID to update.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        owner: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        category: Option<String>,
        /// Completion estimate, 0-100.
        #[arg(long)]
        progress: Option<u8>,
        #[arg(long)]
        notes: Option<String>,
    },

    /// Mark a stored task completed.
    Complete {
        /// Task ID to complete.
        id: u64,
    },

    /// Delete a stored task by ID.
    Delete {
        /// Task ID to delete.
        id: u64,
    },

    /// Manage pending decisions.
    Decision {
        #[command(subcommand)]
        action: DecisionAction,
    },

    /// Show the project summary: status counts, completion and urgent tasks.
    Summary {
        /// Urgency window in days.
        #[arg(long, default_value_t = DEFAULT_URGENT_WINDOW_DAYS)]
        window: i64,
        /// Maximum number of urgent tasks shown.
        #[arg(long, default_value_t = DEFAULT_URGENT_CAP)]
        cap: usize,
        /// Target opening date (YYYY-MM-DD) to show alongside the summary.
        #[arg(long)]
        target_opening: Option<NaiveDate>,
    },

    /// Print the parsed markdown plan.
    Plan,

    /// Print the contact directory.
    Contacts,

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for.
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum DecisionAction {
    /// Record a pending decision.
    Add {
        /// Short title for the decision.
        title: String,
        /// Person the decision is assigned to.
        #[arg(long)]
        assigned_to: String,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: String,
        /// Longer description.
        #[arg(long)]
        desc: Option<String>,
        /// Priority: low | medium | high | critical.
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// What the decision blocks or affects.
        #[arg(long)]
        impact: Option<String>,
        /// Candidate option. May be repeated.
        #[arg(long = "option")]
        options: Vec<String>,
    },
    /// List pending decisions.
    List,
    /// View a single decision by ID.
    View {
        /// Decision ID to view.
        id: u64,
    },
    /// Update fields on a decision.
    Update {
        /// Decision ID to update.
        id: u64,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        assigned_to: Option<String>,
        /// Due date: YYYY-MM-DD, "today", "tomorrow", or "in Nd".
        #[arg(long)]
        due: Option<String>,
        #[arg(long)]
        desc: Option<String>,
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        #[arg(long, value_enum)]
        status: Option<Status>,
        #[arg(long)]
        impact: Option<String>,
    },
    /// Delete a decision by ID.
    Delete {
        /// Decision ID to delete.
        id: u64,
    },
}

/// Parse human-readable due date input.
///
/// Supports "today", "tomorrow", "in Nd"/"in Nw" and YYYY-MM-DD. CLI input
/// is strict by design, unlike the plan parser's best-effort cells.
pub fn parse_due_input(s: &str) -> Option<NaiveDate> {
    let s = s.trim().to_lowercase();
    let today = Local::now().date_naive();

    match s.as_str() {
        "today" => return Some(today),
        "tomorrow" => return Some(today + Duration::days(1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return Some(today + Duration::days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return Some(today + Duration::weeks(weeks));
            }
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").ok()
}

fn require_due(s: &str) -> NaiveDate {
    match parse_due_input(s) {
        Some(d) => d,
        None => {
            eprintln!("Unrecognised due date '{s}'. Use YYYY-MM-DD, 'today', 'tomorrow', or 'in Nd'.");
            std::process::exit(1);
        }
    }
}

fn exit_store_error(e: StoreError) -> ! {
    eprintln!("Error: {e}");
    std::process::exit(1)
}

/// Merge plan seed tasks with stored tasks according to the source filter.
pub fn collect_tasks(store: &Store, plan: Option<&Path>, source: Source) -> Vec<Task> {
    let mut tasks = Vec::new();
    if source != Source::Store {
        if let Some(path) = plan {
            tasks.extend(parse_plan_tasks(path));
        }
    }
    if source != Source::Plan {
        tasks.extend(store.read().tasks);
    }
    tasks
}

/// Format a due date relative to today ("today", "tomorrow", "in 3d", "2d late").
pub fn format_due_relative(due: NaiveDate, today: NaiveDate) -> String {
    let delta = (due - today).num_days();
    if delta == 0 {
        "today".into()
    } else if delta == 1 {
        "tomorrow".into()
    } else if delta > 1 {
        format!("in {delta}d")
    } else {
        format!("{}d late", -delta)
    }
}

/// Truncate a string to a maximum width, adding ellipsis if needed.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out = String::new();
        for (i, ch) in s.chars().enumerate() {
            if i + 1 >= width {
                out.push('…');
                break;
            }
            out.push(ch);
        }
        out
    }
}

/// Print tasks in a formatted table.
fn print_task_table(tasks: &[Task]) {
    println!(
        "{:<6} {:<18} {:<9} {:<10} {:<12} {:<16} {}",
        "ID", "Status", "Pri", "Due", "Category", "Owner", "Title"
    );
    let today = Local::now().date_naive();
    for t in tasks {
        println!(
            "{:<6} {:<18} {:<9} {:<10} {:<12} {:<16} {}",
            t.id,
            format_status(t.status),
            format_priority(t.priority),
            format_due_relative(t.due_date, today),
            truncate(&t.category, 12),
            truncate(&t.owner, 16),
            t.title,
        );
    }
}

/// Add a new task to the store.
pub fn cmd_add(
    store: &Store,
    title: String,
    owner: String,
    due: String,
    priority: Option<Priority>,
    status: Option<Status>,
    category: Option<String>,
    notes: Option<String>,
) {
    let due = require_due(&due);
    let category = category.or_else(|| Some(derive_category(&title)));
    let input = NewTask {
        title,
        owner,
        due: Some(due),
        priority,
        status,
        category,
        notes,
    };
    match store.add_task(input) {
        Ok(task) => println!("Added task {}", task.id),
        Err(e) => exit_store_error(e),
    }
}

/// List tasks with optional filtering and sorting.
pub fn cmd_list(
    store: &Store,
    plan: Option<&Path>,
    status: Option<Status>,
    priority: Option<Priority>,
    category: Option<String>,
    urgent: bool,
    window: i64,
    source: Source,
    sort: SortKey,
    limit: Option<usize>,
) {
    let today = Local::now().date_naive();
    let mut tasks: Vec<Task> = collect_tasks(store, plan, source)
        .into_iter()
        .filter(|t| {
            if let Some(s) = status {
                if t.status != s {
                    return false;
                }
            }
            if let Some(p) = priority {
                if t.priority != p {
                    return false;
                }
            }
            if let Some(ref c) = category {
                if !t.category.eq_ignore_ascii_case(c) {
                    return false;
                }
            }
            if urgent && !crate::summary::is_urgent(t, today, window) {
                return false;
            }
            true
        })
        .collect();

    match sort {
        SortKey::Due => tasks.sort_by_key(|t| (t.due_date, t.id)),
        SortKey::Priority => {
            tasks.sort_by_key(|t| (priority_rank(t.priority), t.due_date, t.id))
        }
        SortKey::Id => tasks.sort_by_key(|t| t.id),
    }

    if let Some(n) = limit {
        tasks.truncate(n);
    }

    print_task_table(&tasks);
}

/// View detailed information about a specific task.
pub fn cmd_view(store: &Store, plan: Option<&Path>, contacts: &ContactDirectory, id: u64) {
    let tasks = collect_tasks(store, plan, Source::All);
    let Some(task) = tasks.iter().find(|t| t.id == id) else {
        eprintln!("Task {} not found.", id);
        std::process::exit(1);
    };
    let today = Local::now().date_naive();
    println!("ID:           {}", task.id);
    println!("Title:        {}", task.title);
    println!("Owner:        {}", task.owner);
    println!("Status:       {}", format_status(task.status));
    println!("Priority:     {}", format_priority(task.priority));
    println!("Category:     {}", task.category);
    println!(
        "Due:          {} ({})",
        task.due_date,
        format_due_relative(task.due_date, today)
    );
    println!("Progress:     {}%", task.progress);
    println!("Created UTC:  {}", task.created_at.to_rfc3339());
    println!("Updated UTC:  {}", task.updated_at.to_rfc3339());
    println!(
        "Notes:        {}",
        if task.notes.is_empty() { "-" } else { &task.notes }
    );
    let resolved = contacts.resolve_owner(&task.owner);
    if !resolved.is_empty() {
        println!("Contacts:");
        for (name, contact) in resolved {
            let role = if contact.role.is_empty() { String::new() } else { format!(" ({})", contact.role) };
            println!("  {:<16} {}{}", name, contact.phone, role);
        }
    }
}

/// Update an existing stored task's fields.
pub fn cmd_update(
    store: &Store,
    id: u64,
    title: Option<String>,
    owner: Option<String>,
    due: Option<String>,
    priority: Option<Priority>,
    status: Option<Status>,
    category: Option<String>,
    progress: Option<u8>,
    notes: Option<String>,
) {
    let due = due.map(|s| require_due(&s));
    if let Some(p) = progress {
        if p > 100 {
            eprintln!("Progress must be between 0 and 100.");
            std::process::exit(1);
        }
    }
    let patch = TaskPatch {
        title,
        owner,
        due,
        priority,
        status,
        category,
        progress,
        notes,
    };
    match store.update_task(id, patch) {
        Ok(Some(task)) => println!("Updated task {}", task.id),
        Ok(None) => {
            eprintln!("Task {} not found in store. Plan tasks are read-only seed data.", id);
            std::process::exit(1);
        }
        Err(e) => exit_store_error(e),
    }
}

/// Mark a stored task completed.
pub fn cmd_complete(store: &Store, id: u64) {
    let patch = TaskPatch {
        status: Some(Status::Completed),
        progress: Some(100),
        ..TaskPatch::default()
    };
    match store.update_task(id, patch) {
        Ok(Some(_)) => println!("Marked task {} completed.", id),
        Ok(None) => {
            eprintln!("Task {} not found in store. Plan tasks are read-only seed data.", id);
            std::process::exit(1);
        }
        Err(e) => exit_store_error(e),
    }
}

/// Delete a stored task by ID.
pub fn cmd_delete(store: &Store, id: u64) {
    match store.delete_task(id) {
        Ok(true) => println!("Deleted task {}.", id),
        Ok(false) => {
            eprintln!("Task {} not found in store. Plan tasks are read-only seed data.", id);
            std::process::exit(1);
        }
        Err(e) => exit_store_error(e),
    }
}

/// Handle decision management commands.
pub fn cmd_decision(store: &Store, action: DecisionAction) {
    match action {
        DecisionAction::Add {
            title,
            assigned_to,
            due,
            desc,
            priority,
            impact,
            options,
        } => {
            let due = require_due(&due);
            let input = NewDecision {
                title,
                assigned_to,
                due: Some(due),
                description: desc,
                priority,
                impact,
                options: options
                    .into_iter()
                    .map(|option| DecisionOption {
                        option,
                        ..DecisionOption::default()
                    })
                    .collect(),
            };
            match store.add_decision(input) {
                Ok(decision) => println!("Added decision {}", decision.id),
                Err(e) => exit_store_error(e),
            }
        }

        DecisionAction::List => {
            let decisions = store.read().decisions;
            if decisions.is_empty() {
                println!("No decisions recorded.");
                return;
            }
            println!(
                "{:<6} {:<18} {:<9} {:<10} {:<16} {}",
                "ID", "Status", "Pri", "Due", "Assigned", "Title"
            );
            let today = Local::now().date_naive();
            for d in &decisions {
                println!(
                    "{:<6} {:<18} {:<9} {:<10} {:<16} {}",
                    d.id,
                    format_status(d.status),
                    format_priority(d.priority),
                    format_due_relative(d.due_date, today),
                    truncate(&d.assigned_to, 16),
                    d.title,
                );
            }
        }

        DecisionAction::View { id } => {
            let decisions = store.read().decisions;
            let Some(d) = decisions.iter().find(|d| d.id == id) else {
                eprintln!("Decision {} not found.", id);
                std::process::exit(1);
            };
            print_decision(d);
        }

        DecisionAction::Update {
            id,
            title,
            assigned_to,
            due,
            desc,
            priority,
            status,
            impact,
        } => {
            let due = due.map(|s| require_due(&s));
            let patch = DecisionPatch {
                title,
                assigned_to,
                due,
                description: desc,
                priority,
                status,
                impact,
            };
            match store.update_decision(id, patch) {
                Ok(Some(d)) => println!("Updated decision {}", d.id),
                Ok(None) => {
                    eprintln!("Decision {} not found.", id);
                    std::process::exit(1);
                }
                Err(e) => exit_store_error(e),
            }
        }

        DecisionAction::Delete { id } => match store.delete_decision(id) {
            Ok(true) => println!("Deleted decision {}.", id),
            Ok(false) => {
                eprintln!("Decision {} not found.", id);
                std::process::exit(1);
            }
            Err(e) => exit_store_error(e),
        },
    }
}

fn print_decision(d: &Decision) {
    let today = Local::now().date_naive();
    println!("ID:           {}", d.id);
    println!("Title:        {}", d.title);
    println!("Assigned to:  {}", d.assigned_to);
    println!("Status:       {}", format_status(d.status));
    println!("Priority:     {}", format_priority(d.priority));
    println!(
        "Due:          {} ({})",
        d.due_date,
        format_due_relative(d.due_date, today)
    );
    println!(
        "Impact:       {}",
        if d.impact.is_empty() { "-" } else { &d.impact }
    );
    println!(
        "Description:  {}",
        if d.description.is_empty() { "-" } else { &d.description }
    );
    if !d.options.is_empty() {
        println!("Options:");
        for opt in &d.options {
            println!("  - {}", opt.option);
            for p in &opt.pros {
                println!("      + {p}");
            }
            for c in &opt.cons {
                println!("      - {c}");
            }
        }
    }
}

/// Print the project summary: status counts, completion and urgent tasks.
pub fn cmd_summary(
    store: &Store,
    plan: Option<&Path>,
    window: i64,
    cap: usize,
    target_opening: Option<NaiveDate>,
) {
    let tasks = collect_tasks(store, plan, Source::All);
    let report = project_report(&tasks, window, cap, target_opening, Utc::now());
    let s = &report.summary;

    println!("Build-out summary");
    println!("  Total tasks:        {}", s.total);
    println!("  Completed:          {}", s.completed);
    println!("  In progress:        {}", s.in_progress);
    println!("  Not started:        {}", s.not_started);
    println!("  Awaiting decision:  {}", s.awaiting_decision);
    println!("  Progress:           {}%", s.progress);
    if let Some(opening) = report.target_opening {
        let today = Local::now().date_naive();
        println!(
            "  Target opening:     {} ({})",
            opening,
            format_due_relative(opening, today)
        );
    }
    if report.urgent_tasks.is_empty() {
        println!("\nNo urgent tasks inside a {window}-day window.");
    } else {
        println!("\nUrgent tasks ({window}-day window):");
        print_task_table(&report.urgent_tasks);
    }
}

/// Print the parsed markdown plan. Re-parses on every call.
pub fn cmd_plan(plan: Option<&Path>) {
    let Some(path) = plan else {
        eprintln!("No plan file given. Pass one with --plan.");
        std::process::exit(1);
    };
    let tasks = parse_plan_tasks(path);
    if tasks.is_empty() {
        println!("No action-item table found in {}.", path.display());
        return;
    }
    print_task_table(&tasks);
}

/// Print the contact directory.
pub fn cmd_contacts(contacts: &ContactDirectory) {
    if contacts.is_empty() {
        println!("No contacts configured. Pass a directory with --contacts.");
        return;
    }
    println!("{:<20} {:<18} {}", "Name", "Phone", "Role");
    for (name, contact) in contacts.iter() {
        println!(
            "{:<20} {:<18} {}",
            truncate(name, 20),
            contact.phone,
            contact.role
        );
    }
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}
