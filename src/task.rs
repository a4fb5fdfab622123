//! Task and decision data structures.
//!
//! This module defines the core `Task` record representing a unit of
//! construction work, and the `Decision` record for pending choices that
//! block progress. Both serialize with camelCase field names to match the
//! on-disk store document.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::fields::{Priority, Status};

/// A unit of construction work.
///
/// Tasks come from two places: the markdown plan (read-only seed data,
/// ids 1..n in file order) and the flat-file store (user-added, ids from
/// 1001 up so the two ranges never collide in merged listings).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: u64,
    pub title: String,
    /// Contractor or person(s) responsible. May name several people joined
    /// by `+`, `&` or `,`.
    pub owner: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    pub category: String,
    /// Completion estimate, 0..=100.
    pub progress: u8,
    #[serde(default)]
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One candidate answer to a pending decision.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DecisionOption {
    pub option: String,
    #[serde(default)]
    pub pros: Vec<String>,
    #[serde(default)]
    pub cons: Vec<String>,
}

/// A pending choice blocking progress on the build-out.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Decision {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub assigned_to: String,
    pub due_date: NaiveDate,
    pub priority: Priority,
    pub status: Status,
    #[serde(default)]
    pub options: Vec<DecisionOption>,
    #[serde(default)]
    pub impact: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
