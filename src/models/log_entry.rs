use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One completed exercise record.
///
/// `ts` is assigned once at creation and never modified afterwards; it is
/// part of the entry's identity. Editing a set from the CLI replaces the
/// entry with a fresh `ts`, which is a new identity, not an update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub date: NaiveDate,
    #[serde(default)]
    pub plan: String,
    pub exercise: String,
    pub weight: f64,
    pub reps: u32,
    pub sets: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpe: Option<u8>,
    /// weight × reps × sets, stored redundantly for display.
    pub volume: f64,
    /// Identity timestamp, epoch seconds. Zero on records written before
    /// it existed; backfilled by `Document::normalized` before any merge.
    #[serde(default)]
    pub ts: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_ts: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<f64>,
}

/// Identity key distinguishing one log entry from another during merge
/// deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LogKey {
    pub date: NaiveDate,
    pub exercise: String,
    pub ts: i64,
}

impl LogEntry {
    pub fn new(
        date: NaiveDate,
        plan: impl Into<String>,
        exercise: impl Into<String>,
        weight: f64,
        reps: u32,
        sets: u32,
    ) -> Self {
        Self {
            date,
            plan: plan.into(),
            exercise: exercise.into(),
            weight,
            reps,
            sets,
            rpe: None,
            volume: weight * reps as f64 * sets as f64,
            ts: Utc::now().timestamp(),
            start_ts: None,
            end_ts: None,
            duration_min: None,
        }
    }

    pub fn with_rpe(mut self, rpe: u8) -> Self {
        self.rpe = Some(rpe);
        self
    }

    /// The `(date, exercise, ts)` identity key.
    pub fn key(&self) -> LogKey {
        LogKey {
            date: self.date,
            exercise: self.exercise.clone(),
            ts: self.ts,
        }
    }
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}  {:<24} {:>6} x {} x {}  (vol {})",
            self.date, self.exercise, self.weight, self.reps, self.sets, self.volume
        )?;
        if let Some(rpe) = self.rpe {
            write!(f, "  @{}", rpe)?;
        }
        Ok(())
    }
}
