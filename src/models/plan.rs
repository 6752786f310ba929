use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Timestamp format for `updated_at`: ISO-8601 UTC, second precision.
///
/// Stored as a string so that last-writer-wins comparisons are plain
/// lexicographic comparisons, which order correctly for this format.
pub const UPDATED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Returns the current wall-clock time formatted for `updated_at`.
pub fn now_stamp() -> String {
    Utc::now().format(UPDATED_AT_FORMAT).to_string()
}

/// One training schedule: a date-keyed list of exercises materialized
/// from a weekly template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    /// Plan name. Also the key in `Document::plans`; kept consistent by
    /// `Document::upsert_plan`.
    pub name: String,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_weeks: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub num_days: Option<u32>,
    /// ISO date -> ordered exercise identifiers. Older files used the
    /// key `workouts` for this field.
    #[serde(default, alias = "workouts")]
    pub schedule: BTreeMap<String, Vec<String>>,
    /// Last-edit timestamp, empty on records written before it existed.
    /// Backfilled by `Document::normalized` before any merge.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub updated_at: String,
}

impl Plan {
    pub fn new(name: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            name: name.into(),
            start_date,
            num_weeks: None,
            num_days: None,
            schedule: BTreeMap::new(),
            updated_at: now_stamp(),
        }
    }

    /// Stamps the plan with the current time. Called on every edit so
    /// `updated_at` is monotonically non-decreasing.
    pub fn touch(&mut self) {
        self.updated_at = now_stamp();
    }

    /// Total number of scheduled days (days with at least one exercise).
    pub fn scheduled_days(&self) -> usize {
        self.schedule.len()
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.len()))?;
        writeln!(f, "Start date: {}", self.start_date)?;
        if let Some(weeks) = self.num_weeks {
            writeln!(f, "Duration:   {} week(s)", weeks)?;
        } else if let Some(days) = self.num_days {
            writeln!(f, "Duration:   {} day(s)", days)?;
        }
        if !self.schedule.is_empty() {
            writeln!(f, "\nSchedule:")?;
            for (date, exercises) in &self.schedule {
                writeln!(f, "  {}  {}", date, exercises.join(", "))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 6).unwrap()
    }

    #[test]
    fn test_new_plan_is_stamped() {
        let plan = Plan::new("Push Pull Legs", start());
        assert_eq!(plan.name, "Push Pull Legs");
        assert!(!plan.updated_at.is_empty());
        assert!(plan.schedule.is_empty());
    }

    #[test]
    fn test_updated_at_format_compares_lexicographically() {
        assert!("2024-01-02T00:00:00Z" > "2024-01-01T23:59:59Z");
        assert!("2024-12-31T00:00:00Z" < "2025-01-01T00:00:00Z");
    }

    #[test]
    fn test_json_roundtrip() {
        let mut plan = Plan::new("Upper", start());
        plan.num_weeks = Some(4);
        plan.schedule
            .insert("2025-01-06".to_string(), vec!["bench press".to_string()]);

        let json = serde_json::to_string(&plan).unwrap();
        let parsed: Plan = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, plan);
    }

    #[test]
    fn test_workouts_alias_accepted() {
        let json = r#"{
            "name": "Legacy",
            "start_date": "2024-06-01",
            "workouts": {"2024-06-01": ["squat"]}
        }"#;
        let plan: Plan = serde_json::from_str(json).unwrap();
        assert_eq!(plan.schedule["2024-06-01"], vec!["squat".to_string()]);
        assert!(plan.updated_at.is_empty());
    }

    #[test]
    fn test_empty_updated_at_not_serialized() {
        let mut plan = Plan::new("Bare", start());
        plan.updated_at = String::new();
        let json = serde_json::to_string(&plan).unwrap();
        assert!(!json.contains("updated_at"));
    }

    #[test]
    fn test_display_lists_schedule() {
        let mut plan = Plan::new("Push", start());
        plan.schedule.insert(
            "2025-01-06".to_string(),
            vec!["bench press".to_string(), "dips".to_string()],
        );
        let output = format!("{}", plan);
        assert!(output.contains("Push"));
        assert!(output.contains("bench press, dips"));
    }
}
