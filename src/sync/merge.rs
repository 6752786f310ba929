//! The reconciler: combines a local and a remote document into one
//! merged document that is safe to adopt as the new source of truth on
//! both sides.
//!
//! Plans merge whole-record last-writer-wins on `updated_at`; logs merge
//! as an append-only set keyed by `(date, exercise, ts)`. There is no
//! version vector: two sessions syncing concurrently can race, and a
//! later sync from either side recovers lost log entries (but not a
//! losing plan edit).

use chrono::Utc;
use std::collections::HashMap;

use crate::models::plan::now_stamp;
use crate::models::{Document, LogEntry, LogKey};

/// Merges `local` and `remote` into one document. Pure: inputs are
/// normalized copies, never mutated, and the same inputs always produce
/// the byte-identical result.
///
/// A caller with no remote document passes `Document::new()`; absence is
/// never an error here.
pub fn merge(local: &Document, remote: &Document) -> Document {
    // One captured clock for both sides: the same legacy record held
    // locally and remotely must backfill to the same identity key even
    // when the two normalizations straddle a second boundary.
    let stamp = now_stamp();
    let epoch = Utc::now().timestamp();
    let local = local.normalized_at(&stamp, epoch);
    let remote = remote.normalized_at(&stamp, epoch);

    // Plans: union of names. Both sides present -> lexicographically
    // greater updated_at wins in full; exact tie -> local. Plans are
    // edited holistically, so no field-level merging.
    let mut plans = remote.plans.clone();
    for (name, local_plan) in local.plans {
        match plans.get(&name) {
            Some(remote_plan) if remote_plan.updated_at > local_plan.updated_at => {}
            _ => {
                plans.insert(name, local_plan);
            }
        }
    }

    // Logs: remote inserted first, local second, so an identity collision
    // keeps the local copy. A session that re-logged a slot must not have
    // its edit discarded by an older remote copy of the same key.
    let mut by_key: HashMap<LogKey, LogEntry> = HashMap::new();
    for entry in remote.logs.into_iter().chain(local.logs) {
        by_key.insert(entry.key(), entry);
    }

    let mut logs: Vec<LogEntry> = by_key.into_values().collect();
    logs.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then(b.ts.cmp(&a.ts))
            .then_with(|| a.exercise.cmp(&b.exercise))
    });

    Document { plans, logs }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Plan;
    use chrono::NaiveDate;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn plan_at(name: &str, updated_at: &str) -> Plan {
        let mut plan = Plan::new(name, date("2024-01-01"));
        plan.updated_at = updated_at.to_string();
        plan
    }

    fn entry(day: &str, exercise: &str, ts: i64, reps: u32) -> LogEntry {
        let mut e = LogEntry::new(date(day), "Plan", exercise, 100.0, reps, 3);
        e.ts = ts;
        e
    }

    fn doc(plans: Vec<Plan>, logs: Vec<LogEntry>) -> Document {
        let mut d = Document::new();
        for p in plans {
            d.upsert_plan(p);
        }
        d.logs = logs;
        d
    }

    #[test]
    fn test_merge_with_self_is_normalize() {
        let d = doc(
            vec![plan_at("A", "2024-01-02T00:00:00Z")],
            vec![entry("2024-01-01", "squat", 100, 5)],
        );
        assert_eq!(merge(&d, &d), d.normalized());
    }

    #[test]
    fn test_disjoint_logs_commute() {
        let a = doc(vec![], vec![entry("2024-01-01", "squat", 100, 5)]);
        let b = doc(vec![], vec![entry("2024-01-02", "bench press", 200, 8)]);

        let ab = merge(&a, &b);
        let ba = merge(&b, &a);
        assert_eq!(ab.logs, ba.logs);
        assert_eq!(ab.logs.len(), 2);
    }

    #[test]
    fn test_log_identity_collision_keeps_local() {
        let local = doc(vec![], vec![entry("2024-01-01", "squat", 100, 5)]);
        let remote = doc(vec![], vec![entry("2024-01-01", "squat", 100, 8)]);

        let merged = merge(&local, &remote);
        assert_eq!(merged.logs.len(), 1);
        assert_eq!(merged.logs[0].reps, 5);
    }

    #[test]
    fn test_legacy_entry_on_both_sides_backfills_to_one_identity() {
        // A pre-schema entry (ts missing) held locally and fetched
        // remotely is the same record; both sides must backfill to the
        // same key so it dedups to one copy.
        let legacy = doc(vec![], vec![entry("2024-01-01", "squat", 0, 5)]);

        let merged = merge(&legacy, &legacy.clone());
        assert_eq!(merged.logs.len(), 1);
        assert!(merged.logs[0].ts > 0);
    }

    #[test]
    fn test_relogged_slot_keeps_both_identities() {
        // Editing a set reassigns ts, so the old identity survives unless
        // the caller filtered it out before merging.
        let local = doc(vec![], vec![entry("2024-01-01", "squat", 200, 8)]);
        let remote = doc(vec![], vec![entry("2024-01-01", "squat", 100, 5)]);

        let merged = merge(&local, &remote);
        assert_eq!(merged.logs.len(), 2);
    }

    #[test]
    fn test_plan_last_writer_wins() {
        let local = doc(vec![plan_at("A", "2024-01-02T00:00:00Z")], vec![]);
        let remote = doc(vec![plan_at("A", "2024-01-01T00:00:00Z")], vec![]);

        let merged = merge(&local, &remote);
        assert_eq!(merged.plans["A"], local.plans["A"]);

        // and the other way around
        let merged = merge(&remote, &local);
        assert_eq!(merged.plans["A"], local.plans["A"]);
    }

    #[test]
    fn test_plan_tie_goes_to_local() {
        let mut local_plan = plan_at("A", "2024-01-01T00:00:00Z");
        local_plan.num_weeks = Some(6);
        let remote_plan = plan_at("A", "2024-01-01T00:00:00Z");

        let merged = merge(&doc(vec![local_plan.clone()], vec![]), &doc(vec![remote_plan], vec![]));
        assert_eq!(merged.plans["A"], local_plan);
    }

    #[test]
    fn test_union_of_disjoint_plans() {
        let local = doc(vec![plan_at("Push", "2024-01-01T00:00:00Z")], vec![]);
        let remote = doc(vec![plan_at("Pull", "2024-01-01T00:00:00Z")], vec![]);

        let merged = merge(&local, &remote);
        assert_eq!(merged.plans.len(), 2);
        assert_eq!(merged.plans["Push"], local.plans["Push"]);
        assert_eq!(merged.plans["Pull"], remote.plans["Pull"]);
    }

    #[test]
    fn test_empty_remote_preserves_local() {
        let local = doc(
            vec![plan_at("Push", "2024-01-01T00:00:00Z")],
            vec![entry("2024-01-01", "squat", 100, 5)],
        );
        let merged = merge(&local, &Document::new());
        assert_eq!(merged, local.normalized());
    }

    #[test]
    fn test_logs_sorted_date_asc_then_ts_desc() {
        let local = doc(
            vec![],
            vec![
                entry("2024-01-02", "squat", 100, 5),
                entry("2024-01-01", "squat", 300, 5),
            ],
        );
        let remote = doc(
            vec![],
            vec![
                entry("2024-01-01", "squat", 100, 5),
                entry("2024-01-01", "bench press", 200, 5),
            ],
        );

        let merged = merge(&local, &remote);
        let keys: Vec<(String, i64)> = merged
            .logs
            .iter()
            .map(|e| (e.date.to_string(), e.ts))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("2024-01-01".to_string(), 300),
                ("2024-01-01".to_string(), 200),
                ("2024-01-01".to_string(), 100),
                ("2024-01-02".to_string(), 100),
            ]
        );
    }

    #[test]
    fn test_merge_is_deterministic() {
        let local = doc(
            vec![plan_at("A", "2024-01-02T00:00:00Z")],
            vec![
                entry("2024-01-01", "squat", 100, 5),
                entry("2024-01-01", "bench press", 100, 8),
            ],
        );
        let remote = doc(
            vec![plan_at("B", "2024-01-01T00:00:00Z")],
            vec![entry("2024-01-01", "deadlift", 100, 3)],
        );

        let first = merge(&local, &remote);
        let second = merge(&local, &remote);
        assert_eq!(first.to_bytes().unwrap(), second.to_bytes().unwrap());
    }

    #[test]
    fn test_merge_does_not_mutate_inputs() {
        let local = doc(vec![plan_at("A", "2024-01-02T00:00:00Z")], vec![]);
        let remote = doc(vec![plan_at("A", "2024-01-01T00:00:00Z")], vec![]);
        let local_before = local.clone();
        let remote_before = remote.clone();

        let _ = merge(&local, &remote);
        assert_eq!(local, local_before);
        assert_eq!(remote, remote_before);
    }
}
