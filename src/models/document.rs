use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::log_entry::LogEntry;
use super::plan::{now_stamp, Plan};

/// The full persisted unit for one user: plans keyed by name plus an
/// append-biased sequence of log entries.
///
/// A Document is always fully present: absent `plans`/`logs` in stored
/// JSON deserialize to empty collections, never to null.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub plans: BTreeMap<String, Plan>,
    #[serde(default)]
    pub logs: Vec<LogEntry>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a plan, keyed by its own name so the map key
    /// and `Plan::name` cannot drift apart.
    pub fn upsert_plan(&mut self, plan: Plan) {
        self.plans.insert(plan.name.clone(), plan);
    }

    /// Returns a copy with every record carrying a comparable timestamp:
    /// plans missing `updated_at` get the current wall-clock time, log
    /// entries missing `ts` get the current epoch seconds.
    ///
    /// Records created under the current schema always have both, so this
    /// only touches legacy or defensively-constructed data. Idempotent:
    /// present values are never overwritten, and nothing is reordered.
    pub fn normalized(&self) -> Document {
        self.normalized_at(&now_stamp(), Utc::now().timestamp())
    }

    /// Like [`Document::normalized`], backfilling with the given stamp and
    /// epoch instead of reading the clock. The merge normalizes both of
    /// its inputs with one captured pair so the same legacy record held on
    /// both sides acquires the same identity key.
    pub fn normalized_at(&self, stamp: &str, epoch: i64) -> Document {
        let mut doc = self.clone();
        for plan in doc.plans.values_mut() {
            if plan.updated_at.is_empty() {
                plan.updated_at = stamp.to_string();
            }
        }
        for entry in &mut doc.logs {
            if entry.ts == 0 {
                entry.ts = epoch;
            }
        }
        doc
    }

    /// Parses a Document from stored bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Document, serde_json::Error> {
        serde_json::from_slice(bytes)
    }

    /// Encodes the Document to its UTF-8 JSON wire form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}
