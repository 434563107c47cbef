//! Export/import documents
//!
//! Format:
//!
//! ```json
//! { "exportedAt": "2024-03-01T12:00:00Z", "habits": [ { "id": "...", "name": "...", "history": ["2024-03-01"] } ] }
//! ```
//!
//! Export always writes the full habit shape. Import checks an explicit
//! schema: a `habits` array whose records carry a non-empty name and a
//! list of valid dates. Stored `streak` and `done` values are not trusted;
//! they are recomputed for the importing day. Any bad record rejects the
//! whole document.

use crate::habits::error::SnapshotError;
use crate::habits::types::{Habit, HabitId};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Prefix of the suggested download name
pub const EXPORT_FILE_PREFIX: &str = "habit-tracker-backup-";

/// A full backup of the habit list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub exported_at: DateTime<Utc>,
    pub habits: Vec<Habit>,
}

/// Lenient view of one imported record, validated field by field
#[derive(Debug, Deserialize)]
struct HabitRecord {
    #[serde(default)]
    id: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    history: Option<Vec<String>>,
}

impl Snapshot {
    pub fn new(habits: Vec<Habit>, exported_at: DateTime<Utc>) -> Self {
        Self {
            exported_at,
            habits,
        }
    }

    /// Pretty-printed JSON document
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Suggested download name, e.g. `habit-tracker-backup-2024-03-01.json`
    pub fn file_name(&self) -> String {
        format!(
            "{}{}.json",
            EXPORT_FILE_PREFIX,
            self.exported_at.format("%Y-%m-%d")
        )
    }

    /// Validate an import document and return its habits, refreshed for `today`
    pub fn parse_habits(document: &str, today: NaiveDate) -> Result<Vec<Habit>, SnapshotError> {
        let value: serde_json::Value =
            serde_json::from_str(document).map_err(|e| SnapshotError::Malformed(e.to_string()))?;

        let object = value
            .as_object()
            .ok_or_else(|| SnapshotError::InvalidFormat("expected a JSON object".to_string()))?;

        let records = object
            .get("habits")
            .ok_or_else(|| SnapshotError::InvalidFormat("missing habits field".to_string()))?
            .as_array()
            .ok_or_else(|| SnapshotError::InvalidFormat("habits must be an array".to_string()))?;

        let mut seen = HashSet::new();
        let mut habits = Vec::with_capacity(records.len());

        for (index, raw) in records.iter().enumerate() {
            let habit = validate_record(index, raw, today)?;
            if !seen.insert(habit.id.clone()) {
                return Err(SnapshotError::DuplicateId(habit.id.to_string()));
            }
            habits.push(habit);
        }

        Ok(habits)
    }
}

fn validate_record(
    index: usize,
    raw: &serde_json::Value,
    today: NaiveDate,
) -> Result<Habit, SnapshotError> {
    let invalid = |reason: String| SnapshotError::InvalidHabit { index, reason };

    if !raw.is_object() {
        return Err(invalid("expected an object".to_string()));
    }

    let record: HabitRecord =
        serde_json::from_value(raw.clone()).map_err(|e| invalid(e.to_string()))?;

    let id = parse_id(record.id).map_err(|other| invalid(format!("unusable id {other}")))?;

    let name = record
        .name
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .ok_or_else(|| invalid("name must be non-empty text".to_string()))?
        .to_string();

    let history = record
        .history
        .unwrap_or_default()
        .iter()
        .map(|d| {
            d.parse::<NaiveDate>()
                .map_err(|_| invalid(format!("invalid date {d:?} in history")))
        })
        .collect::<Result<BTreeSet<_>, _>>()?;

    let mut habit = Habit {
        id,
        name,
        streak: 0,
        history,
        done: false,
    };
    habit.refresh(today);
    Ok(habit)
}

/// Missing ids are generated; anything but a non-blank string or a
/// number is handed back as unusable
fn parse_id(id: Option<serde_json::Value>) -> Result<HabitId, serde_json::Value> {
    match id {
        None | Some(serde_json::Value::Null) => Ok(HabitId::generate()),
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Ok(HabitId::from(s)),
        Some(serde_json::Value::Number(n)) => Ok(HabitId::from(n.to_string())),
        Some(other) => Err(other),
    }
}

/// Salvage a stored habit list
///
/// Unlike an import, a stored list is never rejected as a whole. Records
/// in the stored shape load unchanged. Others keep whatever survives (a
/// non-blank name, the parseable dates) with derived fields recomputed,
/// and are skipped when there is no name. Repeated ids keep the first.
pub(crate) fn recover_stored(value: serde_json::Value, today: NaiveDate) -> Vec<Habit> {
    let serde_json::Value::Array(records) = value else {
        tracing::warn!("Stored habit list is not an array, starting empty");
        return Vec::new();
    };

    let mut seen = HashSet::new();
    let mut habits = Vec::with_capacity(records.len());
    for (index, raw) in records.into_iter().enumerate() {
        let Some(habit) = recover_record(index, raw, today) else {
            continue;
        };
        if !seen.insert(habit.id.clone()) {
            tracing::warn!(index, habit = %habit.id, "Skipping stored habit with repeated id");
            continue;
        }
        habits.push(habit);
    }
    habits
}

fn recover_record(index: usize, raw: serde_json::Value, today: NaiveDate) -> Option<Habit> {
    let problem = match serde_json::from_value::<Habit>(raw.clone()) {
        Ok(habit) => return Some(habit),
        Err(e) => e,
    };

    let record = match serde_json::from_value::<HabitRecord>(raw) {
        Ok(record) => record,
        Err(e) => {
            tracing::warn!(index, "Skipping unreadable stored habit: {}", e);
            return None;
        }
    };

    let Some(name) = record.name.as_deref().map(str::trim).filter(|n| !n.is_empty()) else {
        tracing::warn!(index, "Skipping stored habit without a name");
        return None;
    };

    let history = record
        .history
        .unwrap_or_default()
        .iter()
        .filter_map(|d| d.parse::<NaiveDate>().ok())
        .collect();

    let mut habit = Habit {
        id: parse_id(record.id).unwrap_or_else(|_| HabitId::generate()),
        name: name.to_string(),
        streak: 0,
        history,
        done: false,
    };
    habit.refresh(today);

    tracing::warn!(index, habit = %habit.id, "Repaired stored habit: {}", problem);
    Some(habit)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let habits = vec![
            Habit::new("Read").with_history(
                ["2024-02-28", "2024-02-29", "2024-03-01"]
                    .iter()
                    .map(|d| d.parse().unwrap()),
                today(),
            ),
            Habit::new("Run"),
        ];

        let snapshot = Snapshot::new(habits.clone(), Utc::now());
        let document = snapshot.to_json().unwrap();
        let imported = Snapshot::parse_habits(&document, today()).unwrap();

        assert_eq!(imported, habits);
    }

    #[test]
    fn test_empty_habits_is_valid() {
        let imported = Snapshot::parse_habits(r#"{"habits": []}"#, today()).unwrap();
        assert!(imported.is_empty());
    }

    #[test]
    fn test_missing_habits_field() {
        let err = Snapshot::parse_habits("{}", today()).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat(_)));
        assert_eq!(err.to_string(), "Invalid file: missing habits field");
    }

    #[test]
    fn test_not_json() {
        let err = Snapshot::parse_habits("habits: yes", today()).unwrap_err();
        assert!(matches!(err, SnapshotError::Malformed(_)));
    }

    #[test]
    fn test_habits_not_an_array() {
        let err = Snapshot::parse_habits(r#"{"habits": {"a": 1}}"#, today()).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidFormat(_)));
    }

    #[test]
    fn test_rejects_blank_name() {
        let err =
            Snapshot::parse_habits(r#"{"habits": [{"id": "a", "name": "   "}]}"#, today())
                .unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidHabit { index: 0, .. }));
    }

    #[test]
    fn test_rejects_bad_date() {
        let doc = r#"{"habits": [{"id": "a", "name": "Ok"}, {"id": "b", "name": "Bad", "history": ["2024-13-01"]}]}"#;
        let err = Snapshot::parse_habits(doc, today()).unwrap_err();
        assert!(matches!(err, SnapshotError::InvalidHabit { index: 1, .. }));
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let doc = r#"{"habits": [{"id": "a", "name": "One"}, {"id": "a", "name": "Two"}]}"#;
        let err = Snapshot::parse_habits(doc, today()).unwrap_err();
        assert!(matches!(err, SnapshotError::DuplicateId(id) if id == "a"));
    }

    #[test]
    fn test_recomputes_derived_fields() {
        // Stale streak/done values from another day are not trusted
        let doc = r#"{"exportedAt": "2024-01-01T00:00:00Z", "habits": [
            {"id": 17, "name": " Walk ", "streak": 99, "done": true, "history": ["2024-02-29", "2024-02-29"]}
        ]}"#;
        let habits = Snapshot::parse_habits(doc, today()).unwrap();

        assert_eq!(habits.len(), 1);
        assert_eq!(habits[0].id.as_str(), "17");
        assert_eq!(habits[0].name, "Walk");
        assert_eq!(habits[0].streak, 0);
        assert!(!habits[0].done);
        assert_eq!(habits[0].total_completions(), 1);
    }

    #[test]
    fn test_missing_id_is_generated() {
        let habits =
            Snapshot::parse_habits(r#"{"habits": [{"name": "Floss"}]}"#, today()).unwrap();
        assert!(!habits[0].id.as_str().is_empty());
    }

    #[test]
    fn test_file_name() {
        let exported_at = "2024-03-01T23:10:00Z".parse().unwrap();
        let snapshot = Snapshot::new(vec![], exported_at);
        assert_eq!(snapshot.file_name(), "habit-tracker-backup-2024-03-01.json");

        let json: serde_json::Value = serde_json::from_str(&snapshot.to_json().unwrap()).unwrap();
        assert!(json.get("exportedAt").is_some());
        assert_eq!(json["habits"], serde_json::json!([]));
    }

    #[test]
    fn test_recover_stored_keeps_good_records() {
        let stored = serde_json::json!([
            {"id": "good", "name": "Read", "streak": 4, "history": ["2024-02-29"], "done": false},
            {"id": "bad-date", "name": "Run", "history": ["2024-02-30", "2024-03-01"]},
            {"id": "nameless", "history": ["2024-03-01"]},
            {"id": "good", "name": "Copy"},
            "not a habit"
        ]);
        let habits = recover_stored(stored, today());

        assert_eq!(habits.len(), 2);
        // Well-formed records are left exactly as stored
        assert_eq!(habits[0].id.as_str(), "good");
        assert_eq!(habits[0].streak, 4);

        assert_eq!(habits[1].id.as_str(), "bad-date");
        assert_eq!(habits[1].total_completions(), 1);
        assert!(habits[1].done);
        assert_eq!(habits[1].streak, 1);
    }

    #[test]
    fn test_recover_stored_non_array() {
        assert!(recover_stored(serde_json::json!({"habits": []}), today()).is_empty());
    }
}
