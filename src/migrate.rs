// Load-time upgrades for records saved by older versions

use crate::models::Priority;
use serde_json::Value;

const PRIORITY_FIELD: &str = "priority";

/// Backfill `priority` on records that predate the field
///
/// A record whose priority is absent, falsy (`null`, `false`, `0`, `""`) or not a known
/// level gets the default. Nothing else on the record is touched. Returns the number of
/// records patched.
pub fn fill_missing_priority(records: &mut [Value]) -> usize {
    let mut patched = 0;

    for record in records.iter_mut() {
        let Some(obj) = record.as_object_mut() else {
            continue;
        };

        let known = obj
            .get(PRIORITY_FIELD)
            .and_then(Value::as_str)
            .is_some_and(|s| matches!(s, "high" | "medium" | "low"));

        if !known {
            obj.insert(
                PRIORITY_FIELD.to_string(),
                Value::String(Priority::Medium.as_str().to_string()),
            );
            patched += 1;
        }
    }

    patched
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_priority_becomes_medium() {
        let mut records = vec![json!({
            "id": 1,
            "text": "Old task",
            "completed": false,
            "createdAt": "2020-01-01T00:00:00Z"
        })];

        assert_eq!(fill_missing_priority(&mut records), 1);
        assert_eq!(records[0]["priority"], "medium");
        // Other fields untouched
        assert_eq!(records[0]["text"], "Old task");
        assert_eq!(records[0]["id"], 1);
        assert_eq!(records[0]["completed"], false);
        assert_eq!(records[0]["createdAt"], "2020-01-01T00:00:00Z");
    }

    #[test]
    fn test_existing_priority_is_kept() {
        let mut records = vec![json!({"id": 1, "priority": "high"}), json!({"id": 2, "priority": "low"})];

        assert_eq!(fill_missing_priority(&mut records), 0);
        assert_eq!(records[0]["priority"], "high");
        assert_eq!(records[1]["priority"], "low");
    }

    #[test]
    fn test_falsy_and_unknown_priorities() {
        let mut records = vec![
            json!({"priority": null}),
            json!({"priority": ""}),
            json!({"priority": false}),
            json!({"priority": 0}),
            json!({"priority": "urgent"}),
        ];

        assert_eq!(fill_missing_priority(&mut records), 5);
        assert!(records.iter().all(|r| r["priority"] == "medium"));
    }

    #[test]
    fn test_does_not_revalidate_other_fields() {
        let mut records = vec![json!({"id": 7, "text": "", "completed": true})];

        fill_missing_priority(&mut records);
        assert_eq!(records[0]["text"], "");
        assert_eq!(records[0]["completed"], true);
    }

    #[test]
    fn test_non_objects_are_skipped() {
        let mut records = vec![json!(42), json!("text")];
        assert_eq!(fill_missing_priority(&mut records), 0);
        assert_eq!(records[0], json!(42));
    }
}
