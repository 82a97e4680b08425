// Data models for the task list

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use std::str::FromStr;

/// A single user-created to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "integral_id")]
    pub id: i64,
    pub text: String,
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Build a fresh, incomplete task stamped with the current time
    pub fn new(id: i64, text: impl Into<String>, priority: Priority) -> Self {
        Self {
            id,
            text: text.into(),
            priority,
            completed: false,
            created_at: Utc::now(),
        }
    }
}

/// Ids written as `1.0` are the same id as `1`
fn integral_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(id) = n.as_i64() {
        return Ok(id);
    }

    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(D::Error::custom(format!("task id is not an integer: {}", n))),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Sort rank: high(0) < medium(1) < low(2)
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Priority::High),
            "medium" => Ok(Priority::Medium),
            "low" => Ok(Priority::Low),
            _ => Err(ValidationError::UnknownPriority(s.to_string())),
        }
    }
}

/// Aggregate counts over the whole collection, ignoring the active filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
}

impl Stats {
    pub fn from_tasks(tasks: &[Task]) -> Self {
        let total = tasks.len();
        let completed = tasks.iter().filter(|t| t.completed).count();
        Self {
            total,
            completed,
            pending: total - completed,
        }
    }
}

/// Helper function to get current timestamp in milliseconds
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_now_ms() {
        let ts = now_ms();
        // Should be reasonable timestamp (after year 2020)
        assert!(ts > 1_600_000_000_000);
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");

        let p: Priority = serde_json::from_str("\"medium\"").unwrap();
        assert_eq!(p, Priority::Medium);
    }

    #[test]
    fn test_priority_rank_order() {
        assert!(Priority::High.rank() < Priority::Medium.rank());
        assert!(Priority::Medium.rank() < Priority::Low.rank());
        assert_eq!(Priority::default(), Priority::Medium);
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("high".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" LOW ".parse::<Priority>().unwrap(), Priority::Low);
        assert!(matches!(
            "urgent".parse::<Priority>(),
            Err(ValidationError::UnknownPriority(_))
        ));
    }

    #[test]
    fn test_task_serialization_uses_camel_case() {
        let task = Task {
            id: 1,
            text: "Old task".to_string(),
            priority: Priority::High,
            completed: false,
            created_at: "2020-01-01T00:00:00Z".parse().unwrap(),
        };

        let json = serde_json::to_string(&task).unwrap();
        assert!(json.contains("\"createdAt\":\"2020-01-01T00:00:00Z\""));
        assert!(json.contains("\"priority\":\"high\""));

        let back: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
    }

    #[test]
    fn test_task_accepts_millisecond_timestamps() {
        let json = r#"{"id":5,"text":"x","priority":"low","completed":true,"createdAt":"2024-03-05T10:20:30.123Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.created_at.timestamp_subsec_millis(), 123);
        assert!(task.completed);
    }

    #[test]
    fn test_task_missing_completed_defaults_to_false() {
        let json = r#"{"id":1,"text":"Legacy","priority":"low","createdAt":"2020-01-01T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(!task.completed);
        assert_eq!(task.text, "Legacy");
    }

    #[test]
    fn test_task_accepts_integral_float_id() {
        let json = r#"{"id":1.0,"text":"x","priority":"high","completed":false,"createdAt":"2020-01-01T00:00:00Z"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.id, 1);

        let json = r#"{"id":1.5,"text":"x","priority":"high","completed":false,"createdAt":"2020-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());

        let json = r#"{"id":"1","text":"x","priority":"high","completed":false,"createdAt":"2020-01-01T00:00:00Z"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn test_stats_from_tasks() {
        let mut a = Task::new(1, "a", Priority::High);
        let b = Task::new(2, "b", Priority::Low);
        a.completed = true;

        let stats = Stats::from_tasks(&[a, b]);
        assert_eq!(
            stats,
            Stats {
                total: 2,
                completed: 1,
                pending: 1
            }
        );
        assert_eq!(Stats::from_tasks(&[]), Stats::default());
    }
}
