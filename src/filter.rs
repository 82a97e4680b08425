// View filtering for the task collection

use crate::error::ValidationError;
use crate::models::Task;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// View selector over the task collection. Never mutates the underlying data.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Pending,
    Completed,
}

impl Filter {
    pub fn matches(self, task: &Task) -> bool {
        match self {
            Filter::All => true,
            Filter::Pending => !task.completed,
            Filter::Completed => task.completed,
        }
    }

    /// Subsequence of `tasks` that passes this filter, in the original order
    pub fn apply(self, tasks: &[Task]) -> Vec<Task> {
        tasks.iter().filter(|t| self.matches(t)).cloned().collect()
    }
}

impl std::fmt::Display for Filter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Filter::All => write!(f, "all"),
            Filter::Pending => write!(f, "pending"),
            Filter::Completed => write!(f, "completed"),
        }
    }
}

impl FromStr for Filter {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(Filter::All),
            "pending" => Ok(Filter::Pending),
            "completed" => Ok(Filter::Completed),
            _ => Err(ValidationError::UnknownFilter(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Priority;

    fn sample() -> Vec<Task> {
        let mut done = Task::new(2, "done", Priority::High);
        done.completed = true;
        vec![
            Task::new(1, "first", Priority::Low),
            done,
            Task::new(3, "third", Priority::Medium),
        ]
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("all".parse::<Filter>().unwrap(), Filter::All);
        assert_eq!("Pending".parse::<Filter>().unwrap(), Filter::Pending);
        assert_eq!(" completed\n".parse::<Filter>().unwrap(), Filter::Completed);
        assert_eq!(
            "done".parse::<Filter>(),
            Err(ValidationError::UnknownFilter("done".to_string()))
        );
    }

    #[test]
    fn test_filter_display() {
        assert_eq!(Filter::All.to_string(), "all");
        assert_eq!(Filter::Pending.to_string(), "pending");
        assert_eq!(Filter::Completed.to_string(), "completed");
    }

    #[test]
    fn test_filter_apply_preserves_order() {
        let tasks = sample();

        let all = Filter::All.apply(&tasks);
        assert_eq!(all, tasks);

        let pending: Vec<i64> = Filter::Pending.apply(&tasks).iter().map(|t| t.id).collect();
        assert_eq!(pending, vec![1, 3]);

        let completed: Vec<i64> = Filter::Completed.apply(&tasks).iter().map(|t| t.id).collect();
        assert_eq!(completed, vec![2]);
    }
}
