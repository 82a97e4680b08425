// Errors surfaced to callers of the task store

/// Rejected user input. The store is left unchanged whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Task text cannot be empty")]
    EmptyText,

    #[error("Task text too long: {len} chars (max {max})")]
    TextTooLong { len: usize, max: usize },

    #[error("Unknown filter: {0} (expected all, pending or completed)")]
    UnknownFilter(String),

    #[error("Unknown priority: {0} (expected high, medium or low)")]
    UnknownPriority(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        assert_eq!(ValidationError::EmptyText.to_string(), "Task text cannot be empty");
        assert_eq!(
            ValidationError::TextTooLong { len: 12, max: 10 }.to_string(),
            "Task text too long: 12 chars (max 10)"
        );
        assert!(
            ValidationError::UnknownFilter("done".to_string())
                .to_string()
                .contains("done")
        );
    }
}
