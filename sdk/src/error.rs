//! SDK error types.
//!
//! Provides error types for the shared data model.

/// SDK errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SdkError {
    /// Gender code outside 1..=3.
    #[error("invalid gender code: {0}")]
    InvalidGender(u8),

    /// Identifier could not be parsed.
    #[error("invalid identifier: {0}")]
    InvalidId(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = SdkError::InvalidGender(7);
        assert_eq!(err.to_string(), "invalid gender code: 7");
    }

    #[test]
    fn test_error_invalid_id() {
        let err = SdkError::InvalidId("abc".to_string());
        assert_eq!(err.to_string(), "invalid identifier: abc");
    }
}
