//! Validation Traits
//!
//! Common validation patterns extracted from route handlers.

use crate::error::{ApiError, ApiResult};

/// Trait for validating non-empty strings.
///
/// # Example
/// ```ignore
/// use casefile_api::validation::ValidateNonEmpty;
///
/// fn visit(location_id: &str) -> ApiResult<()> {
///     location_id.validate_non_empty("location_id")?;
///     // ... rest of logic
/// }
/// ```
pub trait ValidateNonEmpty {
    /// Validate that the value is non-empty.
    ///
    /// # Errors
    /// Returns `ApiError::missing_field` if the value is empty or whitespace-only.
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()>;
}

impl ValidateNonEmpty for str {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        if self.trim().is_empty() {
            return Err(ApiError::missing_field(field_name));
        }
        Ok(())
    }
}

impl ValidateNonEmpty for String {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        self.as_str().validate_non_empty(field_name)
    }
}

impl<T: ValidateNonEmpty> ValidateNonEmpty for Option<T> {
    fn validate_non_empty(&self, field_name: &str) -> ApiResult<()> {
        match self {
            Some(value) => value.validate_non_empty(field_name),
            None => Err(ApiError::missing_field(field_name)),
        }
    }
}

/// Trait for validating collection sizes.
pub trait ValidateLen {
    /// Validate that the collection has between `min` and `max` items.
    fn validate_len(&self, field_name: &str, min: usize, max: usize) -> ApiResult<()>;
}

impl<T> ValidateLen for Vec<T> {
    fn validate_len(&self, field_name: &str, min: usize, max: usize) -> ApiResult<()> {
        if self.len() < min || self.len() > max {
            return Err(ApiError::invalid_range(field_name, min, max));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    #[test]
    fn test_non_empty_str() {
        assert!("harbor".validate_non_empty("location_id").is_ok());
        assert!("".validate_non_empty("location_id").is_err());
        assert!("   ".validate_non_empty("location_id").is_err());
    }

    #[test]
    fn test_non_empty_option() {
        let some: Option<String> = Some("x".to_string());
        let none: Option<String> = None;
        assert!(some.validate_non_empty("field").is_ok());

        let err = none.validate_non_empty("field").unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingField);
    }

    #[test]
    fn test_validate_len() {
        let questions = vec!["q1".to_string(), "q2".to_string()];
        assert!(questions.validate_len("questions", 1, 10).is_ok());
        assert!(questions.validate_len("questions", 3, 10).is_err());

        let empty: Vec<String> = Vec::new();
        let err = empty.validate_len("questions", 1, 10).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidRange);
    }
}
