//! Result type alias for tabmask

use super::errors::TabmaskError;

/// Result type alias for tabmask operations
///
/// # Examples
///
/// ```
/// use tabmask::domain::result::Result;
/// use tabmask::domain::errors::TabmaskError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(TabmaskError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, TabmaskError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::{RuleError, TabmaskError};

    #[test]
    fn test_result_err() {
        let result: Result<i32> = Err(TabmaskError::Io("test error".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> std::result::Result<i32, RuleError> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
