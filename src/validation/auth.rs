use garde::Validate;

use crate::error::{AppError, Result};

/// Runs the request's presence checks and converts a failure into a 400.
///
/// # Arguments
///
/// * `request` - A deserialized request body deriving `garde::Validate`.
///
/// # Returns
///
/// A `Result<()>` indicating whether every required field is present.
pub fn validate_request<T>(request: &T) -> Result<()>
where
    T: Validate,
    T::Context: Default,
{
    request
        .validate()
        .map_err(|report| AppError::Validation(report.to_string().trim().replace('\n', ", ")))
}
