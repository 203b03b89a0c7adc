use crate::JobRequest;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter a search query")]
    EmptyQuery,
    #[error("Please enter a valid number of pages")]
    InvalidPageCount,
}

/// Validates raw form input. Checks run in order and the first failure wins.
pub fn validate_form(query: &str, pages: &str) -> Result<JobRequest, ValidationError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ValidationError::EmptyQuery);
    }

    let page_count = pages
        .trim()
        .parse::<u32>()
        .map_err(|_| ValidationError::InvalidPageCount)?;
    if page_count < 1 {
        return Err(ValidationError::InvalidPageCount);
    }

    Ok(JobRequest {
        query: query.to_string(),
        page_count,
    })
}
