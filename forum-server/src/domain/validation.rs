use super::error::DomainError;

pub(crate) const MAX_TITLE_CHARS: usize = 255;
pub(crate) const MAX_BODY_CHARS: usize = 10_000;

pub(crate) fn validate_positive_i64(field: &'static str, value: i64) -> Result<(), DomainError> {
    if value <= 0 {
        return Err(DomainError::Validation {
            field,
            message: "must be > 0",
        });
    }
    Ok(())
}

pub(crate) fn normalize_title(title: &str) -> Result<String, DomainError> {
    let title = title.trim();
    if title.is_empty() || title.chars().count() > MAX_TITLE_CHARS {
        return Err(DomainError::Validation {
            field: "title",
            message: "must be 1..255 chars",
        });
    }
    Ok(title.to_string())
}

/// Trims a free-text body and rejects it when empty or oversized.
pub(crate) fn normalize_body(field: &'static str, body: &str) -> Result<String, DomainError> {
    let body = body.trim();
    if body.is_empty() {
        return Err(DomainError::Validation {
            field,
            message: "must not be empty",
        });
    }
    if body.chars().count() > MAX_BODY_CHARS {
        return Err(DomainError::Validation {
            field,
            message: "must be at most 10000 chars",
        });
    }
    Ok(body.to_string())
}
