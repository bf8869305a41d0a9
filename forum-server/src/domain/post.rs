use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::validation::{normalize_body, normalize_title, validate_positive_i64};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct CreatePostRequest {
    pub(crate) title: String,
    pub(crate) body: String,
    pub(crate) category_ids: Vec<i64>,
}

impl CreatePostRequest {
    /// Normalizes text fields and collapses repeated category ids, keeping
    /// the first-seen order.
    pub(crate) fn validate(self) -> Result<Self, DomainError> {
        let title = normalize_title(&self.title)?;
        let body = normalize_body("body", &self.body)?;

        let mut category_ids: Vec<i64> = Vec::with_capacity(self.category_ids.len());
        for id in self.category_ids {
            validate_positive_i64("category_ids", id)?;
            if !category_ids.contains(&id) {
                category_ids.push(id);
            }
        }
        if category_ids.is_empty() {
            return Err(DomainError::Validation {
                field: "category_ids",
                message: "must contain at least one category",
            });
        }

        Ok(Self {
            title,
            body,
            category_ids,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::CreatePostRequest;
    use crate::domain::error::DomainError;

    fn request(title: &str, body: &str, category_ids: Vec<i64>) -> CreatePostRequest {
        CreatePostRequest {
            title: title.to_string(),
            body: body.to_string(),
            category_ids,
        }
    }

    #[test]
    fn create_post_request_validate_rejects_empty_title() {
        let err = request("   ", "valid body", vec![1])
            .validate()
            .expect_err("title must be rejected");
        assert_validation_field(err, "title");
    }

    #[test]
    fn create_post_request_validate_rejects_empty_categories() {
        let err = request("title", "body", Vec::new())
            .validate()
            .expect_err("empty category set must be rejected");
        assert_validation_field(err, "category_ids");
    }

    #[test]
    fn create_post_request_validate_rejects_non_positive_category() {
        let err = request("title", "body", vec![2, 0])
            .validate()
            .expect_err("category id 0 must be rejected");
        assert_validation_field(err, "category_ids");
    }

    #[test]
    fn create_post_request_validate_normalizes_fields() {
        let validated = request("  title  ", "  body  ", vec![3, 1, 3, 1])
            .validate()
            .expect("must validate");
        assert_eq!(validated.title, "title");
        assert_eq!(validated.body, "body");
        assert_eq!(validated.category_ids, vec![3, 1]);
    }

    fn assert_validation_field(err: DomainError, expected_field: &'static str) {
        match err {
            DomainError::Validation { field, .. } => assert_eq!(field, expected_field),
            _ => panic!("expected DomainError::Validation"),
        }
    }
}
