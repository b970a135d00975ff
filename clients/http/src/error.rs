use std::fmt;

use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonField {
    Name,
    Number,
}

impl fmt::Display for PersonField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersonField::Name => f.write_str("name"),
            PersonField::Number => f.write_str("number"),
        }
    }
}

/// Client input problems found before anything is persisted
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{0} is missing")]
    MissingField(PersonField),

    #[error("name must be unique")]
    DuplicateName,
}

#[derive(Error, Debug)]
pub enum PhonebookError {
    #[error("validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    /// The store rejected the values, e.g. clearing a field or taking another person's name
    #[error("{0}")]
    StoreValidation(String),

    #[error("malformatted id")]
    MalformedId(String),

    #[error("person not found")]
    NotFound(String),

    #[error("{0}")]
    Store(StoreError),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ValidationError::to_string)
        .collect::<Vec<String>>()
        .join(", ")
}

impl From<StoreError> for PhonebookError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::MalformedId(id) => PhonebookError::MalformedId(id),
            err @ (StoreError::DuplicateName(_) | StoreError::MissingField(_)) => {
                PhonebookError::StoreValidation(err.to_string())
            }
            err @ StoreError::Database(_) => PhonebookError::Store(err),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ErrorsBody {
    errors: Vec<String>,
}

impl ResponseError for PhonebookError {
    fn status_code(&self) -> StatusCode {
        match self {
            PhonebookError::Validation(_)
            | PhonebookError::StoreValidation(_)
            | PhonebookError::MalformedId(_) => StatusCode::BAD_REQUEST,
            PhonebookError::NotFound(_) => StatusCode::NOT_FOUND,
            PhonebookError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{:?}", self);
        }

        match self {
            PhonebookError::Validation(errors) => HttpResponse::build(status).json(ErrorsBody {
                errors: errors.iter().map(ValidationError::to_string).collect(),
            }),
            _ => HttpResponse::build(status).json(ErrorBody {
                error: self.to_string(),
            }),
        }
    }
}

/// Body for failures that never reach the phonebook, e.g. unreadable JSON or unknown paths
pub fn error_body(message: impl Into<String>) -> serde_json::Value {
    serde_json::json!({ "error": message.into() })
}

#[cfg(test)]
mod tests {
    use actix_web::body::to_bytes;
    use database::database::request_manager::RequestManagerError;
    use rstest::rstest;

    use super::*;

    async fn body_json(err: PhonebookError) -> serde_json::Value {
        let body = to_bytes(err.error_response().into_body()).await.unwrap();

        serde_json::from_slice(&body).unwrap()
    }

    #[rstest]
    #[case(PhonebookError::Validation(vec![ValidationError::DuplicateName]), StatusCode::BAD_REQUEST)]
    #[case(PhonebookError::StoreValidation("name must be unique".into()), StatusCode::BAD_REQUEST)]
    #[case(PhonebookError::MalformedId("1".into()), StatusCode::BAD_REQUEST)]
    #[case(PhonebookError::NotFound("1".into()), StatusCode::NOT_FOUND)]
    #[case(
        PhonebookError::Store(StoreError::Database(RequestManagerError::DatabaseTimeout)),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    fn status_codes(#[case] err: PhonebookError, #[case] expected: StatusCode) {
        assert_eq!(err.status_code(), expected);
    }

    #[actix_web::test]
    async fn validation_errors_are_aggregated() {
        let err = PhonebookError::Validation(vec![
            ValidationError::MissingField(PersonField::Name),
            ValidationError::MissingField(PersonField::Number),
        ]);

        assert_eq!(
            body_json(err).await,
            serde_json::json!({ "errors": ["name is missing", "number is missing"] })
        );
    }

    #[actix_web::test]
    async fn malformed_id_body() {
        let err = PhonebookError::MalformedId("abc".to_string());

        assert_eq!(body_json(err).await, error_body("malformatted id"));
    }

    #[test]
    fn store_errors_map_to_phonebook_errors() {
        assert!(matches!(
            PhonebookError::from(StoreError::MalformedId("x".into())),
            PhonebookError::MalformedId(_)
        ));
        assert!(matches!(
            PhonebookError::from(StoreError::MissingField("name".into())),
            PhonebookError::StoreValidation(message) if message == "Validation failed: name is missing"
        ));
        assert!(matches!(
            PhonebookError::from(StoreError::Database(RequestManagerError::DatabaseStopped)),
            PhonebookError::Store(_)
        ));
    }
}
