//!
//! # Error Taxonomy & Responder
//!
//! This module defines the fixed set of failure categories (`ErrorKind`) used
//! throughout the application, and the `AppError` type that every pipeline
//! stage fails with. Each kind carries a stable wire code and a default
//! message; clients always receive a `{message, code, details}` body.
//!
//! `AppError` implements `actix_web::error::ResponseError`, which is the
//! terminal stage of the pipeline: any raised failure is normalized into a
//! taxonomy entry and an HTTP status. `From` implementations for
//! `sqlx::Error`, `validator::ValidationErrors`, `jsonwebtoken::errors::Error`
//! and `bcrypt::BcryptError` convert collaborator failures at the boundary,
//! so untagged errors never travel through the pipeline.

use actix_web::error::{JsonPayloadError, PathError, ResponseError};
use actix_web::{http::StatusCode, HttpRequest, HttpResponse};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use validator::ValidationErrors;

/// Named failure categories with stable (code, message) pairs.
///
/// The set is fixed in behavior: every component fails by raising an
/// `AppError` tagged with one of these kinds, never an untagged failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The persistence collaborator is unreachable or timed out.
    DatabaseUnavailable,
    /// Request input failed validation; `details` lists the field issues.
    ValidationFailed,
    /// No credentials were presented where identity is required.
    Unauthenticated,
    /// A presented token is expired, malformed, or badly signed.
    TokenExpiredOrInvalid,
    /// The federated identity provider reported a failure.
    FederatedAuthFailed,
    /// The acting identity does not own the target resource.
    Forbidden,
    /// The requested resource does not exist.
    NotFound,
    /// A registration targeted an email that already has an account.
    AlreadyRegistered,
    /// Login failed; deliberately covers both unknown email and wrong
    /// password so account existence is not leaked.
    InvalidCredentials,
    /// An operation could not be carried through to completion.
    OperationIncomplete,
    /// Anything that does not match a known taxonomy code.
    Unknown,
    /// The caller exceeded the request quota.
    RateLimited,
}

impl ErrorKind {
    /// Stable wire code for this kind. These are part of the API contract
    /// and must never change, typos included.
    pub const fn code(&self) -> &'static str {
        match self {
            ErrorKind::DatabaseUnavailable => "DB_CONN_ERR",
            ErrorKind::ValidationFailed => "VALIDATION_ERR",
            ErrorKind::Unauthenticated => "AUTH_ERR",
            ErrorKind::TokenExpiredOrInvalid => "AUTH_TIME_ERR",
            ErrorKind::FederatedAuthFailed => "GOOGLE_AUTH_ERR",
            ErrorKind::Forbidden => "AUTHZ_ERR",
            ErrorKind::NotFound => "NOT_FOUND_ERR",
            ErrorKind::AlreadyRegistered => "ALRDY_REGISTRED",
            ErrorKind::InvalidCredentials => "IVLD_CRDTIAL",
            ErrorKind::OperationIncomplete => "NOT_CMPLETED",
            ErrorKind::Unknown => "UNKNOWN_ERR",
            ErrorKind::RateLimited => "RATE_LIMIT",
        }
    }

    /// Default human-readable message for this kind.
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorKind::DatabaseUnavailable => "Database connection error",
            ErrorKind::ValidationFailed => "Validation error",
            ErrorKind::Unauthenticated => "You are not authenticated",
            ErrorKind::TokenExpiredOrInvalid => "Token timeout",
            ErrorKind::FederatedAuthFailed => "Google authentication error",
            ErrorKind::Forbidden => "You are not Authorized this operation",
            ErrorKind::NotFound => "Not found",
            ErrorKind::AlreadyRegistered => "User already registered",
            ErrorKind::InvalidCredentials => "Invalid credentials",
            ErrorKind::OperationIncomplete => "Operation can not completed",
            ErrorKind::Unknown => "Unknown error",
            ErrorKind::RateLimited => {
                "Too many requests from this IP, please try again later"
            }
        }
    }

    /// HTTP status this kind resolves to, absent an explicit override.
    pub const fn status(&self) -> StatusCode {
        match self {
            ErrorKind::Unauthenticated
            | ErrorKind::TokenExpiredOrInvalid
            | ErrorKind::InvalidCredentials => StatusCode::UNAUTHORIZED,
            ErrorKind::Forbidden => StatusCode::FORBIDDEN,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::ValidationFailed | ErrorKind::AlreadyRegistered => {
                StatusCode::BAD_REQUEST
            }
            ErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorKind::DatabaseUnavailable
            | ErrorKind::FederatedAuthFailed
            | ErrorKind::OperationIncomplete
            | ErrorKind::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// A field-level validation issue reported back to the client.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub issue: String,
}

/// The failure value raised by every pipeline stage.
///
/// Carries a taxonomy kind, a message (defaulting to the kind's), optional
/// structured details (populated for validation failures), and an optional
/// status override for the rare case where the status was decided upstream.
#[derive(Debug)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
    details: Vec<FieldIssue>,
    status_override: Option<StatusCode>,
}

impl AppError {
    /// Creates an error of the given kind with its default message.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: kind.message().to_string(),
            details: Vec::new(),
            status_override: None,
        }
    }

    /// Replaces the default message. The wire code is unaffected.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attaches field-level details (validation failures).
    pub fn with_details(mut self, details: Vec<FieldIssue>) -> Self {
        self.details = details;
        self
    }

    /// Forces a specific response status, overriding the kind's default.
    ///
    /// Used by the auth middleware to report a missing account as 401 rather
    /// than 404, so token holders cannot probe for account existence.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status_override = Some(status);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn details(&self) -> &[FieldIssue] {
        &self.details
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind.code(), self.message)
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status_override.unwrap_or_else(|| self.kind.status())
    }

    fn error_response(&self) -> HttpResponse {
        // Full diagnostics go to the log; the client only sees the taxonomy
        // entry, so collaborator internals are never leaked.
        log::error!("request failed: {} (kind: {:?})", self, self.kind);
        HttpResponse::build(self.status_code()).json(json!({
            "message": self.message,
            "code": self.kind.code(),
            "details": self.details,
        }))
    }
}

/// Maps `sqlx::Error` into the taxonomy.
///
/// `RowNotFound` becomes `NotFound`; everything else (connection loss, pool
/// timeouts) is `DatabaseUnavailable`. The driver message is logged but not
/// included in the client-facing message.
impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> AppError {
        match error {
            sqlx::Error::RowNotFound => AppError::new(ErrorKind::NotFound),
            other => {
                log::error!("database error: {}", other);
                AppError::new(ErrorKind::DatabaseUnavailable)
            }
        }
    }
}

/// Flattens `validator::ValidationErrors` into `ValidationFailed` with one
/// `{field, issue}` entry per violated rule.
impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> AppError {
        let details = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, issues)| {
                issues.iter().map(move |issue| FieldIssue {
                    field: field.to_string(),
                    issue: issue
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| issue.code.to_string()),
                })
            })
            .collect();
        AppError::new(ErrorKind::ValidationFailed).with_details(details)
    }
}

/// JWT processing failures are always reported as `TokenExpiredOrInvalid`,
/// whether the token expired, was tampered with, or never parsed.
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(error: jsonwebtoken::errors::Error) -> AppError {
        log::debug!("token rejected: {}", error);
        AppError::new(ErrorKind::TokenExpiredOrInvalid)
    }
}

/// Bcrypt failures (malformed stored hash, cost out of range) mean the
/// operation could not be completed; they are not credential mismatches.
impl From<bcrypt::BcryptError> for AppError {
    fn from(error: bcrypt::BcryptError) -> AppError {
        log::error!("bcrypt error: {}", error);
        AppError::new(ErrorKind::OperationIncomplete)
    }
}

/// Error handler for the `web::Json` extractor, registered via
/// `web::JsonConfig`. Without it, an unparseable body produces the
/// framework's plain-text response instead of a taxonomy body.
pub fn json_error_handler(error: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    match error {
        JsonPayloadError::Deserialize(ref inner) => AppError::new(ErrorKind::ValidationFailed)
            .with_details(vec![FieldIssue {
                field: "body".to_string(),
                issue: inner.to_string(),
            }])
            .into(),
        JsonPayloadError::ContentType => AppError::new(ErrorKind::ValidationFailed)
            .with_details(vec![FieldIssue {
                field: "body".to_string(),
                issue: "expected a JSON body".to_string(),
            }])
            .into(),
        other => {
            log::error!("payload error: {}", other);
            AppError::new(ErrorKind::Unknown).into()
        }
    }
}

/// Error handler for the `web::Path` extractor, registered via
/// `web::PathConfig`. A non-parsing path segment (e.g. a task id that is not
/// a UUID) is a validation failure, not a missing resource.
pub fn path_error_handler(error: PathError, _req: &HttpRequest) -> actix_web::Error {
    let issue = match &error {
        PathError::Deserialize(inner) => inner.to_string(),
        other => other.to_string(),
    };
    AppError::new(ErrorKind::ValidationFailed)
        .with_details(vec![FieldIssue {
            field: "path".to_string(),
            issue,
        }])
        .into()
}
