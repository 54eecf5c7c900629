use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::errors::ServiceResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Network,
    Status,
    Parse,
    NotFound,
    InvalidRequest,
    Other,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Status => "status",
            ErrorKind::Parse => "parse",
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidRequest => "invalid_request",
            ErrorKind::Other => "other",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Description of a runtime failure: a kind plus a human message.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
}

impl ErrorInfo {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    pub fn status(code: u16, url: &str) -> Self {
        Self::new(ErrorKind::Status, format!("HTTP {} from {}", code, url))
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Parse, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }
}

impl From<reqwest::Error> for ErrorInfo {
    fn from(err: reqwest::Error) -> Self {
        ErrorInfo::network(err.to_string())
    }
}

impl From<serde_json::Error> for ErrorInfo {
    fn from(err: serde_json::Error) -> Self {
        ErrorInfo::parse(err.to_string())
    }
}

/// Success/failure envelope returned by every feature operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FetchResult<T> {
    Success(T),
    Failure(ErrorInfo),
}

impl<T> FetchResult<T> {
    pub fn ok(data: T) -> Self {
        FetchResult::Success(data)
    }

    pub fn fail(error: ErrorInfo) -> Self {
        FetchResult::Failure(error)
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FetchResult::Success(_))
    }

    pub fn is_failure(&self) -> bool {
        !self.is_ok()
    }

    /// The payload, or `None` on failure.
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchResult::Success(data) => Some(data),
            FetchResult::Failure(_) => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorInfo> {
        match self {
            FetchResult::Success(_) => None,
            FetchResult::Failure(error) => Some(error),
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            FetchResult::Success(data) => Some(data),
            FetchResult::Failure(_) => None,
        }
    }

    pub fn into_result(self) -> Result<T, ErrorInfo> {
        match self {
            FetchResult::Success(data) => Ok(data),
            FetchResult::Failure(error) => Err(error),
        }
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FetchResult<U> {
        match self {
            FetchResult::Success(data) => FetchResult::Success(f(data)),
            FetchResult::Failure(error) => FetchResult::Failure(error),
        }
    }
}

impl<T> From<Result<T, ErrorInfo>> for FetchResult<T> {
    fn from(result: Result<T, ErrorInfo>) -> Self {
        match result {
            Ok(data) => FetchResult::Success(data),
            Err(error) => FetchResult::Failure(error),
        }
    }
}

/// Return type of feature operations.
///
/// The outer `Err` carries contract faults (undeclared feature, missing
/// operation). Runtime failures are a `FetchResult::Failure` inside `Ok`.
pub type Outcome<T> = ServiceResult<FetchResult<T>>;
