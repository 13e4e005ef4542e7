use std::{collections::BTreeMap, fmt};

use reqwest::StatusCode;

/// Field name to server-provided messages, as returned with a 400.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors(pub BTreeMap<String, Vec<String>>);

impl FieldErrors {
    const NON_FIELD: &'static str = "non_field_errors";

    /// Parse a validation body. Object bodies keep their field structure,
    /// anything else lands under `non_field_errors`.
    pub fn from_body(body: &str) -> Self {
        let mut fields = BTreeMap::new();
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(serde_json::Value::Object(map)) => {
                for (field, value) in map {
                    let messages = match value {
                        serde_json::Value::Array(items) => items.iter().map(plain_text).collect(),
                        other => vec![plain_text(&other)],
                    };
                    fields.insert(field, messages);
                }
            }
            Ok(other) => {
                fields.insert(Self::NON_FIELD.to_string(), vec![plain_text(&other)]);
            }
            Err(_) if !body.trim().is_empty() => {
                fields.insert(Self::NON_FIELD.to_string(), vec![body.trim().to_string()]);
            }
            Err(_) => {}
        }
        FieldErrors(fields)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            if !first {
                f.write_str("; ")?;
            }
            first = false;
            if field == Self::NON_FIELD {
                write!(f, "{}", messages.join(", "))?;
            } else {
                write!(f, "{field}: {}", messages.join(", "))?;
            }
        }
        Ok(())
    }
}

fn plain_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFailure {
    Timeout,
    Unreachable,
}

impl fmt::Display for NetworkFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetworkFailure::Timeout => f.write_str("request timed out"),
            NetworkFailure::Unreachable => f.write_str("server unreachable"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("network failure: {kind} ({detail})")]
    Network { kind: NetworkFailure, detail: String },

    #[error("unauthorized")]
    Unauthorized,

    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unexpected response (status {status:?}): {message}")]
    Unknown { status: Option<u16>, message: String },
}

impl ApiError {
    /// Classify a non-2xx response.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::BAD_REQUEST => ApiError::Validation(FieldErrors::from_body(&body)),
            StatusCode::FORBIDDEN => ApiError::Forbidden(body),
            StatusCode::NOT_FOUND => ApiError::NotFound(body),
            other => ApiError::Unknown {
                status: Some(other.as_u16()),
                message: body,
            },
        }
    }

    pub fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network {
                kind: NetworkFailure::Timeout,
                detail: err.to_string(),
            }
        } else if err.is_connect() || err.is_request() {
            ApiError::Network {
                kind: NetworkFailure::Unreachable,
                detail: err.to_string(),
            }
        } else {
            ApiError::Unknown {
                status: err.status().map(|s| s.as_u16()),
                message: err.to_string(),
            }
        }
    }

    pub fn malformed(err: impl fmt::Display) -> Self {
        ApiError::Unknown {
            status: None,
            message: format!("malformed response: {err}"),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Network { .. } => None,
            ApiError::Unauthorized => Some(401),
            ApiError::Validation(_) => Some(400),
            ApiError::Forbidden(_) => Some(403),
            ApiError::NotFound(_) => Some(404),
            ApiError::Unknown { status, .. } => *status,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            ApiError::Network {
                kind: NetworkFailure::Timeout,
                ..
            }
        )
    }

    /// Text shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Network { .. } => {
                "Unable to reach the server. Please try again.".to_string()
            }
            ApiError::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            ApiError::Validation(fields) if !fields.is_empty() => fields.to_string(),
            ApiError::Forbidden(_) => "You do not have permission to perform this action.".to_string(),
            ApiError::NotFound(_) => "The requested item could not be found.".to_string(),
            ApiError::Validation(_) | ApiError::Unknown { .. } => {
                "An unexpected error occurred. Please try again.".to_string()
            }
        }
    }
}
