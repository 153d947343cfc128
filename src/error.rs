use crate::config::ConfigError;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FaceAppError {
    /// Transport failure or non-success HTTP status from the remote service.
    #[error("Remote service error: {message}")]
    Remote {
        status: Option<u16>,
        body: String,
        message: String,
    },
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
    #[error("Invalid Filter ID{}", available_suffix(.available))]
    InvalidFilter { available: Vec<String> },
    #[error("No Faces found in Photo")]
    NoFacesDetected,
    #[error("IO error reading image: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl FaceAppError {
    pub fn status(&self) -> Option<u16> {
        match self {
            FaceAppError::Remote { status, .. } => *status,
            _ => None,
        }
    }

    /// Service error code from a `{"err": {"code": ...}}` response body.
    pub fn error_code(&self) -> Option<String> {
        match self {
            FaceAppError::Remote { body, .. } => parse_error_code(body),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for FaceAppError {
    fn from(err: reqwest::Error) -> Self {
        FaceAppError::Remote {
            status: err.status().map(|s| s.as_u16()),
            body: String::new(),
            message: err.to_string(),
        }
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    err: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: Option<String>,
}

fn parse_error_code(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.err.code)
        .filter(|code| !code.is_empty())
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        String::new()
    } else {
        format!("\nAvailable Filters: '{}'", available.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn remote(status: u16, body: &str) -> FaceAppError {
        FaceAppError::Remote {
            status: Some(status),
            body: body.to_string(),
            message: format!("HTTP {status}"),
        }
    }

    #[test]
    fn test_error_code_extraction() {
        let err = remote(400, r#"{"err":{"code":"photo_no_faces","desc":"No faces"}}"#);
        assert_eq!(err.error_code().as_deref(), Some("photo_no_faces"));
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_error_code_missing() {
        assert_eq!(remote(400, r#"{"err":{}}"#).error_code(), None);
        assert_eq!(remote(400, r#"{"err":{"code":""}}"#).error_code(), None);
        assert_eq!(remote(400, "Bad Request").error_code(), None);
        assert_eq!(FaceAppError::NoFacesDetected.error_code(), None);
    }

    #[test]
    fn test_invalid_filter_message() {
        let err = FaceAppError::InvalidFilter {
            available: vec!["no-filter".into(), "smile".into()],
        };
        assert_eq!(
            err.to_string(),
            "Invalid Filter ID\nAvailable Filters: 'no-filter, smile'"
        );

        let bare = FaceAppError::InvalidFilter { available: vec![] };
        assert_eq!(bare.to_string(), "Invalid Filter ID");
    }
}
