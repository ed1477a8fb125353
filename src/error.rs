use serde::Deserialize;
use std::fmt;
use std::time::Duration;

/// Crate-wide error type. Remote failures are carried verbatim; nothing here
/// retries or reinterprets provider responses.
#[derive(Debug)]
pub enum Error {
    /// No ambient credential could be resolved from the environment.
    AuthenticationUnavailable(String),
    /// The identity provider rejected the impersonation grant.
    PermissionDenied(String),
    /// Any error returned by the speech service, HTTP-level or embedded in a
    /// finished operation, with the provider-supplied code and message.
    RemoteService {
        code: u16,
        status: String,
        message: String,
    },
    /// The local wait bound elapsed. The remote job is NOT cancelled and may
    /// still complete and write its output.
    Timeout { waited: Duration },
    Network(String),
    Invalid(String),
    Internal(String),
}

impl Error {
    pub fn auth_unavailable<S: Into<String>>(msg: S) -> Self {
        Error::AuthenticationUnavailable(msg.into())
    }
    pub fn permission_denied<S: Into<String>>(msg: S) -> Self {
        Error::PermissionDenied(msg.into())
    }
    pub fn network<S: Into<String>>(msg: S) -> Self {
        Error::Network(msg.into())
    }
    pub fn invalid<S: Into<String>>(msg: S) -> Self {
        Error::Invalid(msg.into())
    }
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Error::Internal(msg.into())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::AuthenticationUnavailable(msg) => {
                write!(f, "no ambient credential available: {msg}")
            }
            Error::PermissionDenied(msg) => write!(f, "impersonation denied: {msg}"),
            Error::RemoteService {
                code,
                status,
                message,
            } => {
                if status.is_empty() {
                    write!(f, "remote service error {code}: {message}")
                } else {
                    write!(f, "remote service error {code} {status}: {message}")
                }
            }
            Error::Timeout { waited } => {
                write!(
                    f,
                    "gave up waiting for transcription after {waited:?} (the remote job keeps running)"
                )
            }
            Error::Network(msg) => write!(f, "network error: {msg}"),
            Error::Invalid(msg) => write!(f, "invalid input: {msg}"),
            Error::Internal(msg) => write!(f, "internal error: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

/// Standard Google error envelope.
/// Reference: https://cloud.google.com/apis/design/errors#http_mapping
#[derive(Debug, Deserialize)]
pub struct GoogleErrorResponse {
    pub error: GoogleError,
}

#[derive(Debug, Deserialize)]
pub struct GoogleError {
    #[serde(default)]
    pub code: u16,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// Pulls the human-readable message out of an error body, falling back to the
/// raw body when it is not the standard envelope.
pub fn google_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<GoogleErrorResponse>(body) {
        parsed.error.message
    } else {
        body.to_string()
    }
}

/// Maps a non-2xx provider response to `RemoteService`, preserving the embedded
/// code/status/message when the body is the standard envelope.
pub fn remote_error(http_status: u16, body: &str) -> Error {
    match serde_json::from_str::<GoogleErrorResponse>(body) {
        Ok(parsed) => Error::RemoteService {
            code: if parsed.error.code != 0 {
                parsed.error.code
            } else {
                http_status
            },
            status: parsed.error.status,
            message: parsed.error.message,
        },
        Err(_) => Error::RemoteService {
            code: http_status,
            status: String::new(),
            message: body.to_string(),
        },
    }
}
