//! Error types for the `oauth-state` crate.
//!
//! Follows the same pattern as the rest of the workspace: a root Error struct
//! holding an error kind plus an optional source for chaining.

use std::error::Error as StdError;
use std::fmt;

/// Message shown to the user agent whenever the OAuth `state` value cannot be
/// matched to the device session. Shared by every state failure.
pub const NOT_SYNCHRONIZED: &str = "The OAuth state, and device state are not synchronized. Try again.";

/// Top-level error type for the oauth-state crate.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    State(StateErrorKind),
    Token(TokenErrorKind),
    Http(HttpErrorKind),
}

/// Construction-time errors from validating options.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    WeakSecret,
    InvalidMaxAge,
    InvalidCookieName,
}

/// Errors establishing synchronization between the request and the device.
#[derive(Debug, PartialEq)]
pub enum StateErrorKind {
    /// The callback request carried no `state` query value.
    MissingState,
    /// The signed synchronizer and the `state` value differ.
    NotSynchronized,
}

/// Errors from signing or verifying the session token.
#[derive(Debug, PartialEq)]
pub enum TokenErrorKind {
    MissingCookie,
    InvalidSignature,
    Expired,
    Malformed,
    SigningFailed,
}

/// Errors writing to the response boundary.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    InvalidHeader,
}

impl Error {
    /// True when the failure was a rejection of the session token rather than
    /// a problem with the request or the configuration.
    pub fn is_token_rejection(&self) -> bool {
        matches!(
            self.error_kind,
            ErrorKind::Token(
                TokenErrorKind::MissingCookie
                    | TokenErrorKind::InvalidSignature
                    | TokenErrorKind::Expired
                    | TokenErrorKind::Malformed
            )
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(kind) => match &self.source {
                Some(source) => write!(f, "Configuration error: {:?}: {}", kind, source),
                None => write!(f, "Configuration error: {:?}", kind),
            },
            ErrorKind::State(_) => write!(f, "{}", NOT_SYNCHRONIZED),
            ErrorKind::Token(kind) => write!(f, "Token error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind as JwtErrorKind;

        let error_kind = match err.kind() {
            JwtErrorKind::ExpiredSignature => TokenErrorKind::Expired,
            JwtErrorKind::InvalidSignature | JwtErrorKind::InvalidAlgorithm => {
                TokenErrorKind::InvalidSignature
            }
            JwtErrorKind::InvalidKeyFormat | JwtErrorKind::MissingAlgorithm => {
                TokenErrorKind::SigningFailed
            }
            _ => TokenErrorKind::Malformed,
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Token(error_kind),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Token(TokenErrorKind::Malformed),
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Helper function to create state synchronization errors.
pub fn state_error(kind: StateErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::State(kind),
    }
}

/// Helper function to create token errors.
pub fn token_error(kind: TokenErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Token(kind),
    }
}

/// Helper function to create response boundary errors.
pub fn http_error(kind: HttpErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Http(kind),
    }
}
