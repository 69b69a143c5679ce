use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use oauth_state::error::{ErrorKind as OAuthErrorKind, NOT_SYNCHRONIZED};
use oauth_state::Error as StateError;

extern crate log;

#[derive(Debug)]
pub enum Error {
    OAuthState(StateError),
    Web(WebErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// The server is missing configuration it needs to start an OAuth flow.
    Config,
    /// The request was well formed for state purposes but unusable otherwise.
    Input,
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::OAuthState(err) => Some(err),
            Error::Web(_) => None,
        }
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::OAuthState(err) => write!(fmt, "{err}"),
            Error::Web(kind) => write!(fmt, "{kind:?}"),
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::OAuthState(err) => match err.error_kind {
                // Missing state, mismatched state and every token rejection look
                // the same to the user agent: restart the authorization flow.
                OAuthErrorKind::State(_) => {
                    (StatusCode::BAD_REQUEST, NOT_SYNCHRONIZED).into_response()
                }
                OAuthErrorKind::Token(_) if err.is_token_rejection() => {
                    (StatusCode::BAD_REQUEST, NOT_SYNCHRONIZED).into_response()
                }
                OAuthErrorKind::Token(_) | OAuthErrorKind::Config(_) | OAuthErrorKind::Http(_) => {
                    log::error!("OAuth state failure: {err}");
                    (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL SERVER ERROR").into_response()
                }
            },
            Error::Web(WebErrorKind::Config) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "OAUTH NOT CONFIGURED").into_response()
            }
            Error::Web(WebErrorKind::Input) => {
                (StatusCode::BAD_REQUEST, "BAD REQUEST").into_response()
            }
        }
    }
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Self {
        Error::OAuthState(err)
    }
}
