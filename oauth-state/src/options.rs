//! Immutable configuration shared by the issuer and the verifier.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};

use crate::error::{config_error, ConfigErrorKind, Error};

/// Default name of the cookie that carries the signed session token.
pub const DEFAULT_COOKIE_NAME: &str = "slack_oauth";

/// Default lifetime of the cookie and of the token, in seconds (3 minutes).
pub const DEFAULT_MAX_AGE_SECONDS: u64 = 180;

/// User agents cap cookie lifetimes at 400 days (RFC 6265bis).
pub const MAX_MAX_AGE_SECONDS: u64 = 400 * 24 * 60 * 60;

/// 32 UTF-8 bytes = 256 bits.
pub const MIN_SECRET_BYTES: usize = 32;

/// Validated options for OAuth state synchronization.
///
/// `expires_in` is always derived from `max_age_seconds` so the token can never
/// outlive the cookie that carries it, or vice versa.
#[derive(Clone)]
pub struct StateOptions {
    secret: SecretString,
    cookie_name: String,
    max_age_seconds: u64,
    cookie_max_age: i64,
    expires_in: String,
}

impl StateOptions {
    /// Start building options around the signing secret.
    pub fn builder(secret: impl Into<String>) -> StateOptionsBuilder {
        StateOptionsBuilder {
            secret: secret.into(),
            cookie_name: DEFAULT_COOKIE_NAME.to_string(),
            max_age_seconds: DEFAULT_MAX_AGE_SECONDS,
        }
    }

    /// Options with every default applied.
    pub fn new(secret: impl Into<String>) -> Result<Self, Error> {
        Self::builder(secret).build()
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn max_age_seconds(&self) -> u64 {
        self.max_age_seconds
    }

    pub(crate) fn cookie_max_age(&self) -> i64 {
        self.cookie_max_age
    }

    /// The token lifetime, formatted as `"<max_age_seconds>s"`.
    pub fn expires_in(&self) -> &str {
        &self.expires_in
    }
}

impl fmt::Debug for StateOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateOptions")
            .field("secret", &"[REDACTED]")
            .field("cookie_name", &self.cookie_name)
            .field("max_age_seconds", &self.max_age_seconds)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Builder for [`StateOptions`]; validation happens in [`StateOptionsBuilder::build`].
pub struct StateOptionsBuilder {
    secret: String,
    cookie_name: String,
    max_age_seconds: u64,
}

impl StateOptionsBuilder {
    pub fn cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }

    pub fn max_age_seconds(mut self, max_age_seconds: u64) -> Self {
        self.max_age_seconds = max_age_seconds;
        self
    }

    pub fn build(self) -> Result<StateOptions, Error> {
        if self.secret.trim().len() < MIN_SECRET_BYTES {
            return Err(config_error(
                ConfigErrorKind::WeakSecret,
                "expected `secret` to be a string of 256 or more bits (32 or more utf8 chars)",
            ));
        }

        if self.max_age_seconds == 0 {
            return Err(config_error(
                ConfigErrorKind::InvalidMaxAge,
                "expected `max_age_seconds` to be greater than zero",
            ));
        }

        let cookie_max_age = match i64::try_from(self.max_age_seconds) {
            Ok(seconds) if self.max_age_seconds <= MAX_MAX_AGE_SECONDS => seconds,
            _ => {
                return Err(config_error(
                    ConfigErrorKind::InvalidMaxAge,
                    &format!("expected `max_age_seconds` to be at most {MAX_MAX_AGE_SECONDS}"),
                ))
            }
        };

        if !is_valid_cookie_name(&self.cookie_name) {
            return Err(config_error(
                ConfigErrorKind::InvalidCookieName,
                &format!("`{}` is not a valid cookie name", self.cookie_name),
            ));
        }

        let expires_in = format!("{}s", self.max_age_seconds);

        Ok(StateOptions {
            secret: SecretString::new(self.secret),
            cookie_name: self.cookie_name,
            max_age_seconds: self.max_age_seconds,
            cookie_max_age,
            expires_in,
        })
    }
}

// RFC 6265 token: visible ASCII minus separators.
fn is_valid_cookie_name(name: &str) -> bool {
    !name.is_empty()
        && name.bytes().all(|b| {
            b.is_ascii_graphic()
                && !matches!(
                    b,
                    b'(' | b')'
                        | b'<'
                        | b'>'
                        | b'@'
                        | b','
                        | b';'
                        | b':'
                        | b'\\'
                        | b'"'
                        | b'/'
                        | b'['
                        | b']'
                        | b'?'
                        | b'='
                        | b'{'
                        | b'}'
                )
        })
}

pub(crate) fn secret_bytes(options: &StateOptions) -> &[u8] {
    options.secret.expose_secret().as_bytes()
}
