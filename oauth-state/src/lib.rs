//! # oauth-state
//!
//! Synchronizes the OAuth `state` parameter with the user agent that started
//! the authorization flow, as described in RFC 6819 section 5.3.5.
//!
//! - [`Issuer`] creates a random synchronizer, signs it into a short-lived
//!   session cookie, and hands the synchronizer back for use as `state`.
//! - [`Verifier`] destroys that cookie on the callback, verifies its
//!   signature, and compares the signed synchronizer to the returned `state`
//!   in constant time.
//!
//! Nothing is stored server side; the cookie and the `state` parameter carry
//! everything between the two requests.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use oauth_state::{OAuthState, StateOptions};
//!
//! let oauth = OAuthState::new(StateOptions::new(secret)?);
//!
//! // redirect step
//! let issued = oauth.make_state(Some(return_to), &mut response_headers).await?;
//! // ... send issued.synchronizer as the `state` query parameter
//!
//! // callback step
//! let body = oauth.verify_state::<String, _, _>(&request, &mut response_headers).await?;
//! ```

pub mod boundary;
pub mod error;
pub mod issuer;
pub mod options;
pub mod session_cookie;
pub mod synchronizer;
pub mod token;
pub mod verifier;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

// Re-export commonly used types
pub use boundary::{StateRequest, StateResponse};
pub use error::{Error, ErrorKind};
pub use issuer::{IssuedState, Issuer};
pub use options::StateOptions;
pub use token::{JwtCodec, TokenBody, TokenCodec};
pub use verifier::Verifier;

/// Issuer and verifier built over one shared, immutable configuration.
#[derive(Clone)]
pub struct OAuthState {
    options: Arc<StateOptions>,
    issuer: Issuer,
    verifier: Verifier,
}

impl OAuthState {
    /// Sign session tokens as HS256 JWTs under the configured secret.
    pub fn new(options: StateOptions) -> Self {
        let codec = Arc::new(JwtCodec::new(options::secret_bytes(&options)));
        Self::with_codec(options, codec)
    }

    /// Use a caller supplied token codec.
    pub fn with_codec(options: StateOptions, codec: Arc<dyn TokenCodec>) -> Self {
        let options = Arc::new(options);
        Self {
            issuer: Issuer::new(Arc::clone(&options), Arc::clone(&codec)),
            verifier: Verifier::new(Arc::clone(&options), codec),
            options,
        }
    }

    pub fn options(&self) -> &StateOptions {
        &self.options
    }

    /// See [`Issuer::make_state`].
    pub async fn make_state<T, R>(
        &self,
        data: Option<T>,
        response: &mut R,
    ) -> Result<IssuedState<T>, Error>
    where
        T: Serialize + Send + Sync,
        R: StateResponse + ?Sized,
    {
        self.issuer.make_state(data, response).await
    }

    /// See [`Verifier::verify_state`].
    pub async fn verify_state<T, Req, Res>(
        &self,
        request: &Req,
        response: &mut Res,
    ) -> Result<TokenBody<T>, Error>
    where
        T: DeserializeOwned,
        Req: StateRequest + ?Sized,
        Res: StateResponse + ?Sized,
    {
        self.verifier.verify_state(request, response).await
    }
}
