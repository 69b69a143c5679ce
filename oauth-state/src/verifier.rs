//! Verifying OAuth state: the "authorization server redirects back" half.

use std::sync::Arc;

use log::*;
use serde::de::DeserializeOwned;

use crate::boundary::{StateRequest, StateResponse};
use crate::error::{state_error, token_error, Error, StateErrorKind, TokenErrorKind};
use crate::options::StateOptions;
use crate::session_cookie;
use crate::synchronizer::timing_safe_eq;
use crate::token::{from_payload, TokenBody, TokenCodec};

/// Checks that the callback's `state` value matches the device session, and
/// destroys that session so it can only ever be used once.
#[derive(Clone)]
pub struct Verifier {
    options: Arc<StateOptions>,
    codec: Arc<dyn TokenCodec>,
}

impl Verifier {
    pub fn new(options: Arc<StateOptions>, codec: Arc<dyn TokenCodec>) -> Self {
        Self { options, codec }
    }

    /// Verify the OAuth `state` of `request` against its session cookie.
    ///
    /// Once `state` is present, the expired session cookie is appended to
    /// `response` before the token is looked at, so every attempt consumes
    /// the session whether it succeeds or not.
    ///
    /// # Errors
    ///
    /// * `State(MissingState)` when the request has no `state` value; the
    ///   response is left untouched.
    /// * `Token(..)` when the cookie is missing, tampered with, or expired.
    /// * `State(NotSynchronized)` when `state` and the signed synchronizer differ.
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
        let cookie_name = self.options.cookie_name();

        let state = request.state_param().ok_or_else(|| {
            debug!("OAuth callback is missing the state parameter");
            state_error(StateErrorKind::MissingState, "missing state query parameter")
        })?;

        let cookie_header = request.cookie_header();
        let cookies = session_cookie::parse(cookie_header.as_deref().unwrap_or_default());

        response.append_set_cookie(session_cookie::serialize_expired(cookie_name))?;
        debug!("Invalidated OAuth state cookie `{}`", cookie_name);

        let token = cookies.get(cookie_name).ok_or_else(|| {
            warn!("OAuth state cookie `{}` is missing", cookie_name);
            token_error(
                TokenErrorKind::MissingCookie,
                &format!("missing `{}` cookie", cookie_name),
            )
        })?;

        let payload = self.codec.verify(token).await.map_err(|err| {
            warn!("Rejected OAuth state token: {}", err);
            err
        })?;
        let body: TokenBody<T> = from_payload(payload)?;

        if !timing_safe_eq(body.synchronizer.as_bytes(), state.as_bytes()) {
            warn!("OAuth state does not match the device session");
            return Err(state_error(
                StateErrorKind::NotSynchronized,
                "state does not match synchronizer",
            ));
        }

        Ok(body)
    }
}
