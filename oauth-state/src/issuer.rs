//! Issuing OAuth state: the "redirect to the authorization server" half.

use std::sync::Arc;

use log::*;
use serde::Serialize;

use crate::boundary::StateResponse;
use crate::error::Error;
use crate::options::StateOptions;
use crate::session_cookie;
use crate::synchronizer::Synchronizer;
use crate::token::{to_payload, TokenBody, TokenCodec};

/// Everything produced by one issuance.
///
/// Only `synchronizer` belongs in the outbound OAuth `state` parameter; the
/// signed token travels in the cookie and must never be sent as `state`.
#[derive(Debug, Clone)]
pub struct IssuedState<T> {
    pub token: String,
    pub synchronizer: String,
    pub data: Option<T>,
}

/// Creates synchronizers and binds them to the user agent with a signed cookie.
#[derive(Clone)]
pub struct Issuer {
    options: Arc<StateOptions>,
    codec: Arc<dyn TokenCodec>,
}

impl Issuer {
    pub fn new(options: Arc<StateOptions>, codec: Arc<dyn TokenCodec>) -> Self {
        Self { options, codec }
    }

    /// Generate a synchronizer, sign it together with `data`, and append the
    /// session cookie to `response`.
    ///
    /// Exactly one `Set-Cookie` header is written on success and none on
    /// failure.
    pub async fn make_state<T, R>(
        &self,
        data: Option<T>,
        response: &mut R,
    ) -> Result<IssuedState<T>, Error>
    where
        T: Serialize + Send + Sync,
        R: StateResponse + ?Sized,
    {
        let synchronizer = Synchronizer::generate().into_string();
        let body = TokenBody {
            synchronizer,
            data,
        };

        let token = self
            .codec
            .sign(to_payload(&body)?, self.options.max_age_seconds())
            .await?;

        response.append_set_cookie(session_cookie::serialize(
            self.options.cookie_name(),
            &token,
            self.options.cookie_max_age(),
        ))?;

        debug!(
            "Issued OAuth state cookie `{}` expiring in {}",
            self.options.cookie_name(),
            self.options.expires_in()
        );

        Ok(IssuedState {
            token,
            synchronizer: body.synchronizer,
            data: body.data,
        })
    }
}
