//! Controller for the OAuth state round trip.
//!
//! `authorize` binds a fresh synchronizer to the user agent and redirects it to
//! the authorization server. `callback` consumes that binding when the
//! authorization server redirects back. Exchanging the authorization code is
//! left to whatever sits behind this service.
//!
//! Note: neither endpoint requires custom headers because both are reached via
//! browser redirects.

use crate::controller::ApiResponse;
use crate::error::WebErrorKind;
use crate::params::oauth::{AuthorizeParams, CallbackParams};
use crate::{AppState, Error};

use axum::extract::{Query, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use log::*;
use oauth_state::boundary::STATE_PARAM;
use serde::Serialize;
use service::config::Config;
use url::Url;

/// Body returned once the callback's state has been verified.
#[derive(Debug, Serialize)]
pub(crate) struct CallbackResponse {
    code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    return_to: Option<String>,
}

/// GET /oauth/authorize
///
/// Issues a new OAuth state cookie and redirects to the authorization server
/// with the matching `state` query parameter.
#[utoipa::path(
    get,
    path = "/oauth/authorize",
    params(
        ("return_to" = Option<String>, Query, description = "Where to send the user agent after the callback"),
    ),
    responses(
        (status = 307, description = "Redirect to the authorization server"),
        (status = 500, description = "Server error (OAuth not configured)"),
    )
)]
pub async fn authorize(
    State(app_state): State<AppState>,
    Query(params): Query<AuthorizeParams>,
) -> Result<impl IntoResponse, Error> {
    // Fail before issuing so a misconfigured server never sets a cookie.
    let mut url = authorization_url(&app_state.config)?;

    let mut headers = HeaderMap::new();
    let issued = app_state
        .oauth_state
        .make_state(params.return_to, &mut headers)
        .await?;

    url.query_pairs_mut()
        .append_pair(STATE_PARAM, &issued.synchronizer);

    debug!("Redirecting user agent to {}", redact_state(&url));

    Ok((headers, Redirect::temporary(url.as_str())))
}

/// GET /oauth/callback
///
/// Verifies the `state` returned by the authorization server against the
/// user agent's OAuth state cookie. The cookie is expired on every outcome
/// once a `state` value is present.
#[utoipa::path(
    get,
    path = "/oauth/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from the authorization server"),
        ("state" = String, Query, description = "State issued by /oauth/authorize"),
        ("error" = Option<String>, Query, description = "Error reported by the authorization server"),
    ),
    responses(
        (status = 200, description = "State verified"),
        (status = 400, description = "State not synchronized or callback unusable"),
        (status = 500, description = "Server error"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    request: Request,
) -> Response {
    let (parts, _body) = request.into_parts();
    let mut headers = HeaderMap::new();

    let body = match app_state
        .oauth_state
        .verify_state::<String, _, _>(&parts, &mut headers)
        .await
    {
        Ok(body) => body,
        Err(err) => {
            info!("OAuth callback failed state verification: {err}");
            return (headers, Error::from(err)).into_response();
        }
    };

    let params = CallbackParams::from_uri(&parts.uri);

    if let Some(error) = params.error {
        warn!("Authorization server reported an error: {error}");
        return (headers, Error::Web(WebErrorKind::Input)).into_response();
    }

    let Some(code) = params.code else {
        warn!("OAuth callback is missing the authorization code");
        return (headers, Error::Web(WebErrorKind::Input)).into_response();
    };

    let response = CallbackResponse {
        code,
        return_to: body.data,
    };

    (
        headers,
        Json(ApiResponse::new(StatusCode::OK.into(), response)),
    )
        .into_response()
}

/// Authorization endpoint with every query parameter except `state`.
fn authorization_url(config: &Config) -> Result<Url, Error> {
    let (Some(authorize_url), Some(client_id)) = (config.authorize_url(), config.client_id())
    else {
        warn!("OAuth authorize_url and client_id must both be configured");
        return Err(Error::Web(WebErrorKind::Config));
    };

    let mut url = Url::parse(authorize_url).map_err(|e| {
        warn!("Invalid OAuth authorize_url: {e}");
        Error::Web(WebErrorKind::Config)
    })?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", "code")
            .append_pair("client_id", client_id);
        if let Some(redirect_uri) = config.redirect_uri() {
            query.append_pair("redirect_uri", redirect_uri);
        }
        if let Some(scope) = config.scope() {
            query.append_pair("scope", scope);
        }
    }

    Ok(url)
}

// The synchronizer is a bearer value until the callback consumes it.
fn redact_state(url: &Url) -> String {
    let mut redacted = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            if key == STATE_PARAM {
                (key.into_owned(), "[REDACTED]".to_string())
            } else {
                (key.into_owned(), value.into_owned())
            }
        })
        .collect();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted.to_string()
}
