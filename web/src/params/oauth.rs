use axum::http::Uri;
use serde::Deserialize;
use url::form_urlencoded;

/// Parameters accepted when starting an OAuth flow
///
/// # Fields
///
/// * `return_to` - Optional location to send the user agent after a successful callback.
///   Carried inside the signed session token, never in the `state` parameter.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthorizeParams {
    pub(crate) return_to: Option<String>,
}

/// Parameters the authorization server sends back to the callback
///
/// Read from the URI after state verification rather than through an
/// extractor, so a malformed query can never skip the cookie invalidation.
/// The first occurrence of a repeated key wins, as it does for `state`.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct CallbackParams {
    pub(crate) code: Option<String>,
    pub(crate) error: Option<String>,
}

impl CallbackParams {
    pub(crate) fn from_uri(uri: &Uri) -> Self {
        let mut params = Self::default();
        let Some(query) = uri.query() else {
            return params;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                "code" => &mut params.code,
                "error" => &mut params.error,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }
        params
    }
}
