//! The request/response boundary the protocol needs from an HTTP layer.
//!
//! Any framework that can read the `Cookie` header, read the `state` query
//! value and append a `Set-Cookie` header can host the issuer and verifier.

use std::borrow::Cow;

use http::header::{COOKIE, SET_COOKIE};
use http::{HeaderMap, HeaderValue, Request, Uri};

use crate::error::{http_error, Error, HttpErrorKind};

/// Name of the query parameter the authorization server echoes back.
pub const STATE_PARAM: &str = "state";

/// Read access to an inbound request.
pub trait StateRequest {
    /// The raw `Cookie` header, if any.
    fn cookie_header(&self) -> Option<Cow<'_, str>>;

    /// The decoded `state` query value, if any.
    fn state_param(&self) -> Option<String>;
}

/// Write access to an outbound response.
pub trait StateResponse {
    /// Append one `Set-Cookie` header without disturbing any others.
    fn append_set_cookie(&mut self, header: String) -> Result<(), Error>;
}

/// Join every `Cookie` header into one `; `-separated string.
///
/// HTTP/2 clients may split cookies across several header fields.
pub fn cookie_header_from(headers: &HeaderMap) -> Option<Cow<'_, str>> {
    let mut values = headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok());

    let first = values.next()?;
    let rest: Vec<&str> = values.collect();
    if rest.is_empty() {
        return Some(Cow::Borrowed(first));
    }

    let mut joined = first.to_string();
    for value in rest {
        joined.push_str("; ");
        joined.push_str(value);
    }
    Some(Cow::Owned(joined))
}

/// Find the first `state` value in a URI's query string.
pub fn state_param_from(uri: &Uri) -> Option<String> {
    let query = uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == STATE_PARAM)
        .map(|(_, value)| value.into_owned())
}

impl<B> StateRequest for Request<B> {
    fn cookie_header(&self) -> Option<Cow<'_, str>> {
        cookie_header_from(self.headers())
    }

    fn state_param(&self) -> Option<String> {
        state_param_from(self.uri())
    }
}

impl StateRequest for http::request::Parts {
    fn cookie_header(&self) -> Option<Cow<'_, str>> {
        cookie_header_from(&self.headers)
    }

    fn state_param(&self) -> Option<String> {
        state_param_from(&self.uri)
    }
}

impl StateResponse for HeaderMap {
    fn append_set_cookie(&mut self, header: String) -> Result<(), Error> {
        let value = HeaderValue::try_from(header).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: crate::error::ErrorKind::Http(HttpErrorKind::InvalidHeader),
        })?;
        self.append(SET_COOKIE, value);
        Ok(())
    }
}

impl<B> StateResponse for http::Response<B> {
    fn append_set_cookie(&mut self, header: String) -> Result<(), Error> {
        self.headers_mut().append_set_cookie(header)
    }
}

/// Collect the `Set-Cookie` values written to a header map, in order.
pub fn set_cookie_headers(headers: &HeaderMap) -> Result<Vec<String>, Error> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .map(|value| {
            value
                .to_str()
                .map(str::to_string)
                .map_err(|_| http_error(HttpErrorKind::InvalidHeader, "non-ascii Set-Cookie header"))
        })
        .collect()
}
