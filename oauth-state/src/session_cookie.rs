//! Serialization and parsing of the session cookie.
//!
//! The attribute policy is fixed: `HttpOnly`, `Secure`, `SameSite=Lax` and
//! `Path=/`. Only the value and the max-age vary between issuing and expiring.

use std::collections::HashMap;

use cookie::{Cookie, SameSite};
use time::Duration;

/// Max-age written when the session cookie is destroyed.
pub const EXPIRED_MAX_AGE_SECONDS: i64 = -99_999_999;

/// Placeholder value carried by the destroyed cookie.
pub const EXPIRED_VALUE: &str = "expired";

/// Build a `Set-Cookie` header value for `name` with the fixed attribute policy.
///
/// Each call produces a complete directive, so the user agent replaces whatever
/// it held under `name` rather than merging with it.
pub fn serialize(name: &str, value: &str, max_age_seconds: i64) -> String {
    Cookie::build((name.to_string(), value.to_string()))
        .max_age(Duration::seconds(max_age_seconds))
        .same_site(SameSite::Lax)
        .path("/")
        .secure(true)
        .http_only(true)
        .build()
        .to_string()
}

/// `Set-Cookie` value that makes the user agent discard the session cookie now.
pub fn serialize_expired(name: &str) -> String {
    serialize(name, EXPIRED_VALUE, EXPIRED_MAX_AGE_SECONDS)
}

/// Parse a request `Cookie` header into a name to value mapping.
///
/// Pairs that fail to parse are skipped. When a name repeats, the first
/// occurrence wins, matching how user agents order the most specific cookie first.
pub fn parse(header: &str) -> HashMap<String, String> {
    let mut cookies = HashMap::new();
    for cookie in Cookie::split_parse(header).flatten() {
        cookies
            .entry(cookie.name().to_string())
            .or_insert_with(|| cookie.value().to_string());
    }
    cookies
}
