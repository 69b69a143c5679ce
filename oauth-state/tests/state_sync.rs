use std::sync::Arc;

use chrono::Utc;
use cookie::Cookie;
use http::header::COOKIE;
use http::{HeaderMap, Request};
use jsonwebtoken::{encode, EncodingKey, Header};
use oauth_state::boundary::set_cookie_headers;
use oauth_state::error::{StateErrorKind, TokenErrorKind, NOT_SYNCHRONIZED};
use oauth_state::{ErrorKind, OAuthState, StateOptions, TokenBody};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

const SECRET: &str = "71abbd66c08f49e7b7493b6912397782";
const OTHER_SECRET: &str = "0ca9d33e-2ee5-42e7-b95f-7c1af3cff152";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ReturnTo {
    foo: String,
    bar: String,
}

fn oauth(secret: &str) -> OAuthState {
    OAuthState::new(StateOptions::new(secret).unwrap())
}

// What a user agent sends back after receiving the issuing Set-Cookie header.
fn cookie_pair(set_cookie: &str) -> String {
    let cookie = Cookie::parse(set_cookie.to_string()).unwrap();
    format!("{}={}", cookie.name(), cookie.value())
}

fn callback(state: Option<&str>, cookie: Option<&str>) -> Request<()> {
    let uri = match state {
        Some(state) => format!("/oauth/callback?code=abc&state={}", state),
        None => "/oauth/callback?code=abc".to_string(),
    };
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(COOKIE, cookie);
    }
    builder.body(()).unwrap()
}

async fn issue<T: Serialize + Send + Sync>(oauth: &OAuthState, data: Option<T>) -> (String, String) {
    let mut headers = HeaderMap::new();
    let issued = oauth.make_state(data, &mut headers).await.unwrap();
    let set_cookie = set_cookie_headers(&headers).unwrap().remove(0);
    (issued.synchronizer, cookie_pair(&set_cookie))
}

fn assert_invalidated(headers: &HeaderMap) {
    let written = set_cookie_headers(headers).unwrap();
    assert_eq!(written.len(), 1, "exactly one invalidation header");
    let header = &written[0];
    assert!(header.starts_with("slack_oauth=expired"));
    assert!(header.contains("Max-Age=-99999999"));
    assert!(header.contains("SameSite=Lax"));
    assert!(header.contains("Path=/"));
    assert!(header.contains("Secure"));
    assert!(header.contains("HttpOnly"));
}

#[tokio::test]
async fn round_trip_without_data() {
    let oauth = oauth(SECRET);
    let (synchronizer, cookie) = issue::<Value>(&oauth, None).await;

    let mut headers = HeaderMap::new();
    let body: TokenBody<Value> = oauth
        .verify_state(&callback(Some(synchronizer.as_str()), Some(cookie.as_str())), &mut headers)
        .await
        .unwrap();

    assert_eq!(body.synchronizer, synchronizer);
    assert_eq!(body.data, None);
    assert_invalidated(&headers);
}

#[tokio::test]
async fn round_trip_with_structured_data() {
    let oauth = oauth(SECRET);
    let expected = ReturnTo {
        foo: "bar".to_string(),
        bar: "baz".to_string(),
    };
    let (synchronizer, cookie) = issue(&oauth, Some(expected.clone())).await;

    let mut headers = HeaderMap::new();
    let body: TokenBody<ReturnTo> = oauth
        .verify_state(&callback(Some(synchronizer.as_str()), Some(cookie.as_str())), &mut headers)
        .await
        .unwrap();

    assert_eq!(body.data, Some(expected));
    assert_eq!(body.synchronizer, synchronizer);
    assert_invalidated(&headers);
}

#[tokio::test]
async fn round_trip_with_primitive_data() {
    let oauth = oauth(SECRET);
    let (synchronizer, cookie) = issue(&oauth, Some("foo")).await;

    let mut headers = HeaderMap::new();
    let body: TokenBody<String> = oauth
        .verify_state(&callback(Some(synchronizer.as_str()), Some(cookie.as_str())), &mut headers)
        .await
        .unwrap();

    assert_eq!(body.data.as_deref(), Some("foo"));
}

#[tokio::test]
async fn round_trip_keeps_null_data_distinct_from_no_data() {
    let oauth = oauth(SECRET);
    let (synchronizer, cookie) = issue(&oauth, Some(Value::Null)).await;

    let mut headers = HeaderMap::new();
    let body: TokenBody<Value> = oauth
        .verify_state(&callback(Some(synchronizer.as_str()), Some(cookie.as_str())), &mut headers)
        .await
        .unwrap();

    assert_eq!(body.data, Some(Value::Null));
}

#[tokio::test]
async fn oversized_max_age_is_rejected_before_any_issuance() {
    let err = StateOptions::builder(SECRET)
        .max_age_seconds(u64::MAX)
        .build()
        .unwrap_err();

    assert_eq!(
        err.error_kind,
        ErrorKind::Config(oauth_state::error::ConfigErrorKind::InvalidMaxAge)
    );
}

#[tokio::test]
async fn short_lived_configuration_scenario() {
    let oauth = OAuthState::new(
        StateOptions::builder(SECRET)
            .max_age_seconds(60)
            .build()
            .unwrap(),
    );
    assert_eq!(oauth.options().expires_in(), "60s");

    let mut issued_headers = HeaderMap::new();
    let issued = oauth
        .make_state::<Value, _>(None, &mut issued_headers)
        .await
        .unwrap();
    let set_cookie = set_cookie_headers(&issued_headers).unwrap().remove(0);
    assert!(set_cookie.contains("Max-Age=60"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Secure"));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains(&issued.token));

    let mut headers = HeaderMap::new();
    let request = callback(Some(issued.synchronizer.as_str()), Some(cookie_pair(&set_cookie).as_str()));
    let body: TokenBody<Value> = oauth.verify_state(&request, &mut headers).await.unwrap();

    assert_eq!(body.synchronizer, issued.synchronizer);
    assert_eq!(body.data, None);
    assert_invalidated(&headers);
}

#[tokio::test]
async fn synchronizers_have_fixed_length_and_differ() {
    let oauth = oauth(SECRET);
    let (first, _) = issue::<Value>(&oauth, None).await;
    let (second, _) = issue::<Value>(&oauth, None).await;

    assert_eq!(first.len(), 32);
    assert_eq!(second.len(), 32);
    assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    assert_ne!(first, second);
}

#[tokio::test]
async fn missing_state_emits_no_header() {
    let oauth = oauth(SECRET);
    let (_, cookie) = issue::<Value>(&oauth, None).await;

    let mut headers = HeaderMap::new();
    let err = oauth
        .verify_state::<Value, _, _>(&callback(None, Some(cookie.as_str())), &mut headers)
        .await
        .unwrap_err();

    assert_eq!(err.error_kind, ErrorKind::State(StateErrorKind::MissingState));
    assert_eq!(err.to_string(), NOT_SYNCHRONIZED);
    assert!(headers.is_empty());
}

#[tokio::test]
async fn missing_cookie_fails_and_invalidates() {
    let oauth = oauth(SECRET);
    let (synchronizer, _) = issue::<Value>(&oauth, None).await;

    let mut headers = HeaderMap::new();
    let err = oauth
        .verify_state::<Value, _, _>(&callback(Some(synchronizer.as_str()), None), &mut headers)
        .await
        .unwrap_err();

    assert_eq!(err.error_kind, ErrorKind::Token(TokenErrorKind::MissingCookie));
    assert_invalidated(&headers);
}

#[tokio::test]
async fn cookie_signed_with_other_secret_fails() {
    let issuing = oauth(OTHER_SECRET);
    let verifying = oauth(SECRET);
    let (synchronizer, cookie) = issue::<Value>(&issuing, None).await;

    let mut headers = HeaderMap::new();
    let err = verifying
        .verify_state::<Value, _, _>(&callback(Some(synchronizer.as_str()), Some(cookie.as_str())), &mut headers)
        .await
        .unwrap_err();

    assert_eq!(
        err.error_kind,
        ErrorKind::Token(TokenErrorKind::InvalidSignature)
    );
    assert_invalidated(&headers);
}

#[tokio::test]
async fn expired_token_fails() {
    let oauth = oauth(SECRET);
    let now = Utc::now().timestamp();
    let token = encode(
        &Header::default(),
        &json!({"synchronizer": "00112233445566778899aabbccddeeff", "iat": now - 600, "exp": now - 420}),
        &EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let mut headers = HeaderMap::new();
    let err = oauth
        .verify_state::<Value, _, _>(
            &callback(
                Some("00112233445566778899aabbccddeeff"),
                Some(format!("slack_oauth={}", token).as_str()),
            ),
            &mut headers,
        )
        .await
        .unwrap_err();

    assert_eq!(err.error_kind, ErrorKind::Token(TokenErrorKind::Expired));
    assert_invalidated(&headers);
}

#[tokio::test]
async fn different_length_state_is_not_synchronized() {
    let oauth = oauth(SECRET);
    let (_, cookie) = issue::<Value>(&oauth, None).await;

    let mut headers = HeaderMap::new();
    let err = oauth
        .verify_state::<Value, _, _>(&callback(Some("doesntmatch"), Some(cookie.as_str())), &mut headers)
        .await
        .unwrap_err();

    assert_eq!(
        err.error_kind,
        ErrorKind::State(StateErrorKind::NotSynchronized)
    );
    assert_eq!(err.to_string(), NOT_SYNCHRONIZED);
    assert_invalidated(&headers);
}

#[tokio::test]
async fn state_from_another_session_is_not_synchronized() {
    let first = oauth(SECRET);
    let second = oauth("81abbd66c08f49e7b7493b6912397783");
    let (_, cookie) = issue::<Value>(&first, None).await;
    let (other_synchronizer, _) = issue::<Value>(&second, None).await;

    let mut headers = HeaderMap::new();
    let err = first
        .verify_state::<Value, _, _>(
            &callback(Some(other_synchronizer.as_str()), Some(cookie.as_str())),
            &mut headers,
        )
        .await
        .unwrap_err();

    assert_eq!(
        err.error_kind,
        ErrorKind::State(StateErrorKind::NotSynchronized)
    );
    assert_eq!(err.to_string(), NOT_SYNCHRONIZED);
}

#[tokio::test]
async fn custom_cookie_name_is_used_for_both_halves() {
    let oauth = OAuthState::new(
        StateOptions::builder(SECRET)
            .cookie_name("test")
            .build()
            .unwrap(),
    );
    let (synchronizer, cookie) = issue::<Value>(&oauth, None).await;
    assert!(cookie.starts_with("test="));

    let mut headers = HeaderMap::new();
    let request = callback(Some(synchronizer.as_str()), Some(format!("other=1; {}", cookie).as_str()));
    oauth
        .verify_state::<Value, _, _>(&request, &mut headers)
        .await
        .unwrap();

    let written = set_cookie_headers(&headers).unwrap();
    assert_eq!(written.len(), 1);
    assert!(written[0].starts_with("test=expired"));
}

#[tokio::test]
async fn concurrent_flows_do_not_interfere() {
    let oauth = Arc::new(oauth(SECRET));

    let handles: Vec<_> = (0..32u32)
        .map(|i| {
            let oauth = Arc::clone(&oauth);
            tokio::spawn(async move {
                let (synchronizer, cookie) = issue(&oauth, Some(i)).await;
                let mut headers = HeaderMap::new();
                let body: TokenBody<u32> = oauth
                    .verify_state(&callback(Some(synchronizer.as_str()), Some(cookie.as_str())), &mut headers)
                    .await
                    .unwrap();
                body.data
            })
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.await.unwrap(), Some(i as u32));
    }
}
