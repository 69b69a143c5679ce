//! Signed, expiring session tokens.
//!
//! The session token carries the synchronizer (and any caller data) from the
//! issuing response to the verifying request. It is signed, not encrypted.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::error::{token_error, Error, TokenErrorKind};

/// Claims the codec adds around the caller's payload.
const RESERVED_CLAIMS: [&str; 2] = ["iat", "exp"];

/// Body of a verified session token.
///
/// An absent `data` claim reads back as `None`. A `data` claim holding JSON
/// `null` reads back as `Some` of whatever `T` makes of `null`, so
/// `Some(Value::Null)` survives the round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct TokenBody<T> {
    pub synchronizer: String,
    #[serde(
        default,
        deserialize_with = "present",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<T>,
}

// Only runs when the claim exists; a missing claim takes the `default` path.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Trait for signing and verifying session tokens.
///
/// Payloads travel as JSON objects so any serializable caller data fits, and
/// so the trait stays object safe.
#[async_trait]
pub trait TokenCodec: Send + Sync {
    /// Sign `payload`, expiring `expires_in_seconds` from now.
    async fn sign(&self, payload: Map<String, Value>, expires_in_seconds: u64)
        -> Result<String, Error>;

    /// Verify signature and expiry, returning the payload without the
    /// codec's own claims.
    async fn verify(&self, token: &str) -> Result<Map<String, Value>, Error>;
}

/// HS256 compact JWT codec over a shared secret.
pub struct JwtCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact; the cookie's max-age is not extended by clock leeway.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[async_trait]
impl TokenCodec for JwtCodec {
    async fn sign(
        &self,
        mut payload: Map<String, Value>,
        expires_in_seconds: u64,
    ) -> Result<String, Error> {
        let issued_at = Utc::now().timestamp();
        let expires_at = issued_at
            .checked_add_unsigned(expires_in_seconds)
            .ok_or_else(|| token_error(TokenErrorKind::SigningFailed, "expiry out of range"))?;

        payload.insert("iat".to_string(), Value::from(issued_at));
        payload.insert("exp".to_string(), Value::from(expires_at));

        let token = encode(&Header::new(Algorithm::HS256), &payload, &self.encoding_key)?;
        Ok(token)
    }

    async fn verify(&self, token: &str) -> Result<Map<String, Value>, Error> {
        let mut claims = decode::<Map<String, Value>>(token, &self.decoding_key, &self.validation)?
            .claims;
        for claim in RESERVED_CLAIMS {
            claims.remove(claim);
        }
        Ok(claims)
    }
}

/// Convert a token body into the JSON object handed to the codec.
pub(crate) fn to_payload<T: Serialize>(body: &TokenBody<T>) -> Result<Map<String, Value>, Error> {
    match serde_json::to_value(body)? {
        Value::Object(map) => Ok(map),
        _ => Err(token_error(
            TokenErrorKind::SigningFailed,
            "token body did not serialize to an object",
        )),
    }
}

/// Rebuild a typed token body from a verified payload.
pub(crate) fn from_payload<T: serde::de::DeserializeOwned>(
    payload: Map<String, Value>,
) -> Result<TokenBody<T>, Error> {
    Ok(serde_json::from_value(Value::Object(payload))?)
}
