//! Access token payload decoding
//!
//! Tokens use the compact `header.payload.signature` layout. Only the payload
//! segment is read; signatures are never verified on the client, so a failed
//! decode is the only way a corrupt token is detected.

use crate::error::TokenError;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Role name that selects the admin dashboard
pub const ADMIN_ROLE: &str = "admin";

const LENIENT: GeneralPurposeConfig =
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);

/// Decoded claims of an access token
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Granted roles, in the order the issuer listed them
    #[serde(default, deserialize_with = "null_as_empty")]
    pub roles: Vec<String>,

    /// Every other claim (`sub`, `exp`, `iat`, ...)
    #[serde(flatten)]
    pub claims: Map<String, Value>,
}

impl TokenPayload {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(ADMIN_ROLE)
    }

    /// Subject (user id) the token was issued for
    pub fn subject(&self) -> Option<&str> {
        self.claims.get("sub").and_then(Value::as_str)
    }

    /// Expiry as unix seconds
    pub fn expires_at(&self) -> Option<i64> {
        self.claims.get("exp").and_then(Value::as_i64)
    }

    /// Issue time as unix seconds
    pub fn issued_at(&self) -> Option<i64> {
        self.claims.get("iat").and_then(Value::as_i64)
    }

    /// Check the `exp` claim against `now` (unix seconds).
    ///
    /// A token without `exp` never expires. Nothing in this crate acts on
    /// expiry; callers that care can check it before using a token.
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expires_at().is_some_and(|exp| now >= exp)
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<String>>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Decode the payload segment of `token` without verifying it.
///
/// The segment may use either base64 alphabet, padded or not. The decoded
/// bytes must be a JSON object; `roles`, when present and not `null`, must be
/// an array of strings.
pub fn decode_payload(token: &str) -> Result<TokenPayload, TokenError> {
    let segment = token
        .split('.')
        .nth(1)
        .filter(|s| !s.is_empty())
        .ok_or(TokenError::MissingPayload)?;

    let bytes = match URL_SAFE_LENIENT.decode(segment) {
        Ok(bytes) => bytes,
        Err(url_safe_err) => STANDARD_LENIENT
            .decode(segment)
            .map_err(|_| url_safe_err)?,
    };

    Ok(serde_json::from_slice(&bytes)?)
}

/// Build an unsigned token carrying `claims`, for tests
#[cfg(test)]
pub(crate) fn unsigned_token(claims: &Value) -> String {
    use base64::engine::general_purpose::URL_SAFE_NO_PAD;

    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
