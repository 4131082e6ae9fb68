// ============================
// crates/backend-lib/src/auth/token.rs
// ============================
//! Signed token issuance and parsing.
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Claims carried by every issued token. Access tokens carry a role;
/// refresh tokens do not. The `jti` makes every minted token string
/// unique, so same-second mints for one subject never collide in the
/// session record store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the account's login email
    pub sub: String,
    /// Role claim, access tokens only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// HMAC-SHA256 codec over compact three-segment tokens. The signing key
/// is injected at construction and immutable for the process lifetime.
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    header: Header,
    // signature-only validation; expiry is the caller's concern
    validation: Validation,
}

impl TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            header: Header::new(Algorithm::HS256),
            validation,
        }
    }

    /// Mint an access token carrying subject and role
    pub fn issue_access_token(
        &self,
        subject: &str,
        role: &str,
        ttl: Duration,
    ) -> Result<String, AppError> {
        self.issue(subject, Some(role.to_string()), ttl)
    }

    /// Mint a refresh token carrying the subject only
    pub fn issue_refresh_token(&self, subject: &str, ttl: Duration) -> Result<String, AppError> {
        self.issue(subject, None, ttl)
    }

    fn issue(
        &self,
        subject: &str,
        role: Option<String>,
        ttl: Duration,
    ) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: subject.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        jsonwebtoken::encode(&self.header, &claims, &self.encoding)
            .map_err(|e| AppError::Internal(format!("token signing failed: {e}")))
    }

    /// Whether the token parses and its signature verifies. Expiry is
    /// deliberately not checked here.
    pub fn is_structurally_valid(&self, token: &str) -> bool {
        self.decode(token).is_ok()
    }

    /// Whether the embedded expiry has passed. An unparseable token is
    /// an `InvalidToken` error, not a boolean.
    pub fn is_expired(&self, token: &str) -> Result<bool, AppError> {
        let claims = self.decode(token)?;
        Ok(claims.exp <= Utc::now().timestamp())
    }

    /// Extract the subject; fails if the token does not parse
    pub fn subject_of(&self, token: &str) -> Result<String, AppError> {
        Ok(self.decode(token)?.sub)
    }

    /// Extract the role claim, if present; fails if the token does not parse
    pub fn role_of(&self, token: &str) -> Result<Option<String>, AppError> {
        Ok(self.decode(token)?.role)
    }

    fn decode(&self, token: &str) -> Result<Claims, AppError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| AppError::InvalidToken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new(b"unit-test-secret")
    }

    #[test]
    fn test_access_token_roundtrip() {
        let codec = codec();
        let token = codec
            .issue_access_token("a@x.com", "CUSTOMER", Duration::minutes(15))
            .unwrap();

        assert!(codec.is_structurally_valid(&token));
        assert!(!codec.is_expired(&token).unwrap());
        assert_eq!(codec.subject_of(&token).unwrap(), "a@x.com");
        assert_eq!(codec.role_of(&token).unwrap().as_deref(), Some("CUSTOMER"));
    }

    #[test]
    fn test_refresh_token_has_no_role() {
        let codec = codec();
        let token = codec
            .issue_refresh_token("a@x.com", Duration::days(7))
            .unwrap();

        assert_eq!(codec.role_of(&token).unwrap(), None);
        assert_eq!(codec.subject_of(&token).unwrap(), "a@x.com");
    }

    #[test]
    fn test_same_second_mints_are_distinct() {
        let codec = codec();
        let a = codec
            .issue_refresh_token("a@x.com", Duration::days(7))
            .unwrap();
        let b = codec
            .issue_refresh_token("a@x.com", Duration::days(7))
            .unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_tampered_token_is_structurally_invalid() {
        let codec = codec();
        let token = codec
            .issue_access_token("a@x.com", "CUSTOMER", Duration::minutes(15))
            .unwrap();

        let mut tampered = token.clone();
        tampered.pop();
        assert!(!codec.is_structurally_valid(&tampered));

        // signed with a different key
        let other = TokenCodec::new(b"some-other-secret");
        assert!(!other.is_structurally_valid(&token));

        assert!(!codec.is_structurally_valid("not.a.token"));
        assert!(!codec.is_structurally_valid(""));
    }

    #[test]
    fn test_expiry_detection_ignores_validity_of_structure() {
        let codec = codec();
        let expired = codec
            .issue_access_token("a@x.com", "CUSTOMER", Duration::seconds(-10))
            .unwrap();

        // structurally fine, merely expired
        assert!(codec.is_structurally_valid(&expired));
        assert!(codec.is_expired(&expired).unwrap());
        // claims remain extractable after expiry
        assert_eq!(codec.subject_of(&expired).unwrap(), "a@x.com");
    }

    #[test]
    fn test_unparseable_token_errors_on_expiry_check() {
        let codec = codec();
        let err = codec.is_expired("garbage").unwrap_err();
        assert!(matches!(err, AppError::InvalidToken));

        assert!(matches!(
            codec.subject_of("garbage").unwrap_err(),
            AppError::InvalidToken
        ));
    }

    #[test]
    fn test_wire_format_is_three_segments() {
        let codec = codec();
        let token = codec
            .issue_refresh_token("a@x.com", Duration::days(7))
            .unwrap();
        assert_eq!(token.split('.').count(), 3);
    }
}
