use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;

use super::claims::Claims;
use super::claims::Subject;
use super::errors::TokenError;

/// Minimum signing secret length for HS256 (256 bits).
pub const MIN_SECRET_LENGTH: usize = 32;

/// Issues and verifies signed identity tokens.
///
/// Tokens are compact JWTs signed with HS256. Nothing is persisted: a token is
/// valid exactly as long as its signature checks out and its `exp` lies in the
/// future. Rotating the secret invalidates every outstanding token.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from the process-wide signing secret.
    ///
    /// # Errors
    /// * `SecretTooShort` - Secret is shorter than [`MIN_SECRET_LENGTH`] bytes
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(TokenError::SecretTooShort {
                min: MIN_SECRET_LENGTH,
                actual: secret.len(),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `verify_at` against our own clock, with no leeway
        // and the boundary second counted as expired.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            header: Header::new(Algorithm::HS256),
            validation,
        })
    }

    /// Issue a token for `subject` valid for `ttl` from now.
    pub fn issue(&self, subject: &Subject, ttl: Duration) -> Result<String, TokenError> {
        self.issue_at(subject, Utc::now(), ttl)
    }

    /// Issue a token as if the current time were `issued_at`.
    ///
    /// # Errors
    /// * `ExpiryOutOfRange` - `ttl` is too large to produce an expiry
    /// * `SigningFailed` - The signing key could not produce a signature
    pub fn issue_at(
        &self,
        subject: &Subject,
        issued_at: DateTime<Utc>,
        ttl: Duration,
    ) -> Result<String, TokenError> {
        let claims = Claims::new(subject, issued_at, ttl)?;

        encode(&self.header, &claims, &self.encoding_key)
            .map_err(|e| TokenError::SigningFailed(e.to_string()))
    }

    /// Verify a token's signature and expiry and decode its claims.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify a token as if the current time were `now`.
    ///
    /// # Errors
    /// * `InvalidToken` - Malformed token, bad signature, or incomplete payload
    /// * `TokenExpired` - `now` is at or past the token's `exp`
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| TokenError::InvalidToken(e.to_string()))?;

        let claims = token_data.claims;
        if claims.is_expired(now.timestamp()) {
            tracing::debug!(exp = claims.exp, now = now.timestamp(), "Token expired");
            return Err(TokenError::TokenExpired);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"my_secret_key_at_least_32_bytes_long!";

    fn subject(is_admin: bool) -> Subject {
        Subject {
            id: 1,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@x.com".to_string(),
            is_admin,
        }
    }

    #[test]
    fn test_issue_and_verify() {
        let codec = TokenCodec::new(SECRET).unwrap();

        let token = codec
            .issue(&subject(false), Duration::hours(1))
            .expect("Failed to issue token");
        assert!(!token.is_empty());

        let claims = codec.verify(&token).expect("Failed to verify token");
        assert_eq!(claims.subject(), subject(false));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = TokenCodec::new(b"too-short");
        assert!(matches!(
            result,
            Err(TokenError::SecretTooShort { min: 32, actual: 9 })
        ));
    }

    #[test]
    fn test_issue_with_oversized_ttl_is_an_error() {
        let codec = TokenCodec::new(SECRET).unwrap();

        let result = codec.issue(&subject(false), Duration::seconds(i64::MAX / 1000));

        assert_eq!(result, Err(TokenError::ExpiryOutOfRange));
    }

    #[test]
    fn test_verify_after_ttl_fails() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let issued_at = Utc::now() - Duration::hours(2);

        let token = codec
            .issue_at(&subject(false), issued_at, Duration::hours(1))
            .unwrap();

        assert_eq!(codec.verify(&token), Err(TokenError::TokenExpired));
    }

    #[test]
    fn test_verify_rejects_exact_expiry_boundary() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let issued_at = Utc::now();
        let ttl = Duration::minutes(15);

        let token = codec.issue_at(&subject(false), issued_at, ttl).unwrap();

        let just_before = issued_at + ttl - Duration::seconds(1);
        assert!(codec.verify_at(&token, just_before).is_ok());

        let boundary = issued_at + ttl;
        assert_eq!(
            codec.verify_at(&token, boundary),
            Err(TokenError::TokenExpired)
        );
    }

    #[test]
    fn test_verify_invalid_token() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let result = codec.verify("invalid.token.here");
        assert!(matches!(result, Err(TokenError::InvalidToken(_))));
    }

    #[test]
    fn test_verify_with_wrong_secret() {
        let codec1 = TokenCodec::new(b"secret1_at_least_32_bytes_long_key!").unwrap();
        let codec2 = TokenCodec::new(b"secret2_at_least_32_bytes_long_key!").unwrap();

        let token = codec1.issue(&subject(false), Duration::hours(1)).unwrap();

        assert!(matches!(
            codec2.verify(&token),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_tampered_signature_fails() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let token = codec.issue(&subject(false), Duration::hours(1)).unwrap();

        let signature_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.into_bytes();
        bytes[signature_start] = if bytes[signature_start] == b'A' {
            b'B'
        } else {
            b'A'
        };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(matches!(
            codec.verify(&tampered),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_swapped_payload_fails() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let user_token = codec.issue(&subject(false), Duration::hours(1)).unwrap();
        let admin_token = codec.issue(&subject(true), Duration::hours(1)).unwrap();

        let user_parts: Vec<&str> = user_token.split('.').collect();
        let admin_parts: Vec<&str> = admin_token.split('.').collect();
        let forged = format!("{}.{}.{}", user_parts[0], admin_parts[1], user_parts[2]);

        assert!(matches!(
            codec.verify(&forged),
            Err(TokenError::InvalidToken(_))
        ));
    }

    #[test]
    fn test_unsigned_token_is_rejected() {
        let codec = TokenCodec::new(SECRET).unwrap();
        let token = codec.issue(&subject(true), Duration::hours(1)).unwrap();

        // {"alg":"none","typ":"JWT"}
        let payload = token.split('.').nth(1).unwrap();
        let forged = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

        assert!(codec.verify(&forged).is_err());
    }
}
