use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::token::Claims;
use crate::token::Subject;
use crate::token::TokenCodec;
use crate::token::TokenError;

/// Authentication coordinator combining password verification and token issuance.
///
/// Holds the only copy of the signing key; build it once at startup and share
/// it behind an `Arc`.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    token_codec: TokenCodec,
}

/// Result of successful authentication.
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    /// Signed access token
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator.
    ///
    /// # Arguments
    /// * `signing_secret` - Secret key for token signing
    ///
    /// # Errors
    /// * `SecretTooShort` - The secret cannot safely sign HS256 tokens
    pub fn new(signing_secret: &[u8]) -> Result<Self, TokenError> {
        Ok(Self {
            password_hasher: PasswordHasher::new(),
            token_codec: TokenCodec::new(signing_secret)?,
        })
    }

    /// Hash a password for storage.
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Check a password against the stored hash of the account it claims.
    ///
    /// Pass `None` when no account matched: the call still burns one hash
    /// verification before answering `InvalidCredentials`, so callers cannot
    /// tell an unknown account from a wrong password.
    ///
    /// # Errors
    /// * `InvalidCredentials` - No account, or password does not match
    /// * `PasswordError` - Stored hash is malformed
    pub fn verify_credentials(
        &self,
        password: &str,
        stored_hash: Option<&str>,
    ) -> Result<(), AuthenticationError> {
        let is_valid = match stored_hash {
            Some(hash) => self.password_hasher.verify(password, hash)?,
            None => self.password_hasher.verify_dummy(password),
        };

        if !is_valid {
            return Err(AuthenticationError::InvalidCredentials);
        }

        Ok(())
    }

    /// Verify credentials and issue an access token for `subject`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Password does not match
    /// * `PasswordError` - Stored hash is malformed
    /// * `TokenError` - Token signing failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: &str,
        subject: &Subject,
        ttl: Duration,
    ) -> Result<AuthenticationResult, AuthenticationError> {
        self.verify_credentials(password, Some(stored_hash))?;

        let issued_at = Utc::now();
        let access_token = self.token_codec.issue_at(subject, issued_at, ttl)?;

        Ok(AuthenticationResult {
            access_token,
            expires_at: issued_at + ttl,
        })
    }

    /// Issue a token without password verification.
    ///
    /// Used for password reset links, where possession of the mailbox is the
    /// proof of identity.
    pub fn issue_token(&self, subject: &Subject, ttl: Duration) -> Result<String, TokenError> {
        self.token_codec.issue(subject, ttl)
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, TokenError> {
        self.token_codec.verify(token)
    }

    pub fn token_codec(&self) -> &TokenCodec {
        &self.token_codec
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn subject() -> Subject {
        Subject {
            id: 42,
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@x.com".to_string(),
            is_admin: false,
        }
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let result = authenticator
            .authenticate(password, &hash, &subject(), Duration::hours(24))
            .expect("Authentication failed");

        assert!(!result.access_token.is_empty());

        let decoded = authenticator
            .validate_token(&result.access_token)
            .expect("Token validation failed");
        assert_eq!(decoded.subject(), subject());
        assert_eq!(decoded.exp, result.expires_at.timestamp());
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = Authenticator::new(SECRET).unwrap();
        let hash = authenticator.hash_password("my_password").unwrap();

        let result =
            authenticator.authenticate("wrong_password", &hash, &subject(), Duration::hours(1));
        assert_eq!(
            result.map(|r| r.access_token),
            Err(AuthenticationError::InvalidCredentials)
        );
    }

    #[test]
    fn test_unknown_account_and_wrong_password_look_alike() {
        let authenticator = Authenticator::new(SECRET).unwrap();
        let hash = authenticator.hash_password("my_password").unwrap();

        let unknown = authenticator.verify_credentials("my_password", None);
        let wrong = authenticator.verify_credentials("not_it", Some(&hash));

        assert_eq!(unknown, Err(AuthenticationError::InvalidCredentials));
        assert_eq!(unknown, wrong);
        assert_eq!(unknown.unwrap_err().to_string(), "Invalid credentials");
    }

    #[test]
    fn test_malformed_stored_hash() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let result = authenticator.verify_credentials("pw", Some("plaintext"));
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(PasswordError::MalformedHash(_)))
        ));
    }

    #[test]
    fn test_issue_and_validate_token() {
        let authenticator = Authenticator::new(SECRET).unwrap();

        let token = authenticator
            .issue_token(&subject(), Duration::minutes(30))
            .expect("Failed to issue token");

        let decoded = authenticator
            .validate_token(&token)
            .expect("Failed to validate token");
        assert_eq!(decoded.email, "ada@x.com");
    }

    #[test]
    fn test_validate_invalid_token() {
        let authenticator = Authenticator::new(SECRET).unwrap();
        assert!(authenticator.validate_token("invalid.token.here").is_err());
    }
}
