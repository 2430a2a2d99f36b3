use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::EmailError;
use crate::user::errors::NameError;
use crate::user::errors::PasswordPolicyError;

/// Public profile of an account plus its role flag.
///
/// Loaded from the credential store once per request and never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub is_admin: bool,
}

impl Identity {
    /// Fields embedded in tokens issued for this identity.
    pub fn subject(&self) -> auth::Subject {
        auth::Subject {
            id: self.id.0,
            first_name: self.first_name.as_str().to_string(),
            last_name: self.last_name.as_str().to_string(),
            email: self.email.as_str().to_string(),
            is_admin: self.is_admin,
        }
    }
}

/// Stored identity together with its password hash.
#[derive(Debug, Clone)]
pub struct Credential {
    pub identity: Identity,
    pub password_hash: String,
}

/// Row to insert at signup, password already hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password_hash: String,
    pub is_admin: bool,
}

/// Numeric user identifier assigned by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Email address type
///
/// Case-folded on construction: the store compares emails byte for byte, so
/// every lookup, insert and update must go through this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Create a new validated, lower-cased email address.
    ///
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: impl AsRef<str>) -> Result<Self, EmailError> {
        let normalized = email.as_ref().trim().to_lowercase();

        email_address::EmailAddress::from_str(&normalized)
            .map(|_| EmailAddress(normalized))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// First or last name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonName(String);

impl PersonName {
    const MAX_LENGTH: usize = 100;

    /// Create a trimmed, non-blank name.
    ///
    /// # Errors
    /// * `Blank` - Empty after trimming
    /// * `TooLong` - Longer than 100 characters
    pub fn new(name: impl AsRef<str>) -> Result<Self, NameError> {
        let name = name.as_ref().trim();
        let length = name.chars().count();

        if length == 0 {
            Err(NameError::Blank)
        } else if length > Self::MAX_LENGTH {
            Err(NameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(name.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password as submitted by the user.
///
/// Lives only for the duration of one request; `Debug` never prints it.
#[derive(Clone, PartialEq, Eq)]
pub struct RawPassword(String);

impl RawPassword {
    /// Argon2 itself has no practical limit; this bounds CPU per request.
    pub const MAX_LENGTH: usize = 1024;

    /// # Errors
    /// * `Empty` - Zero-length password
    /// * `TooLong` - More than 1024 bytes
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        if password.is_empty() {
            Err(PasswordPolicyError::Empty)
        } else if password.len() > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
                actual: password.len(),
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RawPassword(***)")
    }
}

/// Command to register a new account with domain types
#[derive(Debug, Clone)]
pub struct SignupCommand {
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub email: EmailAddress,
    pub password: RawPassword,
}

impl SignupCommand {
    pub fn new(
        first_name: PersonName,
        last_name: PersonName,
        email: EmailAddress,
        password: RawPassword,
    ) -> Self {
        Self {
            first_name,
            last_name,
            email,
            password,
        }
    }
}

/// Successful login: who logged in and the token they now carry.
#[derive(Debug, Clone)]
pub struct LoginResult {
    pub identity: Identity,
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_is_case_folded_and_trimmed() {
        let email = EmailAddress::new("  Ada@X.com ").unwrap();
        assert_eq!(email.as_str(), "ada@x.com");
    }

    #[test]
    fn test_email_rejects_garbage() {
        assert!(matches!(
            EmailAddress::new("not-an-email"),
            Err(EmailError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_person_name_rules() {
        assert_eq!(PersonName::new(" Ada ").unwrap().as_str(), "Ada");
        assert_eq!(PersonName::new("   "), Err(NameError::Blank));
        assert_eq!(
            PersonName::new("x".repeat(101)),
            Err(NameError::TooLong {
                max: 100,
                actual: 101
            })
        );
    }

    #[test]
    fn test_raw_password_rules() {
        assert_eq!(
            RawPassword::new(String::new()),
            Err(PasswordPolicyError::Empty)
        );
        assert!(matches!(
            RawPassword::new("a".repeat(1025)),
            Err(PasswordPolicyError::TooLong { .. })
        ));
        // Whitespace is significant and kept as typed.
        assert_eq!(RawPassword::new(" pw ".to_string()).unwrap().expose(), " pw ");
    }

    #[test]
    fn test_raw_password_debug_is_redacted() {
        let password = RawPassword::new("s3cret".to_string()).unwrap();
        assert!(!format!("{:?}", password).contains("s3cret"));
    }

    #[test]
    fn test_identity_subject() {
        let identity = Identity {
            id: UserId(9),
            first_name: PersonName::new("Ada").unwrap(),
            last_name: PersonName::new("Lovelace").unwrap(),
            email: EmailAddress::new("ada@x.com").unwrap(),
            is_admin: true,
        };

        let subject = identity.subject();
        assert_eq!(subject.id, 9);
        assert_eq!(subject.email, "ada@x.com");
        assert!(subject.is_admin);
    }
}
