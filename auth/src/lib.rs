//! Credential authentication core
//!
//! Provides the pieces every request handler leans on:
//! - Password hashing (Argon2id)
//! - Signed, expiring identity tokens (HS256 JWT) with typed claims
//! - Credential verification coordinated with token issuance
//! - Admin authorization over verified claims
//!
//! Nothing here touches storage or the network. Services supply the user
//! record and decide what to do with the results.
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! let is_valid = hasher.verify("my_password", &hash).unwrap();
//! assert!(is_valid);
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{Subject, TokenCodec};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let subject = Subject {
//!     id: 1,
//!     first_name: "Ada".to_string(),
//!     last_name: "Lovelace".to_string(),
//!     email: "ada@x.com".to_string(),
//!     is_admin: false,
//! };
//! let token = codec.issue(&subject, Duration::hours(24)).unwrap();
//! let claims = codec.verify(&token).unwrap();
//! assert_eq!(claims.email, "ada@x.com");
//! ```
//!
//! ## Admin Guard
//! ```
//! use auth::guard::{authorize_admin, GuardError};
//! use auth::{Subject, TokenCodec};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!").unwrap();
//! let subject = Subject {
//!     id: 1,
//!     first_name: "Ada".to_string(),
//!     last_name: "Lovelace".to_string(),
//!     email: "ada@x.com".to_string(),
//!     is_admin: false,
//! };
//! let token = codec.issue(&subject, Duration::hours(1)).unwrap();
//! assert_eq!(authorize_admin(&codec, Some(&token)), Err(GuardError::Denied));
//! ```

pub mod authenticator;
pub mod guard;
pub mod password;
pub mod token;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::AuthenticationResult;
pub use authenticator::Authenticator;
pub use guard::GuardError;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use token::Claims;
pub use token::Subject;
pub use token::TokenCodec;
pub use token::TokenError;
