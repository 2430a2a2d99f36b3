use async_trait::async_trait;
use auth::Claims;

use crate::domain::user::models::Credential;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Identity;
use crate::domain::user::models::LoginResult;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RawPassword;
use crate::domain::user::models::SignupCommand;
use crate::user::errors::MailerError;
use crate::user::errors::UserError;

/// Port for account domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new, non-admin account.
    ///
    /// # Errors
    /// * `DuplicateUser` - Email is already registered
    /// * `HashingFailure` - Password could not be hashed
    /// * `DatabaseError` - Database operation failed
    async fn signup(&self, command: SignupCommand) -> Result<Identity, UserError>;

    /// Register a new admin account on behalf of an existing admin.
    ///
    /// # Errors
    /// * `Denied` - `requested_by` is not an admin
    /// * `DuplicateUser` - Email is already registered
    /// * `HashingFailure` - Password could not be hashed
    /// * `DatabaseError` - Database operation failed
    async fn create_admin(
        &self,
        requested_by: &Claims,
        command: SignupCommand,
    ) -> Result<Identity, UserError>;

    /// Verify raw credentials and issue an access token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email, wrong password, or a password
    ///   longer than any stored one, indistinguishably
    /// * `HashingFailure` - Stored hash is malformed
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, UserError>;

    /// Same as `login`, then refuse non-admins.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `Denied` - Credentials are valid but the account is not an admin
    async fn admin_login(&self, email: &str, password: &str) -> Result<LoginResult, UserError>;

    /// Mail a password reset link to the account owner.
    ///
    /// # Returns
    /// The address the link was sent to
    ///
    /// # Errors
    /// * `UserNotFound` - No account with this email
    /// * `Mailer` - Delivery failed
    async fn request_password_reset(&self, email: &str) -> Result<EmailAddress, UserError>;

    /// Redeem a reset token and replace the stored password hash.
    ///
    /// Known limitations: the token is not consumed, so it can be redeemed
    /// again until its ttl runs out. Access tokens and reset tokens carry the
    /// same claims under the same secret, so either one works here.
    ///
    /// # Returns
    /// The address whose password was reset
    ///
    /// # Errors
    /// * `InvalidOrExpiredToken` - Token signature or expiry check failed
    /// * `UserNotFound` - Account disappeared since the token was issued
    async fn reset_password(
        &self,
        token: &str,
        new_password: RawPassword,
    ) -> Result<EmailAddress, UserError>;

    /// Case-insensitive substring search over full name and email.
    ///
    /// # Errors
    /// * `Denied` - `requested_by` is not an admin
    /// * `DatabaseError` - Database operation failed
    async fn search_users(
        &self,
        requested_by: &Claims,
        term: &str,
    ) -> Result<Vec<Identity>, UserError>;
}

/// Persistence operations for credentials.
///
/// Uniqueness of email and atomicity of updates are the store's job; the
/// service only interprets the outcome.
#[async_trait]
pub trait CredentialStore: Send + Sync + 'static {
    /// Retrieve identity and password hash by (case-folded) email.
    ///
    /// # Returns
    /// Optional credential (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Credential>, UserError>;

    /// Persist a new account.
    ///
    /// # Returns
    /// Identity with its store-assigned id
    ///
    /// # Errors
    /// * `DuplicateUser` - Email is already registered
    /// * `DatabaseError` - Database operation failed
    async fn insert(&self, user: NewUser) -> Result<Identity, UserError>;

    /// Replace the password hash for an email.
    ///
    /// # Returns
    /// Number of rows updated (0 when no such account)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn update_password_hash(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<u64, UserError>;

    /// List identities whose email or "first last" matches an ILIKE pattern.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn search(&self, pattern: &str) -> Result<Vec<Identity>, UserError>;
}

/// Outbound email delivery.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Send a plain-text message.
    ///
    /// # Errors
    /// * `InvalidAddress` - Recipient or sender could not be parsed
    /// * `BuildFailed` - Message could not be assembled
    /// * `DeliveryFailed` - Transport rejected the message
    async fn send(&self, to: &EmailAddress, subject: &str, body: &str)
        -> Result<(), MailerError>;
}
