use std::sync::Arc;

use async_trait::async_trait;
use auth::Authenticator;
use auth::Claims;
use chrono::Duration;

use crate::domain::user::emails::reset_link;
use crate::domain::user::emails::ResetPasswordEmail;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::Identity;
use crate::domain::user::models::LoginResult;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::RawPassword;
use crate::domain::user::models::SignupCommand;
use crate::user::errors::UserError;
use crate::user::ports::CredentialStore;
use crate::user::ports::Mailer;
use crate::user::ports::UserServicePort;

/// Token lifetimes and link settings for the account service.
#[derive(Debug, Clone)]
pub struct UserServiceSettings {
    pub access_token_ttl: Duration,
    pub reset_token_ttl: Duration,
    pub reset_link_base_url: String,
}

/// Domain service implementation for account operations.
///
/// Concrete implementation of UserServicePort with dependency injection.
/// Holds no mutable state of its own; the credential store is the only shared
/// resource it writes to.
pub struct UserService<CS, M>
where
    CS: CredentialStore,
    M: Mailer,
{
    store: Arc<CS>,
    mailer: Arc<M>,
    authenticator: Arc<Authenticator>,
    settings: UserServiceSettings,
}

impl<CS, M> UserService<CS, M>
where
    CS: CredentialStore,
    M: Mailer,
{
    /// Create a new account service with injected dependencies.
    ///
    /// # Arguments
    /// * `store` - Credential persistence implementation
    /// * `mailer` - Outbound email implementation
    /// * `authenticator` - Hasher and token codec built from the signing secret
    /// * `settings` - Token lifetimes and reset link base
    pub fn new(
        store: Arc<CS>,
        mailer: Arc<M>,
        authenticator: Arc<Authenticator>,
        settings: UserServiceSettings,
    ) -> Self {
        Self {
            store,
            mailer,
            authenticator,
            settings,
        }
    }

    /// Create an admin without an acting admin. Used once at startup to seed
    /// the first administrator.
    pub async fn bootstrap_admin(&self, command: SignupCommand) -> Result<Identity, UserError> {
        self.register(command, true).await
    }

    async fn register(
        &self,
        command: SignupCommand,
        is_admin: bool,
    ) -> Result<Identity, UserError> {
        let password = command.password;
        let password_hash = self
            .with_authenticator(move |authenticator| {
                Ok(authenticator.hash_password(password.expose())?)
            })
            .await?;

        let user = NewUser {
            first_name: command.first_name,
            last_name: command.last_name,
            email: command.email,
            password_hash,
            is_admin,
        };

        let identity = self.store.insert(user).await?;

        tracing::info!(
            user_id = %identity.id,
            email = %identity.email,
            is_admin,
            "Account created"
        );

        Ok(identity)
    }

    /// Run hashing work on the blocking pool so it never stalls the executor.
    async fn with_authenticator<T, F>(&self, task: F) -> Result<T, UserError>
    where
        F: FnOnce(&Authenticator) -> Result<T, UserError> + Send + 'static,
        T: Send + 'static,
    {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || task(&authenticator))
            .await
            .map_err(|e| UserError::Unknown(format!("Hashing task failed: {}", e)))?
    }
}

#[async_trait]
impl<CS, M> UserServicePort for UserService<CS, M>
where
    CS: CredentialStore,
    M: Mailer,
{
    async fn signup(&self, command: SignupCommand) -> Result<Identity, UserError> {
        self.register(command, false).await
    }

    async fn create_admin(
        &self,
        requested_by: &Claims,
        command: SignupCommand,
    ) -> Result<Identity, UserError> {
        auth::guard::require_admin(requested_by).map_err(|e| {
            tracing::warn!(requested_by = %requested_by.email, "Unauthorised admin creation");
            UserError::from(e)
        })?;

        self.register(command, true).await
    }

    async fn login(&self, email: &str, password: &str) -> Result<LoginResult, UserError> {
        // No stored password can be longer, so there is nothing to hash.
        if password.len() > RawPassword::MAX_LENGTH {
            tracing::info!(email = %email, "Invalid credentials");
            return Err(UserError::InvalidCredentials);
        }

        // A malformed email cannot match any account; treat it like an unknown one.
        let credential = match EmailAddress::new(email) {
            Ok(email) => self.store.find_by_email(&email).await?,
            Err(_) => None,
        };

        let password = password.to_string();
        let ttl = self.settings.access_token_ttl;

        let result = self
            .with_authenticator(move |authenticator| match credential {
                Some(credential) => {
                    let authenticated = authenticator.authenticate(
                        &password,
                        &credential.password_hash,
                        &credential.identity.subject(),
                        ttl,
                    )?;

                    Ok(LoginResult {
                        identity: credential.identity,
                        access_token: authenticated.access_token,
                        expires_at: authenticated.expires_at,
                    })
                }
                None => {
                    authenticator.verify_credentials(&password, None)?;
                    Err(UserError::InvalidCredentials)
                }
            })
            .await;

        match &result {
            Ok(login) => {
                tracing::info!(user_id = %login.identity.id, email = %login.identity.email, "Login successful")
            }
            Err(UserError::InvalidCredentials) => {
                tracing::info!(email = %email, "Invalid credentials")
            }
            Err(e) => tracing::error!(email = %email, error = %e, "Login failed"),
        }

        result
    }

    async fn admin_login(&self, email: &str, password: &str) -> Result<LoginResult, UserError> {
        let login = self.login(email, password).await?;

        if !login.identity.is_admin {
            tracing::warn!(email = %login.identity.email, "Unauthorised admin access");
            return Err(UserError::Denied);
        }

        Ok(login)
    }

    async fn request_password_reset(&self, email: &str) -> Result<EmailAddress, UserError> {
        let email = EmailAddress::new(email)?;

        let identity = self
            .store
            .find_by_email(&email)
            .await?
            .map(|credential| credential.identity)
            .ok_or_else(|| {
                tracing::info!(email = %email, "Password reset requested for unknown user");
                UserError::UserNotFound(email.to_string())
            })?;

        let ttl = self.settings.reset_token_ttl;
        let token = self
            .authenticator
            .issue_token(&identity.subject(), ttl)
            .map_err(|e| UserError::TokenSigningFailure(e.to_string()))?;

        let link = reset_link(&self.settings.reset_link_base_url, &token);
        let message = ResetPasswordEmail::new(&identity.first_name, &link, ttl.num_minutes());

        self.mailer
            .send(&identity.email, &message.subject, &message.body)
            .await
            .map_err(|e| {
                tracing::error!(email = %identity.email, error = %e, "Reset email could not be sent");
                UserError::from(e)
            })?;

        tracing::info!(user_id = %identity.id, email = %identity.email, "Reset password email sent");

        Ok(identity.email)
    }

    async fn reset_password(
        &self,
        token: &str,
        new_password: RawPassword,
    ) -> Result<EmailAddress, UserError> {
        let claims = self.authenticator.validate_token(token).map_err(|e| {
            tracing::warn!(error = %e, "Rejected password reset token");
            UserError::InvalidOrExpiredToken
        })?;

        let email =
            EmailAddress::new(&claims.email).map_err(|_| UserError::InvalidOrExpiredToken)?;

        let password_hash = self
            .with_authenticator(move |authenticator| {
                Ok(authenticator.hash_password(new_password.expose())?)
            })
            .await?;

        let updated = self
            .store
            .update_password_hash(&email, &password_hash)
            .await?;

        if updated == 0 {
            tracing::info!(email = %email, "Password reset for missing user");
            return Err(UserError::UserNotFound(email.to_string()));
        }

        tracing::info!(email = %email, "Password reset");

        Ok(email)
    }

    async fn search_users(
        &self,
        requested_by: &Claims,
        term: &str,
    ) -> Result<Vec<Identity>, UserError> {
        auth::guard::require_admin(requested_by).map_err(|e| {
            tracing::warn!(requested_by = %requested_by.email, "Unauthorised user search");
            UserError::from(e)
        })?;

        let users = self.store.search(&like_pattern(term)).await?;

        tracing::info!(
            requested_by = %requested_by.email,
            count = users.len(),
            "Users fetched"
        );

        Ok(users)
    }
}

/// `%term%` with LIKE wildcards in `term` matched literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
