#![allow(dead_code)]

use std::sync::Arc;
use std::sync::Mutex;

use account_service::domain::user::models::Credential;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::Identity;
use account_service::domain::user::models::NewUser;
use account_service::domain::user::models::PersonName;
use account_service::domain::user::models::RawPassword;
use account_service::domain::user::models::SignupCommand;
use account_service::domain::user::models::UserId;
use account_service::domain::user::service::UserService;
use account_service::domain::user::service::UserServiceSettings;
use account_service::inbound::http::router::create_router;
use account_service::user::errors::MailerError;
use account_service::user::errors::UserError;
use account_service::user::ports::CredentialStore;
use account_service::user::ports::Mailer;
use async_trait::async_trait;
use auth::Authenticator;
use axum::Router;
use chrono::Duration;
use serde_json::json;
use serde_json::Value;

pub const SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";
pub const RESET_BASE_URL: &str = "https://app.example.com/auth/forgot-password/reset";

/// Credential store backed by a vector, mirroring the Postgres constraints
/// the service relies on: unique email, case-insensitive search.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    rows: Mutex<Vec<Credential>>,
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_email(&self, email: &EmailAddress) -> Result<Option<Credential>, UserError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|c| &c.identity.email == email).cloned())
    }

    async fn insert(&self, user: NewUser) -> Result<Identity, UserError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.identity.email == user.email) {
            return Err(UserError::DuplicateUser(user.email.to_string()));
        }

        let identity = Identity {
            id: UserId(rows.len() as i64 + 1),
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            is_admin: user.is_admin,
        };
        rows.push(Credential {
            identity: identity.clone(),
            password_hash: user.password_hash,
        });

        Ok(identity)
    }

    async fn update_password_hash(
        &self,
        email: &EmailAddress,
        password_hash: &str,
    ) -> Result<u64, UserError> {
        let mut rows = self.rows.lock().unwrap();
        let mut updated = 0;
        for row in rows.iter_mut().filter(|c| &c.identity.email == email) {
            row.password_hash = password_hash.to_string();
            updated += 1;
        }
        Ok(updated)
    }

    async fn search(&self, pattern: &str) -> Result<Vec<Identity>, UserError> {
        let inner = pattern
            .strip_prefix('%')
            .and_then(|p| p.strip_suffix('%'))
            .unwrap_or(pattern);
        let needle = unescape_like(inner).to_lowercase();
        let rows = self.rows.lock().unwrap();

        Ok(rows
            .iter()
            .map(|c| &c.identity)
            .filter(|identity| {
                let full_name = format!(
                    "{} {}",
                    identity.first_name.as_str(),
                    identity.last_name.as_str()
                );
                identity.email.as_str().contains(&needle)
                    || full_name.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }
}

fn unescape_like(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Keeps every message instead of delivering it.
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<SentMail>>,
}

impl RecordingMailer {
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &EmailAddress, subject: &str, body: &str) -> Result<(), MailerError> {
        self.sent.lock().unwrap().push(SentMail {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}

/// Test application that spawns a real server over in-memory adapters
pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub mailer: Arc<RecordingMailer>,
    pub authenticator: Arc<Authenticator>,
    pub router: Router,
    user_service: Arc<UserService<InMemoryCredentialStore, RecordingMailer>>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let store = Arc::new(InMemoryCredentialStore::default());
        let mailer = Arc::new(RecordingMailer::default());
        let authenticator =
            Arc::new(Authenticator::new(SECRET).expect("Failed to build authenticator"));

        let user_service = Arc::new(UserService::new(
            store,
            Arc::clone(&mailer),
            Arc::clone(&authenticator),
            UserServiceSettings {
                access_token_ttl: Duration::hours(24),
                reset_token_ttl: Duration::minutes(30),
                reset_link_base_url: RESET_BASE_URL.to_string(),
            },
        ));

        let router = create_router(user_service.clone(), Arc::clone(&authenticator));

        // Spawn server in background
        let server = router.clone();
        tokio::spawn(async move {
            axum::serve(listener, server).await.expect("Server error");
        });

        Self {
            address,
            api_client: reqwest::Client::new(),
            mailer,
            authenticator,
            router,
            user_service,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Helper to make POST request with Bearer token
    pub fn post_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.post(path).bearer_auth(token)
    }

    pub async fn signup(&self, first_name: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/signup")
            .json(&json!({
                "first_name": first_name,
                "last_name": "Tester",
                "email": email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/login")
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Log in and return the access token, panicking on failure.
    pub async fn token_for(&self, email: &str, password: &str) -> String {
        let response = self.login(email, password).await;
        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.expect("Failed to parse response");
        body["data"]["token"].as_str().unwrap().to_string()
    }

    /// Seed an administrator the way the server does at startup.
    pub async fn seed_admin(&self, email: &str, password: &str) {
        let command = SignupCommand::new(
            PersonName::new("Root").unwrap(),
            PersonName::new("Admin").unwrap(),
            EmailAddress::new(email).unwrap(),
            RawPassword::new(password.to_string()).unwrap(),
        );
        self.user_service
            .bootstrap_admin(command)
            .await
            .expect("Failed to seed admin");
    }

    /// Token carried by the most recent reset email.
    pub fn last_reset_token(&self) -> String {
        let mail = self.mailer.sent().pop().expect("No email sent");
        let start = mail.body.find("token=").expect("No token in email") + "token=".len();
        mail.body[start..]
            .split_whitespace()
            .next()
            .unwrap()
            .to_string()
    }
}
