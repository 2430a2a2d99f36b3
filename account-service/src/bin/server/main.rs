use std::sync::Arc;

use account_service::config::BootstrapAdminConfig;
use account_service::config::Config;
use account_service::domain::user::models::EmailAddress;
use account_service::domain::user::models::PersonName;
use account_service::domain::user::models::RawPassword;
use account_service::domain::user::models::SignupCommand;
use account_service::domain::user::service::UserService;
use account_service::inbound::http::router::create_router;
use account_service::outbound::mailer::SmtpMailer;
use account_service::outbound::repositories::PostgresUserRepository;
use account_service::user::errors::UserError;
use account_service::user::ports::CredentialStore;
use account_service::user::ports::Mailer;
use anyhow::Context;
use auth::Authenticator;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "account-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        smtp_host = %config.smtp.host,
        access_token_hours = config.jwt.expiration_hours,
        reset_token_minutes = config.password_reset.expiration_minutes,
        "Configuration loaded"
    );

    // A bad signing secret must stop the process before it listens.
    let authenticator = Arc::new(
        Authenticator::new(config.jwt.secret.as_bytes())
            .context("Invalid jwt.secret configuration")?,
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool));
    let mailer = Arc::new(SmtpMailer::new(&config.smtp)?);

    let user_service = Arc::new(UserService::new(
        user_repository,
        mailer,
        Arc::clone(&authenticator),
        config.service_settings(),
    ));

    if let Some(admin) = &config.bootstrap_admin {
        seed_admin(&user_service, admin).await?;
    }

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(user_service, authenticator);
    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}

async fn seed_admin<CS, M>(
    user_service: &UserService<CS, M>,
    admin: &BootstrapAdminConfig,
) -> Result<(), anyhow::Error>
where
    CS: CredentialStore,
    M: Mailer,
{
    let command = SignupCommand::new(
        PersonName::new(&admin.first_name)?,
        PersonName::new(&admin.last_name)?,
        EmailAddress::new(&admin.email)?,
        RawPassword::new(admin.password.clone())?,
    );

    match user_service.bootstrap_admin(command).await {
        Ok(identity) => {
            tracing::info!(user_id = %identity.id, email = %identity.email, "Bootstrap admin created");
        }
        Err(UserError::DuplicateUser(email)) => {
            tracing::debug!(email = %email, "Bootstrap admin already present");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
