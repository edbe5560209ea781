//! Agrimarket command-line client.

#![forbid(unsafe_code)]

mod client_config;

use std::collections::BTreeMap;
use std::env;
use std::sync::Arc;

use agrimarket_application::{
    CredentialSession, ErrorStateStore, KeyValueStore, LoginFlow, LoginOutcome,
    NotificationQueue, RouteGuard, Routed,
};
use agrimarket_core::AppError;
use agrimarket_domain::{ApiErrorClassification, DashboardScope, FormValidation};
use agrimarket_infrastructure::{HttpAuthApi, JsonFileKeyValueStore};
use tracing::info;

use crate::client_config::{ClientConfig, init_tracing};

const USAGE: &str =
    "usage: agrimarket-client <login <email> <password> | logout | guard <scope> | whoami <scope>>";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Login { email: String, password: String },
    Logout,
    Guard { scope: DashboardScope },
    WhoAmI { scope: DashboardScope },
}

impl Command {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, AppError> {
        let command = match args.next().as_deref() {
            Some("login") => match (args.next(), args.next()) {
                (Some(email), Some(password)) => Self::Login { email, password },
                _ => return Err(usage()),
            },
            Some("logout") => Self::Logout,
            Some("guard") => Self::Guard {
                scope: DashboardScope::parse(args.next().unwrap_or_default().as_str()),
            },
            Some("whoami") => Self::WhoAmI {
                scope: DashboardScope::parse(args.next().unwrap_or_default().as_str()),
            },
            _ => return Err(usage()),
        };

        if args.next().is_some() {
            return Err(usage());
        }
        Ok(command)
    }
}

fn usage() -> AppError {
    AppError::Validation(USAGE.to_owned())
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let command = Command::parse(env::args().skip(1))?;
    let config = ClientConfig::load()?;
    let store: Arc<dyn KeyValueStore> =
        Arc::new(JsonFileKeyValueStore::open(config.storage_path.clone())?);

    info!(
        storage_path = %config.storage_path.display(),
        "agrimarket client starting"
    );

    match command {
        Command::Login { email, password } => login(&config, store, email, password).await,
        Command::Logout => {
            CredentialSession::new(store).logout()?;
            println!("signed out");
            Ok(())
        }
        Command::Guard { scope } => {
            let guard = RouteGuard::new(store);
            match guard.render(scope, || format!("{} dashboard", scope.as_str())) {
                Routed::View(view) => println!("granted: {view}"),
                Routed::Redirect(target) => println!("redirect: {target}"),
            }
            Ok(())
        }
        Command::WhoAmI { scope } => {
            let session = CredentialSession::new(store);
            match session.current_user(scope.credential_namespace())? {
                Some(profile) => println!(
                    "{} <{}> ({})",
                    profile.name,
                    profile.email,
                    profile.role.as_str()
                ),
                None => println!("not signed in"),
            }
            Ok(())
        }
    }
}

async fn login(
    config: &ClientConfig,
    store: Arc<dyn KeyValueStore>,
    email: String,
    password: String,
) -> Result<(), AppError> {
    let api_base_url = config.api_base_url()?;
    let http_client = reqwest::Client::builder()
        .timeout(config.http_timeout)
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let notifications = NotificationQueue::new(config.notification_queue_config());
    let flow = LoginFlow::new(
        Arc::new(HttpAuthApi::new(http_client, api_base_url)),
        CredentialSession::new(store),
        notifications.clone(),
        config.retry_policy(),
    );

    let values = BTreeMap::from([
        ("email".to_owned(), email),
        ("password".to_owned(), password),
    ]);
    let mut form = ErrorStateStore::new();
    let outcome = flow.login(&mut form, &values).await?;

    for toast in notifications.toasts() {
        match toast.title() {
            Some(title) => println!("[{}] {title}: {}", toast.kind().as_str(), toast.message()),
            None => println!("[{}] {}", toast.kind().as_str(), toast.message()),
        }
    }

    match outcome {
        LoginOutcome::SignedIn { profile, namespace } => {
            println!(
                "signed in as {} ({}) -> {}",
                profile.email,
                profile.role.as_str(),
                namespace.token_key()
            );
        }
        LoginOutcome::Invalid(FormValidation { errors }) => print_field_errors(&errors),
        LoginOutcome::Failed(ApiErrorClassification { field_errors, .. }) => {
            print_field_errors(&field_errors);
        }
        LoginOutcome::AlreadySubmitting => println!("a sign-in is already in progress"),
    }

    Ok(())
}

fn print_field_errors(errors: &BTreeMap<String, String>) {
    for (field, message) in errors {
        println!("{field}: {message}");
    }
}
