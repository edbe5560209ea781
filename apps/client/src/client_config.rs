use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use agrimarket_application::{NotificationQueueConfig, RetryPolicy};
use agrimarket_core::AppError;
use tracing_subscriber::EnvFilter;
use url::Url;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub storage_path: PathBuf,
    pub max_toasts: usize,
    pub http_timeout: Duration,
    pub max_retries: u32,
}

impl ClientConfig {
    pub fn load() -> Result<Self, AppError> {
        let storage_path = env::var("STORAGE_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map_or_else(|| PathBuf::from(".agrimarket/storage.json"), PathBuf::from);

        let max_toasts = parsed_env("MAX_TOASTS", 5_usize)?;
        if max_toasts == 0 {
            return Err(AppError::Validation(
                "MAX_TOASTS must be at least 1".to_owned(),
            ));
        }

        let http_timeout = Duration::from_secs(parsed_env("HTTP_TIMEOUT_SECONDS", 15_u64)?);
        let max_retries = parsed_env("MAX_RETRIES", 3_u32)?;

        Ok(Self {
            storage_path,
            max_toasts,
            http_timeout,
            max_retries,
        })
    }

    /// Reads the backend base url. Only commands that reach the backend need it.
    pub fn api_base_url(&self) -> Result<Url, AppError> {
        let raw_base_url = required_non_empty_env("API_BASE_URL")?;
        parse_base_url(raw_base_url.as_str())
    }

    pub fn notification_queue_config(&self) -> NotificationQueueConfig {
        NotificationQueueConfig {
            max_toasts: self.max_toasts,
            ..NotificationQueueConfig::default()
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            ..RetryPolicy::default()
        }
    }
}

fn parse_base_url(raw_base_url: &str) -> Result<Url, AppError> {
    let api_base_url = Url::parse(raw_base_url).map_err(|error| {
        AppError::Validation(format!("invalid API_BASE_URL '{raw_base_url}': {error}"))
    })?;
    if api_base_url.cannot_be_a_base() {
        return Err(AppError::Validation(format!(
            "API_BASE_URL '{raw_base_url}' must be an http(s) base url"
        )));
    }

    Ok(api_base_url)
}

fn required_env(name: &str) -> Result<String, AppError> {
    env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))
}

fn required_non_empty_env(name: &str) -> Result<String, AppError> {
    let value = required_env(name)?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parsed_env<T>(name: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value
            .trim()
            .parse::<T>()
            .map_err(|error| AppError::Validation(format!("invalid {name}: {error}"))),
        _ => Ok(default),
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
