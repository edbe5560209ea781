//! Ports implemented by infrastructure adapters.

use agrimarket_core::AppResult;
use agrimarket_domain::{ApiFailure, UserProfile};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// String-keyed persistent storage shared by every part of the client.
///
/// Implementations must tolerate removing keys that do not exist.
pub trait KeyValueStore: Send + Sync {
    /// Reads one value.
    fn get(&self, key: &str) -> AppResult<Option<String>>;

    /// Writes one value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> AppResult<()>;

    /// Deletes one value.
    fn remove(&self, key: &str) -> AppResult<()>;
}

/// Email/password sign-in payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginRequest {
    /// Sign-in email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
}

/// Successful sign-in response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    /// Credential token for the user's namespace.
    pub token: String,
    /// Signed-in user.
    pub user: UserProfile,
}

/// Backend authentication endpoints.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Signs a user in.
    async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiFailure>;
}
