//! Role-scoped credential persistence.

use std::sync::Arc;

use agrimarket_core::{AppError, AppResult, NonEmptyString};
use agrimarket_domain::{CredentialNamespace, UserProfile};
use tracing::{info, warn};

use crate::{KeyValueStore, LoginResponse};

/// Reads and writes credential tokens and profiles per namespace.
///
/// A sign-in writes exactly the namespace matching the user's role; other
/// namespaces are never touched.
#[derive(Clone)]
pub struct CredentialSession {
    store: Arc<dyn KeyValueStore>,
}

impl CredentialSession {
    /// Creates a session over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Persists a successful sign-in and returns the namespace written.
    pub fn store_login(&self, response: &LoginResponse) -> AppResult<CredentialNamespace> {
        let token = NonEmptyString::new(response.token.as_str())?;
        let namespace = response.user.role.credential_namespace();
        let profile = serde_json::to_string(&response.user).map_err(|error| {
            AppError::Internal(format!("failed to serialize user profile: {error}"))
        })?;

        self.store.set(namespace.token_key(), token.as_str())?;
        self.store.set(namespace.user_key(), profile.as_str())?;

        info!(
            user_id = %response.user.id,
            role = response.user.role.as_str(),
            token_key = namespace.token_key(),
            "stored credentials"
        );
        Ok(namespace)
    }

    /// Returns the token stored for a namespace.
    pub fn token(&self, namespace: CredentialNamespace) -> AppResult<Option<String>> {
        Ok(self
            .store
            .get(namespace.token_key())?
            .filter(|token| !token.is_empty()))
    }

    /// Returns the profile stored for a namespace.
    ///
    /// A profile that no longer parses is reported as absent.
    pub fn current_user(&self, namespace: CredentialNamespace) -> AppResult<Option<UserProfile>> {
        let Some(raw) = self.store.get(namespace.user_key())? else {
            return Ok(None);
        };

        match serde_json::from_str(raw.as_str()) {
            Ok(profile) => Ok(Some(profile)),
            Err(error) => {
                warn!(
                    user_key = namespace.user_key(),
                    error = %error,
                    "ignoring unreadable stored profile"
                );
                Ok(None)
            }
        }
    }

    /// Removes the token and profile of every namespace.
    ///
    /// Every key is attempted even if an earlier removal fails; the first
    /// failure is returned.
    pub fn logout(&self) -> AppResult<()> {
        let mut first_error = None;

        for namespace in CredentialNamespace::all() {
            for key in [namespace.token_key(), namespace.user_key()] {
                if let Err(error) = self.store.remove(key) {
                    warn!(key, error = %error, "failed to remove credential key");
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => {
                info!("cleared all credentials");
                Ok(())
            }
        }
    }
}
