//! Email/password sign-in flow tying validation, error state, toasts and
//! credential storage together.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use agrimarket_core::AppResult;
use agrimarket_domain::{
    ApiErrorClassification, CredentialNamespace, ErrorContext, FormSchema, FormValidation,
    ToastOptions, UserProfile,
};
use tracing::info;

use crate::{
    AuthApi, CredentialSession, ErrorStateStore, LoginRequest, LoginResponse, NotificationQueue,
    RetryPolicy, run_submission,
};


const SIGNING_IN_MESSAGE: &str = "Connexion en cours...";
const SIGNED_IN_MESSAGE: &str = "Connexion réussie";

/// Result of one sign-in attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// A previous submission is still in flight; nothing was done.
    AlreadySubmitting,
    /// The form did not pass local validation; the API was not called.
    Invalid(FormValidation),
    /// Credentials were stored.
    SignedIn {
        /// Signed-in user.
        profile: UserProfile,
        /// Namespace the token was written to.
        namespace: CredentialNamespace,
    },
    /// The backend rejected the attempt or could not be reached.
    Failed(ApiErrorClassification),
}

/// Sign-in flow for every role.
#[derive(Clone)]
pub struct LoginFlow {
    api: Arc<dyn AuthApi>,
    session: CredentialSession,
    notifications: NotificationQueue,
    retry_policy: RetryPolicy,
}

impl LoginFlow {
    /// Creates a sign-in flow.
    #[must_use]
    pub fn new(
        api: Arc<dyn AuthApi>,
        session: CredentialSession,
        notifications: NotificationQueue,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            api,
            session,
            notifications,
            retry_policy,
        }
    }

    /// Submits the login form.
    ///
    /// Transient failures are retried with backoff before being reported.
    /// Only storage failures are returned as errors.
    pub async fn login(
        &self,
        form: &mut ErrorStateStore,
        values: &BTreeMap<String, String>,
    ) -> AppResult<LoginOutcome> {
        if form.is_submitting() {
            return Ok(LoginOutcome::AlreadySubmitting);
        }

        form.clear_errors();
        let validation = form.validate_form(values, &FormSchema::login());
        if !validation.is_valid() {
            return Ok(LoginOutcome::Invalid(validation));
        }

        let request = LoginRequest {
            email: field_value(values, "email").trim().to_owned(),
            password: field_value(values, "password").to_owned(),
        };

        let loading_toast = self
            .notifications
            .loading(SIGNING_IN_MESSAGE, ToastOptions::default());
        let outcome = self.attempt(form, &request).await;
        self.notifications.remove(loading_toast);

        match outcome {
            Ok(response) => {
                let namespace = self.session.store_login(&response)?;
                self.notifications
                    .success(SIGNED_IN_MESSAGE, ToastOptions::default());
                info!(
                    user_id = %response.user.id,
                    role = response.user.role.as_str(),
                    "user signed in"
                );

                Ok(LoginOutcome::SignedIn {
                    profile: response.user,
                    namespace,
                })
            }
            Err(classification) => Ok(LoginOutcome::Failed(classification)),
        }
    }

    async fn attempt(
        &self,
        form: &mut ErrorStateStore,
        request: &LoginRequest,
    ) -> Result<LoginResponse, ApiErrorClassification> {
        let failure = match run_submission(form, self.api.login(request)).await {
            Ok(response) => return Ok(response),
            Err(failure) => failure,
        };

        if failure.is_transient() && self.retry_policy.max_retries > 0 {
            let last_failure = Mutex::new(failure.clone());
            let slot = &last_failure;
            let retried = form
                .handle_error_with_retry(failure, ErrorContext::Login, self.retry_policy, move || {
                    let attempt = self.api.login(request);
                    async move {
                        let outcome = attempt.await;
                        if let Err(failure) = &outcome {
                            *slot.lock().unwrap_or_else(PoisonError::into_inner) = failure.clone();
                        }
                        outcome
                    }
                })
                .await;
            if retried.is_err() {
                let last_failure = last_failure
                    .into_inner()
                    .unwrap_or_else(PoisonError::into_inner);
                self.notifications.show_auth_error(&last_failure);
            }
            return retried;
        }

        let classification = form.handle_api_error(&failure, ErrorContext::Login);
        self.notifications.show_auth_error(&failure);
        Err(classification)
    }
}

fn field_value<'a>(values: &'a BTreeMap<String, String>, field: &str) -> &'a str {
    values.get(field).map_or("", String::as_str)
}
