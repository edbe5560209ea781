//! Per-form error state: field messages, the submitting flag and API error
//! classification.

use std::collections::BTreeMap;
use std::future::Future;
use std::time::Duration;

use agrimarket_domain::{
    ApiErrorClassification, ApiFailure, ErrorContext, FormSchema, FormValidation, ValidationRule,
    classify, validate_field, validate_form,
};
use tracing::{debug, warn};

use crate::run_submission;

/// Retry settings for [`ErrorStateStore::handle_error_with_retry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of additional attempts.
    pub max_retries: u32,
    /// Delay before the first retry; doubles for every following one.
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Creates a policy.
    #[must_use]
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// Returns the backoff before the zero-based retry `attempt`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

/// Mutable error state backing one form.
///
/// An absent key and an empty message both mean "no error" for that field.
#[derive(Debug, Clone, Default)]
pub struct ErrorStateStore {
    errors: BTreeMap<String, String>,
    is_submitting: bool,
}

impl ErrorStateStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all field errors.
    #[must_use]
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Returns the error for one field, ignoring empty messages.
    #[must_use]
    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors
            .get(field)
            .map(String::as_str)
            .filter(|message| !message.is_empty())
    }

    /// Returns whether any field has a non-empty error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors.values().any(|message| !message.is_empty())
    }

    /// Returns whether a submission is in flight.
    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    /// Sets the error for one field, replacing any previous one.
    pub fn set_field_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.insert(field.into(), message.into());
    }

    /// Removes the error for one field. No-op when the field has none.
    pub fn clear_error(&mut self, field: &str) {
        self.errors.remove(field);
    }

    /// Removes every error.
    pub fn clear_errors(&mut self) {
        self.errors.clear();
    }

    /// Merges errors into the current state; incoming messages win.
    pub fn set_multiple_errors(&mut self, errors: BTreeMap<String, String>) {
        self.errors.extend(errors);
    }

    /// Sets the submitting flag.
    pub fn set_loading(&mut self, loading: bool) {
        self.is_submitting = loading;
    }

    /// Validates the current value of one field and records the outcome.
    ///
    /// Call this with the latest input value on every change; the previous
    /// result for the field is always overwritten.
    pub fn validate_field(
        &mut self,
        field: &str,
        value: &str,
        rule: &ValidationRule,
    ) -> Option<String> {
        let message = validate_field(field, value, rule);
        match &message {
            Some(message) => self.set_field_error(field, message.clone()),
            None => self.clear_error(field),
        }

        message
    }

    /// Validates a whole form and records the outcome for every schema field.
    ///
    /// Errors of fields outside the schema are left untouched.
    pub fn validate_form(
        &mut self,
        values: &BTreeMap<String, String>,
        schema: &FormSchema,
    ) -> FormValidation {
        let validation = validate_form(values, schema);
        for (field, _) in schema.iter() {
            if !validation.errors.contains_key(field) {
                self.clear_error(field);
            }
        }
        self.set_multiple_errors(validation.errors.clone());

        validation
    }

    /// Classifies a failed call and merges its field errors into the store.
    ///
    /// The returned general message is meant to be surfaced as a toast.
    pub fn handle_api_error(
        &mut self,
        failure: &ApiFailure,
        context: ErrorContext,
    ) -> ApiErrorClassification {
        let classification = classify(failure, context);
        debug!(
            failure = %failure,
            context = ?context,
            fields = classification.field_errors.len(),
            "classified api failure"
        );
        self.set_multiple_errors(classification.field_errors.clone());

        classification
    }

    /// Retries a failed call with exponential backoff.
    ///
    /// Attempts run one after another; the submitting flag is held for the
    /// backoff and the attempt and released on every exit, including when
    /// the returned future is dropped mid-retry. When every retry fails
    /// the last failure is classified like [`Self::handle_api_error`].
    pub async fn handle_error_with_retry<T, F, Fut>(
        &mut self,
        failure: ApiFailure,
        context: ErrorContext,
        policy: RetryPolicy,
        mut retry: F,
    ) -> Result<T, ApiErrorClassification>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiFailure>>,
    {
        let mut last_failure = failure;

        for attempt in 0..policy.max_retries {
            let delay = policy.delay_for(attempt);
            let next = &mut retry;
            let outcome = run_submission(self, async move {
                tokio::time::sleep(delay).await;
                next().await
            })
            .await;

            match outcome {
                Ok(value) => return Ok(value),
                Err(failure) => {
                    warn!(
                        attempt = attempt + 1,
                        max_retries = policy.max_retries,
                        failure = %failure,
                        "retry attempt failed"
                    );
                    last_failure = failure;
                }
            }
        }

        Err(self.handle_api_error(&last_failure, context))
    }
}
