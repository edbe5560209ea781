//! Domain values and pure rules for the marketplace client.

#![forbid(unsafe_code)]

mod api_failure;
mod dashboard;
mod toast;
mod user;
mod validation;

pub use api_failure::{
    AUTH_ERROR_TITLE, ApiErrorClassification, ApiFailure, EMAIL_TAKEN_MESSAGE, ErrorBody,
    ErrorContext, FieldMessage, GENERAL_FIELD, HttpFailureKind, MessageHint,
    NETWORK_FAILURE_MESSAGE, SETUP_FAILURE_MESSAGE, UNEXPECTED_FAILURE_MESSAGE,
    auth_error_message, classify,
};
pub use dashboard::{ADMIN_LOGIN_PATH, CredentialNamespace, DashboardScope, LOGIN_PATH};
pub use toast::{Toast, ToastAction, ToastId, ToastKind, ToastOptions, ToastPosition, ToastSpec};
pub use user::{UserProfile, UserRole};
pub use validation::{
    FieldKind, FieldPattern, FormSchema, FormValidation, INVALID_EMAIL_MESSAGE,
    INVALID_FORMAT_MESSAGE, INVALID_PHONE_MESSAGE, PASSWORD_DIGIT_MESSAGE,
    PASSWORD_LOWERCASE_MESSAGE, PASSWORD_MIN_LENGTH, PASSWORD_TOO_SHORT_MESSAGE,
    PASSWORD_UPPERCASE_MESSAGE, REQUIRED_MESSAGE, ValidationRule, is_valid_email,
    is_valid_phone, min_length_message, validate_field, validate_form,
};
