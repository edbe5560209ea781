//! Backend failure model and its classification into user-facing messages.
//!
//! A failed API call reaches the client in one of three shapes: the server
//! answered with an error status, the request left but nothing came back, or
//! the request could not even be built. Classification is a pure function of
//! that shape; callers decide where the resulting messages go.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Field key used for errors that belong to the form as a whole.
pub const GENERAL_FIELD: &str = "general";

/// Per-field message as sent by the backend.
///
/// The backend usually sends `{ "message": "..." }` objects but bare strings
/// are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldMessage {
    /// `{ "message": "..." }` form.
    Detailed {
        /// Message text.
        message: String,
    },
    /// Bare string form.
    Plain(String),
}

impl FieldMessage {
    /// Returns the message text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Detailed { message } | Self::Plain(message) => message.as_str(),
        }
    }
}

/// JSON body of an error response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Free-text server message.
    #[serde(default)]
    pub message: Option<String>,
    /// Structured per-field validation errors.
    #[serde(default)]
    pub errors: BTreeMap<String, FieldMessage>,
}

impl ErrorBody {
    /// Creates a body carrying only a message.
    #[must_use]
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            errors: BTreeMap::new(),
        }
    }

    /// Parses a response body, keeping whatever parts have the expected shape.
    ///
    /// `message` and `errors` are read independently. Field entries that are
    /// neither `{ "message": ... }` nor a string are skipped, and a body that
    /// is not a JSON object degrades to an empty body.
    #[must_use]
    pub fn from_json_lenient(bytes: &[u8]) -> Self {
        let Ok(Value::Object(mut object)) = serde_json::from_slice::<Value>(bytes) else {
            return Self::default();
        };

        let message = match object.remove("message") {
            Some(Value::String(message)) => Some(message),
            _ => None,
        };
        let errors = match object.remove("errors") {
            Some(Value::Object(entries)) => entries
                .into_iter()
                .filter_map(|(field, entry)| {
                    serde_json::from_value::<FieldMessage>(entry)
                        .ok()
                        .map(|message| (field, message))
                })
                .collect(),
            _ => BTreeMap::new(),
        };

        Self { message, errors }
    }

    fn non_empty_message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }
}

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    /// The server answered with a non-success status.
    Response {
        /// HTTP status code.
        status: u16,
        /// Parsed error body.
        body: ErrorBody,
    },
    /// The request was sent but no response arrived.
    NoResponse {
        /// Transport-level detail, for logs only.
        detail: String,
    },
    /// The request could not be issued at all.
    Setup {
        /// Client-side detail, for logs only.
        detail: String,
    },
}

impl ApiFailure {
    /// Creates a response failure with an empty body.
    #[must_use]
    pub fn status(status: u16) -> Self {
        Self::Response {
            status,
            body: ErrorBody::default(),
        }
    }

    /// Creates a response failure carrying a server message.
    #[must_use]
    pub fn status_with_message(status: u16, message: impl Into<String>) -> Self {
        Self::Response {
            status,
            body: ErrorBody::with_message(message),
        }
    }

    /// Creates a no-response failure.
    #[must_use]
    pub fn no_response(detail: impl Into<String>) -> Self {
        Self::NoResponse {
            detail: detail.into(),
        }
    }

    /// Creates a request setup failure.
    #[must_use]
    pub fn setup(detail: impl Into<String>) -> Self {
        Self::Setup {
            detail: detail.into(),
        }
    }
}

impl ApiFailure {
    /// Returns whether retrying the same request may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Response { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            Self::NoResponse { .. } => true,
            Self::Setup { .. } => false,
        }
    }
}

impl std::fmt::Display for ApiFailure {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Response { status, body } => match body.non_empty_message() {
                Some(message) => write!(formatter, "HTTP {status}: {message}"),
                None => write!(formatter, "HTTP {status}"),
            },
            Self::NoResponse { detail } => write!(formatter, "no response: {detail}"),
            Self::Setup { detail } => write!(formatter, "request setup failed: {detail}"),
        }
    }
}

/// Status code families the client reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpFailureKind {
    /// 400.
    BadRequest,
    /// 401.
    Unauthorized,
    /// 403.
    Forbidden,
    /// 404.
    NotFound,
    /// 409.
    Conflict,
    /// 422.
    Unprocessable,
    /// 429.
    TooManyRequests,
    /// 500.
    ServerError,
    /// 503.
    Unavailable,
    /// Any other status.
    Other(u16),
}

impl HttpFailureKind {
    /// Maps a status code to its kind.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            409 => Self::Conflict,
            422 => Self::Unprocessable,
            429 => Self::TooManyRequests,
            500 => Self::ServerError,
            503 => Self::Unavailable,
            other => Self::Other(other),
        }
    }
}

/// What a free-text server message is about.
///
/// The backend does not emit structured error codes, so the message is
/// inspected once here and the classifier only matches on the result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageHint {
    /// Account exists but is not verified yet.
    Unverified,
    /// Message mentions the email address.
    Email,
    /// Message mentions the password.
    Password,
    /// Message mentions the phone number.
    Phone,
    /// Nothing recognisable.
    None,
}

impl MessageHint {
    /// Inspects a server message.
    #[must_use]
    pub fn from_message(message: Option<&str>) -> Self {
        let Some(message) = message else {
            return Self::None;
        };
        let lowered = message.to_lowercase();

        if lowered.contains("verif") || lowered.contains("vérif") {
            Self::Unverified
        } else if lowered.contains("email") || lowered.contains("e-mail") {
            Self::Email
        } else if lowered.contains("password") || lowered.contains("mot de passe") {
            Self::Password
        } else if lowered.contains("phone") || lowered.contains("téléphone") {
            Self::Phone
        } else {
            Self::None
        }
    }
}

/// Flow in which the failure happened; flavours a few messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorContext {
    /// Any other call.
    #[default]
    General,
    /// Email/password login.
    Login,
    /// Account registration.
    Registration,
    /// Forgotten or reset password.
    PasswordReset,
    /// Email or account verification.
    Verification,
}

/// Result of classifying an [`ApiFailure`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiErrorClassification {
    /// Message suitable for a toast or banner.
    pub general_message: String,
    /// Messages to show beneath specific form fields.
    pub field_errors: BTreeMap<String, String>,
}

impl ApiErrorClassification {
    fn general(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            field_errors: BTreeMap::from([(GENERAL_FIELD.to_owned(), message.clone())]),
            general_message: message,
        }
    }

    fn field(general_message: impl Into<String>, field: &str, message: impl Into<String>) -> Self {
        Self {
            general_message: general_message.into(),
            field_errors: BTreeMap::from([(field.to_owned(), message.into())]),
        }
    }
}

/// General message when the server cannot be reached.
pub const NETWORK_FAILURE_MESSAGE: &str =
    "Impossible de contacter le serveur. Vérifiez votre connexion internet.";
/// General message when the request could not be built.
pub const SETUP_FAILURE_MESSAGE: &str =
    "Une erreur de configuration est survenue. Veuillez réessayer.";
/// General message for unrecognised failures.
pub const UNEXPECTED_FAILURE_MESSAGE: &str = "Une erreur inattendue est survenue.";
/// Message attached to the email field on a conflict.
pub const EMAIL_TAKEN_MESSAGE: &str = "Cette adresse email est déjà utilisée";

const BAD_REQUEST_MESSAGE: &str = "Données invalides. Veuillez vérifier les informations saisies.";
const INVALID_CREDENTIALS_MESSAGE: &str = "Email ou mot de passe incorrect";
const SESSION_EXPIRED_MESSAGE: &str = "Votre session a expiré. Veuillez vous reconnecter.";
const UNVERIFIED_ACCOUNT_MESSAGE: &str =
    "Votre compte n'est pas encore vérifié. Veuillez consulter vos emails.";
const FORBIDDEN_MESSAGE: &str = "Accès refusé. Vous n'avez pas les permissions nécessaires.";
const ACCOUNT_NOT_FOUND_MESSAGE: &str = "Aucun compte n'est associé à cette adresse email";
const NOT_FOUND_MESSAGE: &str = "La ressource demandée est introuvable.";
const CONFLICT_MESSAGE: &str = "Un compte existe déjà avec cette adresse email.";
const UNPROCESSABLE_MESSAGE: &str = "Certaines informations sont invalides.";
const TOO_MANY_REQUESTS_MESSAGE: &str =
    "Trop de tentatives. Veuillez patienter avant de réessayer.";
const SERVER_ERROR_MESSAGE: &str = "Erreur du serveur. Veuillez réessayer plus tard.";
const UNAVAILABLE_MESSAGE: &str =
    "Service temporairement indisponible. Veuillez réessayer dans quelques instants.";

const INVALID_EMAIL_FIELD_MESSAGE: &str = "Adresse email invalide";
const INVALID_PASSWORD_FIELD_MESSAGE: &str = "Mot de passe invalide";
const INVALID_PHONE_FIELD_MESSAGE: &str = "Numéro de téléphone invalide";

/// Classifies a failed call.
///
/// Classification never fails: unknown statuses and malformed bodies fall
/// back to the server message or a generic one. When no specific field is
/// implicated the message is stored under [`GENERAL_FIELD`].
#[must_use]
pub fn classify(failure: &ApiFailure, context: ErrorContext) -> ApiErrorClassification {
    match failure {
        ApiFailure::Response { status, body } => classify_response(*status, body, context),
        ApiFailure::NoResponse { .. } => ApiErrorClassification::general(NETWORK_FAILURE_MESSAGE),
        ApiFailure::Setup { .. } => ApiErrorClassification::general(SETUP_FAILURE_MESSAGE),
    }
}

fn classify_response(
    status: u16,
    body: &ErrorBody,
    context: ErrorContext,
) -> ApiErrorClassification {
    let server_message = body.non_empty_message();
    let hint = MessageHint::from_message(server_message);

    match HttpFailureKind::from_status(status) {
        HttpFailureKind::BadRequest => {
            let general = server_message.unwrap_or(BAD_REQUEST_MESSAGE);
            match hint {
                MessageHint::Email => {
                    ApiErrorClassification::field(general, "email", INVALID_EMAIL_FIELD_MESSAGE)
                }
                MessageHint::Password => ApiErrorClassification::field(
                    general,
                    "password",
                    INVALID_PASSWORD_FIELD_MESSAGE,
                ),
                MessageHint::Phone => {
                    ApiErrorClassification::field(general, "phone", INVALID_PHONE_FIELD_MESSAGE)
                }
                MessageHint::Unverified | MessageHint::None => {
                    ApiErrorClassification::general(general)
                }
            }
        }
        HttpFailureKind::Unauthorized => match context {
            ErrorContext::Login => ApiErrorClassification::general(INVALID_CREDENTIALS_MESSAGE),
            _ => ApiErrorClassification::general(SESSION_EXPIRED_MESSAGE),
        },
        HttpFailureKind::Forbidden => match hint {
            MessageHint::Unverified => ApiErrorClassification::general(UNVERIFIED_ACCOUNT_MESSAGE),
            _ => ApiErrorClassification::general(FORBIDDEN_MESSAGE),
        },
        HttpFailureKind::NotFound => match context {
            ErrorContext::Login | ErrorContext::PasswordReset => ApiErrorClassification::field(
                ACCOUNT_NOT_FOUND_MESSAGE,
                "email",
                ACCOUNT_NOT_FOUND_MESSAGE,
            ),
            _ => ApiErrorClassification::general(NOT_FOUND_MESSAGE),
        },
        HttpFailureKind::Conflict => {
            ApiErrorClassification::field(CONFLICT_MESSAGE, "email", EMAIL_TAKEN_MESSAGE)
        }
        HttpFailureKind::Unprocessable if !body.errors.is_empty() => ApiErrorClassification {
            general_message: server_message.unwrap_or(UNPROCESSABLE_MESSAGE).to_owned(),
            field_errors: body
                .errors
                .iter()
                .map(|(field, message)| (field.clone(), message.as_str().to_owned()))
                .collect(),
        },
        HttpFailureKind::Unprocessable => {
            ApiErrorClassification::general(server_message.unwrap_or(UNPROCESSABLE_MESSAGE))
        }
        HttpFailureKind::TooManyRequests => {
            ApiErrorClassification::general(TOO_MANY_REQUESTS_MESSAGE)
        }
        HttpFailureKind::ServerError => ApiErrorClassification::general(SERVER_ERROR_MESSAGE),
        HttpFailureKind::Unavailable => ApiErrorClassification::general(UNAVAILABLE_MESSAGE),
        HttpFailureKind::Other(_) => {
            ApiErrorClassification::general(server_message.unwrap_or(UNEXPECTED_FAILURE_MESSAGE))
        }
    }
}

/// Title of the toast raised for authentication failures.
pub const AUTH_ERROR_TITLE: &str = "Erreur d'authentification";

/// Builds the single message shown in an authentication error toast.
///
/// This mapping is deliberately separate from [`classify`]: the toast speaks
/// about the sign-in attempt as a whole and never mentions form fields.
#[must_use]
pub fn auth_error_message(failure: &ApiFailure) -> String {
    let ApiFailure::Response { status, body } = failure else {
        return match failure {
            ApiFailure::NoResponse { .. } => NETWORK_FAILURE_MESSAGE.to_owned(),
            _ => UNEXPECTED_FAILURE_MESSAGE.to_owned(),
        };
    };
    let server_message = body.non_empty_message();

    let message = match HttpFailureKind::from_status(*status) {
        HttpFailureKind::BadRequest => server_message.unwrap_or("Requête invalide."),
        HttpFailureKind::Unauthorized => "Identifiants incorrects. Veuillez réessayer.",
        HttpFailureKind::Forbidden => match MessageHint::from_message(server_message) {
            MessageHint::Unverified => UNVERIFIED_ACCOUNT_MESSAGE,
            _ => "Votre compte n'a pas accès à cet espace.",
        },
        HttpFailureKind::NotFound => "Aucun compte trouvé avec ces informations.",
        HttpFailureKind::Conflict => EMAIL_TAKEN_MESSAGE,
        HttpFailureKind::Unprocessable => server_message.unwrap_or(UNPROCESSABLE_MESSAGE),
        HttpFailureKind::TooManyRequests => TOO_MANY_REQUESTS_MESSAGE,
        HttpFailureKind::ServerError | HttpFailureKind::Unavailable => {
            "Le service d'authentification est indisponible. Veuillez réessayer plus tard."
        }
        HttpFailureKind::Other(_) => server_message.unwrap_or(UNEXPECTED_FAILURE_MESSAGE),
    };

    message.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_always_implicates_email() {
        for failure in [
            ApiFailure::status(409),
            ApiFailure::status_with_message(409, "duplicate phone"),
        ] {
            let classification = classify(&failure, ErrorContext::Registration);
            assert_eq!(
                classification.field_errors.get("email").map(String::as_str),
                Some(EMAIL_TAKEN_MESSAGE)
            );
            assert!(!classification.general_message.is_empty());
        }
    }

    #[test]
    fn no_response_yields_network_message_under_general_only() {
        let classification = classify(&ApiFailure::no_response("timeout"), ErrorContext::Login);
        assert_eq!(classification.general_message, NETWORK_FAILURE_MESSAGE);
        assert_eq!(
            classification
                .field_errors
                .keys()
                .map(String::as_str)
                .collect::<Vec<_>>(),
            vec![GENERAL_FIELD]
        );
    }

    #[test]
    fn setup_failure_yields_configuration_message() {
        let classification = classify(&ApiFailure::setup("bad url"), ErrorContext::General);
        assert_eq!(classification.general_message, SETUP_FAILURE_MESSAGE);
    }

    #[test]
    fn bad_request_routes_hinted_message_to_field() {
        let classification = classify(
            &ApiFailure::status_with_message(400, "Email format is invalid"),
            ErrorContext::Registration,
        );
        assert_eq!(classification.general_message, "Email format is invalid");
        assert!(classification.field_errors.contains_key("email"));

        let classification = classify(&ApiFailure::status(400), ErrorContext::Registration);
        assert_eq!(classification.general_message, BAD_REQUEST_MESSAGE);
        assert!(classification.field_errors.contains_key(GENERAL_FIELD));
    }

    #[test]
    fn unauthorized_message_depends_on_context() {
        let login = classify(&ApiFailure::status(401), ErrorContext::Login);
        let other = classify(&ApiFailure::status(401), ErrorContext::General);
        assert_eq!(login.general_message, INVALID_CREDENTIALS_MESSAGE);
        assert_eq!(other.general_message, SESSION_EXPIRED_MESSAGE);
    }

    #[test]
    fn forbidden_detects_unverified_account() {
        let classification = classify(
            &ApiFailure::status_with_message(403, "Account not verified"),
            ErrorContext::Login,
        );
        assert_eq!(classification.general_message, UNVERIFIED_ACCOUNT_MESSAGE);

        let classification = classify(&ApiFailure::status(403), ErrorContext::Login);
        assert_eq!(classification.general_message, FORBIDDEN_MESSAGE);
    }

    #[test]
    fn unprocessable_uses_structured_field_errors() {
        let body: ErrorBody = serde_json::from_str(
            r#"{"message":"Validation failed","errors":{"phone":{"message":"bad phone"},"name":"too short"}}"#,
        )
        .unwrap_or_else(|_| panic!("test"));
        let classification = classify(
            &ApiFailure::Response { status: 422, body },
            ErrorContext::Registration,
        );

        assert_eq!(classification.general_message, "Validation failed");
        assert_eq!(
            classification.field_errors,
            BTreeMap::from([
                ("name".to_owned(), "too short".to_owned()),
                ("phone".to_owned(), "bad phone".to_owned()),
            ])
        );
    }

    #[test]
    fn status_codes_map_to_kinds() {
        for (status, kind) in [
            (400, HttpFailureKind::BadRequest),
            (401, HttpFailureKind::Unauthorized),
            (403, HttpFailureKind::Forbidden),
            (404, HttpFailureKind::NotFound),
            (409, HttpFailureKind::Conflict),
            (422, HttpFailureKind::Unprocessable),
            (429, HttpFailureKind::TooManyRequests),
            (500, HttpFailureKind::ServerError),
            (503, HttpFailureKind::Unavailable),
            (502, HttpFailureKind::Other(502)),
        ] {
            assert_eq!(HttpFailureKind::from_status(status), kind);
        }
    }

    #[test]
    fn every_status_kind_has_expected_outcome() {
        let cases: [(u16, ErrorContext, &str, &[&str]); 15] = [
            (400, ErrorContext::General, BAD_REQUEST_MESSAGE, &[GENERAL_FIELD]),
            (401, ErrorContext::Login, INVALID_CREDENTIALS_MESSAGE, &[GENERAL_FIELD]),
            (401, ErrorContext::Registration, SESSION_EXPIRED_MESSAGE, &[GENERAL_FIELD]),
            (403, ErrorContext::General, FORBIDDEN_MESSAGE, &[GENERAL_FIELD]),
            (404, ErrorContext::Login, ACCOUNT_NOT_FOUND_MESSAGE, &["email"]),
            (404, ErrorContext::PasswordReset, ACCOUNT_NOT_FOUND_MESSAGE, &["email"]),
            (404, ErrorContext::General, NOT_FOUND_MESSAGE, &[GENERAL_FIELD]),
            (404, ErrorContext::Registration, NOT_FOUND_MESSAGE, &[GENERAL_FIELD]),
            (409, ErrorContext::Login, CONFLICT_MESSAGE, &["email"]),
            (422, ErrorContext::Registration, UNPROCESSABLE_MESSAGE, &[GENERAL_FIELD]),
            (429, ErrorContext::Login, TOO_MANY_REQUESTS_MESSAGE, &[GENERAL_FIELD]),
            (500, ErrorContext::Login, SERVER_ERROR_MESSAGE, &[GENERAL_FIELD]),
            (503, ErrorContext::General, UNAVAILABLE_MESSAGE, &[GENERAL_FIELD]),
            (502, ErrorContext::General, UNEXPECTED_FAILURE_MESSAGE, &[GENERAL_FIELD]),
            (418, ErrorContext::Verification, UNEXPECTED_FAILURE_MESSAGE, &[GENERAL_FIELD]),
        ];

        for (status, context, general_message, fields) in cases {
            let classification = classify(&ApiFailure::status(status), context);
            assert_eq!(
                classification.general_message, general_message,
                "status {status} in {context:?}"
            );
            assert_eq!(
                classification
                    .field_errors
                    .keys()
                    .map(String::as_str)
                    .collect::<Vec<_>>(),
                fields.to_vec(),
                "status {status} in {context:?}"
            );
        }
    }

    #[test]
    fn unknown_status_falls_back_to_server_message() {
        let classification = classify(
            &ApiFailure::status_with_message(418, "I'm a teapot"),
            ErrorContext::General,
        );
        assert_eq!(classification.general_message, "I'm a teapot");

        let classification = classify(&ApiFailure::status(418), ErrorContext::General);
        assert_eq!(classification.general_message, UNEXPECTED_FAILURE_MESSAGE);
    }

    #[test]
    fn malformed_body_degrades_to_empty() {
        assert_eq!(ErrorBody::from_json_lenient(b"<html>oops</html>"), ErrorBody::default());
        assert_eq!(
            ErrorBody::from_json_lenient(br#"{"message":"nope"}"#).message.as_deref(),
            Some("nope")
        );
    }

    #[test]
    fn off_shape_errors_keep_server_message() {
        let body = ErrorBody::from_json_lenient(
            br#"{"message":"Email already registered","errors":[{"msg":"taken","param":"email"}]}"#,
        );
        assert_eq!(body.message.as_deref(), Some("Email already registered"));
        assert!(body.errors.is_empty());

        let classification = classify(
            &ApiFailure::Response { status: 400, body },
            ErrorContext::Registration,
        );
        assert_eq!(classification.general_message, "Email already registered");
        assert!(classification.field_errors.contains_key("email"));
    }

    #[test]
    fn unusable_field_entries_are_skipped() {
        let body = ErrorBody::from_json_lenient(
            br#"{"message":42,"errors":{"email":{"message":"taken"},"phone":["bad"],"name":"short"}}"#,
        );
        assert_eq!(body.message, None);
        assert_eq!(
            body.errors,
            BTreeMap::from([
                (
                    "email".to_owned(),
                    FieldMessage::Detailed {
                        message: "taken".to_owned()
                    }
                ),
                ("name".to_owned(), FieldMessage::Plain("short".to_owned())),
            ])
        );
    }

    #[test]
    fn transient_failures_are_recognised() {
        assert!(ApiFailure::no_response("reset").is_transient());
        assert!(ApiFailure::status(503).is_transient());
        assert!(!ApiFailure::status(409).is_transient());
        assert!(!ApiFailure::setup("bad url").is_transient());
    }

    #[test]
    fn auth_message_is_independent_of_fields() {
        assert_eq!(
            auth_error_message(&ApiFailure::status(409)),
            EMAIL_TAKEN_MESSAGE
        );
        assert_eq!(
            auth_error_message(&ApiFailure::no_response("refused")),
            NETWORK_FAILURE_MESSAGE
        );
        assert!(!auth_error_message(&ApiFailure::status(401)).is_empty());
    }
}
