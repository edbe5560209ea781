//! Field and form validation rules.
//!
//! Validation results are plain data: a field either yields a
//! human-readable message or nothing. Messages are the French strings shown
//! beneath form inputs.

use std::collections::BTreeMap;

use agrimarket_core::{AppError, AppResult};
use regex::Regex;

/// Message for a required field left empty.
pub const REQUIRED_MESSAGE: &str = "Ce champ est requis";
/// Message for a malformed email address.
pub const INVALID_EMAIL_MESSAGE: &str = "Veuillez entrer une adresse email valide";
/// Message for a malformed phone number.
pub const INVALID_PHONE_MESSAGE: &str = "Veuillez entrer un numéro de téléphone valide";
/// Message for a password below the minimum length.
pub const PASSWORD_TOO_SHORT_MESSAGE: &str =
    "Le mot de passe doit contenir au moins 8 caractères";
/// Message for a password without an uppercase letter.
pub const PASSWORD_UPPERCASE_MESSAGE: &str =
    "Le mot de passe doit contenir au moins une majuscule";
/// Message for a password without a lowercase letter.
pub const PASSWORD_LOWERCASE_MESSAGE: &str =
    "Le mot de passe doit contenir au moins une minuscule";
/// Message for a password without a digit.
pub const PASSWORD_DIGIT_MESSAGE: &str = "Le mot de passe doit contenir au moins un chiffre";
/// Message for a value rejected by a custom pattern.
pub const INVALID_FORMAT_MESSAGE: &str = "Format invalide";

/// Minimum password length accepted by the client.
pub const PASSWORD_MIN_LENGTH: usize = 8;

const PHONE_MIN_DIGITS: usize = 8;
const PHONE_MAX_DIGITS: usize = 15;

/// Builds the message for a value shorter than `min_length` characters.
#[must_use]
pub fn min_length_message(min_length: usize) -> String {
    format!("Minimum {min_length} caractères")
}

/// Content-specific checks applied to a field in addition to its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Email address.
    Email,
    /// Phone number.
    Phone,
    /// Password subject to strength checks.
    Password,
    /// Any other field; only the generic rule applies.
    Plain,
}

impl FieldKind {
    /// Infers the field kind from its form name.
    ///
    /// Matching is case-insensitive on the name suffix, so `email`,
    /// `contactEmail` and `newPassword` are recognised.
    #[must_use]
    pub fn from_field_name(field: &str) -> Self {
        let lowered = field.to_lowercase();
        if lowered.ends_with("email") {
            Self::Email
        } else if lowered.ends_with("phone") || lowered.ends_with("telephone") {
            Self::Phone
        } else if lowered.ends_with("password") {
            Self::Password
        } else {
            Self::Plain
        }
    }
}

/// Compiled custom pattern a field value must match.
#[derive(Debug, Clone)]
pub struct FieldPattern(Regex);

impl FieldPattern {
    /// Compiles a pattern.
    pub fn new(pattern: &str) -> AppResult<Self> {
        Regex::new(pattern).map(Self).map_err(|error| {
            AppError::Validation(format!("invalid field pattern '{pattern}': {error}"))
        })
    }

    /// Returns whether the value matches the pattern.
    #[must_use]
    pub fn is_match(&self, value: &str) -> bool {
        self.0.is_match(value)
    }

    /// Returns the source pattern.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Declarative rule set for one field.
#[derive(Debug, Clone, Default)]
pub struct ValidationRule {
    required: bool,
    min_length: Option<usize>,
    pattern: Option<FieldPattern>,
    kind: Option<FieldKind>,
}

impl ValidationRule {
    /// Creates an empty rule: optional, no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a rule for a required field.
    #[must_use]
    pub fn required() -> Self {
        Self {
            required: true,
            ..Self::default()
        }
    }

    /// Sets a minimum character count.
    #[must_use]
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = Some(min_length);
        self
    }

    /// Sets a custom pattern the value must match.
    #[must_use]
    pub fn with_pattern(mut self, pattern: FieldPattern) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Overrides the field kind inferred from the field name.
    #[must_use]
    pub fn with_kind(mut self, kind: FieldKind) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Returns whether the field is required.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Returns the minimum character count, if any.
    #[must_use]
    pub fn min_length(&self) -> Option<usize> {
        self.min_length
    }

    /// Returns the custom pattern, if any.
    #[must_use]
    pub fn pattern(&self) -> Option<&FieldPattern> {
        self.pattern.as_ref()
    }

    fn kind_for(&self, field: &str) -> FieldKind {
        self.kind.unwrap_or_else(|| FieldKind::from_field_name(field))
    }
}

/// Field name to rule mapping used for whole-form validation.
#[derive(Debug, Clone, Default)]
pub struct FormSchema {
    rules: BTreeMap<String, ValidationRule>,
}

impl FormSchema {
    /// Creates an empty schema.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the rule for one field.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>, rule: ValidationRule) -> Self {
        self.rules.insert(name.into(), rule);
        self
    }

    /// Returns the rule for one field.
    #[must_use]
    pub fn rule(&self, name: &str) -> Option<&ValidationRule> {
        self.rules.get(name)
    }

    /// Iterates over `(field, rule)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationRule)> {
        self.rules.iter().map(|(name, rule)| (name.as_str(), rule))
    }

    /// Returns the number of fields in the schema.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns whether the schema has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Schema for the email/password login form.
    #[must_use]
    pub fn login() -> Self {
        Self::new()
            .field("email", ValidationRule::required())
            .field(
                "password",
                ValidationRule::required().with_kind(FieldKind::Plain),
            )
    }
}

/// Outcome of validating a whole form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValidation {
    /// Field errors keyed by field name; only failing fields are present.
    pub errors: BTreeMap<String, String>,
}

impl FormValidation {
    /// Returns whether no field produced an error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validates one field value against its rule.
///
/// Checks run in a fixed order and the first failing check wins: required,
/// email shape, phone shape, password strength, minimum length, custom
/// pattern.
#[must_use]
pub fn validate_field(field: &str, value: &str, rule: &ValidationRule) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return rule.required.then(|| REQUIRED_MESSAGE.to_owned());
    }

    match rule.kind_for(field) {
        FieldKind::Email if !is_valid_email(trimmed) => {
            return Some(INVALID_EMAIL_MESSAGE.to_owned());
        }
        FieldKind::Phone if !is_valid_phone(trimmed) => {
            return Some(INVALID_PHONE_MESSAGE.to_owned());
        }
        FieldKind::Password => {
            if let Some(message) = password_strength_error(value) {
                return Some(message.to_owned());
            }
        }
        _ => {}
    }

    if let Some(min_length) = rule.min_length
        && value.chars().count() < min_length
    {
        return Some(min_length_message(min_length));
    }

    if let Some(pattern) = &rule.pattern
        && !pattern.is_match(value)
    {
        return Some(INVALID_FORMAT_MESSAGE.to_owned());
    }

    None
}

/// Validates every field of `schema` against `values`.
///
/// Fields missing from `values` are validated as empty strings.
#[must_use]
pub fn validate_form(values: &BTreeMap<String, String>, schema: &FormSchema) -> FormValidation {
    let errors = schema
        .iter()
        .filter_map(|(field, rule)| {
            let value = values.get(field).map_or("", String::as_str);
            validate_field(field, value, rule).map(|message| (field.to_owned(), message))
        })
        .collect();

    FormValidation { errors }
}

/// Returns whether the value has the `local@domain.tld` shape.
#[must_use]
pub fn is_valid_email(value: &str) -> bool {
    if value.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

/// Returns whether the value is an optionally `+`-prefixed digit string of
/// plausible length. Spaces between digit groups are ignored.
#[must_use]
pub fn is_valid_phone(value: &str) -> bool {
    let compact: String = value.chars().filter(|ch| *ch != ' ').collect();
    let digits = compact.strip_prefix('+').unwrap_or(compact.as_str());

    (PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits.len())
        && digits.chars().all(|ch| ch.is_ascii_digit())
}

fn password_strength_error(password: &str) -> Option<&'static str> {
    if password.chars().count() < PASSWORD_MIN_LENGTH {
        return Some(PASSWORD_TOO_SHORT_MESSAGE);
    }
    if !password.chars().any(char::is_uppercase) {
        return Some(PASSWORD_UPPERCASE_MESSAGE);
    }
    if !password.chars().any(char::is_lowercase) {
        return Some(PASSWORD_LOWERCASE_MESSAGE);
    }
    if !password.chars().any(|ch| ch.is_ascii_digit()) {
        return Some(PASSWORD_DIGIT_MESSAGE);
    }

    None
}
