//! Client side checks for user provided form input. Each check returns a [ValidationError] whose
//! message can be shown to the user directly.

use chrono::NaiveDate;
use lazy_regex::{regex, Lazy, Regex};

use crate::error::{RpError, RpResult, ValidationError};

/// Minimum number of characters a new password must contain
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Basic `local@domain.tld` shape. Anything stricter is left to the backend.
static EMAIL_REGEX: &Lazy<Regex, fn() -> Regex> = regex!(r"^[^\s@]+@[^\s@]+\.[^\s@]+$");

/// Validator for forms that must be checked before being dispatched to the backend
pub trait Validate {
    /// Perform checks against the form to confirm it meets the requirements for submission.
    /// # Errors
    /// This function will return an error describing the first check that failed
    fn validate(&self) -> Result<(), ValidationError>;

    /// Performs the implemented validation, mapping the failure into an [RpError].
    /// # Errors
    /// This function will return an error if the form cannot be validated
    fn validate_form(&self) -> RpResult<()> {
        self.validate().map_err(RpError::from)
    }
}

/// Check that the `value` is not empty after trimming, returning the trimmed value
/// # Errors
/// This function will return an error if the trimmed `value` is empty
pub fn required<'v>(
    field: &'static str,
    label: &str,
    value: &'v str,
) -> Result<&'v str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::new(field, format!("{label} is required.")));
    }
    Ok(trimmed)
}

/// Check that the password and its confirmation are exactly equal. No trimming is performed.
/// # Errors
/// This function will return an error if the values differ
pub fn passwords_match(password: &str, confirmation: &str) -> Result<(), ValidationError> {
    if password != confirmation {
        return Err(ValidationError::new(
            "confirmPassword",
            "Passwords do not match.",
        ));
    }
    Ok(())
}

/// Check that the `value` has at least `min` characters
/// # Errors
/// This function will return an error if the `value` is too short
pub fn min_length(
    field: &'static str,
    label: &str,
    value: &str,
    min: usize,
) -> Result<(), ValidationError> {
    if value.chars().count() < min {
        return Err(ValidationError::new(
            field,
            format!("{label} must be at least {min} characters long."),
        ));
    }
    Ok(())
}

/// Same rules the registration service enforces, checked before a round trip is wasted
/// # Errors
/// This function will return an error naming the first missing character class
pub fn password_strength(password: &str) -> Result<(), ValidationError> {
    let rules: [(fn(&char) -> bool, &str); 3] = [
        (char::is_ascii_uppercase, "an uppercase letter"),
        (char::is_ascii_lowercase, "a lowercase letter"),
        (char::is_ascii_digit, "a digit"),
    ];
    for (rule, description) in rules {
        if !password.chars().any(|c| rule(&c)) {
            return Err(ValidationError::new(
                "password",
                format!("Password must contain at least {description}."),
            ));
        }
    }
    Ok(())
}

/// Check the `value` against a basic email shape
/// # Errors
/// This function will return an error if the `value` does not look like an email address
pub fn email(value: &str) -> Result<(), ValidationError> {
    if !EMAIL_REGEX.is_match(value.trim()) {
        return Err(ValidationError::new(
            "email",
            "Please enter a valid email address.",
        ));
    }
    Ok(())
}

/// Parse a `YYYY-MM-DD` date as produced by an `<input type="date">`
/// # Errors
/// This function will return an error if the `value` is not a valid calendar date
pub fn iso_date(field: &'static str, label: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ValidationError::new(field, format!("{label} must be a date in YYYY-MM-DD format."))
    })
}
