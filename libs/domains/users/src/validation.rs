//! Custom `validator` rules for user payloads.

use std::borrow::Cow;
use validator::ValidationError;

const MIN_PASSWORD_LEN: usize = 8;
const MAX_PASSWORD_LEN: usize = 128;

/// At least 8 characters with a lowercase letter, an uppercase letter, a digit and a symbol.
pub fn validate_strong_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    let strong = (MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&len)
        && password.chars().any(|c| c.is_lowercase())
        && password.chars().any(|c| c.is_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace());

    if strong {
        Ok(())
    } else {
        Err(ValidationError::new("strong_password").with_message(Cow::Borrowed(
            "Password must be 8-128 characters and contain an uppercase letter, a lowercase letter, a number and a symbol",
        )))
    }
}

/// Digits only, forming a NANP number: ten digits (optionally prefixed by country code `1`)
/// whose area code and exchange both start with 2-9.
pub fn validate_us_phone(contact: &str) -> Result<(), ValidationError> {
    let err = || {
        ValidationError::new("phone_number")
            .with_message(Cow::Borrowed("Contact must be a valid US phone number (digits only)"))
    };

    if contact.is_empty() || !contact.bytes().all(|b| b.is_ascii_digit()) {
        return Err(err());
    }

    let national = match contact.len() {
        10 => contact,
        11 if contact.starts_with('1') => &contact[1..],
        _ => return Err(err()),
    };

    let bytes = national.as_bytes();
    if bytes[0] < b'2' || bytes[3] < b'2' {
        return Err(err());
    }

    Ok(())
}

/// Rejects a patch whose `confirm_password` is missing or differs while `password` is set.
///
/// Runs as a struct-level rule, so the failing field is attached as the `field` param.
pub fn validate_password_confirmation(
    password: Option<&str>,
    confirm_password: Option<&str>,
) -> Result<(), ValidationError> {
    if password == confirm_password {
        return Ok(());
    }

    let mut err = ValidationError::new("must_match").with_message(Cow::Borrowed("Passwords do not match"));
    err.add_param(Cow::Borrowed("field"), &"confirm_password");
    Err(err)
}
