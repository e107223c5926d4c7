//! Login form validation
//!
//! WARNING: placeholder checks only. This is not an authentication boundary.

/// Minimum username length, in characters
pub const MIN_USERNAME_LEN: usize = 3;

/// Minimum password length, in characters
pub const MIN_PASSWORD_LEN: usize = 8;

/// Reasons a login form is rejected, shown verbatim to the user
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Ensure your username is 3+ alphanumeric characters long")]
    UsernameTooShort,

    #[error("Ensure your password is at least 8 characters long")]
    PasswordTooShort,
}

/// A login form that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
}

/// Check the form fields, username first.
pub fn validate_login(username: &str, password: &str) -> Result<Credentials, ValidationError> {
    if username.chars().count() < MIN_USERNAME_LEN {
        return Err(ValidationError::UsernameTooShort);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort);
    }
    Ok(Credentials {
        username: username.to_string(),
    })
}
