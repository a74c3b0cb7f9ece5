//! Input validation for account names, emails and passwords.

use thiserror::Error;

/// Minimum name length (after trimming).
pub const MIN_NAME_LENGTH: usize = 2;

/// Maximum name length (after trimming).
pub const MAX_NAME_LENGTH: usize = 100;

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Maximum password length.
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// Maximum email length.
pub const MAX_EMAIL_LENGTH: usize = 255;

/// Characters counted as "special" in a password.
const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?/~`'\"\\";

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name must be at least {MIN_NAME_LENGTH} characters")]
    NameTooShort,

    #[error("name must be at most {MAX_NAME_LENGTH} characters")]
    NameTooLong,

    #[error("name contains invalid characters")]
    NameInvalidChars,

    #[error("email is required")]
    EmailEmpty,

    #[error("email must be at most {MAX_EMAIL_LENGTH} characters")]
    EmailTooLong,

    #[error("invalid email format")]
    EmailInvalidFormat,

    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,

    #[error("password must be at most {MAX_PASSWORD_LENGTH} characters")]
    PasswordTooLong,

    #[error("password must contain a lowercase letter")]
    PasswordMissingLowercase,

    #[error("password must contain an uppercase letter")]
    PasswordMissingUppercase,

    #[error("password must contain a digit")]
    PasswordMissingDigit,

    #[error("password must contain a special character")]
    PasswordMissingSpecial,
}

impl ValidationError {
    /// Name of the input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::NameTooShort | Self::NameTooLong | Self::NameInvalidChars => "name",
            Self::EmailEmpty | Self::EmailTooLong | Self::EmailInvalidFormat => "email",
            _ => "password",
        }
    }
}

/// Validate a display name.
///
/// # Examples
///
/// ```
/// use gameshelf::auth::validation::validate_name;
///
/// assert!(validate_name("Ana Souza").is_ok());
/// assert!(validate_name(" A ").is_err()); // too short once trimmed
/// ```
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();

    if len < MIN_NAME_LENGTH {
        return Err(ValidationError::NameTooShort);
    }
    if len > MAX_NAME_LENGTH {
        return Err(ValidationError::NameTooLong);
    }
    if trimmed.chars().any(|c| c.is_control()) {
        return Err(ValidationError::NameInvalidChars);
    }

    Ok(())
}

/// Validate an email address: `local@domain.tld`, no whitespace.
///
/// # Examples
///
/// ```
/// use gameshelf::auth::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("invalid").is_err());
/// ```
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.is_empty() {
        return Err(ValidationError::EmailEmpty);
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::EmailTooLong);
    }
    if email.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(ValidationError::EmailInvalidFormat);
    };
    if local.is_empty() || domain.contains('@') {
        return Err(ValidationError::EmailInvalidFormat);
    }

    // Domain needs at least one dot with non-empty labels around it
    if !domain.contains('.') || domain.split('.').any(|label| label.is_empty()) {
        return Err(ValidationError::EmailInvalidFormat);
    }

    Ok(())
}

/// Validate a new password.
///
/// Requirements: 8-128 characters with at least one lowercase letter, one
/// uppercase letter, one digit and one special character.
///
/// # Examples
///
/// ```
/// use gameshelf::auth::validation::validate_password;
///
/// assert!(validate_password("Secur3!pass").is_ok());
/// assert!(validate_password("password").is_err());
/// ```
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooShort);
    }
    if len > MAX_PASSWORD_LENGTH {
        return Err(ValidationError::PasswordTooLong);
    }
    if !password.chars().any(|c| c.is_lowercase()) {
        return Err(ValidationError::PasswordMissingLowercase);
    }
    if !password.chars().any(|c| c.is_uppercase()) {
        return Err(ValidationError::PasswordMissingUppercase);
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(ValidationError::PasswordMissingDigit);
    }
    if !password.chars().any(|c| SPECIAL_CHARS.contains(c)) {
        return Err(ValidationError::PasswordMissingSpecial);
    }
    Ok(())
}

/// Validate all registration fields, collecting every failure.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
) -> Result<(), Vec<ValidationError>> {
    let errors: Vec<ValidationError> = [
        validate_name(name),
        validate_email(email),
        validate_password(password),
    ]
    .into_iter()
    .filter_map(|r| r.err())
    .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("Ana").is_ok());
        assert!(validate_name("Jo").is_ok());
        assert!(validate_name("  Ana Souza  ").is_ok());
        assert!(validate_name("ゲーマー").is_ok());
        assert!(validate_name(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_validate_name_length() {
        assert_eq!(validate_name(""), Err(ValidationError::NameTooShort));
        assert_eq!(validate_name("   a   "), Err(ValidationError::NameTooShort));
        assert_eq!(
            validate_name(&"a".repeat(101)),
            Err(ValidationError::NameTooLong)
        );
    }

    #[test]
    fn test_validate_name_control_chars() {
        assert_eq!(
            validate_name("Ana\u{0007}Bell"),
            Err(ValidationError::NameInvalidChars)
        );
        assert_eq!(
            validate_name("Ana\nSouza"),
            Err(ValidationError::NameInvalidChars)
        );
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("ana@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.co").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert_eq!(validate_email(""), Err(ValidationError::EmailEmpty));
        for bad in [
            "invalid",
            "@example.com",
            "ana@",
            "ana@example",
            "ana@.com",
            "ana@example.",
            "ana@@example.com",
            "ana @example.com",
        ] {
            assert_eq!(
                validate_email(bad),
                Err(ValidationError::EmailInvalidFormat),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_validate_email_too_long() {
        let email = format!("{}@example.com", "a".repeat(250));
        assert_eq!(validate_email(&email), Err(ValidationError::EmailTooLong));
    }

    #[test]
    fn test_validate_password_valid() {
        assert!(validate_password("Secur3!pass").is_ok());
        assert!(validate_password("Aa1!aaaa").is_ok());
    }

    #[test]
    fn test_validate_password_rules() {
        assert_eq!(
            validate_password("Aa1!"),
            Err(ValidationError::PasswordTooShort)
        );
        assert_eq!(
            validate_password(&format!("Aa1!{}", "a".repeat(125))),
            Err(ValidationError::PasswordTooLong)
        );
        assert_eq!(
            validate_password("AAAA1111!"),
            Err(ValidationError::PasswordMissingLowercase)
        );
        assert_eq!(
            validate_password("aaaa1111!"),
            Err(ValidationError::PasswordMissingUppercase)
        );
        assert_eq!(
            validate_password("Aaaaaaaa!"),
            Err(ValidationError::PasswordMissingDigit)
        );
        assert_eq!(
            validate_password("Aaaaaaa1"),
            Err(ValidationError::PasswordMissingSpecial)
        );
    }

    #[test]
    fn test_validate_registration_collects_all() {
        assert!(validate_registration("Ana", "ana@example.com", "Secur3!pass").is_ok());

        let errors = validate_registration("A", "nope", "weak").unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field()).collect();
        assert_eq!(fields, vec!["name", "email", "password"]);
    }
}
