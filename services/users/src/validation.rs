//! Input validation for user records
//!
//! Each validator trims (and where the field is case-insensitive, lowercases)
//! its input before checking it, and returns the normalized value that is
//! allowed to reach storage.

use regex::Regex;
use std::sync::OnceLock;

use crate::error::{Rule, ValidationError};
use crate::models::{NewUser, UpdateUser, User};

/// Minimum password length, in UTF-16 code units
pub const PASSWORD_MIN_LENGTH: usize = 8;

/// Registration input that passed every field rule, already normalized
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar: String,
    pub cover_image: Option<String>,
    pub password: String,
}

/// Validate a registration candidate
///
/// Fields are checked in order username, email, full name, avatar,
/// password; the first failure is returned.
pub fn validate(candidate: NewUser) -> Result<ValidatedUser, ValidationError> {
    let username = validate_username(&candidate.username)?;
    let email = validate_email(&candidate.email)?;
    let full_name = validate_full_name(&candidate.full_name)?;
    let avatar = validate_avatar(&candidate.avatar)?;
    validate_password(&candidate.password)?;

    Ok(ValidatedUser {
        username,
        email,
        full_name,
        avatar,
        cover_image: normalize_optional(candidate.cover_image),
        password: candidate.password,
    })
}

/// Re-check a record right before it is stored
///
/// Normalizes the profile fields in place. The password is only checked
/// while it still holds an unhashed plaintext.
pub fn validate_record(user: &mut User) -> Result<(), ValidationError> {
    user.username = validate_username(&user.username)?;
    user.email = validate_email(&user.email)?;
    user.full_name = validate_full_name(&user.full_name)?;
    user.avatar = validate_avatar(&user.avatar)?;
    user.cover_image = normalize_optional(user.cover_image.take());
    if user.password_modified {
        validate_password(&user.password)?;
    }
    Ok(())
}

/// Validate the fields present in a profile edit
///
/// A blank `cover_image` is kept as an empty string, which asks for the
/// cover to be removed.
pub fn validate_update(update: UpdateUser) -> Result<UpdateUser, ValidationError> {
    Ok(UpdateUser {
        username: update.username.as_deref().map(validate_username).transpose()?,
        email: update.email.as_deref().map(validate_email).transpose()?,
        full_name: update
            .full_name
            .as_deref()
            .map(validate_full_name)
            .transpose()?,
        avatar: update.avatar.as_deref().map(validate_avatar).transpose()?,
        cover_image: update.cover_image.map(|v| v.trim().to_string()),
        password: match update.password {
            Some(password) => {
                validate_password(&password)?;
                Some(password)
            }
            None => None,
        },
    })
}

/// Validate username, returning it trimmed and lowercased
pub fn validate_username(username: &str) -> Result<String, ValidationError> {
    let username = username.trim().to_lowercase();
    if username.is_empty() {
        return Err(ValidationError::new(
            "username",
            Rule::Required,
            "Username is required",
        ));
    }

    static USERNAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = USERNAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9_.-]+$").expect("Failed to compile username regex"));

    if !regex.is_match(&username) {
        return Err(ValidationError::new(
            "username",
            Rule::Pattern,
            "Username can only contain letters, numbers, underscores, dots, and hyphens.",
        ));
    }

    Ok(username)
}

/// Validate email, returning it trimmed and lowercased
pub fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim().to_lowercase();
    if email.is_empty() {
        return Err(ValidationError::new(
            "email",
            Rule::Required,
            "Email is required",
        ));
    }

    if !email.contains('@') {
        return Err(ValidationError::new(
            "email",
            Rule::Email,
            "Email must include \"@\"",
        ));
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9_'+\-.]*[a-zA-Z0-9_+-]@([a-zA-Z0-9][a-zA-Z0-9-]*\.)+[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    // The regex engine has no lookahead for these two
    if email.starts_with('.') || email.contains("..") || !regex.is_match(&email) {
        return Err(ValidationError::new(
            "email",
            Rule::Email,
            "Email must be a valid email address",
        ));
    }

    Ok(email)
}

/// Validate full name, returning it trimmed
pub fn validate_full_name(full_name: &str) -> Result<String, ValidationError> {
    let full_name = full_name.trim();
    if full_name.is_empty() {
        return Err(ValidationError::new(
            "fullName",
            Rule::Required,
            "Full name is required",
        ));
    }

    static FULL_NAME_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = FULL_NAME_REGEX
        .get_or_init(|| Regex::new(r"^[a-zA-Z\s]+$").expect("Failed to compile full name regex"));

    if !regex.is_match(full_name) {
        return Err(ValidationError::new(
            "fullName",
            Rule::Pattern,
            "Full name can only contain letters and spaces.",
        ));
    }

    Ok(full_name.to_string())
}

/// Validate the avatar URL is present
pub fn validate_avatar(avatar: &str) -> Result<String, ValidationError> {
    let avatar = avatar.trim();
    if avatar.is_empty() {
        return Err(ValidationError::new(
            "avatar",
            Rule::Required,
            "Avatar is required",
        ));
    }
    Ok(avatar.to_string())
}

/// Validate password
///
/// Only the length is enforced. The message still lists character classes
/// that are not checked. Length is counted in UTF-16 code units, so an
/// astral character such as an emoji counts twice.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        return Err(ValidationError::new(
            "password",
            Rule::Required,
            "Password is required",
        ));
    }

    if password.encode_utf16().count() < PASSWORD_MIN_LENGTH {
        return Err(ValidationError::new(
            "password",
            Rule::MinLength(PASSWORD_MIN_LENGTH),
            "Password must be at least 8 characters long and include at least one lowercase letter, one uppercase letter, and one digit.",
        ));
    }

    Ok(())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate() -> NewUser {
        NewUser {
            username: "  Jane.Doe_99 ".to_string(),
            email: " Jane@Example.COM ".to_string(),
            full_name: " Jane Doe ".to_string(),
            avatar: "https://res.cloudinary.com/demo/image/upload/avatar.png".to_string(),
            cover_image: Some("   ".to_string()),
            password: "password".to_string(),
        }
    }

    #[test]
    fn test_validate_normalizes_fields() {
        let validated = validate(candidate()).unwrap();
        assert_eq!(validated.username, "jane.doe_99");
        assert_eq!(validated.email, "jane@example.com");
        assert_eq!(validated.full_name, "Jane Doe");
        assert_eq!(validated.cover_image, None);
        assert_eq!(validated.password, "password");
    }

    #[test]
    fn test_username_pattern() {
        for valid in ["alice", "a.b-c_d", "user123", "...", "X"] {
            assert!(validate_username(valid).is_ok(), "{valid} should pass");
        }

        for invalid in ["al ice", "bob!", "émile", "a/b", "name@host"] {
            let err = validate_username(invalid).unwrap_err();
            assert_eq!(err.field, "username");
            assert_eq!(err.rule, Rule::Pattern, "{invalid} should fail");
        }
    }

    #[test]
    fn test_username_required() {
        let err = validate_username("   ").unwrap_err();
        assert_eq!(err.rule, Rule::Required);
    }

    #[test]
    fn test_email_rules() {
        assert_eq!(validate_email("A@B.io").unwrap(), "a@b.io");

        let err = validate_email("no-at-sign.com").unwrap_err();
        assert_eq!(err.rule, Rule::Email);
        assert_eq!(err.message, "Email must include \"@\"");

        let err = validate_email("user@localhost").unwrap_err();
        assert_eq!(err.rule, Rule::Email);

        let err = validate_email("").unwrap_err();
        assert_eq!(err.rule, Rule::Required);

        for valid in ["first.last@example.com", "o'neil+tag@mail.example.org", "a@x-y.co"] {
            assert!(validate_email(valid).is_ok(), "{valid} should pass");
        }

        for invalid in [
            "a..b@example.com",
            ".a@example.com",
            "a.@example.com",
            "a@example..com",
            "a@-x.com",
            "a@example.c",
            "a b@example.com",
        ] {
            let err = validate_email(invalid).unwrap_err();
            assert_eq!(err.rule, Rule::Email, "{invalid} should fail");
        }
    }

    #[test]
    fn test_full_name_pattern() {
        assert!(validate_full_name("Ada Lovelace").is_ok());
        assert_eq!(validate_full_name("R2 D2").unwrap_err().field, "fullName");
        assert_eq!(validate_full_name("O'Brien").unwrap_err().rule, Rule::Pattern);
    }

    #[test]
    fn test_password_length_only() {
        for short in ["a", "Abc123", "1234567"] {
            let err = validate_password(short).unwrap_err();
            assert_eq!(err.rule, Rule::MinLength(8));
        }

        // No character classes are required
        for long in ["aaaaaaaa", "12345678", "        ", "ÄÖÜäöüßé"] {
            assert!(validate_password(long).is_ok(), "{long:?} should pass");
        }
    }

    #[test]
    fn test_password_length_counts_utf16_units() {
        // Four emoji are eight UTF-16 code units
        assert!(validate_password("😀😀😀😀").is_ok());
        assert!(validate_password("😀😀😀").is_err());
    }

    #[test]
    fn test_validate_record_rejects_short_new_password() {
        let mut user = User::new(validate(candidate()).unwrap());
        user.set_password("x");

        let err = validate_record(&mut user).unwrap_err();
        assert_eq!(err.field, "password");
        assert_eq!(err.rule, Rule::MinLength(8));
    }

    #[test]
    fn test_validate_record_rejects_edited_fields() {
        let mut user = User::new(validate(candidate()).unwrap());
        user.username = "Bad Name!".to_string();
        assert_eq!(validate_record(&mut user).unwrap_err().field, "username");

        let mut user = User::new(validate(candidate()).unwrap());
        user.email = "a..b@example.com".to_string();
        assert_eq!(validate_record(&mut user).unwrap_err().field, "email");
    }

    #[test]
    fn test_validate_record_normalizes_and_skips_stored_hash() {
        let mut user = User::new(validate(candidate()).unwrap());
        user.password = "$argon2id$short".to_string();
        user.password_modified = false;
        user.username = " NewName ".to_string();

        validate_record(&mut user).unwrap();
        assert_eq!(user.username, "newname");
    }

    #[test]
    fn test_validate_reports_first_failing_field() {
        let mut bad = candidate();
        bad.full_name = "J4ne".to_string();
        bad.password = "short".to_string();

        let err = validate(bad).unwrap_err();
        assert_eq!(err.field, "fullName");
    }

    #[test]
    fn test_validate_requires_avatar() {
        let mut bad = candidate();
        bad.avatar = String::new();

        let err = validate(bad).unwrap_err();
        assert_eq!(err.field, "avatar");
        assert_eq!(err.rule, Rule::Required);
    }

    #[test]
    fn test_validate_update_checks_present_fields_only() {
        let update = UpdateUser {
            email: Some(" New@Mail.org".to_string()),
            ..Default::default()
        };
        let update = validate_update(update).unwrap();
        assert_eq!(update.email.as_deref(), Some("new@mail.org"));
        assert!(update.username.is_none());

        let update = UpdateUser {
            password: Some("tiny".to_string()),
            ..Default::default()
        };
        assert_eq!(validate_update(update).unwrap_err().field, "password");
    }

    #[test]
    fn test_validate_update_keeps_blank_cover_image() {
        let update = UpdateUser {
            cover_image: Some("   ".to_string()),
            ..Default::default()
        };
        let update = validate_update(update).unwrap();
        assert_eq!(update.cover_image.as_deref(), Some(""));
    }
}
