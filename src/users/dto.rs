use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;
use crate::users::repo::User;

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-zA-Z0-9_]{3,16}$").unwrap();
    static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    static ref PHONE_RE: Regex = Regex::new(r"^\d{1,20}$").unwrap();
}

const PASSWORD_SPECIALS: &str = "#?!@$%^&*-";

/// Password rules: 8..=32 chars with at least one uppercase, one lowercase,
/// one digit and one special character.
fn password_errors(password: &str, out: &mut Vec<String>) {
    if password.len() < 8 || password.len() > 32 {
        out.push("password must be 8-32 characters long".into());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        out.push("password must contain an uppercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        out.push("password must contain a lowercase letter".into());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        out.push("password must contain a digit".into());
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        out.push(format!(
            "password must contain a special character ({PASSWORD_SPECIALS})"
        ));
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut errors = Vec::new();

        if !USERNAME_RE.is_match(&self.username) {
            errors.push("username must be 3-16 characters of letters, digits or underscore".into());
        }
        password_errors(&self.password, &mut errors);

        for (field, value) in [("first_name", &self.first_name), ("last_name", &self.last_name)] {
            if let Some(v) = value {
                if v.trim().is_empty() || v.len() > 100 {
                    errors.push(format!("{field} must be 1-100 characters"));
                }
            }
        }
        if let Some(email) = &self.email {
            if !EMAIL_RE.is_match(email) {
                errors.push("email is not a valid address".into());
            }
        }
        if let Some(phone) = &self.phone {
            if !PHONE_RE.is_match(phone) {
                errors.push("phone must contain 1-20 digits".into());
            }
        }
        if self.email.is_none() && self.phone.is_none() {
            errors.push("please provide either email or phone".into());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(errors))
        }
    }
}

pub fn validate_search_username(username: &str) -> Result<(), AppError> {
    if USERNAME_RE.is_match(username) {
        Ok(())
    } else {
        Err(AppError::Validation(vec![
            "username must be 3-16 characters of letters, digits or underscore".into(),
        ]))
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchUsersQuery {
    pub username: String,
    #[serde(default)]
    pub offset: i64,
    #[serde(default = "default_search_limit")]
    pub limit: i64,
}

fn default_search_limit() -> i64 {
    10
}

/// Full user representation returned to the owner of the record.
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
            email: u.email,
            phone: u.phone,
            created_at: u.created_at,
            updated_at: u.updated_at,
        }
    }
}

/// Trimmed user shape embedded in workspace/project/task responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserBrief {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl From<User> for UserBrief {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            username: u.username,
            first_name: u.first_name,
            last_name: u.last_name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_request() -> CreateUserRequest {
        CreateUserRequest {
            username: "alice_01".into(),
            password: "Passw0rd!".into(),
            first_name: Some("Alice".into()),
            last_name: None,
            email: Some("alice@example.com".into()),
            phone: None,
        }
    }

    #[test]
    fn email_only_is_enough() {
        assert!(valid_request().validate().is_ok());
    }

    #[test]
    fn phone_only_is_enough() {
        let mut req = valid_request();
        req.email = None;
        req.phone = Some("79001234567".into());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn neither_email_nor_phone_fails() {
        let mut req = valid_request();
        req.email = None;
        req.phone = None;
        let err = req.validate().unwrap_err();
        match err {
            AppError::Validation(errors) => {
                assert!(errors.iter().any(|e| e.contains("either email or phone")));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn username_charset_and_length_enforced() {
        for bad in ["ab", "no spaces", "way_too_long_username", "bad-dash"] {
            let mut req = valid_request();
            req.username = bad.into();
            assert!(req.validate().is_err(), "username {bad:?} should fail");
        }
    }

    #[test]
    fn password_must_mix_character_classes() {
        for bad in ["short1!", "alllower1!", "ALLUPPER1!", "NoDigits!!", "NoSpecial11"] {
            let mut req = valid_request();
            req.password = bad.into();
            assert!(req.validate().is_err(), "password {bad:?} should fail");
        }
    }

    #[test]
    fn phone_must_be_digits() {
        let mut req = valid_request();
        req.phone = Some("+7900".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn bad_email_rejected() {
        let mut req = valid_request();
        req.email = Some("not-an-email".into());
        assert!(req.validate().is_err());
    }

    #[test]
    fn search_username_validated_like_create() {
        assert!(validate_search_username("ali").is_ok());
        assert!(validate_search_username("a").is_err());
    }
}
