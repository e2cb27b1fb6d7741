//! Login and registration forms.

use crate::form::{clean_text, ValidationErrors, REQUIRED_MESSAGE};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const USERNAME_MAX_CHARS: usize = 150;
pub const PASSWORD_MIN_CHARS: usize = 8;

static USERNAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\w.@+\-]+$").expect("valid username regex"));

/// Credentials submitted to the login flow.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl LoginForm {
    /// Checks presence only; credential matching happens in the account service.
    ///
    /// Passwords are taken verbatim, without trimming.
    pub fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = clean_text(&mut errors, "username", &self.username, None);
        if self.password.is_empty() {
            errors.push("password", REQUIRED_MESSAGE);
        }
        errors.into_result(Self {
            username,
            password: self.password.clone(),
        })
    }
}

/// Sign-up input. Username uniqueness is checked against the store later.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegisterForm {
    pub username: String,
    pub password1: String,
    pub password2: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        let username = clean_text(
            &mut errors,
            "username",
            &self.username,
            Some(USERNAME_MAX_CHARS),
        );
        if !username.is_empty() && !USERNAME_RE.is_match(&username) {
            errors.push(
                "username",
                "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
            );
        }

        if self.password1.is_empty() {
            errors.push("password1", REQUIRED_MESSAGE);
        } else if self.password1.chars().count() < PASSWORD_MIN_CHARS {
            errors.push(
                "password1",
                format!(
                    "This password is too short. It must contain at least {PASSWORD_MIN_CHARS} characters."
                ),
            );
        }

        if self.password2.is_empty() {
            errors.push("password2", REQUIRED_MESSAGE);
        } else if self.password1 != self.password2 {
            errors.push("password2", "The two password fields didn't match.");
        }

        errors.into_result(Self {
            username,
            password1: self.password1.clone(),
            password2: self.password2.clone(),
        })
    }
}
