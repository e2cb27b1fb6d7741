//! Account use-case service: the identity provider behind gated routes.
//!
//! # Responsibility
//! - Register users with Argon2 password hashes.
//! - Verify credentials and issue opaque session tokens.
//! - Resolve session tokens back to a [`Principal`].
//!
//! # Invariants
//! - Passwords are never stored, logged or echoed back into forms.
//! - Failed logins never reveal whether the username exists.
//! - Sessions older than [`SESSION_MAX_AGE_MS`] are purged when a new one opens.

use crate::form::{
    BoundForm, FormOutcome, FormRequest, LoginForm, RegisterForm, ValidationErrors,
    NON_FIELD_ERRORS,
};
use crate::model::principal::Principal;
use crate::repo::account_repo::{
    SessionRepository, SqliteAccountRepository, UserRepository, SESSION_MAX_AGE_MS,
};
use crate::repo::RepoError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use log::{debug, info};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub const INVALID_LOGIN_MESSAGE: &str = "Please enter a correct username and password.";
pub const USERNAME_TAKEN_MESSAGE: &str = "A user with that username already exists.";

pub type AccountResult<T> = Result<T, AccountError>;

/// Service error for account use-cases.
#[derive(Debug)]
pub enum AccountError {
    /// Hashing failed or a stored hash could not be parsed.
    PasswordHash(String),
    /// Persistence-layer failure.
    Repo(RepoError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PasswordHash(message) => write!(f, "password hash error: {message}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::PasswordHash(_) => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for AccountError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Session issued by a successful login or registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSession {
    pub token: String,
    pub principal: Principal,
}

/// Account service facade over user and session repositories.
pub struct AccountService<R: UserRepository + SessionRepository> {
    repo: R,
}

impl<'conn> AccountService<SqliteAccountRepository<'conn>> {
    pub fn with_connection(conn: &'conn Connection) -> Self {
        Self::new(SqliteAccountRepository::new(conn))
    }
}

impl<R: UserRepository + SessionRepository> AccountService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Shows or processes the registration form.
    ///
    /// A successful registration also opens a session for the new user.
    pub fn register(
        &self,
        request: FormRequest<RegisterForm>,
    ) -> AccountResult<FormOutcome<RegisterForm, LoginSession>> {
        let submitted = match request {
            FormRequest::Display => return Ok(FormOutcome::Render(BoundForm::empty())),
            FormRequest::Submit(form) => form,
        };

        let cleaned = match submitted.validate() {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(FormOutcome::Render(scrub_register(submitted, errors))),
        };

        let hash = hash_password(&cleaned.password1)?;
        let principal = match self.repo.create_user(&cleaned.username, &hash) {
            Ok(principal) => principal,
            Err(RepoError::Conflict(_)) => {
                let errors = ValidationErrors::single("username", USERNAME_TAKEN_MESSAGE);
                return Ok(FormOutcome::Render(scrub_register(submitted, errors)));
            }
            Err(err) => return Err(err.into()),
        };
        info!(
            "event=user_register module=account status=ok user_id={}",
            principal.id
        );

        self.start_session(principal).map(FormOutcome::Saved)
    }

    /// Shows or processes the login form.
    pub fn login(
        &self,
        request: FormRequest<LoginForm>,
    ) -> AccountResult<FormOutcome<LoginForm, LoginSession>> {
        let submitted = match request {
            FormRequest::Display => return Ok(FormOutcome::Render(BoundForm::empty())),
            FormRequest::Submit(form) => form,
        };

        let cleaned = match submitted.validate() {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(FormOutcome::Render(scrub_login(submitted, errors))),
        };

        let verified = match self.repo.find_user_by_username(&cleaned.username)? {
            Some(record) => verify_password(&cleaned.password, &record.password_hash)?
                .then_some(record),
            None => {
                // Unknown users pay the same hashing cost as known ones.
                hash_password(&cleaned.password)?;
                None
            }
        };

        match verified {
            Some(record) => self.start_session(record.principal).map(FormOutcome::Saved),
            None => {
                info!("event=user_login module=account status=rejected");
                let errors = ValidationErrors::single(NON_FIELD_ERRORS, INVALID_LOGIN_MESSAGE);
                Ok(FormOutcome::Render(scrub_login(submitted, errors)))
            }
        }
    }

    /// Resolves a session token to its principal.
    pub fn resolve_session(&self, token: &str) -> AccountResult<Option<Principal>> {
        if token.is_empty() {
            return Ok(None);
        }
        Ok(self.repo.principal_for_session(token)?)
    }

    /// Ends a session. Unknown tokens are ignored.
    pub fn logout(&self, token: &str) -> AccountResult<()> {
        self.repo.delete_session(token)?;
        info!("event=user_logout module=account status=ok");
        Ok(())
    }

    fn start_session(&self, principal: Principal) -> AccountResult<LoginSession> {
        let purged = self.repo.purge_expired_sessions()?;
        if purged > 0 {
            debug!(
                "event=session_purge module=account status=ok removed={purged} max_age_ms={SESSION_MAX_AGE_MS}"
            );
        }

        let token = Uuid::new_v4().simple().to_string();
        self.repo.create_session(&token, principal.id)?;
        info!(
            "event=user_login module=account status=ok user_id={}",
            principal.id
        );
        Ok(LoginSession { token, principal })
    }
}

/// Hashes `password` with Argon2id under a fresh random salt.
///
/// Returns the PHC string, which carries the parameters and salt alongside
/// the digest.
pub fn hash_password(password: &str) -> AccountResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| AccountError::PasswordHash(err.to_string()))
}

/// Checks `password` against a stored PHC string.
pub fn verify_password(password: &str, stored: &str) -> AccountResult<bool> {
    let parsed = PasswordHash::new(stored)
        .map_err(|err| AccountError::PasswordHash(format!("unreadable stored hash: {err}")))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AccountError::PasswordHash(err.to_string())),
    }
}

fn scrub_login(form: LoginForm, errors: ValidationErrors) -> BoundForm<LoginForm> {
    BoundForm::invalid(
        LoginForm {
            password: String::new(),
            ..form
        },
        errors,
    )
}

fn scrub_register(form: RegisterForm, errors: ValidationErrors) -> BoundForm<RegisterForm> {
    BoundForm::invalid(
        RegisterForm {
            username: form.username,
            ..RegisterForm::default()
        },
        errors,
    )
}
