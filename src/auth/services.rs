use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use time::{
    format_description::well_known::Rfc3339, macros::format_description, Date, OffsetDateTime,
};
use tokio::task;
use tracing::{info, warn};

use crate::{
    auth::{
        dto::{LoginRequest, RegisterRequest},
        jwt::JwtKeys,
        password::{hash_password, verify_password},
        repo::UserStore,
        repo_types::{Gender, NewUser, User},
    },
    error::AuthError,
};

const REGISTRATION: &str = "registration";
const LOGIN: &str = "login";

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Trimmed, non-blank value or `None`.
fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn present_secret(value: Option<SecretString>) -> Option<SecretString> {
    value.filter(|p| !p.expose_secret().is_empty())
}

fn parse_dob(raw: &str) -> Result<Date, AuthError> {
    let raw = raw.trim();
    Date::parse(raw, format_description!("[year]-[month]-[day]"))
        .or_else(|_| OffsetDateTime::parse(raw, &Rfc3339).map(|dt| dt.date()))
        .map_err(|_| AuthError::Validation("Invalid date of birth".into()))
}

/// Registration input after validation and normalization.
#[derive(Debug)]
struct Registration {
    name: String,
    username: Option<String>,
    email: String,
    password: SecretString,
    gender: Gender,
    dob: Option<Date>,
}

impl TryFrom<RegisterRequest> for Registration {
    type Error = AuthError;

    fn try_from(req: RegisterRequest) -> Result<Self, Self::Error> {
        let (Some(name), Some(email), Some(password)) = (
            present(req.name),
            present(req.email),
            present_secret(req.password),
        ) else {
            return Err(AuthError::Validation(
                "Missing required fields: name, email, or password".into(),
            ));
        };

        let email = normalize_email(&email);

        let gender = match present(req.gender) {
            Some(g) => g
                .parse::<Gender>()
                .map_err(|_| AuthError::Validation("Invalid gender".into()))?,
            None => Gender::default(),
        };
        let dob = present(req.dob).as_deref().map(parse_dob).transpose()?;

        Ok(Self {
            name,
            username: present(req.username),
            email,
            password,
            gender,
            dob,
        })
    }
}

/// A successful login: the issued token and the authenticated account.
#[derive(Debug)]
pub struct Session {
    pub token: String,
    pub user: User,
}

/// Validates identities and issues session tokens.
pub struct CredentialService {
    store: Arc<dyn UserStore>,
    keys: Option<JwtKeys>,
}

impl CredentialService {
    /// `keys` is `None` when no signing secret is configured; login then
    /// fails after password verification.
    pub fn new(store: Arc<dyn UserStore>, keys: Option<JwtKeys>) -> Self {
        Self { store, keys }
    }

    /// validate → lookup → hash → persist
    pub async fn register(&self, req: RegisterRequest) -> Result<User, AuthError> {
        let reg = Registration::try_from(req)?;

        let existing = self
            .store
            .find_by_email(&reg.email)
            .await
            .map_err(|e| AuthError::from_store(REGISTRATION, e))?;
        if existing.is_some() {
            warn!(email = %reg.email, "email already registered");
            return Err(AuthError::DuplicateEmail);
        }

        let password = reg.password;
        let password_hash = task::spawn_blocking(move || hash_password(password.expose_secret()))
            .await
            .map_err(|e| AuthError::storage(REGISTRATION, e))?
            .map_err(|e| AuthError::storage(REGISTRATION, e))?;

        let user = self
            .store
            .insert(NewUser {
                name: reg.name,
                username: reg.username,
                email: reg.email,
                password_hash,
                gender: reg.gender,
                dob: reg.dob,
            })
            .await
            .map_err(|e| AuthError::from_store(REGISTRATION, e))?;

        info!(user_id = %user.id, email = %user.email, "new user registered");
        Ok(user)
    }

    /// validate → lookup → verify → issue
    pub async fn login(&self, req: LoginRequest) -> Result<Session, AuthError> {
        let (Some(email), Some(password)) = (present(req.email), present_secret(req.password))
        else {
            return Err(AuthError::Validation(
                "Missing required fields: email or password".into(),
            ));
        };
        let email = normalize_email(&email);

        let user = self
            .store
            .find_by_email(&email)
            .await
            .map_err(|e| AuthError::from_store(LOGIN, e))?
            .ok_or_else(|| {
                warn!(email = %email, "login unknown email");
                AuthError::NotFound
            })?;

        let stored = user.password_hash.clone();
        let ok = task::spawn_blocking(move || verify_password(password.expose_secret(), &stored))
            .await
            .map_err(|e| AuthError::storage(LOGIN, e))?
            .map_err(|e| AuthError::storage(LOGIN, e))?;
        if !ok {
            warn!(user_id = %user.id, "login invalid password");
            return Err(AuthError::Authentication);
        }

        let keys = self
            .keys
            .as_ref()
            .ok_or(AuthError::MissingSigningKey { during: LOGIN })?;
        let token = keys.sign(user.id).map_err(|e| AuthError::storage(LOGIN, e))?;

        info!(user_id = %user.id, "user logged in");
        Ok(Session { token, user })
    }
}
