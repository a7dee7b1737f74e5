use crate::domain::entities::session::{Session, SessionContext};
use crate::domain::entities::user::{Credentials, SignupReceipt, User};
use crate::domain::error::{DomainError, FieldError};
use crate::domain::ports::auth_api::AuthApi;
use crate::domain::ports::session_store::SessionStore;
use log::{info, warn};
use std::sync::Arc;

const MIN_PASSWORD_LEN: usize = 8;

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn check_email(email: &str, errors: &mut Vec<FieldError>) {
    let valid = match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.'),
        None => false,
    };
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if !valid || email.contains(char::is_whitespace) {
        errors.push(FieldError::new("email", "Please enter a valid email address"));
    }
}

/// Password strength rules for signup and password changes.
pub fn check_password(field: &'static str, password: &str, errors: &mut Vec<FieldError>) {
    if password.chars().count() < MIN_PASSWORD_LEN {
        errors.push(FieldError::new(field, "Password must be at least 8 characters long"));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push(FieldError::new(field, "Password must contain at least one uppercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push(FieldError::new(field, "Password must contain at least one lowercase letter"));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push(FieldError::new(field, "Password must contain at least one number"));
    }
}

fn finish(errors: Vec<FieldError>) -> Result<(), DomainError> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(DomainError::Validation(errors))
    }
}

pub fn validate_signup(email: &str, password: &str, confirm: &str) -> Result<Credentials, DomainError> {
    let email = normalize_email(email);
    let mut errors = Vec::new();
    check_email(&email, &mut errors);
    check_password("password", password, &mut errors);
    if password != confirm {
        errors.push(FieldError::new("confirm_password", "Passwords do not match"));
    }
    finish(errors)?;
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

pub fn validate_login(email: &str, password: &str) -> Result<Credentials, DomainError> {
    let email = normalize_email(email);
    let mut errors = Vec::new();
    check_email(&email, &mut errors);
    if password.is_empty() {
        errors.push(FieldError::new("password", "Password is required"));
    }
    finish(errors)?;
    Ok(Credentials {
        email,
        password: password.to_string(),
    })
}

/// Owns the session lifecycle: the in-process `SessionContext` every adapter
/// reads the token from, and the durable `SessionStore` behind it.
pub struct AuthUseCase {
    api: Arc<dyn AuthApi>,
    store: Arc<dyn SessionStore>,
    session: SessionContext,
}

impl AuthUseCase {
    pub fn new(api: Arc<dyn AuthApi>, store: Arc<dyn SessionStore>, session: SessionContext) -> Self {
        Self { api, store, session }
    }

    /// Pick up a session saved by an earlier run and check it is still
    /// accepted. A rejected or unverifiable token is forgotten.
    pub async fn restore(&self) -> Result<Option<Session>, DomainError> {
        let Some(saved) = self.store.load()? else {
            return Ok(None);
        };
        self.session.begin(saved);
        match self.me().await {
            Ok(_) => Ok(self.session.current()),
            Err(e) => {
                warn!("discarding saved session: {e}");
                self.session.end();
                self.store.clear()?;
                Ok(None)
            }
        }
    }

    pub async fn signup(&self, email: &str, password: &str, confirm: &str) -> Result<SignupReceipt, DomainError> {
        let credentials = validate_signup(email, password, confirm)?;
        let receipt = self.api.signup(&credentials).await?;
        info!("signed up {}", credentials.email);
        Ok(receipt)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Session, DomainError> {
        let credentials = validate_login(email, password)?;
        let session = self.api.login(&credentials).await?;
        self.session.begin(session.clone());
        self.store.save(&session)?;
        info!("logged in as {}", credentials.email);
        Ok(session)
    }

    /// Tell the backend, then drop the session locally whatever it said.
    pub async fn logout(&self) -> Result<(), DomainError> {
        if !self.session.is_authenticated() {
            self.store.clear()?;
            return Ok(());
        }
        if let Err(e) = self.api.logout().await {
            warn!("backend logout failed, clearing local session anyway: {e}");
        }
        self.session.end();
        self.store.clear()?;
        info!("logged out");
        Ok(())
    }

    pub async fn me(&self) -> Result<User, DomainError> {
        if !self.session.is_authenticated() {
            return Err(DomainError::Unauthorized("Please log in first".into()));
        }
        match self.api.me().await {
            Ok(user) => {
                self.session.set_user(user.clone());
                if let Some(session) = self.session.current() {
                    self.store.save(&session)?;
                }
                Ok(user)
            }
            Err(e) if e.status() == Some(401) => {
                warn!("stored session rejected by backend, clearing it");
                self.session.end();
                self.store.clear()?;
                Err(DomainError::Unauthorized("Session expired, please log in again".into()))
            }
            Err(e) => Err(e),
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.session.current()
    }

    pub async fn confirm_email(&self, token: &str) -> Result<String, DomainError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DomainError::InvalidInput("Confirmation token is required".into()));
        }
        self.api.confirm_email(token).await
    }

    pub async fn resend_confirmation(&self, email: &str) -> Result<String, DomainError> {
        let email = normalize_email(email);
        let mut errors = Vec::new();
        check_email(&email, &mut errors);
        finish(errors)?;
        self.api.resend_confirmation(&email).await
    }

    pub async fn change_password(&self, current: &str, new: &str, confirm: &str) -> Result<String, DomainError> {
        let mut errors = Vec::new();
        if current.is_empty() {
            errors.push(FieldError::new("current_password", "Current password is required"));
        }
        check_password("new_password", new, &mut errors);
        if new != confirm {
            errors.push(FieldError::new("confirm_password", "Passwords do not match"));
        }
        if !current.is_empty() && current == new {
            errors.push(FieldError::new("new_password", "New password must be different from the current one"));
        }
        finish(errors)?;
        if !self.session.is_authenticated() {
            return Err(DomainError::Unauthorized("Please log in first".into()));
        }
        self.api.change_password(current, new).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_rules() {
        let mut errors = Vec::new();
        check_password("password", "short", &mut errors);
        assert_eq!(errors.len(), 3);

        let mut errors = Vec::new();
        check_password("password", "Passw0rdOK", &mut errors);
        assert!(errors.is_empty());
    }

    #[test]
    fn signup_checks_confirmation_and_normalizes_email() {
        let creds = validate_signup(" Trader@Example.COM ", "Passw0rdOK", "Passw0rdOK").unwrap();
        assert_eq!(creds.email, "trader@example.com");

        let err = validate_signup("trader@example.com", "Passw0rdOK", "Passw0rdKO").unwrap_err();
        assert!(matches!(err, DomainError::Validation(ref f) if f[0].field == "confirm_password"));
    }

    #[test]
    fn login_rejects_malformed_email() {
        assert!(validate_login("not-an-email", "x").is_err());
        assert!(validate_login("a@b.co", "").is_err());
        assert!(validate_login("a@b.co", "x").is_ok());
    }
}
