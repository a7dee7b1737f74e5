use crate::domain::entities::session::Session;
use crate::domain::entities::user::{Credentials, SignupReceipt, User};
use crate::domain::error::DomainError;
use async_trait::async_trait;

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn signup(&self, credentials: &Credentials) -> Result<SignupReceipt, DomainError>;
    /// Exchange credentials for a session. Does not activate it.
    async fn login(&self, credentials: &Credentials) -> Result<Session, DomainError>;
    async fn logout(&self) -> Result<(), DomainError>;
    async fn me(&self) -> Result<User, DomainError>;
    async fn confirm_email(&self, token: &str) -> Result<String, DomainError>;
    async fn resend_confirmation(&self, email: &str) -> Result<String, DomainError>;
    async fn change_password(&self, current_password: &str, new_password: &str) -> Result<String, DomainError>;
}
