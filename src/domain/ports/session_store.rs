use crate::domain::entities::session::Session;
use crate::domain::error::DomainError;

/// Durable home for the session between CLI runs.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>, DomainError>;
    fn save(&self, session: &Session) -> Result<(), DomainError>;
    fn clear(&self) -> Result<(), DomainError>;
}
