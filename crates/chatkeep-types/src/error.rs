use thiserror::Error;

/// Errors related to registration, login, and session tokens.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("{0} already exists")]
    Conflict(String),

    /// Bad credentials, or a missing, invalid, or expired token.
    ///
    /// Deliberately carries no detail so callers cannot tell an unknown
    /// username from a wrong password.
    #[error("unauthorized")]
    Unauthorized,

    #[error("storage error: {0}")]
    Storage(String),

    /// Password hashing or token signing failed.
    #[error("crypto error: {0}")]
    Crypto(String),
}

/// Errors related to chat operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("chat not found")]
    NotFound,

    /// The chat id is already taken by a chat of another user.
    #[error("chat id '{0}' is already in use")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors related to per-user settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("storage error: {0}")]
    Storage(String),
}

/// Errors from repository operations (used by trait definitions in chatkeep-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for AuthError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Conflict(what) => AuthError::Conflict(what),
            other => AuthError::Storage(other.to_string()),
        }
    }
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            RepositoryError::Conflict(what) => ChatError::Conflict(what),
            other => ChatError::Storage(other.to_string()),
        }
    }
}

impl From<RepositoryError> for SettingsError {
    fn from(e: RepositoryError) -> Self {
        SettingsError::Storage(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error_display() {
        let err = AuthError::Conflict("username".to_string());
        assert_eq!(err.to_string(), "username already exists");
        assert_eq!(AuthError::Unauthorized.to_string(), "unauthorized");
    }

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_repository_conflict_maps_to_domain_conflict() {
        let err: AuthError = RepositoryError::Conflict("email".to_string()).into();
        assert!(matches!(err, AuthError::Conflict(ref w) if w == "email"));

        let err: ChatError = RepositoryError::Conflict("c1".to_string()).into();
        assert!(matches!(err, ChatError::Conflict(_)));
    }

    #[test]
    fn test_repository_failure_maps_to_storage() {
        let err: ChatError = RepositoryError::Connection.into();
        assert!(matches!(err, ChatError::Storage(_)));

        let err: SettingsError = RepositoryError::Query("boom".to_string()).into();
        assert_eq!(err.to_string(), "storage error: query error: boom");
    }
}
