use crate::application::repos::RepoError;

/// Translate driver errors into the repository vocabulary. Constraint
/// violations and timeouts are recognized from the server message; anything
/// else is an opaque persistence failure.
pub fn map_sqlx_error(err: sqlx::Error) -> RepoError {
    match err {
        sqlx::Error::RowNotFound => RepoError::NotFound,
        sqlx::Error::PoolTimedOut => RepoError::Timeout,
        sqlx::Error::Database(db) => {
            let message = db.message();
            if message.contains("duplicate key") {
                RepoError::Duplicate {
                    constraint: db.constraint().unwrap_or("unknown").to_string(),
                }
            } else if message.contains("violates foreign key constraint")
                || message.contains("invalid input syntax")
            {
                RepoError::InvalidInput {
                    message: message.to_string(),
                }
            } else if message.contains("canceling statement due to statement timeout")
                || message.contains("canceling statement due to user request")
            {
                RepoError::Timeout
            } else {
                RepoError::Persistence(message.to_string())
            }
        }
        other => RepoError::from_persistence(other),
    }
}
