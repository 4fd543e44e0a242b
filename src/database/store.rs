use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use super::models::{AlertRecord, NewRegistration, Registration, RegistrationChanges, RegistrationKey};
use crate::types::RegisterKind;

/// Persistence failures, split so callers can tell an unreachable database
/// from a rejected write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Constraint violation: {0}")]
    Constraint(String),

    #[error("Query error: {0}")]
    Query(String),
}

impl StoreError {
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }

    /// Underlying driver message without the variant prefix
    pub fn detail(&self) -> &str {
        match self {
            StoreError::Connection(msg) | StoreError::Constraint(msg) | StoreError::Query(msg) => msg,
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Connection(err.to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation
                | ErrorKind::ForeignKeyViolation
                | ErrorKind::NotNullViolation
                | ErrorKind::CheckViolation => StoreError::Constraint(db_err.message().to_string()),
                _ => StoreError::Query(db_err.message().to_string()),
            },
            _ => StoreError::Query(err.to_string()),
        }
    }
}

/// Every operation is a single statement; none of them hold state between calls.
///
/// Write operations return the number of rows the statement matched so the
/// caller decides what zero (or more than one) means.
#[async_trait]
pub trait RegistrationStore: Send + Sync {
    /// Round-trip to the backing store
    async fn ping(&self) -> Result<(), StoreError>;

    /// All registrations of a kind, newest `record_date` first
    async fn list(&self, kind: RegisterKind) -> Result<Vec<Registration>, StoreError>;

    /// Insert and return the surrogate id
    async fn insert(&self, kind: RegisterKind, new: &NewRegistration) -> Result<i64, StoreError>;

    async fn update(
        &self,
        kind: RegisterKind,
        key: &RegistrationKey,
        changes: &RegistrationChanges,
    ) -> Result<u64, StoreError>;

    async fn delete(&self, kind: RegisterKind, key: &RegistrationKey) -> Result<u64, StoreError>;

    async fn set_alert_completed(
        &self,
        kind: RegisterKind,
        key: &RegistrationKey,
        value: bool,
    ) -> Result<u64, StoreError>;

    /// Registrations with `validity_date <= horizon`, joined with worker,
    /// department and program attributes, ordered by `validity_date` ascending.
    async fn alerts_due_by(
        &self,
        kind: RegisterKind,
        horizon: NaiveDate,
    ) -> Result<Vec<AlertRecord>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_failures_are_connection_errors() {
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_connection());
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_connection());
        assert!(!StoreError::from(sqlx::Error::RowNotFound).is_connection());
    }

    #[test]
    fn detail_strips_prefix() {
        let err = StoreError::Constraint("duplicate key".into());
        assert_eq!(err.detail(), "duplicate key");
        assert_eq!(err.to_string(), "Constraint violation: duplicate key");
    }
}
