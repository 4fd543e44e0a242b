use std::sync::Arc;

use chrono::{DateTime, NaiveDate, SubsecRound, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::alert::alert_horizon;
use crate::database::models::{
    NewRegistration, Registration, RegistrationAlert, RegistrationChanges, RegistrationKey,
};
use crate::database::{RegistrationStore, StoreError};
use crate::types::{parse_calendar_date, parse_timestamp, RegisterKind};

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Registration workflows over an injected store.
///
/// Every method issues exactly one store call, and classification is
/// recomputed on each alert read.
#[derive(Clone)]
pub struct RegistrationService {
    store: Arc<dyn RegistrationStore>,
}

impl RegistrationService {
    pub fn new(store: Arc<dyn RegistrationStore>) -> Self {
        Self { store }
    }

    pub async fn ping(&self) -> Result<(), RegistryError> {
        Ok(self.store.ping().await?)
    }

    pub async fn list(&self, kind: RegisterKind) -> Result<Vec<Registration>, RegistryError> {
        Ok(self.store.list(kind).await?)
    }

    /// Create a registration stamped with the current time
    pub async fn create(
        &self,
        kind: RegisterKind,
        worker_id: Option<i32>,
        fields: RegistrationChanges,
    ) -> Result<i64, RegistryError> {
        self.create_at(kind, worker_id, fields, Utc::now()).await
    }

    pub async fn create_at(
        &self,
        kind: RegisterKind,
        worker_id: Option<i32>,
        fields: RegistrationChanges,
        now: DateTime<Utc>,
    ) -> Result<i64, RegistryError> {
        let worker_id =
            worker_id.ok_or_else(|| RegistryError::Validation("Worker_ID is required".into()))?;

        let new = NewRegistration {
            worker_id,
            // Postgres keeps microseconds; truncate so the echoed value round-trips
            record_date: now.trunc_subsecs(6),
            fields,
        };
        let id = self.store.insert(kind, &new).await?;
        info!(%kind, id, worker_id, "registration created");
        Ok(id)
    }

    /// Full update addressed by worker and the calendar day of `record_date`
    pub async fn update(
        &self,
        kind: RegisterKind,
        worker_id: i32,
        record_date: Option<&str>,
        fields: RegistrationChanges,
    ) -> Result<(), RegistryError> {
        let key = RegistrationKey::by_day(worker_id, Self::record_day(record_date)?);
        let affected = self.store.update(kind, &key, &fields).await?;
        Self::expect_match(kind, &key, affected)
    }

    /// Destructive delete addressed by worker and the exact stored timestamp
    pub async fn delete(
        &self,
        kind: RegisterKind,
        worker_id: i32,
        record_date: Option<&str>,
    ) -> Result<(), RegistryError> {
        let key = RegistrationKey::exact(worker_id, Self::record_timestamp(record_date)?);
        let affected = self.store.delete(kind, &key).await?;
        Self::expect_match(kind, &key, affected)
    }

    /// Set or clear the acknowledgment flag. Classification is untouched.
    pub async fn set_acknowledged(
        &self,
        kind: RegisterKind,
        worker_id: i32,
        record_date: Option<&str>,
        value: bool,
    ) -> Result<(), RegistryError> {
        let key = RegistrationKey::by_day(worker_id, Self::record_day(record_date)?);
        let affected = self.store.set_alert_completed(kind, &key, value).await?;
        Self::expect_match(kind, &key, affected)
    }

    /// Alert listing for the current UTC day
    pub async fn list_alerts(
        &self,
        kind: RegisterKind,
    ) -> Result<Vec<RegistrationAlert>, RegistryError> {
        self.list_alerts_on(kind, Utc::now().date_naive()).await
    }

    /// Overdue and expiring-soon registrations as of `today`, soonest validity first
    pub async fn list_alerts_on(
        &self,
        kind: RegisterKind,
        today: NaiveDate,
    ) -> Result<Vec<RegistrationAlert>, RegistryError> {
        let records = self.store.alerts_due_by(kind, alert_horizon(today)).await?;
        Ok(records
            .into_iter()
            .map(|record| RegistrationAlert::evaluate(record, today))
            .filter(|alert| alert.alert.status.is_alerting())
            .collect())
    }

    fn require_record_date(raw: Option<&str>) -> Result<&str, RegistryError> {
        match raw.map(str::trim) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(RegistryError::Validation("Record_Date is required".into())),
        }
    }

    fn record_day(raw: Option<&str>) -> Result<NaiveDate, RegistryError> {
        parse_calendar_date(Self::require_record_date(raw)?).map_err(RegistryError::Validation)
    }

    fn record_timestamp(raw: Option<&str>) -> Result<DateTime<Utc>, RegistryError> {
        parse_timestamp(Self::require_record_date(raw)?).map_err(RegistryError::Validation)
    }

    fn expect_match(
        kind: RegisterKind,
        key: &RegistrationKey,
        affected: u64,
    ) -> Result<(), RegistryError> {
        match affected {
            0 => Err(RegistryError::NotFound(format!("{} not found", kind.label()))),
            1 => Ok(()),
            n => {
                // Same worker registered twice on one day: the day key cannot tell them apart
                warn!(
                    %kind,
                    worker_id = key.worker_id,
                    record_date = ?key.record_date,
                    rows = n,
                    "natural key matched more than one registration"
                );
                Ok(())
            }
        }
    }
}
