use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of `trade_register` or `training_register`.
///
/// `program_code` is the trade code or the training code depending on the
/// register kind. `enrollment_date` is always `None` for training rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: i64,
    pub worker_id: i32,
    pub record_date: DateTime<Utc>,
    pub department_code: i32,
    pub program_code: i32,
    pub enrollment_date: Option<NaiveDate>,
    pub validity_date: NaiveDate,
    pub status: Option<String>,
    pub remarks: Option<String>,
    pub alert_completed: bool,
}

/// Every caller-supplied field except the identity pair. Updates replace all
/// of these at once; there is no partial update.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationChanges {
    pub department_code: i32,
    pub program_code: i32,
    pub enrollment_date: Option<NaiveDate>,
    pub validity_date: NaiveDate,
    pub status: Option<String>,
    pub remarks: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRegistration {
    pub worker_id: i32,
    /// Stamped by the service at acceptance time, never taken from the caller
    pub record_date: DateTime<Utc>,
    pub fields: RegistrationChanges,
}

/// How a caller-supplied `record_date` is matched against stored rows.
///
/// Update and acknowledgment match on the UTC calendar day, delete matches the
/// exact stored timestamp. The two are separate entry points and must not be
/// merged: a day match can hit several rows created on the same day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordDateMatch {
    CalendarDate(NaiveDate),
    Exact(DateTime<Utc>),
}

impl RecordDateMatch {
    pub fn matches(&self, record_date: &DateTime<Utc>) -> bool {
        match self {
            RecordDateMatch::CalendarDate(day) => record_date.date_naive() == *day,
            RecordDateMatch::Exact(ts) => record_date == ts,
        }
    }
}

/// Natural-key address of a registration: worker plus record date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistrationKey {
    pub worker_id: i32,
    pub record_date: RecordDateMatch,
}

impl RegistrationKey {
    pub fn by_day(worker_id: i32, day: NaiveDate) -> Self {
        Self {
            worker_id,
            record_date: RecordDateMatch::CalendarDate(day),
        }
    }

    pub fn exact(worker_id: i32, record_date: DateTime<Utc>) -> Self {
        Self {
            worker_id,
            record_date: RecordDateMatch::Exact(record_date),
        }
    }

    pub fn matches(&self, registration: &Registration) -> bool {
        registration.worker_id == self.worker_id
            && self.record_date.matches(&registration.record_date)
    }
}
