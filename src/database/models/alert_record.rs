use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::registration::Registration;
use crate::alert::{classify, Alert};

/// Worker attributes joined into alert rows for display. Every field is
/// optional because the join is a LEFT JOIN.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct WorkerProfile {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub state: Option<String>,
    pub qualification: Option<String>,
    pub skill: Option<String>,
    pub aadhar_number: Option<String>,
    pub pf_number: Option<String>,
    pub blood_group: Option<String>,
    #[sqlx(rename = "worker_remarks")]
    pub remarks: Option<String>,
}

/// A registration inside the alert window together with its read-only
/// worker, department and program projections.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRecord {
    pub registration: Registration,
    pub worker: WorkerProfile,
    pub department_name: Option<String>,
    pub program_name: Option<String>,
}

/// An alert record plus its classification for a given day
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationAlert {
    pub record: AlertRecord,
    pub alert: Alert,
}

impl RegistrationAlert {
    pub fn evaluate(record: AlertRecord, today: NaiveDate) -> Self {
        let alert = classify(record.registration.validity_date, today);
        Self { record, alert }
    }
}
