//! Request bodies for the register endpoints, in the wire field names the
//! front end already sends (`Worker_ID`, `Validity_Date`, ...).

use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::Value;

use crate::database::models::RegistrationChanges;
use crate::services::RegistryError;
use crate::types::{
    deserialize_calendar_date, deserialize_code, deserialize_optional_calendar_date,
    deserialize_optional_code, RegisterKind,
};

#[derive(Debug, Deserialize)]
struct TradeRegistrationBody {
    #[serde(rename = "Worker_ID", default, deserialize_with = "deserialize_optional_code")]
    worker_id: Option<i32>,
    #[serde(rename = "Record_Date", default)]
    record_date: Option<String>,
    #[serde(rename = "Department_Code", deserialize_with = "deserialize_code")]
    department_code: i32,
    #[serde(rename = "Trade_Code", deserialize_with = "deserialize_code")]
    trade_code: i32,
    #[serde(
        rename = "Enrollment_Date",
        default,
        deserialize_with = "deserialize_optional_calendar_date"
    )]
    enrollment_date: Option<NaiveDate>,
    #[serde(rename = "Validity_Date", deserialize_with = "deserialize_calendar_date")]
    validity_date: NaiveDate,
    #[serde(rename = "Status", default)]
    status: Option<String>,
    #[serde(rename = "Remarks", default)]
    remarks: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TrainingRegistrationBody {
    #[serde(rename = "Worker_ID", default, deserialize_with = "deserialize_optional_code")]
    worker_id: Option<i32>,
    #[serde(rename = "Record_Date", default)]
    record_date: Option<String>,
    #[serde(rename = "Department_Code", deserialize_with = "deserialize_code")]
    department_code: i32,
    #[serde(rename = "Training_Code", deserialize_with = "deserialize_code")]
    training_code: i32,
    #[serde(rename = "Validity_Date", deserialize_with = "deserialize_calendar_date")]
    validity_date: NaiveDate,
    #[serde(rename = "Status", default)]
    status: Option<String>,
    #[serde(rename = "Remarks", default)]
    remarks: Option<String>,
}

/// A create/update body normalized across both register kinds
#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationPayload {
    /// Read on create only; the identity pair is immutable on update
    pub worker_id: Option<i32>,
    pub record_date: Option<String>,
    pub fields: RegistrationChanges,
}

impl RegistrationPayload {
    pub fn from_json(kind: RegisterKind, body: Value) -> Result<Self, RegistryError> {
        let invalid = |e: serde_json::Error| RegistryError::Validation(format!("Invalid request body: {e}"));

        match kind {
            RegisterKind::Trade => {
                let body: TradeRegistrationBody = serde_json::from_value(body).map_err(invalid)?;
                Ok(Self {
                    worker_id: body.worker_id,
                    record_date: body.record_date,
                    fields: RegistrationChanges {
                        department_code: body.department_code,
                        program_code: body.trade_code,
                        enrollment_date: body.enrollment_date,
                        validity_date: body.validity_date,
                        status: body.status,
                        remarks: body.remarks,
                    },
                })
            }
            RegisterKind::Training => {
                let body: TrainingRegistrationBody =
                    serde_json::from_value(body).map_err(invalid)?;
                Ok(Self {
                    worker_id: body.worker_id,
                    record_date: body.record_date,
                    fields: RegistrationChanges {
                        department_code: body.department_code,
                        program_code: body.training_code,
                        enrollment_date: None,
                        validity_date: body.validity_date,
                        status: body.status,
                        remarks: body.remarks,
                    },
                })
            }
        }
    }
}

/// Body of the delete and acknowledgment endpoints
#[derive(Debug, Default, Deserialize)]
pub struct RecordDateBody {
    #[serde(rename = "Record_Date", default)]
    pub record_date: Option<String>,
}

impl RecordDateBody {
    /// Missing or unparseable bodies yield an empty selector; the service
    /// reports the missing field.
    pub fn from_json(body: Option<Value>) -> Self {
        body.and_then(|v| serde_json::from_value(v).ok())
            .unwrap_or_default()
    }
}
