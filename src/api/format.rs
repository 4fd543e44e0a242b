use serde_json::{json, Map, Value};

use crate::database::models::{Registration, RegistrationAlert, WorkerProfile};
use crate::types::RegisterKind;

/// Convert a registration into its public wire format. Keys keep the
/// register's column naming (`Worker_ID`, `Trade_Code`, ...).
pub fn registration_to_api_value(kind: RegisterKind, registration: &Registration) -> Value {
    Value::Object(registration_fields(kind, registration))
}

pub fn registrations_to_api_values(kind: RegisterKind, registrations: &[Registration]) -> Vec<Value> {
    registrations
        .iter()
        .map(|r| registration_to_api_value(kind, r))
        .collect()
}

/// Registration fields, joined display attributes and the derived
/// `Alert_Status` / `Days_Until_Expiry` pair.
pub fn alert_to_api_value(kind: RegisterKind, alert: &RegistrationAlert) -> Value {
    let record = &alert.record;
    let mut obj = registration_fields(kind, &record.registration);

    merge_worker(&mut obj, &record.worker);
    obj.insert("Department_Name".into(), json!(record.department_name));
    obj.insert(kind.name_field().into(), json!(record.program_name));
    obj.insert("Alert_Status".into(), json!(alert.alert.status));
    obj.insert("Days_Until_Expiry".into(), json!(alert.alert.days_until_expiry));

    Value::Object(obj)
}

pub fn alerts_to_api_values(kind: RegisterKind, alerts: &[RegistrationAlert]) -> Vec<Value> {
    alerts.iter().map(|a| alert_to_api_value(kind, a)).collect()
}

fn registration_fields(kind: RegisterKind, r: &Registration) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("Registration_ID".into(), json!(r.id));
    obj.insert("Worker_ID".into(), json!(r.worker_id));
    obj.insert("Record_Date".into(), json!(r.record_date));
    obj.insert("Department_Code".into(), json!(r.department_code));
    obj.insert(kind.code_field().into(), json!(r.program_code));
    if kind.has_enrollment_date() {
        obj.insert("Enrollment_Date".into(), json!(r.enrollment_date));
    }
    obj.insert("Validity_Date".into(), json!(r.validity_date));
    obj.insert("Status".into(), json!(r.status));
    obj.insert("Remarks".into(), json!(r.remarks));
    obj.insert("Alert_Completed".into(), json!(r.alert_completed));
    obj
}

fn merge_worker(obj: &mut Map<String, Value>, w: &WorkerProfile) {
    obj.insert("Age".into(), json!(w.age));
    obj.insert("Gender".into(), json!(w.gender));
    obj.insert("Address".into(), json!(w.address));
    obj.insert("State".into(), json!(w.state));
    obj.insert("Qualification".into(), json!(w.qualification));
    obj.insert("Skill".into(), json!(w.skill));
    obj.insert("Aadhar_Number".into(), json!(w.aadhar_number));
    obj.insert("PF_Number".into(), json!(w.pf_number));
    obj.insert("Blood_Group".into(), json!(w.blood_group));
    obj.insert("Worker_Remarks".into(), json!(w.remarks));
}
