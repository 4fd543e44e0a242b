use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;

use super::models::{
    AlertRecord, NewRegistration, Registration, RegistrationChanges, RegistrationKey,
    WorkerProfile,
};
use super::store::{RegistrationStore, StoreError};
use crate::types::RegisterKind;

#[derive(Default)]
struct Tables {
    registers: HashMap<RegisterKind, Vec<Registration>>,
    workers: HashMap<i32, WorkerProfile>,
    departments: HashMap<i32, String>,
    programs: HashMap<(RegisterKind, i32), String>,
}

/// Process-local `RegistrationStore`. Mirrors the Postgres statements row for
/// row, including day-granularity matching in UTC and microsecond timestamps.
#[derive(Clone, Default)]
pub struct MemoryRegistrationStore {
    tables: Arc<RwLock<Tables>>,
    next_id: Arc<AtomicI64>,
}

impl MemoryRegistrationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn seed_worker(&self, worker_id: i32, profile: WorkerProfile) {
        self.tables.write().await.workers.insert(worker_id, profile);
    }

    pub async fn seed_department(&self, code: i32, name: impl Into<String>) {
        self.tables
            .write()
            .await
            .departments
            .insert(code, name.into());
    }

    pub async fn seed_program(&self, kind: RegisterKind, code: i32, name: impl Into<String>) {
        self.tables
            .write()
            .await
            .programs
            .insert((kind, code), name.into());
    }

    /// Insert a fully formed row, bypassing the service (back-dated records in tests)
    pub async fn insert_raw(&self, kind: RegisterKind, mut registration: Registration) -> i64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        registration.id = id;
        self.tables
            .write()
            .await
            .registers
            .entry(kind)
            .or_default()
            .push(registration);
        id
    }

    pub async fn get(&self, kind: RegisterKind, id: i64) -> Option<Registration> {
        self.tables
            .read()
            .await
            .registers
            .get(&kind)
            .and_then(|rows| rows.iter().find(|r| r.id == id).cloned())
    }
}

fn apply_changes(kind: RegisterKind, row: &mut Registration, changes: &RegistrationChanges) {
    row.department_code = changes.department_code;
    row.program_code = changes.program_code;
    row.enrollment_date = if kind.has_enrollment_date() {
        changes.enrollment_date
    } else {
        None
    };
    row.validity_date = changes.validity_date;
    row.status = changes.status.clone();
    row.remarks = changes.remarks.clone();
}

#[async_trait]
impl RegistrationStore for MemoryRegistrationStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list(&self, kind: RegisterKind) -> Result<Vec<Registration>, StoreError> {
        let tables = self.tables.read().await;
        let mut rows = tables.registers.get(&kind).cloned().unwrap_or_default();
        rows.sort_by(|a, b| b.record_date.cmp(&a.record_date));
        Ok(rows)
    }

    async fn insert(&self, kind: RegisterKind, new: &NewRegistration) -> Result<i64, StoreError> {
        let mut registration = Registration {
            id: 0,
            worker_id: new.worker_id,
            record_date: new.record_date,
            department_code: 0,
            program_code: 0,
            enrollment_date: None,
            validity_date: new.fields.validity_date,
            status: None,
            remarks: None,
            alert_completed: false,
        };
        apply_changes(kind, &mut registration, &new.fields);
        Ok(self.insert_raw(kind, registration).await)
    }

    async fn update(
        &self,
        kind: RegisterKind,
        key: &RegistrationKey,
        changes: &RegistrationChanges,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let mut affected = 0;
        for row in tables.registers.entry(kind).or_default().iter_mut() {
            if key.matches(row) {
                apply_changes(kind, row, changes);
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn delete(&self, kind: RegisterKind, key: &RegistrationKey) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables.registers.entry(kind).or_default();
        let before = rows.len();
        rows.retain(|row| !key.matches(row));
        Ok((before - rows.len()) as u64)
    }

    async fn set_alert_completed(
        &self,
        kind: RegisterKind,
        key: &RegistrationKey,
        value: bool,
    ) -> Result<u64, StoreError> {
        let mut tables = self.tables.write().await;
        let mut affected = 0;
        for row in tables.registers.entry(kind).or_default().iter_mut() {
            if key.matches(row) {
                row.alert_completed = value;
                affected += 1;
            }
        }
        Ok(affected)
    }

    async fn alerts_due_by(
        &self,
        kind: RegisterKind,
        horizon: NaiveDate,
    ) -> Result<Vec<AlertRecord>, StoreError> {
        let tables = self.tables.read().await;
        let mut records: Vec<AlertRecord> = tables
            .registers
            .get(&kind)
            .map(|rows| rows.as_slice())
            .unwrap_or_default()
            .iter()
            .filter(|row| row.validity_date <= horizon)
            .map(|row| AlertRecord {
                registration: row.clone(),
                worker: tables.workers.get(&row.worker_id).cloned().unwrap_or_default(),
                department_name: tables.departments.get(&row.department_code).cloned(),
                program_name: tables.programs.get(&(kind, row.program_code)).cloned(),
            })
            .collect();

        records.sort_by(|a, b| {
            a.registration
                .validity_date
                .cmp(&b.registration.validity_date)
                .then(a.registration.id.cmp(&b.registration.id))
        });
        Ok(records)
    }
}
