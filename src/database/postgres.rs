use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{FromRow, PgPool, Postgres, Row};
use tracing::debug;

use super::models::{
    AlertRecord, NewRegistration, RecordDateMatch, Registration, RegistrationChanges,
    RegistrationKey, WorkerProfile,
};
use super::store::{RegistrationStore, StoreError};
use crate::types::RegisterKind;

/// `RegistrationStore` over a shared Postgres pool. Each call borrows one
/// connection for one statement.
#[derive(Clone)]
pub struct PgRegistrationStore {
    pool: PgPool,
}

impl PgRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Column list shared by every registration SELECT. Table identifiers come
    /// from `RegisterKind` and are never user input.
    fn registration_columns(kind: RegisterKind, alias: &str) -> String {
        let enrollment = if kind.has_enrollment_date() {
            format!("{alias}enrollment_date")
        } else {
            "NULL::date".to_string()
        };
        format!(
            "{alias}id, {alias}worker_id, {alias}record_date, {alias}department_code, \
             {alias}{program} AS program_code, {enrollment} AS enrollment_date, \
             {alias}validity_date, {alias}status, {alias}remarks, {alias}alert_completed",
            program = kind.program_column(),
        )
    }

    /// WHERE clause for a natural key, with placeholders starting at `first`
    fn key_predicate(key: &RegistrationKey, first: usize) -> String {
        match key.record_date {
            RecordDateMatch::CalendarDate(_) => format!(
                "worker_id = ${} AND (record_date AT TIME ZONE 'UTC')::date = ${}",
                first,
                first + 1
            ),
            RecordDateMatch::Exact(_) => {
                format!("worker_id = ${} AND record_date = ${}", first, first + 1)
            }
        }
    }

    fn bind_key<'q>(
        query: Query<'q, Postgres, PgArguments>,
        key: &RegistrationKey,
    ) -> Query<'q, Postgres, PgArguments> {
        let query = query.bind(key.worker_id);
        match key.record_date {
            RecordDateMatch::CalendarDate(day) => query.bind(day),
            RecordDateMatch::Exact(ts) => query.bind(ts),
        }
    }

    fn alert_record_from_row(row: &PgRow) -> Result<AlertRecord, sqlx::Error> {
        Ok(AlertRecord {
            registration: Registration::from_row(row)?,
            worker: WorkerProfile::from_row(row)?,
            department_name: row.try_get("department_name")?,
            program_name: row.try_get("program_name")?,
        })
    }
}

#[async_trait]
impl RegistrationStore for PgRegistrationStore {
    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn list(&self, kind: RegisterKind) -> Result<Vec<Registration>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY record_date DESC",
            Self::registration_columns(kind, ""),
            kind.register_table()
        );
        let rows = sqlx::query_as::<_, Registration>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn insert(&self, kind: RegisterKind, new: &NewRegistration) -> Result<i64, StoreError> {
        let fields = &new.fields;
        let id: i64 = match kind {
            RegisterKind::Trade => {
                sqlx::query_scalar(
                    "INSERT INTO trade_register \
                     (worker_id, record_date, department_code, trade_code, enrollment_date, validity_date, status, remarks) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
                )
                .bind(new.worker_id)
                .bind(new.record_date)
                .bind(fields.department_code)
                .bind(fields.program_code)
                .bind(fields.enrollment_date)
                .bind(fields.validity_date)
                .bind(&fields.status)
                .bind(&fields.remarks)
                .fetch_one(&self.pool)
                .await?
            }
            RegisterKind::Training => {
                sqlx::query_scalar(
                    "INSERT INTO training_register \
                     (worker_id, record_date, department_code, training_code, validity_date, status, remarks) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
                )
                .bind(new.worker_id)
                .bind(new.record_date)
                .bind(fields.department_code)
                .bind(fields.program_code)
                .bind(fields.validity_date)
                .bind(&fields.status)
                .bind(&fields.remarks)
                .fetch_one(&self.pool)
                .await?
            }
        };
        debug!(%kind, id, worker_id = new.worker_id, "inserted registration");
        Ok(id)
    }

    async fn update(
        &self,
        kind: RegisterKind,
        key: &RegistrationKey,
        changes: &RegistrationChanges,
    ) -> Result<u64, StoreError> {
        let result = match kind {
            RegisterKind::Trade => {
                let sql = format!(
                    "UPDATE trade_register SET department_code = $1, trade_code = $2, enrollment_date = $3, \
                     validity_date = $4, status = $5, remarks = $6 WHERE {}",
                    Self::key_predicate(key, 7)
                );
                let query = sqlx::query(&sql)
                    .bind(changes.department_code)
                    .bind(changes.program_code)
                    .bind(changes.enrollment_date)
                    .bind(changes.validity_date)
                    .bind(changes.status.clone())
                    .bind(changes.remarks.clone());
                Self::bind_key(query, key).execute(&self.pool).await?
            }
            RegisterKind::Training => {
                let sql = format!(
                    "UPDATE training_register SET department_code = $1, training_code = $2, \
                     validity_date = $3, status = $4, remarks = $5 WHERE {}",
                    Self::key_predicate(key, 6)
                );
                let query = sqlx::query(&sql)
                    .bind(changes.department_code)
                    .bind(changes.program_code)
                    .bind(changes.validity_date)
                    .bind(changes.status.clone())
                    .bind(changes.remarks.clone());
                Self::bind_key(query, key).execute(&self.pool).await?
            }
        };
        Ok(result.rows_affected())
    }

    async fn delete(&self, kind: RegisterKind, key: &RegistrationKey) -> Result<u64, StoreError> {
        let sql = format!(
            "DELETE FROM {} WHERE {}",
            kind.register_table(),
            Self::key_predicate(key, 1)
        );
        let result = Self::bind_key(sqlx::query(&sql), key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn set_alert_completed(
        &self,
        kind: RegisterKind,
        key: &RegistrationKey,
        value: bool,
    ) -> Result<u64, StoreError> {
        let sql = format!(
            "UPDATE {} SET alert_completed = $1 WHERE {}",
            kind.register_table(),
            Self::key_predicate(key, 2)
        );
        let result = Self::bind_key(sqlx::query(&sql).bind(value), key)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn alerts_due_by(
        &self,
        kind: RegisterKind,
        horizon: NaiveDate,
    ) -> Result<Vec<AlertRecord>, StoreError> {
        let sql = format!(
            "SELECT {columns}, \
                    w.age, w.gender, w.address, w.state, w.qualification, w.skill, \
                    w.aadhar_number, w.pf_number, w.blood_group, w.remarks AS worker_remarks, \
                    d.department_name, p.{name} AS program_name \
             FROM {table} r \
             LEFT JOIN worker_master w ON r.worker_id = w.worker_id \
             LEFT JOIN department_master d ON r.department_code = d.department_code \
             LEFT JOIN {programs} p ON r.{code} = p.{code} \
             WHERE r.validity_date <= $1 \
             ORDER BY r.validity_date ASC, r.id ASC",
            columns = Self::registration_columns(kind, "r."),
            name = kind.program_name_column(),
            table = kind.register_table(),
            programs = kind.program_table(),
            code = kind.program_column(),
        );

        let rows = sqlx::query(&sql)
            .bind(horizon)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(Self::alert_record_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }
}
