#![allow(dead_code)]

use std::sync::Arc;

use anyhow::Result;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::Value;
use tower::ServiceExt;

use workforce_registry::config::AppConfig;
use workforce_registry::database::models::{Registration, WorkerProfile};
use workforce_registry::database::MemoryRegistrationStore;
use workforce_registry::types::RegisterKind;
use workforce_registry::{app, AppState};

pub const WORKER_ID: i32 = 42;
pub const DEPARTMENT_CODE: i32 = 3;
pub const PROGRAM_CODE: i32 = 7;

/// Router over a fresh in-memory store, seeded with one worker, one
/// department and one program per register kind.
pub struct TestApp {
    pub store: MemoryRegistrationStore,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(AppConfig::for_tests()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let store = MemoryRegistrationStore::new();
        store
            .seed_worker(
                WORKER_ID,
                WorkerProfile {
                    age: Some(31),
                    gender: Some("F".into()),
                    skill: Some("Welding".into()),
                    ..Default::default()
                },
            )
            .await;
        store.seed_department(DEPARTMENT_CODE, "Fabrication").await;
        store.seed_program(RegisterKind::Trade, PROGRAM_CODE, "Welder").await;
        store
            .seed_program(RegisterKind::Training, PROGRAM_CODE, "Safety Induction")
            .await;

        let router = app(AppState::new(Arc::new(store.clone()), config));
        Self { store, router }
    }

    pub async fn send(&self, method: Method, uri: &str, body: Option<Value>) -> Result<(StatusCode, Value)> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&json)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };
        Ok((status, body))
    }

    /// Insert a row directly, for back-dated records and fixed validity dates
    pub async fn seed_registration(
        &self,
        kind: RegisterKind,
        worker_id: i32,
        record_date: DateTime<Utc>,
        validity_date: NaiveDate,
    ) -> i64 {
        self.store
            .insert_raw(
                kind,
                Registration {
                    id: 0,
                    worker_id,
                    record_date,
                    department_code: DEPARTMENT_CODE,
                    program_code: PROGRAM_CODE,
                    enrollment_date: None,
                    validity_date,
                    status: Some("Active".into()),
                    remarks: None,
                    alert_completed: false,
                },
            )
            .await
    }
}

pub fn base_path(kind: RegisterKind) -> String {
    format!("/api/{}", kind.path_segment())
}

pub fn registration_body(kind: RegisterKind, validity_date: &str) -> Value {
    let mut body = serde_json::json!({
        "Worker_ID": WORKER_ID,
        "Department_Code": DEPARTMENT_CODE,
        "Validity_Date": validity_date,
        "Status": "Active",
        "Remarks": "initial",
    });
    body[kind.code_field()] = PROGRAM_CODE.into();
    if kind.has_enrollment_date() {
        body["Enrollment_Date"] = "2025-01-10".into();
    }
    body
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}
