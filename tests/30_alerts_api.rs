mod common;

use anyhow::Result;
use axum::http::{Method, StatusCode};
use chrono::Duration;
use serde_json::{json, Value};

use common::{base_path, registration_body, today, TestApp, WORKER_ID};
use workforce_registry::types::RegisterKind;

async fn create_with_validity(app: &TestApp, kind: RegisterKind, offset_days: i64) -> Result<i64> {
    let validity = (today() + Duration::days(offset_days)).to_string();
    let (status, body) = app
        .send(Method::POST, &base_path(kind), Some(registration_body(kind, &validity)))
        .await?;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    Ok(body["data"]["id"].as_i64().unwrap_or_default())
}

async fn alerts(app: &TestApp, kind: RegisterKind) -> Result<Vec<Value>> {
    let (status, body) = app
        .send(Method::GET, &format!("{}/alerts", base_path(kind)), None)
        .await?;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.is_array(), "alert listing should be a bare array: {body}");
    Ok(body.as_array().cloned().unwrap_or_default())
}

fn find(rows: &[Value], id: i64) -> Option<&Value> {
    rows.iter().find(|r| r["Registration_ID"] == id)
}

#[tokio::test]
async fn overdue_registration_is_listed() -> Result<()> {
    for kind in RegisterKind::ALL {
        let app = TestApp::new().await;
        let id = create_with_validity(&app, kind, -1).await?;

        let rows = alerts(&app, kind).await?;
        let row = find(&rows, id).expect("overdue row listed");

        assert_eq!(row["Alert_Status"], "Overdue");
        assert_eq!(row["Days_Until_Expiry"], -1);
    }
    Ok(())
}

#[tokio::test]
async fn expiring_soon_registration_is_listed() -> Result<()> {
    for kind in RegisterKind::ALL {
        let app = TestApp::new().await;
        let id = create_with_validity(&app, kind, 3).await?;

        let rows = alerts(&app, kind).await?;
        let row = find(&rows, id).expect("expiring row listed");

        assert_eq!(row["Alert_Status"], "Expiring Soon");
        assert_eq!(row["Days_Until_Expiry"], 3);
    }
    Ok(())
}

#[tokio::test]
async fn registrations_outside_window_are_not_listed() -> Result<()> {
    for kind in RegisterKind::ALL {
        let app = TestApp::new().await;
        let far = create_with_validity(&app, kind, 10).await?;
        let edge = create_with_validity(&app, kind, 7).await?;

        let rows = alerts(&app, kind).await?;

        assert!(find(&rows, far).is_none(), "{kind}: {rows:?}");
        assert!(find(&rows, edge).is_some(), "{kind}: window edge must be listed");
    }
    Ok(())
}

#[tokio::test]
async fn alerts_are_ordered_by_validity_and_joined() -> Result<()> {
    let app = TestApp::new().await;
    let kind = RegisterKind::Trade;
    let later = create_with_validity(&app, kind, 5).await?;
    let earlier = create_with_validity(&app, kind, -20).await?;
    let middle = create_with_validity(&app, kind, 0).await?;

    let rows = alerts(&app, kind).await?;
    let ids: Vec<i64> = rows
        .iter()
        .filter_map(|r| r["Registration_ID"].as_i64())
        .collect();
    assert_eq!(ids, vec![earlier, middle, later]);

    let today_row = find(&rows, middle).unwrap();
    assert_eq!(today_row["Alert_Status"], "Expiring Soon");
    assert_eq!(today_row["Days_Until_Expiry"], 0);
    assert_eq!(today_row["Age"], 31);
    assert_eq!(today_row["Skill"], "Welding");
    assert_eq!(today_row["Department_Name"], "Fabrication");
    assert_eq!(today_row["Trade_Name"], "Welder");
    Ok(())
}

#[tokio::test]
async fn update_of_unknown_pair_is_not_found() -> Result<()> {
    for kind in RegisterKind::ALL {
        let app = TestApp::new().await;
        let mut body = registration_body(kind, "2030-01-01");
        body["Record_Date"] = json!("1999-01-01");

        let (status, resp) = app
            .send(Method::PUT, &format!("{}/{}", base_path(kind), WORKER_ID), Some(body))
            .await?;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(resp["code"], "NOT_FOUND");
    }
    Ok(())
}

#[tokio::test]
async fn acknowledgment_keeps_classification() -> Result<()> {
    for kind in RegisterKind::ALL {
        let app = TestApp::new().await;
        let id = create_with_validity(&app, kind, 2).await?;

        let before = alerts(&app, kind).await?;
        let row = find(&before, id).unwrap().clone();
        let record_date = row["Record_Date"].clone();
        let target = format!("{}/{}", base_path(kind), WORKER_ID);

        let (status, resp) = app
            .send(
                Method::PUT,
                &format!("{target}/complete-alert"),
                Some(json!({ "Record_Date": record_date })),
            )
            .await?;
        assert_eq!(status, StatusCode::OK, "{resp}");
        assert_eq!(resp["message"], format!("{} alert marked as complete", kind.label()));

        let (_, listed) = app.send(Method::GET, &base_path(kind), None).await?;
        let stored = find(listed.as_array().unwrap(), id).unwrap();
        assert_eq!(stored["Alert_Completed"], true);

        let after = alerts(&app, kind).await?;
        let acked = find(&after, id).expect("acknowledged rows stay listed");
        assert_eq!(acked["Alert_Completed"], true);
        assert_eq!(acked["Alert_Status"], row["Alert_Status"]);
        assert_eq!(acked["Days_Until_Expiry"], row["Days_Until_Expiry"]);

        let (status, _) = app
            .send(
                Method::PUT,
                &format!("{target}/incomplete-alert"),
                Some(json!({ "Record_Date": record_date })),
            )
            .await?;
        assert_eq!(status, StatusCode::OK);
        let after = alerts(&app, kind).await?;
        assert_eq!(find(&after, id).unwrap()["Alert_Completed"], false);
    }
    Ok(())
}

#[tokio::test]
async fn acknowledgment_is_idempotent() -> Result<()> {
    let app = TestApp::new().await;
    let kind = RegisterKind::Training;
    let id = create_with_validity(&app, kind, -4).await?;
    let rows = alerts(&app, kind).await?;
    let record_date = find(&rows, id).unwrap()["Record_Date"].clone();
    let uri = format!("{}/{}/complete-alert", base_path(kind), WORKER_ID);

    for _ in 0..2 {
        let (status, _) = app
            .send(Method::PUT, &uri, Some(json!({ "Record_Date": record_date })))
            .await?;
        assert_eq!(status, StatusCode::OK);
    }
    Ok(())
}

#[tokio::test]
async fn acknowledging_unknown_registration_is_not_found() -> Result<()> {
    let app = TestApp::new().await;
    let uri = format!("{}/{}/complete-alert", base_path(RegisterKind::Trade), WORKER_ID + 1);

    let (status, body) = app
        .send(Method::PUT, &uri, Some(json!({ "Record_Date": "2025-01-01" })))
        .await?;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Trade registration not found");
    Ok(())
}
