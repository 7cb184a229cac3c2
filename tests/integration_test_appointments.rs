mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use common::{at, booking_body, future_day, parse_body, TestApp};
use serde_json::{json, Value};
use tower::ServiceExt;

fn manual_body(service_id: &str, start: chrono::DateTime<chrono::Utc>, name: &str) -> Value {
    json!({
        "service_id": service_id,
        "start_time": start.to_rfc3339(),
        "contact": { "name": name, "phone": "555-0100" },
        "location": "Warehouse 3",
    })
}

#[tokio::test]
async fn test_manual_appointment_ignores_booking_window() {
    let app = TestApp::new().await;
    let service = app.seed_service(|s| s.requires_confirmation = true).await;
    let uri = format!("/api/v1/{}/appointments", app.tenant_id);

    // Before opening hours, which the public path refuses.
    let start = at(future_day(1), 6, 30);
    let res = app.admin_post(&uri, Some(&manual_body(&service.id, start, "Walk In"))).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let body = parse_body(res).await;
    assert_eq!(body["status"], "scheduled");
    assert_eq!(body["location"], "Warehouse 3");
    assert_eq!(body["contact"]["phone"], "555-0100");
    assert!(body["contact"]["email"].is_null());

    // Manual entries are not announced.
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(app.notifier.snapshot().is_empty());
}

#[tokio::test]
async fn test_manual_conflict_names_existing_appointment() {
    let app = TestApp::new().await;
    let service = app.seed_service(|_| {}).await;
    let day = future_day(2);

    let booked = parse_body(app.post_json(&app.book_uri(&service.id), &booking_body(at(day, 10, 0), "Online Customer", "online@example.com")).await).await;
    let booked_id = booked["id"].as_str().unwrap();

    let uri = format!("/api/v1/{}/appointments", app.tenant_id);
    let res = app.admin_post(&uri, Some(&manual_body(&service.id, at(day, 10, 30), "Phone Customer"))).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    let body = parse_body(res).await;
    assert_eq!(body["code"], "CONFLICT");
    assert!(body["error"].as_str().unwrap().contains(booked_id));
}

#[tokio::test]
async fn test_manual_appointment_unknown_service() {
    let app = TestApp::new().await;
    let uri = format!("/api/v1/{}/appointments", app.tenant_id);
    let res = app.admin_post(&uri, Some(&manual_body("missing", at(future_day(2), 10, 0), "Nobody"))).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contractor_routes_require_token() {
    let app = TestApp::new().await;
    let service = app.seed_service(|_| {}).await;
    let uri = format!("/api/v1/{}/appointments", app.tenant_id);

    let res = app.post_json(&uri, &manual_body(&service.id, at(future_day(2), 10, 0), "Sneaky")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.router.clone().oneshot(
        Request::builder().method("POST").uri(app.appointment_uri("any", "confirm"))
            .header(header::AUTHORIZATION, "Bearer wrong-token")
            .body(Body::empty()).unwrap()
    ).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(res).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_get_appointment() {
    let app = TestApp::new().await;
    let service = app.seed_service(|_| {}).await;
    let booked = parse_body(app.post_json(&app.book_uri(&service.id), &booking_body(at(future_day(2), 9, 0), "Gia Rossi", "gia@example.com")).await).await;
    let id = booked["id"].as_str().unwrap();

    let res = app.admin_get(&app.appointment_uri(id, "")).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["id"], id);
    assert_eq!(body["contact_id"], booked["contact"]["id"]);

    let res = app.admin_get(&app.appointment_uri("missing", "")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_appointments_are_tenant_scoped() {
    let app = TestApp::new().await;
    let service = app.seed_service(|_| {}).await;
    let booked = parse_body(app.post_json(&app.book_uri(&service.id), &booking_body(at(future_day(2), 9, 0), "Hal", "hal@example.com")).await).await;
    let id = booked["id"].as_str().unwrap();

    let foreign = format!("/api/v1/other-tenant/appointments/{}", id);
    assert_eq!(app.admin_get(&foreign).await.status(), StatusCode::NOT_FOUND);

    let foreign_book = format!("/api/v1/other-tenant/services/{}/book", service.id);
    let res = app.post_json(&foreign_book, &booking_body(at(future_day(2), 11, 0), "Hal", "hal@example.com")).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_lifecycle_start_and_complete() {
    let app = TestApp::new().await;
    let service = app.seed_service(|_| {}).await;
    let booked = parse_body(app.post_json(&app.book_uri(&service.id), &booking_body(at(future_day(2), 9, 0), "Ivan", "ivan@example.com")).await).await;
    let id = booked["id"].as_str().unwrap();

    let res = app.admin_post(&app.appointment_uri(id, "complete"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.admin_post(&app.appointment_uri(id, "start"), None).await;
    assert_eq!(parse_body(res).await["status"], "in-progress");

    let res = app.admin_post(&app.appointment_uri(id, "complete"), None).await;
    assert_eq!(parse_body(res).await["status"], "completed");

    // Terminal states reject every further action.
    for action in ["confirm", "decline", "start", "complete", "cancel"] {
        let res = app.admin_post(&app.appointment_uri(id, action), None).await;
        assert_eq!(res.status(), StatusCode::CONFLICT, "action {}", action);
        assert_eq!(parse_body(res).await["code"], "INVALID_TRANSITION");
    }
}

#[tokio::test]
async fn test_cancel_with_reason_and_decline_requires_pending() {
    let app = TestApp::new().await;
    let service = app.seed_service(|_| {}).await;
    let booked = parse_body(app.post_json(&app.book_uri(&service.id), &booking_body(at(future_day(2), 15, 0), "June", "june@example.com")).await).await;
    let id = booked["id"].as_str().unwrap();

    // Scheduled appointments are cancelled, not declined.
    let res = app.admin_post(&app.appointment_uri(id, "decline"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let res = app.admin_post(&app.appointment_uri(id, "cancel"), Some(&json!({ "reason": "Customer moved" }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["status"], "cancelled");
    assert_eq!(body["notes"], "Cancelled: Customer moved");

    let res = app.admin_post(&app.appointment_uri(id, "cancel"), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sqlite_lifecycle() {
    let app = TestApp::sqlite().await;
    let service = app.seed_service(|_| {}).await;
    let uri = format!("/api/v1/{}/appointments", app.tenant_id);

    let res = app.admin_post(&uri, Some(&manual_body(&service.id, at(future_day(3), 12, 0), "Kim Lee"))).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let id = parse_body(res).await["id"].as_str().unwrap().to_string();

    let res = app.admin_post(&app.appointment_uri(&id, "start"), None).await;
    assert_eq!(parse_body(res).await["status"], "in-progress");

    let res = app.admin_post(&app.appointment_uri(&id, "cancel"), Some(&json!({ "reason": "Rain" }))).await;
    assert_eq!(parse_body(res).await["notes"], "Cancelled: Rain");

    let res = app.admin_get(&app.appointment_uri(&id, "")).await;
    assert_eq!(parse_body(res).await["status"], "cancelled");
}
