//! HTTP-level tests driving the assembled router in-process.

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use db::DBService;
use serde_json::{Value, json};
use server::{AppState, app};
use sqlx::SqlitePool;
use tower::util::ServiceExt;

async fn test_app() -> (Router, SqlitePool) {
    let db = DBService::new_in_memory().await.expect("in-memory database");
    let pool = db.pool.clone();
    (app(AppState::new(db, None)), pool)
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let value = serde_json::from_slice(&bytes).expect("json body");
    (status, value)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

async fn seed_civic_catalog(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO powertrain_configs \
         (id, oem_make, engine_code, displacement_liters, cylinder_count, cylinder_layout, \
          forced_induction_type, fuel_type, transmission_type, drive_type) \
         VALUES (1, 'Honda', 'L15B7', 1.5, 4, 'inline', 'turbo', 'gasoline', 'cvt', 'fwd')",
    )
    .execute(pool)
    .await
    .expect("seed config");
    sqlx::query(
        "INSERT INTO vehicle_applications (id, make, model, year_start, year_end, powertrain_config_id) \
         VALUES (1, 'Honda', 'Civic', 2018, 2022, 1)",
    )
    .execute(pool)
    .await
    .expect("seed application");
    sqlx::query(
        "INSERT INTO maintenance_schedules \
         (id, powertrain_config_id, maintenance_item_id, maintenance_item, action_type, \
          requirement_level, interval_type, normal_interval_miles) \
         VALUES (1, 1, 10, 'Engine Oil', 'replace', 'required', 'fixed_recurring', 5000)",
    )
    .execute(pool)
    .await
    .expect("seed schedule");
}

#[tokio::test]
async fn health_answers() {
    let (router, _) = test_app().await;
    let (status, body) = send(&router, get("/api/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], "ok");
}

#[tokio::test]
async fn vehicle_crud_round_trip() {
    let (router, _) = test_app().await;

    let (status, created) = send(
        &router,
        json_request(
            "POST",
            "/api/vehicles",
            json!({"year": 2020, "make": "Honda", "model": "Civic", "mileage": 4600}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], true);
    let id = created["data"]["id"].as_str().expect("vehicle id").to_string();

    let (status, fetched) = send(&router, get(&format!("/api/vehicles/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["data"]["make"], "Honda");
    assert_eq!(fetched["data"]["mileage"], 4600);

    let (status, updated) = send(
        &router,
        json_request(
            "PATCH",
            &format!("/api/vehicles/{id}/mileage"),
            json!({"mileage": 48000}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["data"]["mileage"], 48000);

    let (status, listed) = send(&router, get("/api/vehicles")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["data"].as_array().expect("vehicle list").len(), 1);
}

#[tokio::test]
async fn vehicle_creation_rejects_an_implausible_year() {
    let (router, _) = test_app().await;
    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/vehicles",
            json!({"year": 1492, "make": "Honda", "model": "Civic"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn unknown_vehicle_is_a_404() {
    let (router, _) = test_app().await;
    let (status, body) = send(
        &router,
        get("/api/vehicles/00000000-0000-0000-0000-000000000000/maintenance-due"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn lookup_misses_cleanly_without_catalog_data() {
    let (router, _) = test_app().await;
    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/maintenance/lookup",
            json!({"year": 1990, "make": "Yugo", "model": "GV", "mileage": 50000}),
        ),
    )
    .await;
    // A miss is a successful request carrying an unsuccessful lookup.
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["success"], false);
    assert_eq!(body["data"]["source"], "database");
}

#[tokio::test]
async fn lookup_rejects_negative_mileage() {
    let (router, _) = test_app().await;
    let (status, _) = send(
        &router,
        json_request(
            "POST",
            "/api/maintenance/lookup",
            json!({"year": 2020, "make": "Honda", "model": "Civic", "mileage": -1}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn lookup_resolves_a_seeded_vehicle() {
    let (router, pool) = test_app().await;
    seed_civic_catalog(&pool).await;

    let (status, body) = send(
        &router,
        json_request(
            "POST",
            "/api/maintenance/lookup",
            json!({"year": 2020, "make": "Honda", "model": "Civic", "mileage": 4600}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["success"], true);
    assert_eq!(data["source"], "database");
    assert_eq!(data["match_quality"], "model_only");
    let services = data["services"].as_array().expect("services");
    assert_eq!(services.len(), 1);
    assert_eq!(services[0]["service_name"], "Engine oil change");
    assert_eq!(services[0]["urgency"], "DUE_NOW");
    assert_eq!(services[0]["estimated_labor_hours"], 0.5);
}

#[tokio::test]
async fn maintenance_due_uses_the_stored_odometer() {
    let (router, pool) = test_app().await;
    seed_civic_catalog(&pool).await;

    let (_, created) = send(
        &router,
        json_request(
            "POST",
            "/api/vehicles",
            json!({"year": 2020, "make": "Honda", "model": "Civic", "mileage": 5501}),
        ),
    )
    .await;
    let id = created["data"]["id"].as_str().expect("vehicle id").to_string();

    let (status, body) = send(&router, get(&format!("/api/vehicles/{id}/maintenance-due"))).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["success"], true);
    let services = data["services"].as_array().expect("services");
    assert_eq!(services[0]["urgency"], "OVERDUE");
    assert_eq!(services[0]["mileage_until_due"], -501);
}

#[tokio::test]
async fn catalog_applications_filter_by_year() {
    let (router, pool) = test_app().await;
    seed_civic_catalog(&pool).await;

    let (status, body) = send(
        &router,
        get("/api/catalog/applications?make=honda&model=civic&year=2020"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().expect("applications").len(), 1);

    let (_, empty) = send(
        &router,
        get("/api/catalog/applications?make=honda&model=civic&year=2017"),
    )
    .await;
    assert_eq!(empty["data"].as_array().expect("applications").len(), 0);
}
