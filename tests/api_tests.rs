//! Handler-level tests that run without a database.

use actix_web::{test, web, App};
use tms_lib::api;

#[actix_rt::test]
async fn health_endpoint_reports_version_and_uptime() {
    let app = test::init_service(
        App::new().service(web::scope("/api/v1").configure(api::configure_health_routes)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let res = test::call_service(&app, req).await;
    assert!(res.status().is_success());

    let body: serde_json::Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_seconds"].is_u64());
}

#[actix_rt::test]
async fn unknown_route_is_not_found() {
    let app = test::init_service(
        App::new().service(web::scope("/api/v1").configure(api::configure_health_routes)),
    )
    .await;

    let req = test::TestRequest::get().uri("/api/v1/nope").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status().as_u16(), 404);
}

#[::core::prelude::v1::test]
fn openapi_document_covers_the_surface() {
    use utoipa::OpenApi;

    let doc = api::ApiDoc::openapi();
    let json = doc.to_json().expect("openapi serializes");
    for path in [
        "/plans",
        "/plans/{plan_id}/statistics",
        "/suites/copy",
        "/cases/copy",
        "/tests/{test_id}/results",
    ] {
        assert!(json.contains(path), "missing path: {}", path);
    }
}
