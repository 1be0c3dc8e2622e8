mod common;

use actix_web::http::StatusCode;
use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, test};
use serde_json::Value;

use activity_tracker::models::TokenType;
use activity_tracker::routes;

const EMPLOYEE: u8 = 3;
const HR: u8 = 2;

fn peer() -> std::net::SocketAddr {
    "127.0.0.1:40000".parse().unwrap()
}

macro_rules! app {
    () => {{
        let config = common::config();
        let pool = common::lazy_pool(&config);
        test::init_service(
            App::new()
                .wrap(NormalizePath::trim())
                .app_data(Data::new(pool))
                .app_data(Data::new(config.clone()))
                .app_data(Data::new(config.attendance_policy()))
                .configure(|cfg| routes::configure(cfg, &config)),
        )
        .await
    }};
}

#[actix_web::test]
async fn missing_token_is_unauthorized() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/activity/status")
        .peer_addr(peer())
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Missing Authorization header");
}

#[actix_web::test]
async fn refresh_token_is_not_an_access_token() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/activity/history")
        .peer_addr(peer())
        .insert_header((
            "Authorization",
            format!("Bearer {}", common::token(EMPLOYEE, TokenType::Refresh)),
        ))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn malformed_authorization_header_is_unauthorized() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/dashboard")
        .peer_addr(peer())
        .insert_header(("Authorization", "Token abc"))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn check_in_without_location_is_rejected() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/activity/check-in")
        .peer_addr(peer())
        .insert_header(common::bearer(EMPLOYEE))
        .set_form([
            ("planned_activities", "Fix login bug"),
            ("daily_goals", "Close 3 tickets"),
        ])
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Location is required. Please allow location access."
    );
}

#[actix_web::test]
async fn check_in_without_plan_is_rejected() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/activity/check-in")
        .peer_addr(peer())
        .insert_header(common::bearer(EMPLOYEE))
        .set_form([
            ("lat", "-6.2088"),
            ("long", "106.8456"),
            ("planned_activities", "  \n \n"),
            ("daily_goals", "Close 3 tickets"),
        ])
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Please add at least one planned activity for today");
}

#[actix_web::test]
async fn check_in_without_goals_is_rejected() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/activity/check-in")
        .peer_addr(peer())
        .insert_header(common::bearer(EMPLOYEE))
        .set_form([
            ("lat", "-6.2088"),
            ("long", "106.8456"),
            ("planned_activities", r#"[{"title":"Fix login bug","priority":3}]"#),
            ("daily_goals", "[]"),
        ])
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "Please set at least one goal for today");
}

#[actix_web::test]
async fn check_out_without_location_is_rejected() {
    let app = app!();
    let req = test::TestRequest::post()
        .uri("/api/activity/check-out")
        .peer_addr(peer())
        .insert_header(common::bearer(EMPLOYEE))
        .set_form([("lat", "-6.2088"), ("long", "  ")])
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["error"],
        "Location is required. Please allow location access."
    );
}

#[actix_web::test]
async fn admin_dashboard_is_staff_only() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/dashboard/admin?date_range=month")
        .peer_addr(peer())
        .insert_header(common::bearer(EMPLOYEE))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "HR/Admin only");
}

#[actix_web::test]
async fn admin_dashboard_rejects_unknown_range() {
    let app = app!();
    let req = test::TestRequest::get()
        .uri("/api/dashboard/admin?date_range=fortnight")
        .peer_addr(peer())
        .insert_header(common::bearer(HR))
        .to_request();

    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
