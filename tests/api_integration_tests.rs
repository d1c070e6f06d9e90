mod common;

use std::time::Duration;

use actix_web::{http::header, http::StatusCode, test, App};
use fir_generator_server::fir::handlers::{json_config, DEFAULT_JSON_LIMIT, RENDER_FAILURE_MESSAGE};
use fir_generator_server::{configure_app, ErrorResponse};
use serde_json::{json, Value};

use common::{test_state, test_state_with_timeout, valid_record, Behaviour, FAKE_PDF};

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .app_data(json_config(DEFAULT_JSON_LIMIT))
                .configure(configure_app),
        )
        .await
    };
}

fn post_fir(body: &Value) -> test::TestRequest {
    test::TestRequest::post()
        .uri("/api/generate-fir")
        .set_json(body)
}

#[actix_web::test]
async fn test_valid_record_returns_pdf_attachment() {
    let (state, counters) = test_state(Behaviour::Succeed, 2);
    let app = init_app!(state);

    let resp = test::call_service(&app, post_fir(&valid_record()).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/pdf"
    );
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"FIR_2024-0042.pdf\""
    );
    let body = test::read_body(resp).await;
    assert_eq!(body.as_ref(), FAKE_PDF);

    assert_eq!(counters.launched(), 1);
    assert_eq!(counters.released(), 1);
    assert_eq!(state.pool.available(), 2);
}

#[actix_web::test]
async fn test_case_number_with_slashes_is_sanitized_in_filename_only() {
    let (state, counters) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let mut record = valid_record();
    record["caseNumber"] = json!("FIR/2024/1234");
    let resp = test::call_service(&app, post_fir(&record).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"FIR_FIR-2024-1234.pdf\""
    );
    let markup = counters.last_markup().unwrap();
    assert!(markup.contains(r#"#field("FIR No", "FIR/2024/1234")"#));
}

#[actix_web::test]
async fn test_case_number_with_delete_character_gets_valid_header() {
    let (state, counters) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let mut record = valid_record();
    record["caseNumber"] = json!("a\u{7f}b");
    let resp = test::call_service(&app, post_fir(&record).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"FIR_a-b.pdf\""
    );
    assert_eq!(counters.released(), 1);
}

#[actix_web::test]
async fn test_reserved_device_name_case_number_is_kept() {
    let (state, _) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let mut record = valid_record();
    record["caseNumber"] = json!("CON");
    let resp = test::call_service(&app, post_fir(&record).to_request()).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"FIR_CON.pdf\""
    );
}

#[actix_web::test]
async fn test_invalid_phone_is_rejected_without_rendering() {
    let (state, counters) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let mut record = valid_record();
    record["complainant"]["phone"] = json!("12345");
    let resp = test::call_service(&app, post_fir(&record).to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(body.error.contains("complainant.phone"), "{}", body.error);
    assert_eq!(counters.launched(), 0);
}

#[actix_web::test]
async fn test_empty_charges_are_rejected() {
    let (state, counters) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let mut record = valid_record();
    record["charges"] = json!([]);
    let resp = test::call_service(&app, post_fir(&record).to_request()).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, "\"charges\" must contain at least 1 items");
    assert_eq!(counters.launched(), 0);
}

#[actix_web::test]
async fn test_first_failing_field_is_reported() {
    let (state, _) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let mut record = valid_record();
    record["complainant"]["age"] = json!(150);
    record["incident"]["place"] = json!("   ");
    record["charges"][0]["type"] = json!("IPC");
    let resp = test::call_service(&app, post_fir(&record).to_request()).await;

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(
        body.error,
        "\"complainant.age\" must be less than or equal to 120"
    );
}

#[actix_web::test]
async fn test_render_failure_returns_generic_error_and_releases_renderer() {
    let (state, counters) = test_state(Behaviour::FailPrint, 1);
    let app = init_app!(state);

    let resp = test::call_service(&app, post_fir(&valid_record()).to_request()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.error, RENDER_FAILURE_MESSAGE);
    assert!(!body.error.contains("details-table"));

    assert_eq!(counters.launched(), 1);
    assert_eq!(counters.released(), 1);
    assert_eq!(state.pool.available(), 1);
}

#[actix_web::test]
async fn test_renderer_startup_failure_is_a_server_error() {
    let (state, counters) = test_state(Behaviour::FailLaunch, 1);
    let app = init_app!(state);

    let resp = test::call_service(&app, post_fir(&valid_record()).to_request()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(counters.launched(), 0);
    assert_eq!(state.pool.available(), 1);
}

#[actix_web::test]
async fn test_render_timeout_releases_renderer() {
    let (state, counters) =
        test_state_with_timeout(Behaviour::Hang, 1, Duration::from_millis(50));
    let app = init_app!(state);

    let resp = test::call_service(&app, post_fir(&valid_record()).to_request()).await;

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(counters.launched(), 1);
    assert_eq!(counters.released(), 1);
    assert_eq!(state.pool.available(), 1);
}

#[actix_web::test]
async fn test_malformed_json_is_a_client_error() {
    let (state, counters) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let req = test::TestRequest::post()
        .uri("/api/generate-fir")
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload("{ malformed json ")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert!(!body.error.is_empty());
    assert_eq!(counters.launched(), 0);
}

#[actix_web::test]
async fn test_rendered_markup_keeps_charge_order() {
    let (state, counters) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let mut record = valid_record();
    record["charges"] = json!([
        { "section": "303", "description": "Theft", "type": "BNS" },
        { "section": "115", "description": "Hurt", "type": "BNS" }
    ]);
    let resp = test::call_service(&app, post_fir(&record).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let markup = counters.last_markup().unwrap();
    let theft = markup
        .find(r#"charge-item("BNS Section 303", "Theft")"#)
        .unwrap();
    let hurt = markup
        .find(r#"charge-item("BNS Section 115", "Hurt")"#)
        .unwrap();
    assert!(theft < hurt);
}

#[actix_web::test]
async fn test_common_charges_catalog() {
    let (state, _) = test_state(Behaviour::Succeed, 1);
    let app = init_app!(state);

    let req = test::TestRequest::get()
        .uri("/api/charges/common")
        .to_request();
    let charges: Vec<Value> = test::call_and_read_body_json(&app, req).await;

    assert_eq!(charges.len(), 8);
    assert_eq!(
        charges[2],
        json!({ "section": "303", "description": "Theft", "type": "BNS" })
    );
}

#[actix_web::test]
async fn test_health_reports_pool_status() {
    let (state, _) = test_state(Behaviour::Succeed, 3);
    let app = init_app!(state);

    let req = test::TestRequest::get().uri("/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["renderer"]["capacity"], 3);
    assert_eq!(body["renderer"]["available"], 3);
    assert_eq!(body["renderer"]["timeout_secs"], 5);
}
