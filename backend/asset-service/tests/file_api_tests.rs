//! HTTP surface of the file API

mod common;

use actix_web::http::{header, StatusCode};
use actix_web::{test, web, App};
use asset_service::handlers;
use asset_service::middleware::MetricsMiddleware;
use error_types::ErrorResponse;
use image::GenericImageView;
use s3_utils::InMemoryStore;
use std::sync::Arc;

macro_rules! app {
    ($store:expr, $scratch:expr) => {{
        let resolver = web::Data::new(common::resolver($store, $scratch));
        let metrics = resolver.metrics().clone();
        test::init_service(
            App::new()
                .app_data(resolver)
                .wrap(MetricsMiddleware::new(metrics))
                .configure(handlers::configure),
        )
        .await
    }};
}

fn location(resp: &actix_web::dev::ServiceResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn seeded_store() -> Arc<InMemoryStore> {
    let store = common::store();
    store.insert("events/cover.png", common::png(4000, 2000), "image/png");
    store.insert("events/thumb.png", common::png(300, 300), "image/png");
    store
}

#[actix_web::test]
async fn test_get_file_redirects_to_store() {
    let scratch = tempfile::tempdir().unwrap();
    let app = app!(seeded_store(), scratch.path());

    let req = test::TestRequest::get()
        .uri("/file/get?file=docs/program.pdf")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("{}/docs/program.pdf", common::STORE_URL)
    );
}

#[actix_web::test]
async fn test_get_file_without_key_is_bad_request() {
    let scratch = tempfile::tempdir().unwrap();
    let app = app!(seeded_store(), scratch.path());

    let req = test::TestRequest::get().uri("/file/get").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "INVALID_REQUEST");
    assert_eq!(body.status, 400);
}

#[actix_web::test]
async fn test_getimg_streams_fresh_derivative() {
    let scratch = tempfile::tempdir().unwrap();
    let store = seeded_store();
    let app = app!(store.clone(), scratch.path());

    let req = test::TestRequest::get()
        .uri("/file/getimg/500?img=events/cover.png")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(
        resp.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"cover.png\""
    );

    let body = test::read_body(resp).await;
    let decoded = image::load_from_memory(&body).unwrap();
    assert_eq!(decoded.dimensions(), (500, 250));
    assert_eq!(store.object("resized/500events/cover.png").unwrap().body, body);
    assert_eq!(common::scratch_entries(scratch.path()), 0);
}

#[actix_web::test]
async fn test_getimg_redirects_on_cache_hit() {
    let scratch = tempfile::tempdir().unwrap();
    let store = seeded_store();
    let app = app!(store.clone(), scratch.path());

    let first = test::TestRequest::get()
        .uri("/file/getimg/500?img=events/cover.png")
        .to_request();
    assert_eq!(test::call_service(&app, first).await.status(), StatusCode::OK);

    let second = test::TestRequest::get()
        .uri("/file/getimg/500?img=events/cover.png")
        .to_request();
    let resp = test::call_service(&app, second).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("{}/resized/500events/cover.png", common::STORE_URL)
    );
    assert_eq!(store.put_count(), 1);
}

#[actix_web::test]
async fn test_getimg_redirects_small_images_to_original() {
    let scratch = tempfile::tempdir().unwrap();
    let app = app!(seeded_store(), scratch.path());

    let req = test::TestRequest::get()
        .uri("/file/getimg/500?img=events/thumb.png")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        format!("{}/events/thumb.png", common::STORE_URL)
    );
}

#[actix_web::test]
async fn test_getimg_missing_asset_is_not_found() {
    let scratch = tempfile::tempdir().unwrap();
    let app = app!(seeded_store(), scratch.path());

    let req = test::TestRequest::get()
        .uri("/file/getimg/500?img=events/missing.png")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "MEDIA_NOT_FOUND");
    assert_eq!(body.error_type, "not_found_error");
    assert_eq!(common::scratch_entries(scratch.path()), 0);
}

#[actix_web::test]
async fn test_getimg_undecodable_asset_is_unprocessable() {
    let scratch = tempfile::tempdir().unwrap();
    let store = seeded_store();
    store.insert("events/broken.jpg", b"\xff\xd8\xff garbage".to_vec(), "image/jpeg");
    let app = app!(store, scratch.path());

    let req = test::TestRequest::get()
        .uri("/file/getimg/100?img=events/broken.jpg")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "UNSUPPORTED_FORMAT");
}

#[actix_web::test]
async fn test_getimg_rejects_invalid_sizes() {
    let scratch = tempfile::tempdir().unwrap();
    let app = app!(seeded_store(), scratch.path());

    for uri in [
        "/file/getimg/0?img=events/cover.png",
        "/file/getimg/abc?img=events/cover.png",
        "/file/getimg/500",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[actix_web::test]
async fn test_getimg_large_bounds_pass_through() {
    let scratch = tempfile::tempdir().unwrap();
    let store = seeded_store();
    let app = app!(store.clone(), scratch.path());

    for size in [300, 5000, 100_000] {
        let req = test::TestRequest::get()
            .uri(&format!("/file/getimg/{size}?img=events/thumb.png"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::FOUND, "size {size}");
        assert_eq!(
            location(&resp),
            format!("{}/events/thumb.png", common::STORE_URL)
        );
    }
    assert_eq!(store.put_count(), 0);
}

#[actix_web::test]
async fn test_getimg_failed_upload_is_bad_gateway() {
    let scratch = tempfile::tempdir().unwrap();
    let inner = seeded_store();
    let store = common::FailingStore::new(inner.clone());
    store.fail_uploads(true);
    let app = app!(store, scratch.path());

    let req = test::TestRequest::get()
        .uri("/file/getimg/500?img=events/cover.png")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    let body: ErrorResponse = test::read_body_json(resp).await;
    assert_eq!(body.code, "STORAGE_TRANSFER_FAILED");
    assert!(inner.object("resized/500events/cover.png").is_none());
    assert_eq!(common::scratch_entries(scratch.path()), 0);
}

#[actix_web::test]
async fn test_local_objects_served_for_memory_backend() {
    let scratch = tempfile::tempdir().unwrap();
    let store = Arc::new(InMemoryStore::new(format!(
        "http://localhost:8080{}",
        handlers::LOCAL_OBJECTS_PATH
    )));
    let thumb = common::png(300, 300);
    store.insert("events/thumb.png", thumb.clone(), "image/png");
    let resolver = web::Data::new(common::resolver(store, scratch.path()));
    let app = test::init_service(
        App::new()
            .app_data(resolver)
            .configure(handlers::configure)
            .configure(handlers::configure_local_objects),
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/file/getimg/500?img=events/thumb.png")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(
        location(&resp),
        "http://localhost:8080/objects/events/thumb.png"
    );

    let req = test::TestRequest::get()
        .uri("/objects/events/thumb.png")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "image/png"
    );
    assert_eq!(test::read_body(resp).await.as_ref(), thumb.as_slice());

    let req = test::TestRequest::get()
        .uri("/objects/events/missing.png")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_health_and_metrics_endpoints() {
    let scratch = tempfile::tempdir().unwrap();
    let app = app!(seeded_store(), scratch.path());

    for uri in ["/api/v1/health", "/api/v1/health/live", "/api/v1/health/ready"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let req = test::TestRequest::get()
        .uri("/file/getimg/500?img=events/cover.png")
        .to_request();
    test::call_service(&app, req).await;

    let req = test::TestRequest::get().uri("/metrics").to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("asset_resolutions_total{outcome=\"derived\"} 1"));
    assert!(text.contains("http_requests_total{method=\"GET\",status=\"200\"}"));
}
