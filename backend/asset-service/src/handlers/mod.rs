/// HTTP handlers for asset-service
///
/// - Files: redirect to stored files, serve size-bound images
/// - Health: liveness/readiness probes and Prometheus metrics
pub mod files;
pub mod health;

use actix_web::web;

pub use files::{get_file, get_image, get_object};

/// Mount point of [`configure_local_objects`]
pub const LOCAL_OBJECTS_PATH: &str = "/objects";

/// Register every route; shared by `main` and integration tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/file")
            .route("/get", web::get().to(files::get_file))
            .route("/getimg/{size}", web::get().to(files::get_image)),
    )
    .route("/api/v1/health", web::get().to(health::health))
    .route("/api/v1/health/live", web::get().to(health::live))
    .route("/api/v1/health/ready", web::get().to(health::ready))
    .route("/metrics", web::get().to(health::metrics));
}

/// Serve stored objects from this process; used with the in-memory backend
pub fn configure_local_objects(cfg: &mut web::ServiceConfig) {
    cfg.route(
        &format!("{LOCAL_OBJECTS_PATH}/{{key:.*}}"),
        web::get().to(files::get_object),
    );
}
