/// Asset Service - HTTP Server
///
/// Redirects file requests to object storage and serves resized images.
use actix_web::{web, App, HttpServer};
use anyhow::Context;
use asset_service::config::StorageBackend;
use asset_service::handlers;
use asset_service::middleware;
use asset_service::services::resize::scratch;
use asset_service::services::DerivedAssetResolver;
use asset_service::{Config, Metrics};
use s3_utils::{InMemoryStore, ObjectStore, S3Store};
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::EnvFilter;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = Config::from_env()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {e}"))?;

    init_tracing(config.app.is_production());

    // The store is fully built before the server accepts traffic
    let store: Arc<dyn ObjectStore> = match config.storage.backend {
        StorageBackend::S3 => {
            let store = S3Store::connect(config.s3.clone()).await;
            match store.health_check().await {
                Ok(()) => tracing::info!(bucket = %config.s3.bucket, "S3 bucket reachable"),
                Err(e) => tracing::warn!(
                    bucket = %config.s3.bucket,
                    error = %e,
                    "S3 health check failed; readiness probe will report unavailable"
                ),
            }
            Arc::new(store)
        }
        StorageBackend::Memory => {
            let base_url = format!(
                "{}{}",
                config.app.public_url.trim_end_matches('/'),
                handlers::LOCAL_OBJECTS_PATH
            );
            tracing::warn!(%base_url, "Using in-memory object store; contents are lost on restart");
            Arc::new(InMemoryStore::new(base_url))
        }
    };

    scratch::reset_root(&config.resize.scratch_dir)
        .await
        .with_context(|| {
            format!(
                "Failed to prepare scratch directory {}",
                config.resize.scratch_dir.display()
            )
        })?;

    let metrics =
        Metrics::new().map_err(|e| anyhow::anyhow!("Failed to register metrics: {e}"))?;
    let resolver = web::Data::new(DerivedAssetResolver::new(
        store,
        &config.resize,
        metrics.clone(),
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(address = %bind_address, "Asset service starting HTTP server");

    let serve_local_objects = config.storage.backend == StorageBackend::Memory;
    let cors = config.cors.clone();
    HttpServer::new(move || {
        App::new()
            .app_data(resolver.clone())
            .wrap(middleware::MetricsMiddleware::new(metrics.clone()))
            .wrap(middleware::cors(&cors))
            .wrap(TracingLogger::default())
            .configure(handlers::configure)
            .configure(|cfg| {
                if serve_local_objects {
                    handlers::configure_local_objects(cfg);
                }
            })
    })
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {bind_address}"))?
    .run()
    .await?;

    tracing::info!("Asset service shutting down");
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
