/// File handlers - redirect to stored files and serve bounded images
use actix_web::http::header::{self, ContentDisposition, DispositionParam, DispositionType};
use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::services::{AssetKey, DerivedAssetResolver, Resolution, ResolveError};

#[derive(Debug, Deserialize)]
pub struct FileQuery {
    pub file: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ImageQuery {
    pub img: Option<String>,
}

fn require_key(raw: Option<&str>, param: &str) -> Result<AssetKey> {
    raw.and_then(AssetKey::new)
        .ok_or_else(|| AppError::BadRequest(format!("query parameter '{param}' is required")))
}

fn parse_size(raw: &str) -> Result<u32> {
    match raw.parse::<u32>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(AppError::BadRequest(format!(
            "size must be a positive integer, got '{raw}'"
        ))),
    }
}

fn redirect(url: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, url))
        .finish()
}

/// Redirect to the public URL of a stored file
pub async fn get_file(
    resolver: web::Data<DerivedAssetResolver>,
    query: web::Query<FileQuery>,
) -> Result<HttpResponse> {
    let key = require_key(query.file.as_deref(), "file")?;
    Ok(redirect(&resolver.public_url(&key)))
}

/// Serve an object straight from the store.
///
/// Only mounted for the in-memory backend, whose public URLs point here.
pub async fn get_object(
    resolver: web::Data<DerivedAssetResolver>,
    key: web::Path<String>,
) -> Result<HttpResponse> {
    let key = require_key(Some(key.as_str()), "key")?;
    let body = resolver
        .store()
        .get(key.as_str())
        .await
        .map_err(ResolveError::from)?;

    Ok(HttpResponse::Ok().content_type(key.content_type()).body(body))
}

/// Serve an image bounded to `size` pixels on its longer side
pub async fn get_image(
    resolver: web::Data<DerivedAssetResolver>,
    size: web::Path<String>,
    query: web::Query<ImageQuery>,
) -> Result<HttpResponse> {
    let size = parse_size(&size)?;
    let key = require_key(query.img.as_deref(), "img")?;

    let response = match resolver.resolve(&key, size).await? {
        Resolution::Cached { url, .. } | Resolution::Original { url, .. } => redirect(&url),
        Resolution::Derived(asset) => HttpResponse::Ok()
            .content_type(asset.content_type)
            .insert_header(ContentDisposition {
                disposition: DispositionType::Attachment,
                parameters: vec![DispositionParam::Filename(asset.file_name)],
            })
            .body(asset.body),
    };

    Ok(response)
}
