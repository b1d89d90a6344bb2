use axum::{
    extract::{rejection::JsonRejection, FromRequestParts, Path, Request, State},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use mongodb::bson;
use serde_json::{Map, Value};
use std::path::{Component, PathBuf};
use std::sync::Arc;
use tower::ServiceExt;
use tower_http::services::ServeFile;

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::*;
use crate::AppState;

type JsonBody = std::result::Result<Json<Value>, JsonRejection>;

// === Readiness gate ===

/// The connected store. Extracting it fails with 503 until the state carries
/// one, so every handler taking `Db` is gated on readiness.
pub struct Db(pub Arc<dyn Store>);

impl FromRequestParts<AppState> for Db {
    type Rejection = AppError;

    async fn from_request_parts(
        _parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        state.store.clone().map(Db).ok_or(AppError::NotReady)
    }
}

// A body sent without a JSON content type counts as empty.
fn json_object(body: JsonBody) -> Result<Map<String, Value>> {
    match body {
        Ok(Json(Value::Object(map))) => Ok(map),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Map::new()),
        Ok(_) | Err(_) => Err(AppError::InvalidBody),
    }
}

fn documents_to_json(docs: Vec<bson::Document>) -> Json<Vec<Value>> {
    Json(docs.into_iter().map(document_to_json).collect())
}

// === Root ===

pub async fn index() -> &'static str {
    "API running. Try GET /collection/lessons"
}

// === Images ===

/// Only direct children of the images directory are reachable.
fn image_path(dir: &std::path::Path, name: &str) -> Option<PathBuf> {
    let mut components = std::path::Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(file)), None) => Some(dir.join(file)),
        _ => None,
    }
}

pub async fn get_image(
    State(state): State<AppState>,
    Path(image_name): Path<String>,
    req: Request,
) -> Result<Response> {
    let path = image_path(&state.images_dir, &image_name).ok_or(AppError::ImageNotFound)?;

    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => {}
        _ => return Err(AppError::ImageNotFound),
    }

    let response = ServeFile::new(&path)
        .oneshot(req)
        .await
        .unwrap_or_else(|never| match never {});
    Ok(response.into_response())
}

// === Lessons ===

pub async fn list_lessons(Db(store): Db) -> Result<Json<Vec<Value>>> {
    let lessons = store.list_lessons().await?;
    Ok(documents_to_json(lessons))
}

pub async fn update_lesson(
    Db(store): Db,
    Path(id): Path<String>,
    body: JsonBody,
) -> Result<Json<LessonUpdated>> {
    let filter = LessonFilter::parse(&id)?;
    let mut patch = json_object(body)?;
    // `_id` is immutable; MongoDB refuses any `$set` that changes it.
    patch.remove("_id");
    let fields = json_to_document(&patch)?;

    let outcome = store.update_lesson(&filter, fields).await?;
    if outcome.matched == 0 {
        return Err(AppError::LessonNotFound);
    }

    Ok(Json(LessonUpdated {
        msg: "success",
        modified: outcome.modified,
    }))
}

// === Orders ===

/// Shared by `POST /orders` and `POST /collection/orders`.
pub async fn create_order(
    Db(store): Db,
    body: JsonBody,
) -> Result<(StatusCode, Json<OrderSaved>)> {
    let order = NewOrder::from_body(json_object(body)?)?;
    let id = store.insert_order(order).await?;
    tracing::info!(order_id = %id, "order inserted");

    Ok((
        StatusCode::CREATED,
        Json(OrderSaved {
            message: "Order Saved",
            order_id: id.to_hex(),
        }),
    ))
}

pub async fn list_orders(Db(store): Db) -> Result<Json<Vec<Value>>> {
    let orders = store.list_orders().await?;
    Ok(documents_to_json(orders))
}

// === Fallback ===

pub async fn route_not_found() -> AppError {
    AppError::RouteNotFound
}
