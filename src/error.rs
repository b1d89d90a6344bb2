use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::{ErrorResponse, MessageResponse};

#[derive(Debug, Error)]
pub enum AppError {
    #[error("DB not ready")]
    NotReady,

    #[error("Invalid lesson ID")]
    InvalidLessonId,

    #[error("Lesson not found")]
    LessonNotFound,

    #[error("Invalid order. Provide {{name, phone, lessons:[{{id,qty}}]}} or {{cart:[...]}}")]
    InvalidOrder,

    #[error("Invalid JSON body")]
    InvalidBody,

    #[error("Image not found")]
    ImageNotFound,

    #[error("Route not found")]
    RouteNotFound,

    #[error("Database error: {0}")]
    Store(#[from] mongodb::error::Error),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::NotReady => StatusCode::SERVICE_UNAVAILABLE,
            Self::InvalidLessonId | Self::InvalidOrder | Self::InvalidBody => {
                StatusCode::BAD_REQUEST
            }
            Self::LessonNotFound | Self::ImageNotFound | Self::RouteNotFound => {
                StatusCode::NOT_FOUND
            }
            Self::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match self {
            Self::Store(_) => {
                tracing::error!(error = %self, "request failed");
                internal_error()
            }
            Self::NotReady => {
                tracing::warn!("DB not ready yet");
                (status, Json(ErrorResponse::new(self.to_string()))).into_response()
            }
            // Lesson lookups answer with `msg`, not `error`.
            Self::LessonNotFound => {
                (status, Json(MessageResponse::new(self.to_string()))).into_response()
            }
            _ => (status, Json(ErrorResponse::new(self.to_string()))).into_response(),
        }
    }
}

/// The generic 500 body; failure detail stays in the server log.
pub fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new("Internal Server Error")),
    )
        .into_response()
}

pub type Result<T> = std::result::Result<T, AppError>;
