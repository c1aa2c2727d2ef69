use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::storage::StorageError;

/// Error returned by every REST handler. Rendered as `{"error": "..."}`.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Validation(#[from] validator::ValidationErrors),
    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for AppError {
    fn from(e: StorageError) -> Self {
        match e {
            StorageError::DuplicateNumber(number) => {
                AppError::Conflict(format!("Стол №{} уже существует", number))
            }
            StorageError::SlotTaken { .. } => AppError::Conflict("Время уже занято".to_string()),
            other => AppError::Storage(other),
        }
    }
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            AppError::Storage(e) => {
                tracing::error!("storage error: {:?}", e);
                "Внутренняя ошибка сервера".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_http_status() {
        let slot = AppError::from(StorageError::SlotTaken {
            table_id: 1,
            date: "2026-10-19".to_string(),
            time: "19:00".to_string(),
        });
        assert_eq!(slot.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::from(StorageError::DuplicateNumber(4)).status(), StatusCode::CONFLICT);
        let corrupt = AppError::from(StorageError::Corrupt("bad".to_string()));
        assert_eq!(corrupt.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_is_404() {
        assert_eq!(AppError::NotFound("Стол не найден").status(), StatusCode::NOT_FOUND);
    }
}
