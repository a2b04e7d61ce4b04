use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error as ThisError;
use tracing::info;

#[derive(ThisError, Debug)]
pub enum Error {
    #[error("Invalid symbol: {0:?}")]
    InvalidSymbol(String),
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match self {
            Error::InvalidSymbol(_) => StatusCode::BAD_REQUEST,
        };

        info!("rejecting request: {}", self);

        (
            status,
            Json(json!({
                "success": false,
                "error": self.to_string(),
            })),
        )
            .into_response()
    }
}
