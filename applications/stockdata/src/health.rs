use crate::state::State;
use axum::{extract::State as AxumState, Json};
use chrono::Utc;
use serde::Serialize;

#[derive(Serialize)]
pub struct Health {
    status: &'static str,
    timestamp: String,
    cache_size: usize,
}

pub async fn get_health(AxumState(state): AxumState<State>) -> Json<Health> {
    Json(Health {
        status: "healthy",
        timestamp: Utc::now().to_rfc3339(),
        cache_size: state.cache.len().await,
    })
}
