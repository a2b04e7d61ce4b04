use crate::health;
use crate::indices;
use crate::state::State;
use crate::stocks;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

const ALLOWED_ORIGINS: [&str; 4] = [
    "http://localhost:3000",
    "http://localhost:3001",
    "http://localhost:3002",
    "http://localhost:3005",
];

fn cors() -> CorsLayer {
    let origins = ALLOWED_ORIGINS
        .into_iter()
        .map(HeaderValue::from_static)
        .collect::<Vec<_>>();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
}

pub fn create_app(state: State) -> Router {
    Router::new()
        .route("/api/health", get(health::get_health))
        .route("/api/stock/{symbol}", get(stocks::get))
        .route("/api/stocks", post(stocks::batch))
        .route("/api/indices", get(indices::get))
        .with_state(state)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
}
