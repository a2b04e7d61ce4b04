use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use marketpulse::errors::Error;
use marketpulse::providers::chain::ChainPolicy;
use marketpulse::providers::{MockProvider, Provider, ProviderKind};
use marketpulse::quote::{to_decimal, Quote};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use stockdata::{create_app, State};
use tower::ServiceExt;

fn serving(kind: ProviderKind, price: f64, times: usize) -> Arc<dyn Provider> {
    let mut provider = MockProvider::new();
    provider.expect_kind().return_const(kind);
    provider
        .expect_quote()
        .times(times)
        .returning(move |symbol| {
            Ok(Quote::new(symbol.clone(), to_decimal(price), kind.data_source())
                .with_change(Decimal::new(15, 1), Decimal::new(75, 2)))
        });
    Arc::new(provider)
}

fn failing(kind: ProviderKind) -> Arc<dyn Provider> {
    let mut provider = MockProvider::new();
    provider.expect_kind().return_const(kind);
    provider
        .expect_quote()
        .returning(move |_| Err(Error::RateLimited { provider: kind }));
    Arc::new(provider)
}

fn state(providers: Vec<Arc<dyn Provider>>) -> State {
    State::new(providers, ChainPolicy::default(), Duration::from_secs(30))
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, serde_json::from_slice(&body).unwrap())
}

async fn post_json(app: &Router, uri: &str, payload: Value) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();

    (status, body.to_vec())
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = create_app(state(vec![]));

    let (status, body) = get_json(&app, "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["cache_size"], 0);
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_stock_served_once_then_cached() {
    let app = create_app(state(vec![serving(ProviderKind::Finnhub, 189.5, 1)]));

    let (status, first) = get_json(&app, "/api/stock/aapl").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["success"], true);
    assert_eq!(first["data"]["symbol"], "AAPL");
    assert_eq!(first["data"]["price"], 189.5);
    assert_eq!(first["data"]["dataSource"], "finnhub");
    assert_eq!(first["data"]["isRealTime"], true);

    let (_, second) = get_json(&app, "/api/stock/AAPL").await;
    assert_eq!(second["data"]["price"], 189.5);

    let (_, health) = get_json(&app, "/api/health").await;
    assert_eq!(health["cache_size"], 1);
}

#[tokio::test]
async fn test_stock_falls_back_to_next_provider() {
    let app = create_app(state(vec![
        failing(ProviderKind::Yahoo),
        serving(ProviderKind::TwelveData, 377.0, 1),
    ]));

    let (_, body) = get_json(&app, "/api/stock/MSFT").await;

    assert_eq!(body["data"]["dataSource"], "twelve-data");
    assert_eq!(body["data"]["price"], 377.0);
}

#[tokio::test]
async fn test_stock_uses_mock_data_when_every_provider_fails() {
    let app = create_app(state(vec![
        failing(ProviderKind::Yahoo),
        failing(ProviderKind::Polygon),
    ]));

    let (status, body) = get_json(&app, "/api/stock/NVDA").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["dataSource"], "enhanced-mock");
    assert_eq!(body["data"]["isRealTime"], false);
    assert!(body["data"]["price"].as_f64().unwrap() > 0.0);

    let (_, health) = get_json(&app, "/api/health").await;
    assert_eq!(health["cache_size"], 0);
}

#[tokio::test]
async fn test_stock_rejects_invalid_symbol() {
    let app = create_app(state(vec![]));

    let (status, body) = get_json(&app, "/api/stock/AA%20PL").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].as_str().unwrap().contains("Invalid symbol"));
}

#[tokio::test]
async fn test_batch_matches_single_stock() {
    let app = create_app(state(vec![serving(ProviderKind::Yahoo, 250.0, 2)]));

    let (status, body) = post_json(
        &app,
        "/api/stocks",
        json!({"symbols": ["aapl", "TSLA", "AAPL"]}),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    let data = body["data"].as_object().unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data["TSLA"]["price"], 250.0);

    let (_, single) = get_json(&app, "/api/stock/AAPL").await;
    assert_eq!(single["data"]["price"], data["AAPL"]["price"]);
}

#[tokio::test]
async fn test_batch_fills_failures_with_mock_data() {
    let app = create_app(state(vec![failing(ProviderKind::Finnhub)]));

    let (_, body) = post_json(&app, "/api/stocks", json!({"symbols": ["GOOGL"]})).await;

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"]["GOOGL"]["dataSource"], "enhanced-mock");
}

#[tokio::test]
async fn test_batch_empty_list() {
    let app = create_app(state(vec![]));

    let (status, body) = post_json(&app, "/api/stocks", json!({"symbols": []})).await;

    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["data"], json!({}));
}

#[tokio::test]
async fn test_batch_without_symbols_is_rejected() {
    let app = create_app(state(vec![]));

    let (status, _) = post_json(&app, "/api/stocks", json!({"tickers": ["AAPL"]})).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_indices_use_real_quotes() {
    let app = create_app(state(vec![serving(ProviderKind::Yahoo, 5431.6, 3)]));

    let (status, body) = get_json(&app, "/api/indices").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let us = body["data"]["US"].as_array().unwrap();
    assert_eq!(us.len(), 3);
    assert_eq!(us[0]["name"], "S&P 500");
    assert_eq!(us[0]["value"], "5,431.60");
    assert_eq!(us[0]["change"], "+1.50");
    assert_eq!(us[0]["percent"], "+0.75%");
    assert_eq!(us[0]["trend"], "up");
}

#[tokio::test]
async fn test_indices_fall_back_to_static_rows() {
    let app = create_app(state(vec![failing(ProviderKind::Yahoo)]));

    let (_, body) = get_json(&app, "/api/indices").await;

    let data = &body["data"];
    assert_eq!(
        data["US"][2],
        json!({"name": "DOW", "value": "34,567.89", "change": "-23.45", "percent": "-0.07%", "trend": "down"})
    );
    assert_eq!(data["Europe"].as_array().unwrap().len(), 3);
    assert_eq!(data["Asia"][0]["name"], "Nikkei 225");
    assert_eq!(data["Currencies"][0]["value"], "1.0876");
    assert_eq!(data["Crypto"][2]["trend"], "down");
}

#[tokio::test]
async fn test_cors_allows_dashboard_origins() {
    let app = create_app(state(vec![]));

    let request = Request::builder()
        .uri("/api/health")
        .header("origin", "http://localhost:3002")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()["access-control-allow-origin"],
        "http://localhost:3002"
    );
}
