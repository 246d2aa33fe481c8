//! Provider clients against a local axum server standing in for the real APIs.

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Path, Query};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use lantern_core::{
    CoordinatesResolver, Item, ItemId, LanternError, StoryApi, ValidationError, WeatherProvider,
};
use lantern_providers::{HackerNewsClient, OpenWeatherClient};
use serde_json::json;

async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn item(Path(file): Path<String>) -> impl IntoResponse {
    match file.as_str() {
        "42.json" => Json(json!({
            "by": "pg", "descendants": 2, "id": 42, "kids": [43, 44], "score": 10,
            "time": 1175714200, "title": "Lantern", "type": "story"
        }))
        .into_response(),
        "100.json" => Json(json!({
            "deleted": true, "id": 100, "parent": 44, "time": 1175714300, "type": "comment"
        }))
        .into_response(),
        "13.json" => Json(json!({"id": 13, "type": "story"})).into_response(),
        "500.json" => (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response(),
        _ => Json(serde_json::Value::Null).into_response(),
    }
}

fn story_api() -> Router {
    Router::new()
        .route(
            "/v0/topstories.json",
            get(|| async { Json((1..=600).collect::<Vec<u64>>()) }),
        )
        .route("/v0/item/:file", get(item))
}

#[tokio::test]
async fn hacker_news_top_ids_are_capped() {
    let base = serve(story_api()).await;
    let client = HackerNewsClient::new(format!("{base}/v0"), Duration::from_secs(5)).unwrap();

    let ids = client.list_top_ids().await.unwrap();
    assert_eq!(ids.len(), 500);
    assert_eq!(ids[0], ItemId::new(1));
}

#[tokio::test]
async fn hacker_news_items_parse_and_null_is_none() {
    let base = serve(story_api()).await;
    let client = HackerNewsClient::new(format!("{base}/v0"), Duration::from_secs(5)).unwrap();

    let story = client.get_item(ItemId::new(42)).await.unwrap().unwrap();
    assert_eq!(story.kids(), &[ItemId::new(43), ItemId::new(44)]);

    let deleted = client.get_item(ItemId::new(100)).await.unwrap().unwrap();
    assert!(matches!(deleted, Item::Comment(ref c) if c.deleted));

    assert_eq!(client.get_item(ItemId::new(7)).await.unwrap(), None);
}

#[tokio::test]
async fn hacker_news_errors_are_typed() {
    let base = serve(story_api()).await;
    let client = HackerNewsClient::new(format!("{base}/v0"), Duration::from_secs(5)).unwrap();

    let malformed = client.get_item(ItemId::new(13)).await.unwrap_err();
    assert!(matches!(
        malformed,
        LanternError::Validation(ValidationError::MalformedPayload { .. })
    ));

    let failed = client.get_item(ItemId::new(500)).await.unwrap_err();
    assert!(matches!(failed, LanternError::Transport(_)));
}

fn weather_api() -> Router {
    Router::new()
        .route(
            "/geo/1.0/direct",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("limit").map(String::as_str), Some("1"));
                assert_eq!(params.get("appid").map(String::as_str), Some("test-key"));
                match params.get("q").map(String::as_str) {
                    Some("Atlanta") => Json(json!([
                        {"name": "Atlanta", "lat": 33.749, "lon": -84.388, "country": "US"}
                    ])),
                    _ => Json(json!([])),
                }
            }),
        )
        .route(
            "/data/3.0/onecall",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("units").map(String::as_str), Some("imperial"));
                assert_eq!(params.get("exclude").map(String::as_str), Some("alerts"));
                Json(json!({
                    "lat": params.get("lat").and_then(|v| v.parse::<f64>().ok()),
                    "lon": params.get("lon").and_then(|v| v.parse::<f64>().ok()),
                    "timezone": "America/New_York",
                    "current": {"temp": 70.0},
                    "hourly": [{"dt": 1700000000, "temp": 70.0, "pop": 0.2}],
                    "daily": []
                }))
            }),
        )
}

#[tokio::test]
async fn open_weather_resolves_city_then_forecast() {
    let base = serve(weather_api()).await;
    let client = OpenWeatherClient::new(base, "test-key", Duration::from_secs(5)).unwrap();

    let coordinates = client.resolve("Atlanta").await.unwrap();
    assert!((coordinates.lat - 33.749).abs() < 1e-9);

    let forecast = client.fetch_forecast(coordinates).await.unwrap();
    assert_eq!(forecast.current_temp, Some(70.0));
    assert_eq!(forecast.hourly.len(), 1);
}

#[tokio::test]
async fn open_weather_unknown_city_is_not_found() {
    let base = serve(weather_api()).await;
    let client = OpenWeatherClient::new(base, "test-key", Duration::from_secs(5)).unwrap();

    let err = client.resolve("Atlantis").await.unwrap_err();
    assert!(err.is_not_found());
}
