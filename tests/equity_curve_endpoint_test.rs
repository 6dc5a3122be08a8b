use axum::http::StatusCode;
use equity_player::api::{self, AppState};
use equity_player::config::Config;
use equity_player::FlatMarkPolicy;
use serde_json::{json, Value};
use tower::util::ServiceExt;

fn setup_app(config: Config) -> axum::Router {
    api::create_router(AppState::new(config))
}

async fn post(app: axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = axum::http::Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(axum::body::Body::from(body.to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

fn scenario_body() -> Value {
    json!({
        "trades": [
            {"instrumentId": "ES", "timestamp": "2020-01-02 09:30:00", "side": "BUY",
             "size": "10", "price": "100", "commission": "1"},
            {"instrumentId": "ES", "timestamp": "2020-01-03 09:30:00", "side": "SELL",
             "size": "10", "price": "120", "commission": "1"}
        ],
        "prices": [
            {"timestamp": "2020-01-01", "price": "95"},
            {"timestamp": "2020-01-02 16:00:00", "price": "110"}
        ],
        "baseCapital": "1000000"
    })
}

#[tokio::test]
async fn test_equity_curve_response_fields() {
    let (status, json) = post(
        setup_app(Config::default()),
        "/v1/equity-curve",
        scenario_body(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    assert!(json["sessionId"].is_string());
    assert_eq!(json["instrument"], "ES");
    assert_eq!(json["totalEntries"], 4);
    assert_eq!(json["digest"].as_str().unwrap().len(), 64);

    let entries = json["entries"].as_array().unwrap();
    let messages: Vec<&str> = entries
        .iter()
        .map(|e| e["message"].as_str().unwrap())
        .collect();
    assert_eq!(messages, vec!["INITIALIZATION", "OPEN", "MTM", "FLAT"]);

    let mtm = &entries[2];
    assert_eq!(mtm["seq"], 2);
    assert!(mtm["timeMs"].is_i64());
    assert_eq!(mtm["unrealizedPnl"], "100");
    assert_eq!(mtm["equity"], "1000099");

    let flat = &entries[3];
    assert_eq!(flat["realizedPnl"], "200");
    assert_eq!(flat["totalCommission"], "2");
    assert_eq!(flat["equity"], "1000198");
    assert_eq!(flat["baseCapital"], "1000000");
}

#[tokio::test]
async fn test_equity_curve_deterministic_digest() {
    let app = setup_app(Config::default());
    let (_, first) = post(app.clone(), "/v1/equity-curve", scenario_body()).await;
    let (_, second) = post(app, "/v1/equity-curve", scenario_body()).await;

    assert_eq!(first["digest"], second["digest"]);
    assert_eq!(first["entries"], second["entries"]);
    assert_ne!(first["sessionId"], second["sessionId"]);
}

#[tokio::test]
async fn test_window_crops_entries_but_keeps_sequence() {
    let mut body = scenario_body();
    // 2020-01-02T16:00:00Z .. 2020-01-03T09:30:00Z
    body["fromMs"] = json!(1_577_980_800_000i64);
    body["toMs"] = json!(1_578_043_800_000i64);

    let (status, json) = post(setup_app(Config::default()), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalEntries"], 4);

    let seqs: Vec<i64> = json["entries"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["seq"].as_i64().unwrap())
        .collect();
    assert_eq!(seqs, vec![2, 3]);
}

#[tokio::test]
async fn test_inverted_window_rejected() {
    let mut body = scenario_body();
    body["fromMs"] = json!(2000);
    body["toMs"] = json!(1000);

    let (status, json) = post(setup_app(Config::default()), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].is_string());
}

#[tokio::test]
async fn test_default_base_capital_from_config() {
    let mut body = scenario_body();
    body.as_object_mut().unwrap().remove("baseCapital");
    let config = Config {
        default_base_capital: 500.into(),
        ..Config::default()
    };

    let (status, json) = post(setup_app(config), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["entries"][0]["equity"], "500");
}

#[tokio::test]
async fn test_multiple_instruments_is_bad_request() {
    let body = json!({
        "trades": [
            {"instrumentId": "ES", "timestamp": 1000, "side": "BUY", "size": 1, "price": 10},
            {"instrumentId": "NQ", "timestamp": 2000, "side": "BUY", "size": 1, "price": 10}
        ]
    });
    let (status, json) = post(setup_app(Config::default()), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("instrument"));
}

#[tokio::test]
async fn test_malformed_timestamp_is_bad_request() {
    let body = json!({
        "trades": [
            {"instrumentId": "ES", "timestamp": "not a time", "side": "BUY", "size": 1, "price": 10}
        ]
    });
    let (status, json) = post(setup_app(Config::default()), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("Ordering error"));
}

#[tokio::test]
async fn test_fractional_timestamp_is_bad_request() {
    let body = json!({
        "trades": [
            {"instrumentId": "ES", "timestamp": 1000.5, "side": "BUY", "size": 1, "price": 10}
        ]
    });
    let (status, json) = post(setup_app(Config::default()), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error = json["error"].as_str().unwrap();
    assert!(error.starts_with("Ordering error"));
    assert!(error.contains("1000.5"));
}

#[tokio::test]
async fn test_overflowing_position_is_bad_request() {
    let body = json!({
        "trades": [
            {"instrumentId": "ES", "timestamp": 1000, "side": "BUY",
             "size": "1000000000000000", "price": "1000000000000000"},
            {"instrumentId": "ES", "timestamp": 2000, "side": "BUY",
             "size": "1000000000000000", "price": "1000000000000000"}
        ]
    });
    let (status, json) = post(setup_app(Config::default()), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("overflow"));
}

#[tokio::test]
async fn test_unknown_side_is_unprocessable() {
    let body = json!({
        "trades": [
            {"instrumentId": "ES", "timestamp": 1000, "side": "HOLD", "size": 1, "price": 10}
        ]
    });
    let (status, _) = post(setup_app(Config::default()), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_mark_while_flat_depends_on_policy() {
    let body = json!({
        "trades": [
            {"instrumentId": "ES", "timestamp": 1000, "side": "BUY", "size": 1, "price": 10},
            {"instrumentId": "ES", "timestamp": 2000, "side": "SELL", "size": 1, "price": 12}
        ],
        "prices": [{"timestamp": 3000, "price": 13}]
    });

    let (status, _) = post(setup_app(Config::default()), "/v1/equity-curve", body.clone()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let carry = Config {
        flat_mark_policy: FlatMarkPolicy::Carry,
        ..Config::default()
    };
    let (status, json) = post(setup_app(carry), "/v1/equity-curve", body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["entries"][3]["message"], "MTM");
    assert_eq!(json["entries"][3]["equity"], "2");
}

#[tokio::test]
async fn test_event_cap_is_bad_request() {
    let config = Config {
        max_events: 2,
        ..Config::default()
    };
    let (status, _) = post(setup_app(config), "/v1/equity-curve", scenario_body()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_csv_endpoint_matches_json_endpoint() {
    let csv_body = json!({
        "tradelogCsv": "timestamp,ticker,side,size,price,commission\n\
            2020-01-02 09:30:00,ES,BUY,10,100,1\n\
            2020-01-03 09:30:00,ES,SELL,10,120,1\n",
        "pricesCsv": "timestamp,price\n2020-01-01,95\n2020-01-02 16:00:00,110\n",
        "baseCapital": "1000000"
    });

    let app = setup_app(Config::default());
    let (status, from_csv) = post(app.clone(), "/v1/equity-curve/csv", csv_body).await;
    assert_eq!(status, StatusCode::OK);
    let (_, from_json) = post(app, "/v1/equity-curve", scenario_body()).await;

    assert_eq!(from_csv["digest"], from_json["digest"]);
    assert_eq!(from_csv["entries"], from_json["entries"]);
}

#[tokio::test]
async fn test_csv_endpoint_reports_csv_errors() {
    let csv_body = json!({
        "tradelogCsv": "timestamp,ticker\n1000,ES\n",
        "pricesCsv": "timestamp,price\n"
    });
    let (status, json) = post(setup_app(Config::default()), "/v1/equity-curve/csv", csv_body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().starts_with("CSV error"));
}

#[tokio::test]
async fn test_health_and_ready() {
    let app = setup_app(Config::default());
    for (uri, expected) in [("/health", "ok"), ("/ready", "ready")] {
        let req = axum::http::Request::builder()
            .method("GET")
            .uri(uri)
            .body(axum::body::Body::empty())
            .unwrap();
        let resp = app.clone().oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["status"], expected);
    }
}
