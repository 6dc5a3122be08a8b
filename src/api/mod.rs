pub mod equity_curve;
pub mod health;

use crate::config::Config;
use crate::orchestration::Player;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub player: Arc<Player>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let player = Arc::new(Player::from_config(&config));
        Self { config, player }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/equity-curve", post(equity_curve::post_equity_curve))
        .route(
            "/v1/equity-curve/csv",
            post(equity_curve::post_equity_curve_csv),
        )
        .layer(cors)
        .with_state(state)
}
