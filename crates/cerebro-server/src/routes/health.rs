use axum::{routing::get, Router};

pub const LIVENESS_MESSAGE: &str =
    "Cerebro is up and running. Ready to receive commands!";

async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

pub fn routes() -> Router {
    Router::new().route("/", get(liveness))
}
