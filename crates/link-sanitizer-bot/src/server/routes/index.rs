use axum::{routing::get, Router};

use crate::server::AppRouter;

pub(super) fn router() -> AppRouter {
    Router::new().route("/ping", get(ping))
}

async fn ping() -> &'static str {
    "pong"
}
