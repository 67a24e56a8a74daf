use axum::Router;

use super::AppRouter;

mod index;
mod webhook;

pub(super) fn router(webhook_path: &str) -> AppRouter {
    Router::new()
        .merge(index::router())
        .merge(webhook::router(webhook_path))
}
