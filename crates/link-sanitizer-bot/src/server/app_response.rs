use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// What Telegram gets back for a delivery.
///
/// The body is always `"0"`; only the status tells whether the update was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResponse {
    Ok,
    Failed,
}
impl WebhookResponse {
    pub const BODY: &'static str = "0";

    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::Ok => StatusCode::OK,
            Self::Failed => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebhookResponse {
    fn into_response(self) -> Response {
        (self.status_code(), Self::BODY).into_response()
    }
}
