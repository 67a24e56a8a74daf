use app_sanitizer::{Decision, InboundUpdate, InvocationError, ParameterBlacklist, Sanitized};
use axum::{body::Bytes, extract::State, routing::post, Router};
use tracing::{debug, error, field, info, Span};

use crate::server::{app_response::WebhookResponse, AppRouter, AppState};

pub(super) fn router(webhook_path: &str) -> AppRouter {
    Router::new().route(webhook_path, post(webhook))
}

#[tracing::instrument(name = "update", skip_all, fields(update_id = field::Empty))]
async fn webhook(State(state): State<AppState>, body: Bytes) -> WebhookResponse {
    match handle_update(&state, &body).await {
        Ok(()) => WebhookResponse::Ok,
        Err(e) => {
            error!(err = ?e, "Failed to handle update");
            WebhookResponse::Failed
        }
    }
}

async fn handle_update(state: &AppState, body: &[u8]) -> Result<(), InvocationError> {
    let blacklist = ParameterBlacklist::from_config(state.url_blacklist.as_deref())?;

    let update: InboundUpdate =
        serde_json::from_slice(body).map_err(InvocationError::InvalidPayload)?;

    if let Some(update_id) = update.update_id {
        Span::current().record("update_id", update_id);
    }

    let Some(msg) = update.message else {
        debug!("Update does not carry a message");
        return Ok(());
    };

    let decision = state.processor.process(&msg, &blacklist).await?;

    if let Decision::Notify { reports, .. } = decision {
        let cleaned = reports
            .iter()
            .filter(|x| x.result.as_ref().is_ok_and(Sanitized::is_rewritten))
            .count();

        info!(cleaned, "Queued reply");
    }

    Ok(())
}
