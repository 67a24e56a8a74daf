use std::{any::Any, sync::Arc, time::Duration};

use app_config::common::ServerConfig;
use app_sanitizer::MessageProcessor;
use axum::{
    http::{header, HeaderValue, Request},
    response::{IntoResponse, Response},
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{debug, error, field, info, Span};

use self::app_response::WebhookResponse;

mod app_response;
mod routes;

type AppRouter = axum::Router<AppState>;

#[derive(Debug, Clone)]
pub struct AppState {
    pub processor: Arc<MessageProcessor>,
    /// Raw JSON list of parameters, parsed again for every update
    pub url_blacklist: Option<Arc<str>>,
}
impl AppState {
    pub fn new(processor: MessageProcessor, url_blacklist: Option<&str>) -> Self {
        Self {
            processor: Arc::new(processor),
            url_blacklist: url_blacklist.map(Arc::from),
        }
    }
}

pub fn app(state: AppState, webhook_path: &str) -> axum::Router {
    let router = routes::router(webhook_path);

    add_middlewares(router).with_state(state)
}

pub async fn run(state: AppState, config: &ServerConfig) -> anyhow::Result<()> {
    info!("Starting server...");

    let router = app(state, &config.webhook_path);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;

    info!(
        webhook_path = config.webhook_path,
        "Server listening on http://{}",
        listener.local_addr()?
    );

    axum::serve(listener, router).await?;

    Ok(())
}

#[derive(Clone)]
struct MakeRequestUlid;
impl MakeRequestId for MakeRequestUlid {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let mut id = ulid::Ulid::new().to_string();
        id.make_ascii_lowercase();
        let val = HeaderValue::from_str(&id).ok()?;

        Some(RequestId::new(val))
    }
}

fn panic_response(err: Box<dyn Any + Send + 'static>) -> Response {
    let details = err.downcast_ref::<String>().map_or_else(
        || {
            err.downcast_ref::<&str>()
                .map_or("Unknown panic message", |s| *s)
        },
        String::as_str,
    );

    error!(details, "Handler panicked");

    WebhookResponse::Failed.into_response()
}

fn add_middlewares<T>(router: axum::Router<T>) -> axum::Router<T>
where
    T: Clone + Send + Sync + 'static,
{
    router.layer(CatchPanicLayer::custom(panic_response)).layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUlid))
            .layer(
                TraceLayer::new_for_http()
                    .make_span_with(|request: &Request<_>| {
                        let m = request.method();
                        let p = request.uri().path();
                        let id = request
                            .extensions()
                            .get::<RequestId>()
                            .and_then(|id| id.header_value().to_str().ok())
                            .unwrap_or("-");
                        let dur = field::Empty;

                        tracing::info_span!("", %id, %m, ?p, dur)
                    })
                    .on_request(|request: &Request<_>, _span: &Span| {
                        let headers = request.headers();
                        info!(
                            target: "request",
                            "START \"{method} {uri} {http_type:?}\" {user_agent:?} {ip:?}",
                            http_type = request.version(),
                            method = request.method(),
                            uri = request.uri(),
                            user_agent = headers
                                .get(header::USER_AGENT)
                                .map_or("-", |x| x.to_str().unwrap_or("-")),
                            ip = headers
                                .get("x-forwarded-for")
                                .map_or("-", |x| x.to_str().unwrap_or("-")),
                        );
                    })
                    .on_response(|response: &Response<_>, latency, span: &Span| {
                        span.record("dur", field::debug(latency));
                        debug!(
                            target: "request",
                            "END {status}",
                            status = response.status().as_u16(),
                        );
                    })
                    .on_body_chunk(())
                    .on_failure(|error, latency, span: &Span| {
                        span.record("dur", field::debug(latency));
                        debug!(
                            target: "request",
                            err = ?error,
                            "ERR: something went wrong",
                        );
                    }),
            )
            .layer(TimeoutLayer::new(Duration::from_secs(60)))
            .layer(PropagateRequestIdLayer::x_request_id()),
    )
}
