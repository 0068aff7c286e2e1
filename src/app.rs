use std::any::Any;
use std::sync::Arc;

use axum::{extract::Request, middleware, response::Response, Router};
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};
use tracing::Span;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::config::Config;
use crate::cors::{cors_headers, preflight, MakeRequestUuid};
use crate::error::{echo_panic_response, kv_panic_response};
use crate::handlers;
use crate::routes;
use crate::state::AppState;

type PanicResponder = fn(Box<dyn Any + Send + 'static>) -> Response;

/// Router for the echo handler
pub fn echo_app(config: Arc<Config>) -> Router {
    with_edge_layers(handlers::echo::router(), echo_panic_response).with_state(config)
}

/// Router for the KV handler, including its OpenAPI docs
pub fn kv_app(state: AppState) -> Router {
    let router = handlers::kv_router()
        .merge(SwaggerUi::new(routes::DOCS).url(routes::OPENAPI_JSON, ApiDoc::openapi()));
    with_edge_layers(router, kv_panic_response).with_state(state)
}

/// Middleware shared by both handlers, outermost first
fn with_edge_layers<S>(router: Router<S>, on_panic: PanicResponder) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    let [allow_origin, allow_methods, allow_headers] = cors_headers();

    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetResponseHeaderLayer::overriding(allow_origin.0, allow_origin.1))
            .layer(SetResponseHeaderLayer::overriding(allow_methods.0, allow_methods.1))
            .layer(SetResponseHeaderLayer::overriding(allow_headers.0, allow_headers.1))
            .layer(middleware::from_fn(preflight))
            .layer(CatchPanicLayer::custom(on_panic)),
    )
}

fn request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}
