use std::any::Any;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Json, Router,
};
use serde_json::json;
use tower_http::catch_panic::CatchPanicLayer;

use super::mailer::Mailer;
use super::profile::FormProfile;
use super::service::EnquiryNotifier;

/// Per-route state: the shared notifier plus the form this route serves.
pub(crate) struct EnquiryRoute<M> {
    pub(crate) service: Arc<EnquiryNotifier<M>>,
    pub(crate) profile: Arc<FormProfile>,
}

impl<M> Clone for EnquiryRoute<M> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            profile: Arc::clone(&self.profile),
        }
    }
}

/// Router builder mounting one submission endpoint per profile.
///
/// Routes accept every method so that non-POST requests get the JSON 405
/// body rather than axum's empty default.
pub fn enquiry_router<M>(service: Arc<EnquiryNotifier<M>>, profiles: &[FormProfile]) -> Router
where
    M: Mailer + 'static,
{
    profiles
        .iter()
        .fold(Router::new(), |router, profile| {
            let route = EnquiryRoute {
                service: Arc::clone(&service),
                profile: Arc::new(profile.clone()),
            };
            let mounted: Router = Router::new()
                .route(profile.path, any(submit_handler::<M>))
                .with_state(route);
            router.merge(mounted)
        })
        .layer(CatchPanicLayer::custom(panic_response))
}

pub(crate) async fn submit_handler<M>(
    State(route): State<EnquiryRoute<M>>,
    method: Method,
    headers: HeaderMap,
    body: Bytes,
) -> Response
where
    M: Mailer + 'static,
{
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    match route
        .service
        .process(&route.profile, &method, content_type, &body)
        .await
    {
        Ok(outcome) => {
            let payload = outcome.acknowledgement(route.profile.ack_key);
            (StatusCode::OK, Json(payload)).into_response()
        }
        Err(err) => err.into_response(),
    }
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(message) = panic.downcast_ref::<String>() {
        message.as_str()
    } else if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else {
        "unknown panic payload"
    };
    tracing::error!(%detail, "unexpected failure while handling enquiry");

    let payload = json!({ "error": "Unexpected server error" });
    (StatusCode::INTERNAL_SERVER_ERROR, Json(payload)).into_response()
}
