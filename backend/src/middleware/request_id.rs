//! Middleware attaching a request-scoped correlation identifier and logging
//! one event per request.
//!
//! The identifier is taken from the inbound `X-Request-Id` header when it is
//! usable, generated otherwise, stored in the request extensions, and echoed
//! on the response. Handlers receive it explicitly by declaring a
//! [`TraceId`] argument.

use std::task::{Context, Poll};
use std::time::Instant;

use actix_web::dev::{Payload, Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::http::header::{HeaderName, HeaderValue};
use actix_web::{Error, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::{LocalBoxFuture, Ready, ready};
use tracing::{Instrument, error, info, info_span};

use crate::domain::{TRACE_ID_HEADER, TraceId};

/// Middleware assigning every request a [`TraceId`] and adding an
/// `X-Request-Id` header to every response.
///
/// # Examples
/// ```
/// use actix_web::App;
/// use user_age_api::RequestId;
///
/// let app = App::new().wrap(RequestId);
/// ```
#[derive(Clone)]
pub struct RequestId;

impl<S, B> Transform<S, ServiceRequest> for RequestId
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = RequestIdMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestIdMiddleware { service }))
    }
}

/// Service wrapper produced by [`RequestId`].
///
/// Applications should not use this type directly.
pub struct RequestIdMiddleware<S> {
    service: S,
}

fn inbound_trace_id(req: &ServiceRequest) -> Option<TraceId> {
    req.headers()
        .get(TRACE_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(TraceId::from_header_value)
}

fn elapsed_millis(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

impl<S, B> Service<ServiceRequest> for RequestIdMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let started = Instant::now();
        let trace_id = inbound_trace_id(&req).unwrap_or_else(TraceId::generate);
        req.extensions_mut().insert(trace_id.clone());
        let method = req.method().to_string();
        let path = req.path().to_owned();
        let span = info_span!("request", request_id = %trace_id);

        let fut = self.service.call(req);
        Box::pin(
            async move {
                match fut.await {
                    Ok(mut res) => {
                        match HeaderValue::from_str(trace_id.as_str()) {
                            Ok(value) => {
                                res.response_mut()
                                    .headers_mut()
                                    .insert(HeaderName::from_static(TRACE_ID_HEADER), value);
                            }
                            Err(error) => {
                                error!(
                                    %error,
                                    request_id = %trace_id,
                                    "failed to encode request identifier header"
                                );
                            }
                        }
                        info!(
                            method = %method,
                            path = %path,
                            status = res.status().as_u16(),
                            duration_ms = elapsed_millis(started),
                            request_id = %trace_id,
                            "request"
                        );
                        Ok(res)
                    }
                    Err(err) => {
                        info!(
                            method = %method,
                            path = %path,
                            status = err.as_response_error().status_code().as_u16(),
                            duration_ms = elapsed_millis(started),
                            request_id = %trace_id,
                            "request"
                        );
                        Err(err)
                    }
                }
            }
            .instrument(span),
        )
    }
}

/// Handlers obtain the request's identifier by declaring a `TraceId`
/// argument. Outside the middleware a fresh identifier is generated.
impl FromRequest for TraceId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let trace_id = req
            .extensions()
            .get::<TraceId>()
            .cloned()
            .unwrap_or_else(TraceId::generate);
        ready(Ok(trace_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};
    use rstest::rstest;
    use uuid::Uuid;

    async fn echo_trace_id(trace_id: TraceId) -> HttpResponse {
        HttpResponse::Ok().body(trace_id.to_string())
    }

    /// Call an echo handler behind the middleware and return the response
    /// header value together with the identifier the handler saw.
    async fn call_with_header(header: Option<&str>) -> (String, String) {
        let app = test::init_service(
            App::new()
                .wrap(RequestId)
                .route("/", web::get().to(echo_trace_id)),
        )
        .await;
        let mut req = test::TestRequest::get().uri("/");
        if let Some(value) = header {
            req = req.insert_header((TRACE_ID_HEADER, value));
        }
        let res = test::call_service(&app, req.to_request()).await;
        let header_value = res
            .headers()
            .get(TRACE_ID_HEADER)
            .expect("request id header")
            .to_str()
            .expect("header is ascii")
            .to_owned();
        let body = test::read_body(res).await;
        let body = std::str::from_utf8(&body).expect("utf8 body").to_owned();
        (header_value, body)
    }

    #[actix_web::test]
    async fn generates_uuid_when_header_missing() {
        let (header_value, body) = call_with_header(None).await;
        Uuid::parse_str(&header_value).expect("generated id is a UUID");
        assert_eq!(header_value, body);
    }

    #[rstest]
    #[case("client-supplied-42")]
    #[case("00000000-0000-0000-0000-000000000000")]
    #[actix_web::test]
    async fn reuses_usable_inbound_header(#[case] inbound: &str) {
        let (header_value, body) = call_with_header(Some(inbound)).await;
        assert_eq!(header_value, inbound);
        assert_eq!(body, inbound);
    }

    #[actix_web::test]
    async fn replaces_unusable_inbound_header() {
        let oversized = "x".repeat(200);
        let (header_value, body) = call_with_header(Some(&oversized)).await;
        assert_ne!(header_value, oversized);
        Uuid::parse_str(&header_value).expect("generated id is a UUID");
        assert_eq!(header_value, body);
    }

    #[actix_web::test]
    async fn each_request_gets_a_distinct_identifier() {
        let (first, _) = call_with_header(None).await;
        let (second, _) = call_with_header(None).await;
        assert_ne!(first, second);
    }

    #[actix_web::test]
    async fn extractor_generates_identifier_without_middleware() {
        let app = test::init_service(App::new().route("/", web::get().to(echo_trace_id))).await;
        let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
        assert!(res.headers().get(TRACE_ID_HEADER).is_none());
        let body = test::read_body(res).await;
        let body = std::str::from_utf8(&body).expect("utf8 body");
        Uuid::parse_str(body).expect("generated id is a UUID");
    }
}
