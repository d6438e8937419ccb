//! Request correlation and HTTP metrics.
//!
//! [`MetricsLayer`] gives every request a [`RequestId`] (the caller's
//! `X-Request-ID` when present, a UUID v7 otherwise), makes it visible to
//! handlers through the request headers, and returns it on the response.
//! When the response is ready it records `http_requests_total` and
//! `http_request_duration_seconds`, labelled by the matched route template.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Instant;

use axum::extract::MatchedPath;
use axum::http::{HeaderMap, HeaderValue, Method, Request, Response};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::{info_span, Span};
use uuid::Uuid;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Route label for requests that matched no route.
const UNMATCHED_ROUTE: &str = "unmatched";

/// Correlation ID shared by the logs, the problem `instance`, and the
/// response header of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestId(pub String);

impl RequestId {
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The trimmed `X-Request-ID`, or a fresh ID when the header is absent,
/// blank, or not UTF-8.
pub fn extract_or_generate_request_id(headers: &HeaderMap) -> RequestId {
    headers
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(RequestId::from)
        .unwrap_or_else(RequestId::generate)
}

fn status_bucket(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// What is known about a request when it arrives.
#[derive(Debug)]
struct RequestContext {
    started: Instant,
    method: Method,
    route: String,
    echo: Option<HeaderValue>,
    span: Span,
}

impl RequestContext {
    /// Resolve the request ID, write it back onto `req`, and open the span.
    fn begin<B>(req: &mut Request<B>) -> Self {
        let request_id = extract_or_generate_request_id(req.headers());
        let echo = HeaderValue::from_str(request_id.as_str()).ok();
        if let Some(value) = &echo {
            req.headers_mut().insert(REQUEST_ID_HEADER, value.clone());
        }

        let route = req
            .extensions()
            .get::<MatchedPath>()
            .map(|matched| matched.as_str().to_string())
            .unwrap_or_else(|| UNMATCHED_ROUTE.to_string());
        let method = req.method().clone();
        let span = info_span!(
            "request",
            request_id = %request_id,
            method = %method,
            route = %route,
        );

        Self {
            started: Instant::now(),
            method,
            route,
            echo,
            span,
        }
    }

    /// Record the outcome. `status` is `None` when the inner service failed.
    fn finish(self, status: Option<u16>) {
        let elapsed = self.started.elapsed().as_secs_f64();
        let status = status.unwrap_or(500);
        let method = self.method.to_string();

        metrics::counter!(
            "http_requests_total",
            "method" => method.clone(),
            "path" => self.route.clone(),
            "status" => status_bucket(status)
        )
        .increment(1);
        metrics::histogram!(
            "http_request_duration_seconds",
            "method" => method,
            "path" => self.route
        )
        .record(elapsed);

        let _entered = self.span.enter();
        if status >= 500 {
            tracing::error!(status, latency_ms = elapsed * 1000.0, "request failed");
        } else {
            tracing::info!(status, latency_ms = elapsed * 1000.0, "request completed");
        }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsLayer;

impl<S> Layer<S> for MetricsLayer {
    type Service = MetricsMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MetricsMiddleware { inner }
    }
}

#[derive(Debug, Clone)]
pub struct MetricsMiddleware<S> {
    inner: S,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for MetricsMiddleware<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    ReqBody: http_body::Body + Send + 'static,
    ResBody: http_body::Body + Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = MetricsFuture<S::Future>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        let context = RequestContext::begin(&mut req);
        let inner = {
            let _entered = context.span.enter();
            self.inner.call(req)
        };

        MetricsFuture {
            inner,
            context: Some(context),
        }
    }
}

pin_project! {
    /// Response future that stamps the request ID and records metrics once.
    pub struct MetricsFuture<F> {
        #[pin]
        inner: F,
        context: Option<RequestContext>,
    }
}

impl<F, ResBody, E> Future for MetricsFuture<F>
where
    F: Future<Output = Result<Response<ResBody>, E>>,
{
    type Output = F::Output;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let polled = match this.context.as_ref() {
            Some(context) => {
                let _entered = context.span.enter();
                this.inner.poll(cx)
            }
            None => this.inner.poll(cx),
        };

        let mut result = match polled {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(result) => result,
        };

        if let Some(mut context) = this.context.take() {
            let status = match &mut result {
                Ok(response) => {
                    if let Some(value) = context.echo.take() {
                        response.headers_mut().insert(REQUEST_ID_HEADER, value);
                    }
                    Some(response.status().as_u16())
                }
                Err(_) => None,
            };
            context.finish(status);
        }

        Poll::Ready(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_are_distinct_uuids() {
        let first = RequestId::generate();
        let second = RequestId::generate();

        assert_ne!(first, second);
        assert_eq!(first.as_str().len(), 36);
    }

    #[test]
    fn header_id_is_trimmed() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Request-ID", HeaderValue::from_static(" trip-42 "));

        assert_eq!(extract_or_generate_request_id(&headers).as_str(), "trip-42");
    }

    #[test]
    fn missing_or_blank_header_generates_id() {
        assert_eq!(
            extract_or_generate_request_id(&HeaderMap::new()).as_str().len(),
            36
        );

        let mut headers = HeaderMap::new();
        headers.insert(REQUEST_ID_HEADER, HeaderValue::from_static(""));
        assert_eq!(extract_or_generate_request_id(&headers).as_str().len(), 36);
    }

    #[test]
    fn begin_writes_id_back_onto_request() {
        let mut req = Request::builder()
            .uri("/api/v1/route")
            .header(REQUEST_ID_HEADER, "trip-9")
            .body(())
            .unwrap();
        let context = RequestContext::begin(&mut req);

        assert_eq!(req.headers()[REQUEST_ID_HEADER], "trip-9");
        assert_eq!(context.echo.as_ref().unwrap(), "trip-9");
        assert_eq!(context.route, UNMATCHED_ROUTE);
    }

    #[test]
    fn begin_generates_id_when_absent() {
        let mut req = Request::builder().uri("/health/live").body(()).unwrap();
        RequestContext::begin(&mut req);

        let id = req.headers()[REQUEST_ID_HEADER].to_str().unwrap();
        assert_eq!(id.len(), 36);
    }

    #[test]
    fn status_buckets() {
        assert_eq!(status_bucket(200), "2xx");
        assert_eq!(status_bucket(304), "3xx");
        assert_eq!(status_bucket(404), "4xx");
        assert_eq!(status_bucket(503), "5xx");
        assert_eq!(status_bucket(99), "other");
    }
}
