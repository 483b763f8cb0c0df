// restapi-client/src/observer.rs
use crate::http::{HttpRequest, HttpResponse};
use http::HeaderMap;
use tracing::debug;
use url::Url;

/// Hooks invoked at fixed points of a request. Observers see the traffic
/// but cannot change it.
pub trait RequestObserver: Send + Sync {
    fn client_created(&self, _base_uri: &str) {}

    /// Called before every dispatch, including redirected ones.
    fn before_send(&self, _request: &HttpRequest) {}

    fn after_receive(&self, _request: &HttpRequest, _response: &HttpResponse) {}

    fn redirected(&self, _from: &Url, _to: &Url, _remaining: u32) {}
}

/// Writes request and response details as `tracing` debug events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl RequestObserver for TracingObserver {
    fn client_created(&self, base_uri: &str) {
        debug!(base_uri, "constructing debug api client");
    }

    fn before_send(&self, request: &HttpRequest) {
        debug!(
            method = %request.method,
            path = request.url.path(),
            uri = %request.url,
            "sending HTTP request"
        );
        log_headers("request", &request.headers);
        debug!(body = request.body.as_deref().unwrap_or("<none>"), "request body");
    }

    fn after_receive(&self, _request: &HttpRequest, response: &HttpResponse) {
        debug!(status = response.status, "response received");
        log_headers("response", &response.headers);
        debug!(body = %response.body, "response body");
    }

    fn redirected(&self, from: &Url, to: &Url, remaining: u32) {
        debug!(from = %from, to = %to, remaining, "following redirect");
    }
}

fn log_headers(direction: &str, headers: &HeaderMap) {
    for (name, value) in headers {
        let value = if *name == http::header::AUTHORIZATION {
            "<redacted>".into()
        } else {
            String::from_utf8_lossy(value.as_bytes())
        };
        debug!(direction, header = %name, value = %value, "header");
    }
}
