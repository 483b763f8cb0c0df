// restapi-client/src/http/reqwest.rs
use super::{HttpError, HttpRequest, HttpResponse, HttpTransport};
use async_trait::async_trait;
use std::time::Duration;

/// [`HttpTransport`] backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the given TLS verification policy and timeout.
    ///
    /// A `timeout_secs` of zero disables the timeout. Automatic redirect
    /// following is always switched off.
    pub fn new(insecure_tls: bool, timeout_secs: u64) -> Result<Self, HttpError> {
        let mut builder = reqwest::Client::builder()
            .danger_accept_invalid_certs(insecure_tls)
            .redirect(reqwest::redirect::Policy::none());

        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }

        let inner = builder
            .build()
            .map_err(|e| HttpError::dispatch(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { inner })
    }

    /// Wrap an existing client. The caller is responsible for disabling
    /// its redirect policy.
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
        let mut req = self
            .inner
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());

        if let Some(body) = &request.body {
            req = req.body(body.clone());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| HttpError::dispatch(e.to_string()))?;

        let status = resp.status().as_u16();
        let headers = resp.headers().clone();

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| HttpError::body_read(status, e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builds_with_and_without_verification() {
        assert!(ReqwestTransport::new(true, 0).is_ok());
        assert!(ReqwestTransport::new(false, 30).is_ok());
    }
}
