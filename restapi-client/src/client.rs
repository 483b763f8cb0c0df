// restapi-client/src/client.rs
use crate::auth::AuthMode;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, HttpTransport};
use crate::observer::{RequestObserver, TracingObserver};
use crate::signing::SigV4Signer;
use chrono::Utc;
use http::header::{HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE, LOCATION};
use http::{HeaderMap, Method};
use std::sync::Arc;
use tracing::debug;
use url::{Origin, Url};

pub const DEFAULT_ID_ATTRIBUTE: &str = "id";
pub const DEFAULT_REDIRECT_LIMIT: u32 = 5;

/// Construction inputs for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_uri: String,
    /// Skip peer certificate verification
    pub insecure_tls: bool,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Pre-built `Authorization` value; takes precedence over basic auth
    pub auth_header: Option<String>,
    /// Per-request timeout, 0 disables it
    pub timeout_secs: u64,
    /// Field naming a resource's identifier, `/` separates nested keys
    pub id_attribute: String,
    /// Fields copied from the current object into update payloads
    pub copy_keys: Vec<String>,
    pub write_returns_object: bool,
    pub create_returns_object: bool,
    pub debug: bool,
    pub redirect_limit: u32,
}

impl Default for ApiClientConfig {
    fn default() -> Self {
        Self {
            base_uri: String::new(),
            insecure_tls: false,
            username: None,
            password: None,
            auth_header: None,
            timeout_secs: 0,
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
            copy_keys: Vec::new(),
            write_returns_object: false,
            create_returns_object: false,
            debug: false,
            redirect_limit: DEFAULT_REDIRECT_LIMIT,
        }
    }
}

impl ApiClientConfig {
    pub fn new(base_uri: impl Into<String>) -> Self {
        Self {
            base_uri: base_uri.into(),
            ..Default::default()
        }
    }
}

/// Header identifying the calling account, attached to every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountHeader {
    pub name: String,
    pub value: String,
}

impl AccountHeader {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Client for one REST endpoint.
///
/// Holds only read-only configuration; every call keeps its working state
/// (including the redirect budget) on its own stack.
pub struct ApiClient<T: HttpTransport> {
    transport: T,
    config: ApiClientConfig,
    account_header: Option<AccountHeader>,
    signer: Option<SigV4Signer>,
    observer: Option<Arc<dyn RequestObserver>>,
}

#[cfg(feature = "reqwest")]
impl ApiClient<crate::http::ReqwestTransport> {
    /// Build a client over a reqwest transport honouring `insecure_tls`
    /// and `timeout_secs`.
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let transport = crate::http::ReqwestTransport::new(config.insecure_tls, config.timeout_secs)
            .map_err(|e| ApiError::Transport(e.message))?;
        Ok(Self::with_transport(config, transport))
    }
}

impl<T: HttpTransport> ApiClient<T> {
    /// Normalize `config` and wrap `transport`. Never fails; a malformed
    /// base URI surfaces on the first request.
    pub fn with_transport(mut config: ApiClientConfig, transport: T) -> Self {
        if let Some(stripped) = config.base_uri.strip_suffix('/') {
            config.base_uri = stripped.to_string();
        }
        if config.id_attribute.is_empty() {
            config.id_attribute = DEFAULT_ID_ATTRIBUTE.to_string();
        }

        let observer: Option<Arc<dyn RequestObserver>> = if config.debug {
            Some(Arc::new(TracingObserver))
        } else {
            None
        };
        if let Some(observer) = &observer {
            observer.client_created(&config.base_uri);
        }

        Self {
            transport,
            config,
            account_header: None,
            signer: None,
            observer,
        }
    }

    pub fn with_signer(mut self, signer: SigV4Signer) -> Self {
        self.signer = Some(signer);
        self
    }

    pub fn with_account_header(mut self, header: AccountHeader) -> Self {
        self.account_header = Some(header);
        self
    }

    /// Replace the observer installed by `debug`.
    pub fn with_observer(mut self, observer: Arc<dyn RequestObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn config(&self) -> &ApiClientConfig {
        &self.config
    }

    pub fn base_uri(&self) -> &str {
        &self.config.base_uri
    }

    pub fn id_attribute(&self) -> &str {
        &self.config.id_attribute
    }

    pub fn copy_keys(&self) -> &[String] {
        &self.config.copy_keys
    }

    pub fn redirect_limit(&self) -> u32 {
        self.config.redirect_limit
    }

    pub fn signer(&self) -> Option<&SigV4Signer> {
        self.signer.as_ref()
    }

    pub fn account_header(&self) -> Option<&AccountHeader> {
        self.account_header.as_ref()
    }

    /// Send one authenticated request to `base_uri + path` and return the
    /// response body.
    ///
    /// An empty `body` sends no body; anything else is sent verbatim as
    /// `application/json`. 301/302 responses are followed up to the
    /// redirect limit; 404, anything below 200 and anything from 303 up is
    /// an error.
    pub async fn send_request(&self, method: &str, path: &str, body: &str) -> Result<String, ApiError> {
        let method = Method::from_bytes(method.as_bytes())
            .map_err(|e| ApiError::RequestConstruction(format!("invalid method '{}': {}", method, e)))?;
        let full_uri = format!("{}{}", self.config.base_uri, path);
        let url = Url::parse(&full_uri)
            .map_err(|e| ApiError::RequestConstruction(format!("invalid URI '{}': {}", full_uri, e)))?;
        let origin = url.origin();
        let body = if body.is_empty() { None } else { Some(body.to_string()) };

        let mut request = self.prepare(method, url, body, true)?;
        let mut remaining = self.config.redirect_limit;

        loop {
            if let Some(observer) = &self.observer {
                observer.before_send(&request);
            }

            let response = self.transport.send(&request).await.map_err(|e| match e.status {
                Some(status) => ApiError::BodyRead {
                    status,
                    message: e.message,
                },
                None => ApiError::Transport(e.message),
            })?;

            if let Some(observer) = &self.observer {
                observer.after_receive(&request, &response);
            }

            match response.status {
                301 | 302 => {
                    if remaining == 0 {
                        return Err(ApiError::TooManyRedirects {
                            limit: self.config.redirect_limit,
                        });
                    }
                    remaining -= 1;
                    request = self.redirect(request, &response, &origin, remaining)?;
                }
                status if status == 404 || status < 200 || status >= 303 => {
                    return Err(ApiError::UnexpectedStatus {
                        status,
                        body: response.body,
                    });
                }
                _ => return Ok(response.body),
            }
        }
    }

    /// Build the request that follows a 301/302. Without a `Location` the
    /// previous request is sent again.
    fn redirect(
        &self,
        previous: HttpRequest,
        response: &HttpResponse,
        origin: &Origin,
        remaining: u32,
    ) -> Result<HttpRequest, ApiError> {
        let Some(location) = response.header(LOCATION.as_str()) else {
            debug!(status = response.status, "redirect without Location, resending");
            return Ok(previous);
        };

        let target = previous.url.join(location).map_err(|e| {
            ApiError::RequestConstruction(format!("invalid redirect location '{}': {}", location, e))
        })?;

        if let Some(observer) = &self.observer {
            observer.redirected(&previous.url, &target, remaining);
        }

        let (method, body) = if previous.method == Method::GET || previous.method == Method::HEAD {
            (previous.method, previous.body)
        } else {
            (Method::GET, None)
        };

        // Credentials never leave the configured origin.
        let same_origin = target.origin() == *origin;
        self.prepare(method, target, body, same_origin)
    }

    /// Assemble headers, auth, account header and signature for one attempt.
    fn prepare(
        &self,
        method: Method,
        url: Url,
        body: Option<String>,
        with_credentials: bool,
    ) -> Result<HttpRequest, ApiError> {
        let mut headers = HeaderMap::new();
        if body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }

        let mut request = HttpRequest {
            method,
            url,
            headers,
            body,
        };

        if !with_credentials {
            return Ok(request);
        }

        let auth = AuthMode::select(
            self.config.auth_header.as_deref().unwrap_or_default(),
            self.config.username.as_deref().unwrap_or_default(),
            self.config.password.as_deref().unwrap_or_default(),
        );
        if let Some(value) = auth.header_value() {
            let value = HeaderValue::from_str(&value).map_err(|e| {
                ApiError::RequestConstruction(format!("invalid Authorization header: {}", e))
            })?;
            request.headers.insert(AUTHORIZATION, value);
        }

        if let Some(account) = &self.account_header {
            let name = HeaderName::from_bytes(account.name.as_bytes()).map_err(|e| {
                ApiError::RequestConstruction(format!("invalid header name '{}': {}", account.name, e))
            })?;
            let value = HeaderValue::from_str(&account.value).map_err(|e| {
                ApiError::RequestConstruction(format!("invalid value for header '{}': {}", account.name, e))
            })?;
            request.headers.insert(name, value);
        }

        if let Some(signer) = &self.signer {
            if request.headers.contains_key(AUTHORIZATION) {
                debug!("request signature replaces the configured Authorization header");
            }
            signer.sign(&mut request, Utc::now())?;
        }

        Ok(request)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::http::HttpError;
    use crate::signing::Credentials;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    /// Replays canned outcomes in order and records every request it sees.
    #[derive(Default)]
    pub(crate) struct ScriptedTransport {
        outcomes: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        pub(crate) fn new() -> Self {
            Self::default()
        }

        pub(crate) fn respond(self, status: u16, body: &str) -> Self {
            self.push(Ok(response(status, &[], body)))
        }

        pub(crate) fn redirect_to(self, status: u16, location: &str) -> Self {
            self.push(Ok(response(status, &[("location", location)], "")))
        }

        pub(crate) fn fail(self, error: HttpError) -> Self {
            self.push(Err(error))
        }

        fn push(self, outcome: Result<HttpResponse, HttpError>) -> Self {
            self.outcomes.lock().unwrap().push_back(outcome);
            self
        }

        pub(crate) fn requests(&self) -> Vec<HttpRequest> {
            self.seen.lock().unwrap().clone()
        }
    }

    pub(crate) fn response(status: u16, headers: &[(&'static str, &str)], body: &str) -> HttpResponse {
        let mut map = HeaderMap::new();
        for (name, value) in headers {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        HttpResponse {
            status,
            headers: map,
            body: body.to_string(),
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
            self.seen.lock().unwrap().push(request.clone());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HttpError::dispatch("script exhausted")))
        }
    }

    fn client(transport: Arc<ScriptedTransport>) -> ApiClient<Arc<ScriptedTransport>> {
        ApiClient::with_transport(ApiClientConfig::new("https://api.example.com"), transport)
    }

    fn client_with(
        config: ApiClientConfig,
        transport: Arc<ScriptedTransport>,
    ) -> ApiClient<Arc<ScriptedTransport>> {
        ApiClient::with_transport(config, transport)
    }

    #[test]
    fn test_trailing_slash_stripped_once() {
        let t = Arc::new(ScriptedTransport::new());
        assert_eq!(
            client_with(ApiClientConfig::new("https://x/"), t.clone()).base_uri(),
            "https://x"
        );
        assert_eq!(
            client_with(ApiClientConfig::new("https://x"), t.clone()).base_uri(),
            "https://x"
        );
        assert_eq!(
            client_with(ApiClientConfig::new("https://x//"), t).base_uri(),
            "https://x/"
        );
    }

    #[test]
    fn test_id_attribute_defaults() {
        let t = Arc::new(ScriptedTransport::new());
        let config = ApiClientConfig {
            id_attribute: String::new(),
            ..ApiClientConfig::new("https://x")
        };
        assert_eq!(client_with(config, t.clone()).id_attribute(), "id");

        let config = ApiClientConfig {
            id_attribute: "data/uuid".to_string(),
            ..ApiClientConfig::new("https://x")
        };
        assert_eq!(client_with(config, t).id_attribute(), "data/uuid");
    }

    #[tokio::test]
    async fn test_empty_body_has_no_content_type() {
        let t = Arc::new(ScriptedTransport::new().respond(200, "ok"));
        client(t.clone()).send_request("GET", "/things", "").await.unwrap();

        let req = &t.requests()[0];
        assert!(req.body.is_none());
        assert!(req.header("content-type").is_none());
        assert_eq!(req.url.as_str(), "https://api.example.com/things");
    }

    #[tokio::test]
    async fn test_body_sent_verbatim_as_json() {
        let payload = r#"{ "name" : "widget" }"#;
        let t = Arc::new(ScriptedTransport::new().respond(200, "ok"));
        client(t.clone()).send_request("POST", "/things", payload).await.unwrap();

        let req = &t.requests()[0];
        assert_eq!(req.method, Method::POST);
        assert_eq!(req.body.as_deref(), Some(payload));
        assert_eq!(req.header("content-type"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_auth_header_wins() {
        let t = Arc::new(ScriptedTransport::new().respond(200, "ok"));
        let config = ApiClientConfig {
            auth_header: Some("Bearer abc".to_string()),
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..ApiClientConfig::new("https://api.example.com")
        };
        client_with(config, t.clone()).send_request("GET", "/", "").await.unwrap();
        assert_eq!(t.requests()[0].header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_basic_auth_and_none() {
        let t = Arc::new(ScriptedTransport::new().respond(200, "ok").respond(200, "ok"));
        let config = ApiClientConfig {
            username: Some("user".to_string()),
            password: Some("pass".to_string()),
            ..ApiClientConfig::new("https://api.example.com")
        };
        client_with(config, t.clone()).send_request("GET", "/", "").await.unwrap();
        client(t.clone()).send_request("GET", "/", "").await.unwrap();

        let requests = t.requests();
        assert_eq!(requests[0].header("authorization"), Some("Basic dXNlcjpwYXNz"));
        assert!(requests[1].header("authorization").is_none());
    }

    #[tokio::test]
    async fn test_not_found_carries_status_and_body() {
        let t = Arc::new(ScriptedTransport::new().respond(404, "no such thing"));
        let err = client(t).send_request("GET", "/missing", "").await.unwrap_err();

        assert!(matches!(err, ApiError::UnexpectedStatus { status: 404, .. }));
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("no such thing"));
    }

    #[tokio::test]
    async fn test_status_policy() {
        for (status, ok) in [(100, false), (200, true), (204, true), (300, true), (303, false), (500, false)] {
            let t = Arc::new(ScriptedTransport::new().respond(status, "body"));
            let result = client(t).send_request("GET", "/", "").await;
            assert_eq!(result.is_ok(), ok, "status {}", status);
        }
    }

    #[tokio::test]
    async fn test_six_redirects_exhaust_budget() {
        let mut script = ScriptedTransport::new();
        for _ in 0..6 {
            script = script.respond(301, "");
        }
        let t = Arc::new(script.respond(200, "never"));
        let err = client(t.clone()).send_request("GET", "/", "").await.unwrap_err();

        assert!(matches!(err, ApiError::TooManyRedirects { limit: 5 }));
        assert_eq!(t.requests().len(), 6);
    }

    #[tokio::test]
    async fn test_two_redirects_then_success() {
        let t = Arc::new(
            ScriptedTransport::new()
                .respond(301, "")
                .respond(302, "")
                .respond(200, "final"),
        );
        let body = client(t.clone()).send_request("GET", "/", "").await.unwrap();
        assert_eq!(body, "final");
        assert_eq!(t.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_redirect_follows_location() {
        let t = Arc::new(
            ScriptedTransport::new()
                .redirect_to(302, "/moved/here")
                .respond(200, "moved"),
        );
        let config = ApiClientConfig {
            auth_header: Some("Bearer abc".to_string()),
            ..ApiClientConfig::new("https://api.example.com")
        };
        let body = client_with(config, t.clone())
            .send_request("POST", "/things", r#"{"a":1}"#)
            .await
            .unwrap();
        assert_eq!(body, "moved");

        let requests = t.requests();
        assert_eq!(requests[1].url.as_str(), "https://api.example.com/moved/here");
        assert_eq!(requests[1].method, Method::GET);
        assert!(requests[1].body.is_none());
        assert_eq!(requests[1].header("authorization"), Some("Bearer abc"));
    }

    #[tokio::test]
    async fn test_cross_origin_redirect_drops_credentials() {
        let t = Arc::new(
            ScriptedTransport::new()
                .redirect_to(301, "https://elsewhere.example.net/x")
                .respond(200, "there"),
        );
        let config = ApiClientConfig {
            auth_header: Some("Bearer abc".to_string()),
            ..ApiClientConfig::new("https://api.example.com")
        };
        client_with(config, t.clone()).send_request("GET", "/", "").await.unwrap();

        let requests = t.requests();
        assert_eq!(requests[1].url.host_str(), Some("elsewhere.example.net"));
        assert!(requests[1].header("authorization").is_none());
    }

    #[tokio::test]
    async fn test_transport_failure_is_not_retried() {
        let t = Arc::new(
            ScriptedTransport::new()
                .fail(HttpError::dispatch("connection refused"))
                .respond(200, "unreachable"),
        );
        let err = client(t.clone()).send_request("GET", "/", "").await.unwrap_err();

        assert!(matches!(err, ApiError::Transport(ref m) if m.contains("connection refused")));
        assert_eq!(t.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_body_read_failure() {
        let t = Arc::new(ScriptedTransport::new().fail(HttpError::body_read(200, "reset")));
        let err = client(t).send_request("GET", "/", "").await.unwrap_err();
        assert!(matches!(err, ApiError::BodyRead { status: 200, .. }));
    }

    #[tokio::test]
    async fn test_malformed_request_is_recoverable() {
        let t = Arc::new(ScriptedTransport::new());
        let c = client_with(ApiClientConfig::new("not a uri"), t.clone());
        let err = c.send_request("GET", "/x", "").await.unwrap_err();
        assert!(matches!(err, ApiError::RequestConstruction(_)));

        let err = client(t.clone()).send_request("BAD METHOD", "/x", "").await.unwrap_err();
        assert!(matches!(err, ApiError::RequestConstruction(_)));
        assert!(t.requests().is_empty());
    }

    #[tokio::test]
    async fn test_account_header_and_signature() {
        let t = Arc::new(ScriptedTransport::new().respond(200, "ok"));
        let c = client(t.clone())
            .with_account_header(AccountHeader::new("x-drench-account", "acct-42"))
            .with_signer(SigV4Signer::new(
                "execute-api",
                "us-east-1",
                Credentials::new("AKID", "secret"),
            ));
        c.send_request("GET", "/things", "").await.unwrap();

        let req = &t.requests()[0];
        assert_eq!(req.header("x-drench-account"), Some("acct-42"));
        assert!(req.header("x-amz-date").is_some());
        let auth = req.header("authorization").unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKID/"));
        assert!(auth.contains("/us-east-1/execute-api/aws4_request"));
        assert!(auth.contains("SignedHeaders=host;x-amz-date;x-drench-account,"));
    }

    #[tokio::test]
    async fn test_signing_failure_prevents_io() {
        let t = Arc::new(ScriptedTransport::new().respond(200, "ok"));
        let c = client(t.clone()).with_signer(SigV4Signer::new(
            "execute-api",
            "us-east-1",
            Credentials::new("", ""),
        ));
        let err = c.send_request("GET", "/", "").await.unwrap_err();

        assert!(matches!(err, ApiError::Signing(_)));
        assert!(t.requests().is_empty());
    }

    #[tokio::test]
    async fn test_identical_calls_identical_results() {
        let t = Arc::new(
            ScriptedTransport::new()
                .respond(200, "same")
                .respond(200, "same"),
        );
        let c = client(t);
        let first = c.send_request("GET", "/a", "").await.unwrap();
        let second = c.send_request("GET", "/a", "").await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_empty_account_value_is_sent_and_signed() {
        let t = Arc::new(ScriptedTransport::new().respond(200, "ok"));
        let c = client(t.clone())
            .with_account_header(AccountHeader::new("x-drench-account", ""))
            .with_signer(SigV4Signer::new(
                "execute-api",
                "us-east-1",
                Credentials::new("AKID", "secret"),
            ));
        c.send_request("GET", "/things", "").await.unwrap();

        let req = &t.requests()[0];
        assert_eq!(req.header("x-drench-account"), Some(""));
        assert!(req
            .header("authorization")
            .unwrap()
            .contains("SignedHeaders=host;x-amz-date;x-drench-account,"));
    }

    #[tokio::test]
    async fn test_uri_parsing_resolves_dot_segments() {
        let t = Arc::new(ScriptedTransport::new().respond(200, "").respond(200, ""));
        let c = client(t.clone());
        c.send_request("GET", "/a/../b", "").await.unwrap();
        c.send_request("GET", "", "").await.unwrap();

        let requests = t.requests();
        assert_eq!(requests[0].url.as_str(), "https://api.example.com/b");
        assert_eq!(requests[1].url.as_str(), "https://api.example.com/");
    }

    /// Answers every path with `redirects` bare 301s, then 200 with the path
    /// as body. Yields before answering so concurrent calls interleave.
    struct PerPathRedirects {
        redirects: u32,
        hits: Mutex<HashMap<String, u32>>,
    }

    #[async_trait]
    impl HttpTransport for PerPathRedirects {
        async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, HttpError> {
            tokio::task::yield_now().await;
            let path = request.url.path().to_string();
            let hit = {
                let mut hits = self.hits.lock().unwrap();
                let count = hits.entry(path.clone()).or_insert(0);
                *count += 1;
                *count
            };
            if hit <= self.redirects {
                Ok(response(301, &[], ""))
            } else {
                Ok(response(200, &[], &path))
            }
        }
    }

    #[tokio::test]
    async fn test_concurrent_calls_keep_separate_redirect_budgets() {
        let t = Arc::new(PerPathRedirects {
            redirects: 2,
            hits: Mutex::new(HashMap::new()),
        });
        let config = ApiClientConfig {
            redirect_limit: 2,
            ..ApiClientConfig::new("https://api.example.com")
        };
        let c = ApiClient::with_transport(config, t.clone());

        let (a, b) = tokio::join!(
            c.send_request("GET", "/a", ""),
            c.send_request("GET", "/b", "")
        );

        assert_eq!(a.unwrap(), "/a");
        assert_eq!(b.unwrap(), "/b");
        let hits = t.hits.lock().unwrap();
        assert_eq!(hits.get("/a"), Some(&3));
        assert_eq!(hits.get("/b"), Some(&3));
    }

    #[derive(Default)]
    struct CountingObserver {
        sent: Mutex<u32>,
        received: Mutex<Vec<u16>>,
    }

    impl RequestObserver for CountingObserver {
        fn before_send(&self, _request: &HttpRequest) {
            *self.sent.lock().unwrap() += 1;
        }

        fn after_receive(&self, _request: &HttpRequest, response: &HttpResponse) {
            self.received.lock().unwrap().push(response.status);
        }
    }

    #[tokio::test]
    async fn test_observer_sees_every_attempt() {
        let observer = Arc::new(CountingObserver::default());
        let t = Arc::new(ScriptedTransport::new().respond(301, "").respond(200, "ok"));
        let c = client(t).with_observer(observer.clone());
        c.send_request("GET", "/", "").await.unwrap();

        assert_eq!(*observer.sent.lock().unwrap(), 2);
        assert_eq!(*observer.received.lock().unwrap(), vec![301, 200]);
    }
}
