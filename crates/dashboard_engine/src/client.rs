use std::sync::Arc;
use std::time::Duration;

use dashboard_core::Service;
use dashboard_logging::{dash_debug, dash_warn};
use reqwest::cookie::{CookieStore, Jar};
use reqwest::Method;
use serde_json::Value;

use crate::{ApiError, Endpoint, Endpoints, FailureKind};

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Normalized response: the HTTP status and the parsed JSON body (`null` when empty).
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

/// Request seam towards the backend services. Test doubles implement this.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn get(
        &self,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse, ApiError>;

    async fn post(&self, endpoint: &Endpoint, body: &Value) -> Result<ApiResponse, ApiError>;

    async fn patch(&self, endpoint: &Endpoint, body: &Value) -> Result<ApiResponse, ApiError>;

    async fn delete(&self, endpoint: &Endpoint, body: &Value) -> Result<ApiResponse, ApiError>;
}

/// reqwest-backed client. A cookie jar keeps the session cookie from
/// `POST /login` and sends it with every later request.
#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    client: reqwest::Client,
    endpoints: Endpoints,
    jar: Arc<Jar>,
}

impl ReqwestApiClient {
    pub fn new(endpoints: Endpoints, settings: &ClientSettings) -> Result<Self, ApiError> {
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .cookie_provider(jar.clone())
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            client,
            endpoints,
            jar,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Cookie header the auth service would receive, e.g. `session=abc`.
    pub fn session_cookie(&self) -> Option<String> {
        let base = self.endpoints.base(Service::Auth)?;
        let header = self.jar.cookies(base)?;
        header.to_str().ok().map(str::to_string)
    }

    /// Re-installs a cookie header saved by [`Self::session_cookie`] for every service.
    pub fn restore_session_cookie(&self, header: &str) {
        for (_, base) in self.endpoints.iter() {
            for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
                self.jar.add_cookie_str(&format!("{pair}; Path=/"), base);
            }
        }
    }

    async fn send(
        &self,
        method: Method,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<ApiResponse, ApiError> {
        let url = self.endpoints.resolve(endpoint)?;
        dash_debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url.clone());
        if !params.is_empty() {
            request = request.query(params);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        if !status.is_success() {
            dash_warn!("{} {} failed with {}", method, url, status);
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        let data = if bytes.iter().all(u8::is_ascii_whitespace) {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .map_err(|err| ApiError::decode(format!("{url}: {err}")))?
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            data,
        })
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn get(
        &self,
        endpoint: &Endpoint,
        params: &[(&str, &str)],
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::GET, endpoint, params, None).await
    }

    async fn post(&self, endpoint: &Endpoint, body: &Value) -> Result<ApiResponse, ApiError> {
        self.send(Method::POST, endpoint, &[], Some(body)).await
    }

    async fn patch(&self, endpoint: &Endpoint, body: &Value) -> Result<ApiResponse, ApiError> {
        self.send(Method::PATCH, endpoint, &[], Some(body)).await
    }

    async fn delete(&self, endpoint: &Endpoint, body: &Value) -> Result<ApiResponse, ApiError> {
        self.send(Method::DELETE, endpoint, &[], Some(body)).await
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
