use reqwest::Method;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::config::{ClientConfig, Service};
use crate::error::{ClientError, Result};
use crate::models::HealthStatus;
use crate::transport::{
    ApiRequest, HttpTransport, MultipartForm, RawResponse, ReqwestTransport, RequestBody,
};

/// Authenticated JSON/multipart client for the patient and AI services.
///
/// Cheap to clone; every view-state controller holds its own copy.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn HttpTransport>,
}

impl ApiClient {
    /// Client backed by `reqwest`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            config: Arc::new(config),
            transport,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Builds the request without sending it.
    ///
    /// The bearer token is always attached. Multipart bodies carry no
    /// content-type so the runtime can add the boundary; everything else is
    /// sent as JSON.
    pub fn prepare(
        &self,
        service: Service,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> ApiRequest {
        let mut headers = vec![(
            "Authorization".to_string(),
            format!("Bearer {}", self.config.bearer_token),
        )];
        if !matches!(body, RequestBody::Multipart(_)) {
            headers.push(("Content-Type".to_string(), "application/json".to_string()));
        }

        ApiRequest {
            service,
            method,
            url: self.config.url(service, path),
            headers,
            body,
        }
    }

    /// Sends a prepared request; any non-success status becomes a single
    /// [`ClientError::Api`] with a normalized message.
    pub async fn dispatch(&self, request: ApiRequest) -> Result<RawResponse> {
        let service = request.service;
        debug!(%service, method = %request.method, url = %request.url, "Sending request");

        let response = self.transport.send(request).await.inspect_err(|e| {
            error!(%service, "Fetch failure: {}", e);
        })?;

        if !response.is_success() {
            let message = normalize_error(response.status, &response.status_text, &response.body);
            error!(%service, status = response.status, "Fetch failure: {}", message);
            return Err(ClientError::Api {
                status: response.status,
                message,
            });
        }

        Ok(response)
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        service: Service,
        method: Method,
        path: &str,
        body: RequestBody,
    ) -> Result<T> {
        let request = self.prepare(service, method, path, body);
        let response = self.dispatch(request).await?;
        decode_json(&response.body)
    }

    pub async fn get<T: DeserializeOwned>(&self, service: Service, path: &str) -> Result<T> {
        self.request(service, Method::GET, path, RequestBody::Empty)
            .await
    }

    pub async fn post<B, T>(&self, service: Service, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(service, Method::POST, path, json_body(body)?)
            .await
    }

    pub async fn put<B, T>(&self, service: Service, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.request(service, Method::PUT, path, json_body(body)?)
            .await
    }

    /// PUT without a payload, used by action endpoints such as cancel.
    pub async fn put_empty<T: DeserializeOwned>(&self, service: Service, path: &str) -> Result<T> {
        self.request(service, Method::PUT, path, RequestBody::Empty)
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, service: Service, path: &str) -> Result<T> {
        self.request(service, Method::DELETE, path, RequestBody::Empty)
            .await
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        service: Service,
        path: &str,
        form: MultipartForm,
    ) -> Result<T> {
        self.request(service, Method::POST, path, RequestBody::Multipart(form))
            .await
    }

    /// Liveness probe. Never fails: an unreachable or unhealthy service is
    /// reported as `{ "status": "error" }`.
    pub async fn check_health(&self, service: Service) -> HealthStatus {
        match self.get::<HealthStatus>(service, "/health").await {
            Ok(status) => status,
            Err(e) => {
                warn!(%service, "Health check failed: {}", e);
                HealthStatus::degraded()
            }
        }
    }
}

fn json_body<B: Serialize + ?Sized>(body: &B) -> Result<RequestBody> {
    Ok(RequestBody::Json(serde_json::to_value(body)?))
}

pub(crate) fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(|e| ClientError::Decode(format!("Invalid JSON response: {}", e)))
}

/// Turns an error response into one human-readable message.
///
/// JSON bodies yield the first truthy `detail`, `message` or `error` field
/// (strings verbatim, anything else JSON-encoded), or the whole body encoded
/// when none is present. Non-JSON bodies yield their text, and an empty body
/// yields `API Error <status>: <statusText>`.
pub fn normalize_error(status: u16, status_text: &str, body: &[u8]) -> String {
    match serde_json::from_slice::<Value>(body) {
        Ok(payload) => {
            let picked = ["detail", "message", "error"]
                .iter()
                .filter_map(|key| payload.get(*key))
                .find(|value| is_truthy(value));
            match picked {
                Some(Value::String(text)) => text.clone(),
                Some(other) => other.to_string(),
                None => payload.to_string(),
            }
        }
        Err(_) => {
            let text = String::from_utf8_lossy(body);
            if text.is_empty() {
                format!("API Error {}: {}", status, status_text)
            } else {
                text.into_owned()
            }
        }
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
