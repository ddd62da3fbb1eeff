//! Recording transport shared by the unit tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::transport::{ApiRequest, HttpTransport, RawResponse};

enum Scripted {
    Response(RawResponse),
    Failure(String),
}

/// Replays queued responses in order and records every request it receives.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<ApiRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_json(self, status: u16, body: Value) -> Self {
        let reason = reqwest::StatusCode::from_u16(status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or_default()
            .to_string();
        self.respond_raw(status, &reason, body.to_string().into_bytes())
    }

    pub fn respond_raw(self, status: u16, status_text: &str, body: Vec<u8>) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Response(RawResponse {
                status,
                status_text: status_text.to_string(),
                body,
            }));
        self
    }

    pub fn fail_with(self, message: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .push_back(Scripted::Failure(message.to_string()));
        self
    }

    pub fn calls(&self) -> Vec<ApiRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|c| format!("{} {}", c.method, c.url))
            .collect()
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: ApiRequest) -> Result<RawResponse> {
        self.calls.lock().unwrap().push(request.clone());
        match self.script.lock().unwrap().pop_front() {
            Some(Scripted::Response(response)) => Ok(response),
            Some(Scripted::Failure(message)) => Err(ClientError::Transport(message)),
            None => Err(ClientError::Transport(format!(
                "no scripted response for {} {}",
                request.method, request.url
            ))),
        }
    }
}

pub fn test_config() -> ClientConfig {
    ClientConfig::new("http://patient.test/api", "http://ai.test/api")
}

pub fn client_with(transport: MockTransport) -> (ApiClient, Arc<MockTransport>) {
    let transport = Arc::new(transport);
    let client = ApiClient::with_transport(test_config(), transport.clone());
    (client, transport)
}
