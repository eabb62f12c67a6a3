//! HTTP knowledge-base client (Lambda function URL or API gateway)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

use crate::base::{
    parse_invocation_payload, KnowledgeBase, KnowledgeBaseError, KnowledgeBaseRequest,
    KnowledgeBaseResponse, KnowledgeBaseResult,
};

/// POSTs the request JSON to an endpoint fronting the knowledge-base function
pub struct HttpKnowledgeBase {
    client: Client,
    endpoint: String,
    extra_headers: HashMap<String, String>,
}

impl HttpKnowledgeBase {
    pub fn new(
        endpoint: impl Into<String>,
        extra_headers: Option<HashMap<String, String>>,
    ) -> Self {
        Self {
            client: Client::builder()
                .http1_only()
                .build()
                .unwrap_or_else(|_| Client::new()),
            endpoint: endpoint.into().trim().to_string(),
            extra_headers: extra_headers.unwrap_or_default(),
        }
    }

    fn apply_headers(&self, mut req_builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        for (key, value) in &self.extra_headers {
            req_builder = req_builder.header(key, value);
        }
        req_builder
    }
}

/// Function URLs unwrap the `{statusCode, body}` envelope; pass-through
/// gateways do not. Accept both.
fn parse_http_payload(bytes: &[u8]) -> KnowledgeBaseResult<KnowledgeBaseResponse> {
    let value: Value = serde_json::from_slice(bytes)?;
    if value.get("body").is_some() {
        return parse_invocation_payload(bytes);
    }
    serde_json::from_value(value)
        .map_err(|e| KnowledgeBaseError::InvalidResponse(format!("malformed body: {}", e)))
}

#[async_trait]
impl KnowledgeBase for HttpKnowledgeBase {
    async fn ask(
        &self,
        request: &KnowledgeBaseRequest,
    ) -> KnowledgeBaseResult<KnowledgeBaseResponse> {
        debug!("POST {}", self.endpoint);
        let response = self
            .apply_headers(self.client.post(&self.endpoint))
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let bytes = response.bytes().await?;
        if !status.is_success() {
            let detail = String::from_utf8_lossy(&bytes);
            warn!("Knowledge base endpoint returned {}: {}", status, detail);
            return Err(KnowledgeBaseError::Api(format!(
                "status {}: {}",
                status.as_u16(),
                detail
            )));
        }

        parse_http_payload(&bytes)
    }

    fn target(&self) -> String {
        self.endpoint.clone()
    }
}
