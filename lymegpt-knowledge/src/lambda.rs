//! AWS Lambda knowledge-base client

use async_trait::async_trait;
use aws_sdk_lambda::error::DisplayErrorContext;
use aws_sdk_lambda::primitives::Blob;
use aws_sdk_lambda::Client;
use tracing::{debug, warn};

use crate::base::{
    parse_invocation_payload, KnowledgeBase, KnowledgeBaseError, KnowledgeBaseRequest,
    KnowledgeBaseResponse, KnowledgeBaseResult,
};

/// Invokes the knowledge-base function synchronously with ambient AWS
/// credentials.
pub struct LambdaKnowledgeBase {
    client: Client,
    function_name: String,
}

impl LambdaKnowledgeBase {
    /// Build a client from the ambient AWS configuration, optionally pinning
    /// the region.
    pub async fn from_env(function_name: impl Into<String>, region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let sdk_config = loader.load().await;
        Self::new(Client::new(&sdk_config), function_name)
    }

    pub fn new(client: Client, function_name: impl Into<String>) -> Self {
        Self {
            client,
            function_name: function_name.into(),
        }
    }
}

/// Map an invoke result to an answer. `payload` is empty when the
/// function returned nothing.
fn read_invoke_output(
    function_error: Option<&str>,
    status: i32,
    payload: &[u8],
) -> KnowledgeBaseResult<KnowledgeBaseResponse> {
    if let Some(function_error) = function_error {
        let detail = String::from_utf8_lossy(payload);
        return Err(KnowledgeBaseError::Api(format!(
            "{}: {}",
            function_error, detail
        )));
    }

    if !(200..300).contains(&status) {
        return Err(KnowledgeBaseError::Api(format!(
            "invoke returned status {}",
            status
        )));
    }

    if payload.is_empty() {
        return Err(KnowledgeBaseError::InvalidResponse(
            "function returned no payload".to_string(),
        ));
    }
    parse_invocation_payload(payload)
}

#[async_trait]
impl KnowledgeBase for LambdaKnowledgeBase {
    async fn ask(
        &self,
        request: &KnowledgeBaseRequest,
    ) -> KnowledgeBaseResult<KnowledgeBaseResponse> {
        let body = serde_json::to_vec(request)?;
        debug!("Invoking {} ({} bytes)", self.function_name, body.len());

        let output = self
            .client
            .invoke()
            .function_name(&self.function_name)
            .payload(Blob::new(body))
            .send()
            .await
            .map_err(|e| KnowledgeBaseError::Invoke(DisplayErrorContext(&e).to_string()))?;

        let payload: &[u8] = output.payload().map(|p| p.as_ref()).unwrap_or_default();
        let result = read_invoke_output(output.function_error(), output.status_code(), payload);
        if let Err(e) = &result {
            warn!("{} failed: {}", self.function_name, e);
        }
        result
    }

    fn target(&self) -> String {
        format!("lambda:{}", self.function_name)
    }
}
