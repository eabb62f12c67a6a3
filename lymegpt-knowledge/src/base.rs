//! Base trait and wire types for knowledge-base clients

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Error type for knowledge-base calls
#[derive(Error, Debug)]
pub enum KnowledgeBaseError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Knowledge base returned an error: {0}")]
    Api(String),

    #[error("Function invocation failed: {0}")]
    Invoke(String),

    #[error("Knowledge base did not answer within {0} seconds")]
    Timeout(u64),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type KnowledgeBaseResult<T> = Result<T, KnowledgeBaseError>;

/// Payload sent to the knowledge-base function
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseRequest {
    pub question: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

impl KnowledgeBaseRequest {
    pub fn new(question: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            session_id: session_id.into(),
        }
    }
}

/// The `body` of a knowledge-base answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseResponse {
    pub answer: String,
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub citations: Vec<Citation>,
}

/// One citation group supporting part of the answer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Citation {
    #[serde(rename = "retrievedReferences")]
    pub retrieved_references: Vec<RetrievedReference>,
}

/// A source excerpt and where it was stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedReference {
    pub content: ReferenceContent,
    pub location: ReferenceLocation,
}

impl RetrievedReference {
    pub fn new(text: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            content: ReferenceContent { text: text.into() },
            location: ReferenceLocation {
                s3_location: S3Location { uri: uri.into() },
            },
        }
    }

    pub fn text(&self) -> &str {
        &self.content.text
    }

    pub fn uri(&self) -> &str {
        &self.location.s3_location.uri
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceContent {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceLocation {
    #[serde(rename = "s3Location")]
    pub s3_location: S3Location,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct S3Location {
    pub uri: String,
}

/// Parse the JSON returned by the knowledge-base function.
///
/// The answer lives under `body`, either as an object or as a JSON-encoded
/// string. A `statusCode` outside 2xx is a failure.
pub fn parse_invocation_payload(payload: &[u8]) -> KnowledgeBaseResult<KnowledgeBaseResponse> {
    let envelope: Value = serde_json::from_slice(payload)?;
    let Value::Object(mut envelope) = envelope else {
        return Err(KnowledgeBaseError::InvalidResponse(
            "payload is not a JSON object".to_string(),
        ));
    };

    if let Some(status) = envelope.get("statusCode") {
        let code = status.as_u64().ok_or_else(|| {
            KnowledgeBaseError::InvalidResponse(format!("statusCode is not a number: {}", status))
        })?;
        if !(200..300).contains(&code) {
            let detail = envelope
                .get("body")
                .map(|b| match b {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .unwrap_or_default();
            return Err(KnowledgeBaseError::Api(format!(
                "status {}: {}",
                code, detail
            )));
        }
    }

    let body = envelope
        .remove("body")
        .ok_or_else(|| KnowledgeBaseError::InvalidResponse("missing field `body`".to_string()))?;
    let body = match body {
        Value::String(raw) => serde_json::from_str(&raw)?,
        other => other,
    };

    serde_json::from_value(body)
        .map_err(|e| KnowledgeBaseError::InvalidResponse(format!("malformed body: {}", e)))
}

/// A callable that answers a question synchronously and may fail
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Ask one question
    async fn ask(
        &self,
        request: &KnowledgeBaseRequest,
    ) -> KnowledgeBaseResult<KnowledgeBaseResponse>;

    /// Human-readable description of the target (function name or URL)
    fn target(&self) -> String;
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANSWER: &str = r#"{
        "statusCode": 200,
        "body": {
            "answer": "Doxycycline is first-line...",
            "sessionId": "abc123",
            "citations": [
                {"retrievedReferences": [
                    {"content": {"text": "Doxycycline 100mg twice daily for 14-21 days..."},
                     "location": {
                         "type": "S3",
                         "s3Location": {"uri": "s3://bucket/guidelines.pdf"}
                     }}
                ]}
            ]
        }
    }"#;

    #[test]
    fn test_request_uses_camel_case_session_id() {
        let json = serde_json::to_value(KnowledgeBaseRequest::new("q", "")).unwrap();
        assert_eq!(json, serde_json::json!({"question": "q", "sessionId": ""}));
    }

    #[test]
    fn test_parse_object_body() {
        let response = parse_invocation_payload(ANSWER.as_bytes()).unwrap();
        assert_eq!(response.answer, "Doxycycline is first-line...");
        assert_eq!(response.session_id, "abc123");
        assert_eq!(response.citations.len(), 1);
        let reference = &response.citations[0].retrieved_references[0];
        assert_eq!(reference.uri(), "s3://bucket/guidelines.pdf");
        assert!(reference.text().starts_with("Doxycycline 100mg"));
    }

    #[test]
    fn test_parse_string_encoded_body() {
        let body = serde_json::json!({"answer": "a", "sessionId": "s", "citations": []});
        let payload = serde_json::json!({"body": body.to_string()});
        let response = parse_invocation_payload(payload.to_string().as_bytes()).unwrap();
        assert_eq!(response.session_id, "s");
        assert!(response.citations.is_empty());
    }

    #[test]
    fn test_non_success_status_is_api_error() {
        let payload = r#"{"statusCode": 500, "body": "knowledge base unavailable"}"#;
        let err = parse_invocation_payload(payload.as_bytes()).unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::Api(ref m) if m.contains("500")));
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        for payload in [
            r#"{"statusCode": 200}"#,
            r#"{"body": {"answer": "a", "citations": []}}"#,
            r#"{"body": {"answer": "a", "sessionId": "s"}}"#,
            concat!(
                r#"{"body": {"answer": "a", "sessionId": "s", "#,
                r#""citations": [{"retrievedReferences": [{"content": {}}]}]}}"#
            ),
        ] {
            let err = parse_invocation_payload(payload.as_bytes()).unwrap_err();
            assert!(matches!(err, KnowledgeBaseError::InvalidResponse(_)), "{}", payload);
        }
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        let err = parse_invocation_payload(b"not json").unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::Json(_)));

        let err = parse_invocation_payload(b"[1, 2]").unwrap_err();
        assert!(matches!(err, KnowledgeBaseError::InvalidResponse(_)));
    }
}
