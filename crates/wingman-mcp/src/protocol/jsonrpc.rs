//! JSON-RPC 2.0 envelope.
//!
//! Self-contained: one request per line in, one response per line out.
//! No batching and no server-initiated messages.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// JSON-RPC 2.0 version constant
pub const JSONRPC_VERSION: &str = "2.0";

/// A JSON-RPC 2.0 request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Protocol version; not validated
    #[serde(default = "default_version")]
    pub jsonrpc: String,
    /// Request ID, `Null` when absent
    #[serde(default, skip_serializing_if = "RequestId::is_null")]
    pub id: RequestId,
    /// Method name, empty when absent or null
    #[serde(default, deserialize_with = "null_as_empty")]
    pub method: String,
    /// Method parameters, opaque until the handler decodes them
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub params: Value,
}

fn default_version() -> String {
    JSONRPC_VERSION.to_string()
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Request {
    /// Create a request.
    pub fn new(id: impl Into<RequestId>, method: impl Into<String>, params: Value) -> Self {
        Self {
            jsonrpc: default_version(),
            id: id.into(),
            method: method.into(),
            params,
        }
    }
}

/// JSON-RPC request ID
///
/// Numbers are kept as [`serde_json::Number`] so `7` and `7.0` are echoed
/// exactly as received.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestId {
    /// Numeric ID
    Number(serde_json::Number),
    /// String ID
    String(String),
    /// Absent or null ID
    #[default]
    Null,
}

impl RequestId {
    /// Whether the ID is absent or null.
    pub fn is_null(&self) -> bool {
        matches!(self, RequestId::Null)
    }
}

impl From<i64> for RequestId {
    fn from(n: i64) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<i32> for RequestId {
    fn from(n: i32) -> Self {
        RequestId::Number(n.into())
    }
}

impl From<String> for RequestId {
    fn from(s: String) -> Self {
        RequestId::String(s)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        RequestId::String(s.to_string())
    }
}

/// A JSON-RPC 2.0 response carrying exactly one of `result` or `error`.
///
/// Only [`Response::success`] and [`Response::error`] build one, and
/// deserialization rejects messages with both or neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawResponse")]
pub struct Response {
    jsonrpc: String,
    id: RequestId,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<ErrorObject>,
}

impl Response {
    /// Create a successful response
    pub fn success(id: RequestId, result: Value) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response
    pub fn error(id: RequestId, error: ErrorObject) -> Self {
        Response {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }

    /// Create an error response from RpcError
    pub fn from_error(id: RequestId, err: RpcError) -> Self {
        Response::error(id, err.into())
    }

    /// ID this response answers.
    pub fn id(&self) -> &RequestId {
        &self.id
    }

    /// Result, for successful responses.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// Error, for failed responses.
    pub fn error_object(&self) -> Option<&ErrorObject> {
        self.error.as_ref()
    }
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default = "default_version")]
    jsonrpc: String,
    #[serde(default)]
    id: RequestId,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ErrorObject>,
}

impl TryFrom<RawResponse> for Response {
    type Error = String;

    fn try_from(raw: RawResponse) -> Result<Self, Self::Error> {
        match (raw.result, raw.error) {
            (Some(_), Some(_)) => Err("response carries both result and error".to_string()),
            (None, None) => Err("response carries neither result nor error".to_string()),
            (result, error) => Ok(Response {
                jsonrpc: raw.jsonrpc,
                id: raw.id,
                result,
                error,
            }),
        }
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    /// Error code
    pub code: i32,
    /// Error message
    pub message: String,
    /// Additional error data (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl From<RpcError> for ErrorObject {
    fn from(err: RpcError) -> Self {
        ErrorObject {
            code: err.code(),
            message: err.message(),
            data: None,
        }
    }
}

/// RPC-level failures this server reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RpcError {
    /// The method does not exist
    MethodNotFound(String),
    /// Anything else that stops a method from producing a result
    Internal(String),
}

impl RpcError {
    /// JSON-RPC method not found
    pub const METHOD_NOT_FOUND: i32 = -32601;
    /// JSON-RPC internal error
    pub const INTERNAL_ERROR: i32 = -32603;

    /// Get the error code
    pub fn code(&self) -> i32 {
        match self {
            RpcError::MethodNotFound(_) => Self::METHOD_NOT_FOUND,
            RpcError::Internal(_) => Self::INTERNAL_ERROR,
        }
    }

    /// Get the error message
    pub fn message(&self) -> String {
        match self {
            RpcError::MethodNotFound(method) => format!("Method not found: {}", method),
            RpcError::Internal(msg) => msg.clone(),
        }
    }
}

impl std::fmt::Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for RpcError {}

impl From<wingman_core::Error> for RpcError {
    fn from(err: wingman_core::Error) -> Self {
        RpcError::Internal(err.to_string())
    }
}

/// Parse one request line.
pub fn parse_request_str(text: &str) -> serde_json::Result<Request> {
    serde_json::from_str(text)
}

/// Serialize a response to a single JSON line (without the newline).
pub fn serialize_response_string(response: &Response) -> serde_json::Result<String> {
    serde_json::to_string(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_request() {
        let req = parse_request_str(r#"{"jsonrpc":"2.0","method":"test","id":1}"#).unwrap();
        assert_eq!(req.method, "test");
        assert_eq!(req.id, RequestId::from(1));
        assert_eq!(req.params, Value::Null);
    }

    #[test]
    fn test_parse_request_with_params() {
        let json = r#"{"jsonrpc":"2.0","method":"test","params":{"key":"value"},"id":"abc"}"#;
        let req = parse_request_str(json).unwrap();
        assert_eq!(req.id, RequestId::String("abc".to_string()));
        assert_eq!(req.params, json!({"key": "value"}));
    }

    #[test]
    fn test_parse_request_without_id() {
        let req = parse_request_str(r#"{"jsonrpc":"2.0","method":"notification"}"#).unwrap();
        assert!(req.id.is_null());

        let line = serde_json::to_string(&req).unwrap();
        assert!(!line.contains("\"id\""));
        assert!(!line.contains("\"params\""));
    }

    #[test]
    fn test_parse_request_missing_method() {
        let req = parse_request_str(r#"{"jsonrpc":"2.0","id":1}"#).unwrap();
        assert_eq!(req.method, "");
        assert_eq!(req.id, RequestId::from(1));

        let req = parse_request_str(r#"{"jsonrpc":"2.0","id":2,"method":null}"#).unwrap();
        assert_eq!(req.method, "");
    }

    #[test]
    fn test_parse_request_rejects_malformed() {
        assert!(parse_request_str("not json").is_err());
        assert!(parse_request_str(r#"{"jsonrpc":"2.0","id":1,"method":7}"#).is_err());
    }

    #[test]
    fn test_float_id_preserved() {
        let req = parse_request_str(r#"{"jsonrpc":"2.0","method":"m","id":2.5}"#).unwrap();
        let resp = Response::success(req.id, json!({}));
        let line = serialize_response_string(&resp).unwrap();
        assert!(line.contains("\"id\":2.5"));
    }

    #[test]
    fn test_response_success() {
        let resp = Response::success(RequestId::from(1), json!({"status": "ok"}));
        let json = serialize_response_string(&resp).unwrap();
        assert!(json.contains("\"result\""));
        assert!(!json.contains("\"error\""));
        assert_eq!(resp.result(), Some(&json!({"status": "ok"})));
        assert!(resp.error_object().is_none());
    }

    #[test]
    fn test_response_error() {
        let resp = Response::from_error(
            RequestId::from(1),
            RpcError::MethodNotFound("unknown".to_string()),
        );
        let json = serialize_response_string(&resp).unwrap();
        assert!(json.contains("\"error\""));
        assert!(!json.contains("\"result\""));
        assert!(json.contains("-32601"));
        assert!(json.contains("Method not found: unknown"));
    }

    #[test]
    fn test_null_id_serialized() {
        let resp = Response::from_error(RequestId::Null, RpcError::Internal("boom".into()));
        assert_eq!(
            serialize_response_string(&resp).unwrap(),
            r#"{"jsonrpc":"2.0","id":null,"error":{"code":-32603,"message":"boom"}}"#
        );
    }

    #[test]
    fn test_response_exclusivity_enforced() {
        let both = r#"{"jsonrpc":"2.0","id":3,"result":"x","error":{"code":-32603,"message":"e"}}"#;
        assert!(serde_json::from_str::<Response>(both).is_err());

        let neither = r#"{"jsonrpc":"2.0","id":3}"#;
        assert!(serde_json::from_str::<Response>(neither).is_err());

        let ok = r#"{"jsonrpc":"2.0","id":3,"error":{"code":-32601,"message":"Method not found: x"}}"#;
        let resp: Response = serde_json::from_str(ok).unwrap();
        assert_eq!(resp.error_object().unwrap().code, -32601);
    }

    #[test]
    fn test_rpc_error_codes() {
        assert_eq!(RpcError::MethodNotFound("m".into()).code(), -32601);
        assert_eq!(RpcError::Internal("unknown tool: x".into()).code(), -32603);
        assert_eq!(
            RpcError::Internal("unknown tool: x".into()).to_string(),
            "unknown tool: x"
        );
    }

    #[test]
    fn test_backend_error_into_rpc_error() {
        let err: RpcError = wingman_core::Error::CaptureFailed("exit status 1".into()).into();
        assert_eq!(err.code(), -32603);
        assert!(err.message().contains("failed to capture pane"));
    }
}
