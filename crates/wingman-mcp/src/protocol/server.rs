//! Wingman MCP Server Implementation
//!
//! Reads one JSON-RPC request per line, answers it, and flushes before
//! reading the next. All terminal access goes through the configured
//! [`TerminalBackend`].

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, instrument, warn};

use wingman_session::TerminalBackend;

use super::jsonrpc::{
    parse_request_str, serialize_response_string, Request, RequestId, Response, RpcError,
};
use super::types::{
    CallToolParams, CallToolResult, InitializeResult, ListResourcesResult, ListToolsResult,
    ReadResourceParams, ReadResourceResult, ResourceContents, ServerCapabilities, ServerInfo,
    PROTOCOL_VERSION, SERVER_NAME, TEXT_MIME_TYPE,
};
use crate::resources::{format_resource_info, resource_catalog, TerminalResource};
use crate::tools::{
    format_terminal_info, format_window_list, format_window_switched, tool_catalog, ToolCall,
};

/// Name and version reported in `initialize`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerIdentity {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

impl ServerIdentity {
    /// Identity with the standard server name.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            name: SERVER_NAME.to_string(),
            version: version.into(),
        }
    }
}

/// RPC methods this server understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Method {
    /// `initialize`
    Initialize,
    /// `tools/list`
    ToolsList,
    /// `tools/call`
    ToolsCall,
    /// `resources/list`
    ResourcesList,
    /// `resources/read`
    ResourcesRead,
    /// Anything else
    Unknown(String),
}

impl Method {
    /// Classify a method name.
    pub fn parse(name: &str) -> Self {
        match name {
            "initialize" => Method::Initialize,
            "tools/list" => Method::ToolsList,
            "tools/call" => Method::ToolsCall,
            "resources/list" => Method::ResourcesList,
            "resources/read" => Method::ResourcesRead,
            other => Method::Unknown(other.to_string()),
        }
    }
}

/// Wingman MCP Server
///
/// Owns the backend for its whole life; `set_window` mutates it in place.
pub struct WingmanServer {
    backend: Box<dyn TerminalBackend>,
    identity: ServerIdentity,
}

impl WingmanServer {
    /// Create a server over `backend`.
    pub fn new(backend: Box<dyn TerminalBackend>, identity: ServerIdentity) -> Self {
        Self { backend, identity }
    }

    /// The backend being observed.
    pub fn backend(&self) -> &dyn TerminalBackend {
        self.backend.as_ref()
    }

    /// Ensure the session exists, then serve until end of input.
    ///
    /// When the session cannot be set up, a best-effort error response with
    /// a null id is written before the error is returned.
    #[instrument(skip_all, fields(session = %self.backend.session_name()))]
    pub async fn start<R, W>(&mut self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        if let Err(e) = self.backend.ensure_session().await {
            error!("Failed to set up terminal session: {}", e);
            let response = Response::from_error(
                RequestId::Null,
                RpcError::Internal(format!("failed to setup terminal session: {e}")),
            );
            if let Err(write_err) = write_response(&mut writer, &response).await {
                warn!("Could not report startup failure: {}", write_err);
            }
            return Err(e).context("failed to setup terminal session");
        }

        info!(
            "Observing {} session '{}'",
            self.backend.kind(),
            self.backend.session_name()
        );
        self.serve(reader, writer).await
    }

    /// Answer requests line by line until end of input.
    ///
    /// Blank lines are skipped. A line that is not a JSON-RPC request ends
    /// the loop with an error and no response, since no id can be recovered.
    pub async fn serve<R, W>(&mut self, reader: R, mut writer: W) -> anyhow::Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        while let Some(line) = lines.next_line().await.context("failed to read request")? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            debug!("Received: {}", line);
            let request = parse_request_str(line).context("failed to decode request")?;
            let response = self.handle_request(request).await;
            write_response(&mut writer, &response).await?;
        }

        info!("EOF received, shutting down");
        Ok(())
    }

    /// Produce the response for one request.
    #[instrument(skip_all, fields(method = %request.method))]
    pub async fn handle_request(&mut self, request: Request) -> Response {
        let Request {
            id, method, params, ..
        } = request;

        let outcome = match Method::parse(&method) {
            Method::Initialize => to_value(self.initialize_result()),
            Method::ToolsList => to_value(ListToolsResult {
                tools: tool_catalog(self.backend.kind()),
            }),
            Method::ToolsCall => self.call_tool(params).await.and_then(to_value),
            Method::ResourcesList => to_value(ListResourcesResult {
                resources: resource_catalog(),
            }),
            Method::ResourcesRead => self.read_resource(params).await.and_then(to_value),
            Method::Unknown(name) => {
                warn!("Unknown method: {}", name);
                Err(RpcError::MethodNotFound(name))
            }
        };

        match outcome {
            Ok(result) => Response::success(id, result),
            Err(err) => Response::from_error(id, err),
        }
    }

    fn initialize_result(&self) -> InitializeResult {
        InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: self.identity.name.clone(),
                version: self.identity.version.clone(),
            },
        }
    }

    async fn call_tool(&mut self, params: Value) -> Result<CallToolResult, RpcError> {
        let params: CallToolParams = serde_json::from_value(params)
            .map_err(|e| RpcError::Internal(format!("failed to decode tool call params: {e}")))?;

        let call = match ToolCall::parse(&params) {
            Ok(call) => call,
            Err(e) if e.is_protocol_error() => {
                warn!("Rejected tool call: {}", e);
                return Err(RpcError::Internal(e.to_string()));
            }
            Err(e) => {
                debug!("Invalid arguments for {}: {}", params.name, e);
                return Ok(CallToolResult::error(e));
            }
        };

        Ok(self.run_tool(call).await)
    }

    async fn run_tool(&mut self, call: ToolCall) -> CallToolResult {
        let name = call.name();
        let kind = self.backend.kind();
        debug!("Calling tool: {}", name);

        let outcome = match call {
            ToolCall::ReadTerminal => self.backend.capture_pane().await,
            ToolCall::ReadScrollback { lines } => {
                self.backend.get_scrollback_history(lines).await
            }
            ToolCall::GetTerminalInfo => self
                .backend
                .get_pane_info()
                .await
                .map(|info| format_terminal_info(kind, &info, self.backend.get_window())),
            ToolCall::ListWindows => self
                .backend
                .list_windows()
                .await
                .map(|windows| format_window_list(kind, &windows)),
            ToolCall::SetWindow { window_id } => {
                self.backend.set_window(&window_id);
                info!("Switched to window/pane '{}'", window_id);
                Ok(format_window_switched(&window_id))
            }
        };

        match outcome {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                warn!("Tool {} failed: {}", name, e);
                CallToolResult::error(e)
            }
        }
    }

    async fn read_resource(&self, params: Value) -> Result<ReadResourceResult, RpcError> {
        let params: ReadResourceParams = serde_json::from_value(params).map_err(|e| {
            RpcError::Internal(format!("failed to decode resource read params: {e}"))
        })?;

        let resource = TerminalResource::from_uri(&params.uri)
            .ok_or_else(|| RpcError::Internal(format!("unknown resource: {}", params.uri)))?;

        let text = match resource {
            TerminalResource::Current => self.backend.capture_pane().await?,
            TerminalResource::Info => {
                let info = self.backend.get_pane_info().await?;
                format_resource_info(self.backend.kind(), &info, self.backend.get_window())
            }
        };

        Ok(ReadResourceResult {
            contents: vec![ResourceContents {
                uri: params.uri,
                mime_type: TEXT_MIME_TYPE.to_string(),
                text,
            }],
        })
    }
}

fn to_value<T: Serialize>(result: T) -> Result<Value, RpcError> {
    serde_json::to_value(result)
        .map_err(|e| RpcError::Internal(format!("failed to encode result: {e}")))
}

async fn write_response<W>(writer: &mut W, response: &Response) -> anyhow::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let mut line = serialize_response_string(response).context("failed to encode response")?;
    debug!("Sending: {}", line);
    line.push('\n');
    writer.write_all(line.as_bytes()).await?;
    writer.flush().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wingman_core::{BackendKind, PaneInfo};
    use wingman_session::testing::{FakeBackend, Operation};

    fn server(backend: FakeBackend) -> WingmanServer {
        WingmanServer::new(Box::new(backend), ServerIdentity::new("9.9.9"))
    }

    fn call(name: &str, arguments: Value) -> Request {
        Request::new(1, "tools/call", json!({"name": name, "arguments": arguments}))
    }

    fn text_of(response: &Response) -> (&str, bool) {
        let result = response.result().unwrap();
        (
            result["content"][0]["text"].as_str().unwrap(),
            result.get("isError").and_then(Value::as_bool).unwrap_or(false),
        )
    }

    #[test]
    fn test_method_parse() {
        assert_eq!(Method::parse("initialize"), Method::Initialize);
        assert_eq!(Method::parse("resources/read"), Method::ResourcesRead);
        assert_eq!(
            Method::parse("prompts/list"),
            Method::Unknown("prompts/list".to_string())
        );
    }

    #[tokio::test]
    async fn test_initialize_reports_identity() {
        let mut server = server(FakeBackend::new("s"));
        let response = server
            .handle_request(Request::new(1, "initialize", Value::Null))
            .await;
        let result = response.result().unwrap();
        assert_eq!(result["protocolVersion"], "2024-11-05");
        assert_eq!(result["serverInfo"]["name"], "mcp-ssh-wingman");
        assert_eq!(result["serverInfo"]["version"], "9.9.9");
    }

    #[tokio::test]
    async fn test_tool_failure_is_soft() {
        let mut server = server(FakeBackend::new("s").fail(Operation::Capture));
        let response = server.handle_request(call("read_terminal", json!({}))).await;
        let (text, is_error) = text_of(&response);
        assert!(is_error);
        assert!(text.starts_with("Error: failed to capture pane"));
    }

    #[tokio::test]
    async fn test_resource_failure_is_hard() {
        let mut server = server(FakeBackend::new("s").fail(Operation::Capture));
        let response = server
            .handle_request(Request::new(
                2,
                "resources/read",
                json!({"uri": "terminal://current"}),
            ))
            .await;
        let error = response.error_object().unwrap();
        assert_eq!(error.code, -32603);
        assert!(error.message.contains("failed to capture pane"));
    }

    #[tokio::test]
    async fn test_list_windows_marks_active() {
        let backend = FakeBackend::new("s")
            .with_kind(BackendKind::Screen)
            .with_windows(vec![
                wingman_core::WindowInfo::new("0", "bash").active(),
                wingman_core::WindowInfo::new("1", "logs"),
            ]);
        let mut server = server(backend);
        let response = server.handle_request(call("list_windows", json!({}))).await;
        assert_eq!(
            text_of(&response).0,
            "Available windows/panes in screen session:\n- ID: 0, Name: bash (active)\n- ID: 1, Name: logs\n"
        );
    }

    #[tokio::test]
    async fn test_scrollback_lines_reach_backend() {
        let fake = FakeBackend::new("s").with_scrollback("old output\n");
        let mut server = server(fake.clone());

        server.handle_request(call("read_scrollback", json!({}))).await;
        server
            .handle_request(call("read_scrollback", json!({"lines": 25.7})))
            .await;
        let response = server
            .handle_request(call("read_scrollback", json!({"lines": 0})))
            .await;

        assert!(text_of(&response).1);
        assert_eq!(fake.scrollback_requests(), vec![100, 25]);
    }

    #[tokio::test]
    async fn test_info_includes_scrollback_limit() {
        let info = PaneInfo {
            scrollback_limit: Some(5000),
            ..PaneInfo::placeholder("0")
        };
        let mut server = server(FakeBackend::new("s").with_pane_info(info));
        let response = server
            .handle_request(call("get_terminal_info", json!({})))
            .await;
        assert!(text_of(&response)
            .0
            .ends_with("- Window/Pane ID: \n- Scrollback Limit: 5000 lines"));
    }

    #[tokio::test]
    async fn test_start_reports_setup_failure() {
        let mut server = server(FakeBackend::new("s").fail(Operation::EnsureSession));
        let mut output = Vec::new();

        let result = server.start(&b""[..], &mut output).await;

        assert!(result.is_err());
        let line = String::from_utf8(output).unwrap();
        let value: Value = serde_json::from_str(line.trim()).unwrap();
        assert_eq!(value["id"], Value::Null);
        assert_eq!(value["error"]["code"], -32603);
        assert!(value["error"]["message"]
            .as_str()
            .unwrap()
            .starts_with("failed to setup terminal session"));
    }
}
