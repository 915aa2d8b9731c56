//! MCP request and result shapes used by this server.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// MCP protocol revision this server speaks
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// Name reported in `serverInfo`
pub const SERVER_NAME: &str = "mcp-ssh-wingman";

/// MIME type of every resource this server exposes
pub const TEXT_MIME_TYPE: &str = "text/plain";

// =============================================================================
// Initialization
// =============================================================================

/// Result of `initialize`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    /// Protocol revision
    pub protocol_version: String,
    /// Advertised capabilities
    pub capabilities: ServerCapabilities,
    /// Server identity
    pub server_info: ServerInfo,
}

/// Capabilities advertised during `initialize`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerCapabilities {
    /// Tool support
    pub tools: ToolsCapability,
    /// Resource support
    pub resources: ResourcesCapability,
}

/// Tool capability flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    /// Whether the tool list can change at runtime
    pub list_changed: bool,
}

/// Resource capability flags
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesCapability {
    /// Whether clients may subscribe to resource updates
    pub subscribe: bool,
    /// Whether the resource list can change at runtime
    pub list_changed: bool,
}

/// Name and version reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerInfo {
    /// Server name
    pub name: String,
    /// Server version
    pub version: String,
}

// =============================================================================
// Tools
// =============================================================================

/// Result of `tools/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListToolsResult {
    /// Available tools
    pub tools: Vec<Tool>,
}

/// Tool descriptor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tool {
    /// Tool name used in `tools/call`
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// JSON schema of the arguments
    pub input_schema: InputSchema,
}

/// JSON schema of a tool's arguments (always an object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputSchema {
    /// Always `"object"`
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Argument schemas by name
    pub properties: BTreeMap<String, Property>,
    /// Names of required arguments
    pub required: Vec<String>,
}

impl InputSchema {
    /// Schema with no arguments.
    pub fn empty() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: BTreeMap::new(),
            required: Vec::new(),
        }
    }

    /// Add an optional argument.
    pub fn property(mut self, name: &str, property: Property) -> Self {
        self.properties.insert(name.to_string(), property);
        self
    }

    /// Add a required argument.
    pub fn required_property(mut self, name: &str, property: Property) -> Self {
        self.required.push(name.to_string());
        self.property(name, property)
    }
}

/// Schema of a single argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// JSON type name
    #[serde(rename = "type")]
    pub property_type: String,
    /// Human-readable description
    pub description: String,
}

impl Property {
    /// Argument of the given JSON type.
    pub fn new(property_type: &str, description: &str) -> Self {
        Self {
            property_type: property_type.to_string(),
            description: description.to_string(),
        }
    }
}

/// Parameters of `tools/call`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallToolParams {
    /// Tool to invoke
    pub name: String,
    /// Tool arguments
    #[serde(default)]
    pub arguments: Option<Map<String, Value>>,
}

/// Result of `tools/call`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallToolResult {
    /// Output blocks
    pub content: Vec<Content>,
    /// Whether the tool itself failed
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl CallToolResult {
    /// Successful single-text result.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![Content::text(text)],
            is_error: false,
        }
    }

    /// Failed result with the text `Error: <message>`.
    pub fn error(message: impl std::fmt::Display) -> Self {
        Self {
            content: vec![Content::text(format!("Error: {message}"))],
            is_error: true,
        }
    }
}

/// One output block of a tool result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Content {
    /// Plain text
    Text {
        /// The text
        text: String,
    },
}

impl Content {
    /// Text block.
    pub fn text(text: impl Into<String>) -> Self {
        Content::Text { text: text.into() }
    }

    /// Text of the block.
    pub fn as_text(&self) -> &str {
        match self {
            Content::Text { text } => text,
        }
    }
}

// =============================================================================
// Resources
// =============================================================================

/// Result of `resources/list`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResourcesResult {
    /// Available resources
    pub resources: Vec<Resource>,
}

/// Resource descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// `terminal://...` URI
    pub uri: String,
    /// Display name
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// Content type
    pub mime_type: String,
}

/// Parameters of `resources/read`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResourceParams {
    /// Resource to read
    pub uri: String,
}

/// Result of `resources/read`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadResourceResult {
    /// Resource contents
    pub contents: Vec<ResourceContents>,
}

/// Text contents of one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceContents {
    /// URI that was read
    pub uri: String,
    /// Content type
    pub mime_type: String,
    /// The text
    pub text: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_initialize_result_shape() {
        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities::default(),
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: "1.0.0".to_string(),
            },
        };
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({
                "protocolVersion": "2024-11-05",
                "capabilities": {
                    "tools": {"listChanged": false},
                    "resources": {"subscribe": false, "listChanged": false}
                },
                "serverInfo": {"name": "mcp-ssh-wingman", "version": "1.0.0"}
            })
        );
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = InputSchema::empty()
            .required_property("window_id", Property::new("string", "The window"));
        assert_eq!(
            serde_json::to_value(&schema).unwrap(),
            json!({
                "type": "object",
                "properties": {"window_id": {"type": "string", "description": "The window"}},
                "required": ["window_id"]
            })
        );

        let empty = serde_json::to_value(InputSchema::empty()).unwrap();
        assert_eq!(empty, json!({"type": "object", "properties": {}, "required": []}));
    }

    #[test]
    fn test_call_tool_result_error_flag() {
        let ok = serde_json::to_value(CallToolResult::text("hi")).unwrap();
        assert_eq!(ok, json!({"content": [{"type": "text", "text": "hi"}]}));

        let failed = serde_json::to_value(CallToolResult::error("boom")).unwrap();
        assert_eq!(
            failed,
            json!({"content": [{"type": "text", "text": "Error: boom"}], "isError": true})
        );
    }

    #[test]
    fn test_call_tool_params_arguments_optional() {
        let params: CallToolParams = serde_json::from_value(json!({"name": "read_terminal"})).unwrap();
        assert_eq!(params.arguments, None);

        let params: CallToolParams =
            serde_json::from_value(json!({"name": "read_scrollback", "arguments": {"lines": 5}}))
                .unwrap();
        assert_eq!(params.arguments.unwrap()["lines"], json!(5));

        assert!(serde_json::from_value::<CallToolParams>(json!("read_terminal")).is_err());
    }

    #[test]
    fn test_resource_contents_camel_case() {
        let contents = ResourceContents {
            uri: "terminal://current".to_string(),
            mime_type: TEXT_MIME_TYPE.to_string(),
            text: "$ ls".to_string(),
        };
        let value = serde_json::to_value(&contents).unwrap();
        assert_eq!(value["mimeType"], "text/plain");
    }
}
