//! DaytonaServer - MCP server that exposes Daytona sandbox operations.
//!
//! This module implements ServerHandler manually to expose sandbox lifecycle
//! and toolbox operations as tools, the sandbox list and file contents as
//! resources, and a small set of static prompts.

use crate::config::{DaytonaMcpConfig, MAX_COMMAND_LENGTH, MAX_INPUT_SIZE_BYTES};
use crate::prompts::{self, PROMPTS};
use crate::resources::{ResourceUri, ResourceUriError, FILE_URI_TEMPLATE, SANDBOXES_URI};
use crate::types::*;

use base64::Engine as _;
use daytona_core::{CoreError, HttpClient, SandboxClient, ToolboxClient};
use rmcp::{
    handler::server::ServerHandler,
    model::*,
    service::{RequestContext, RoleServer},
    ErrorData,
};
use schemars::schema_for;
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// MCP server for Daytona sandbox operations.
///
/// The server holds no state besides the clients: every tool call is a
/// single request against the Daytona API.
#[derive(Clone)]
pub struct DaytonaServer {
    sandboxes: SandboxClient,
    toolbox: ToolboxClient,
    config: DaytonaMcpConfig,
}

impl DaytonaServer {
    /// Create a new DaytonaServer with the given configuration.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: DaytonaMcpConfig) -> Result<Self, CoreError> {
        let http = HttpClient::new(config.client.clone())?;

        tracing::info!(
            server_url = %config.client.server_url,
            target = ?config.client.target,
            "Daytona clients configured"
        );

        Ok(Self {
            sandboxes: SandboxClient::new(http.clone()),
            toolbox: ToolboxClient::new(http),
            config,
        })
    }

    /// Get a reference to the configuration.
    pub fn config(&self) -> &DaytonaMcpConfig {
        &self.config
    }

    /// Truncate sensitive content for logging.
    fn truncate_for_log(s: &str, max_len: usize) -> String {
        if s.len() <= max_len {
            s.to_string()
        } else {
            let mut end = max_len;
            while !s.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... ({} bytes total)", &s[..end], s.len())
        }
    }

    /// Validate input size.
    fn validate_size(content: &str, max_bytes: usize, field_name: &str) -> Result<(), String> {
        if content.len() > max_bytes {
            Err(format!(
                "{} exceeds maximum size ({} bytes > {} bytes)",
                field_name,
                content.len(),
                max_bytes
            ))
        } else {
            Ok(())
        }
    }

    /// Deserialize tool arguments, reporting a validation error on failure.
    fn parse_params<T: DeserializeOwned>(
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> Result<T, CallToolResult> {
        let value = serde_json::Value::Object(args.unwrap_or_default());
        serde_json::from_value(value).map_err(|e| {
            tracing::debug!(error = %e, "Invalid tool parameters");
            Self::error_result("validation", format!("Invalid parameters: {e}"))
        })
    }

    /// Helper to create success result with JSON content
    fn json_result<T: serde::Serialize>(data: &T) -> CallToolResult {
        match serde_json::to_string_pretty(data) {
            Ok(json) => CallToolResult::success(vec![Content::text(json)]),
            Err(e) => Self::error_result("decode", format!("JSON serialization error: {e}")),
        }
    }

    /// Helper to create a structured error result
    fn error_result(kind: &str, message: impl Into<String>) -> CallToolResult {
        let body = ToolError::new(kind, message);
        let text = serde_json::to_string(&body)
            .unwrap_or_else(|_| format!("{{\"error\":{{\"kind\":\"{kind}\"}}}}"));
        CallToolResult::error(vec![Content::text(text)])
    }

    /// Helper to surface a client error as a failed tool call
    fn core_error_result(action: &str, e: &CoreError) -> CallToolResult {
        Self::error_result(e.kind(), format!("{action}: {e}"))
    }

    /// Map a client error to a protocol error for resource reads.
    fn core_error_data(e: CoreError) -> ErrorData {
        let data = Some(serde_json::json!({ "kind": e.kind() }));
        match e {
            CoreError::NotFound(_) => ErrorData::resource_not_found(e.to_string(), data),
            CoreError::Validation(_) => ErrorData::invalid_params(e.to_string(), data),
            _ => ErrorData::internal_error(e.to_string(), data),
        }
    }

    /// Convert schemars RootSchema to rmcp JsonObject
    fn schema_to_json_object<T: schemars::JsonSchema>(
    ) -> Arc<serde_json::Map<String, serde_json::Value>> {
        let schema = schema_for!(T);
        let json = serde_json::to_value(&schema.schema).unwrap_or_else(|_| serde_json::json!({}));
        match json {
            serde_json::Value::Object(map) => Arc::new(map),
            _ => Arc::new(serde_json::Map::new()),
        }
    }

    /// Create an empty schema for tools with no parameters
    fn empty_schema() -> Arc<serde_json::Map<String, serde_json::Value>> {
        let mut map = serde_json::Map::new();
        map.insert("type".into(), serde_json::json!("object"));
        map.insert("properties".into(), serde_json::json!({}));
        Arc::new(map)
    }

    // ========================================================================
    // Tool Implementations
    // ========================================================================

    async fn handle_list_sandboxes(&self) -> CallToolResult {
        tracing::debug!("Listing sandboxes");

        match self.sandboxes.list().await {
            Ok(sandboxes) => Self::json_result(&ListSandboxesResult {
                sandboxes: sandboxes.into_iter().map(SandboxInfo::from).collect(),
            }),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to list sandboxes");
                Self::core_error_result("Failed to list sandboxes", &e)
            }
        }
    }

    async fn handle_create_sandbox(
        &self,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let params: CreateSandboxParams = match Self::parse_params(args) {
            Ok(p) => p,
            Err(result) => return result,
        };

        tracing::info!(repository_url = %params.repository_url, "Creating sandbox");

        match self.sandboxes.create(&params.repository_url).await {
            Ok(sandbox) => {
                tracing::info!(sandbox_id = %sandbox.id, state = %sandbox.state, "Created sandbox");
                Self::json_result(&SandboxInfo::from(sandbox))
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to create sandbox");
                Self::core_error_result("Failed to create sandbox", &e)
            }
        }
    }

    async fn handle_get_sandbox_info(
        &self,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let params: SandboxIdParams = match Self::parse_params(args) {
            Ok(p) => p,
            Err(result) => return result,
        };

        tracing::debug!(sandbox_id = %params.sandbox_id, "Getting sandbox info");

        match self.sandboxes.get_info(&params.sandbox_id).await {
            Ok(sandbox) => Self::json_result(&SandboxInfo::from(sandbox)),
            Err(e) => Self::core_error_result("Failed to get sandbox info", &e),
        }
    }

    async fn handle_remove_sandbox(
        &self,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let params: SandboxIdParams = match Self::parse_params(args) {
            Ok(p) => p,
            Err(result) => return result,
        };

        tracing::info!(sandbox_id = %params.sandbox_id, "Removing sandbox");

        match self.sandboxes.remove(&params.sandbox_id).await {
            Ok(()) => {
                tracing::info!(sandbox_id = %params.sandbox_id, "Removed sandbox");
                Self::json_result(&RemoveSandboxResult {
                    success: true,
                    sandbox_id: params.sandbox_id,
                })
            }
            Err(e) => {
                tracing::error!(sandbox_id = %params.sandbox_id, error = %e, "Failed to remove sandbox");
                Self::core_error_result("Failed to remove sandbox", &e)
            }
        }
    }

    async fn handle_execute_command(
        &self,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let params: ExecuteCommandParams = match Self::parse_params(args) {
            Ok(p) => p,
            Err(result) => return result,
        };

        // Validate command length
        if let Err(e) = Self::validate_size(&params.command, MAX_COMMAND_LENGTH, "command") {
            return Self::error_result("validation", e);
        }

        // Log with truncated content for security
        tracing::info!(
            "Executing command in sandbox {}: {}",
            params.sandbox_id,
            Self::truncate_for_log(&params.command, 100)
        );

        match self
            .toolbox
            .execute_command(&params.sandbox_id, &params.command)
            .await
        {
            Ok(result) => Self::json_result(&ExecResponse::from(result)),
            Err(e) => Self::core_error_result("Execution failed", &e),
        }
    }

    async fn handle_list_files(
        &self,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let params: SandboxPathParams = match Self::parse_params(args) {
            Ok(p) => p,
            Err(result) => return result,
        };

        tracing::debug!(sandbox_id = %params.sandbox_id, path = %params.path, "Listing files");

        match self
            .toolbox
            .list_files(&params.sandbox_id, &params.path)
            .await
        {
            Ok(entries) => Self::json_result(&ListFilesResult {
                entries: entries.into_iter().map(FileEntryResponse::from).collect(),
            }),
            Err(e) => Self::core_error_result("Failed to list files", &e),
        }
    }

    async fn handle_read_file(
        &self,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let params: SandboxPathParams = match Self::parse_params(args) {
            Ok(p) => p,
            Err(result) => return result,
        };

        tracing::debug!(sandbox_id = %params.sandbox_id, path = %params.path, "Reading file");

        match self
            .toolbox
            .read_file(&params.sandbox_id, &params.path)
            .await
        {
            Ok(bytes) => {
                let (content, encoding) = match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => (text, ContentEncoding::Utf8),
                    Err(_) => (
                        base64::engine::general_purpose::STANDARD.encode(&bytes),
                        ContentEncoding::Base64,
                    ),
                };
                Self::json_result(&ReadFileResult { content, encoding })
            }
            Err(e) => Self::core_error_result("Failed to read file", &e),
        }
    }

    async fn handle_write_file(
        &self,
        args: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> CallToolResult {
        let params: WriteFileParams = match Self::parse_params(args) {
            Ok(p) => p,
            Err(result) => return result,
        };

        // Validate content size
        if let Err(e) = Self::validate_size(&params.content, MAX_INPUT_SIZE_BYTES, "content") {
            return Self::error_result("validation", e);
        }

        tracing::info!(
            "Writing file in sandbox {}: {} ({} bytes)",
            params.sandbox_id,
            params.path,
            params.content.len()
        );

        let bytes_written = params.content.len();
        match self
            .toolbox
            .write_file(&params.sandbox_id, &params.path, params.content)
            .await
        {
            Ok(()) => Self::json_result(&WriteFileResult {
                success: true,
                bytes_written,
            }),
            Err(e) => Self::core_error_result("Failed to write file", &e),
        }
    }

    /// Build the list of available tools
    fn build_tools_list() -> Vec<Tool> {
        vec![
            Tool::new(
                "list_sandboxes",
                "List all Daytona sandboxes with their state.",
                Self::empty_schema(),
            ),
            Tool::new(
                "create_sandbox",
                "Create a new Daytona sandbox from a Git repository URL. Returns the sandbox summary.",
                Self::schema_to_json_object::<CreateSandboxParams>(),
            ),
            Tool::new(
                "get_sandbox_info",
                "Get detailed information about a specific sandbox.",
                Self::schema_to_json_object::<SandboxIdParams>(),
            ),
            Tool::new(
                "remove_sandbox",
                "Remove (delete) a Daytona sandbox.",
                Self::schema_to_json_object::<SandboxIdParams>(),
            ),
            Tool::new(
                "execute_command",
                "Execute a shell command inside a sandbox. Returns exit_code, stdout and stderr.",
                Self::schema_to_json_object::<ExecuteCommandParams>(),
            ),
            Tool::new(
                "list_files",
                "List the contents of a directory in the sandbox.",
                Self::schema_to_json_object::<SandboxPathParams>(),
            ),
            Tool::new(
                "read_file",
                "Read a file from the sandbox filesystem.",
                Self::schema_to_json_object::<SandboxPathParams>(),
            ),
            Tool::new(
                "write_file",
                "Write a file to the sandbox filesystem, replacing any existing content.",
                Self::schema_to_json_object::<WriteFileParams>(),
            ),
        ]
    }

    // ========================================================================
    // Resources
    // ========================================================================

    fn build_resources() -> Vec<Resource> {
        let mut sandboxes = RawResource::new(SANDBOXES_URI, "sandboxes");
        sandboxes.description = Some("All Daytona sandboxes, as JSON.".into());
        sandboxes.mime_type = Some("application/json".into());
        vec![sandboxes.no_annotation()]
    }

    fn build_resource_templates() -> Result<Vec<ResourceTemplate>, ErrorData> {
        let template = serde_json::json!({
            "uriTemplate": FILE_URI_TEMPLATE,
            "name": "sandbox_file",
            "description": "Content of a file inside a sandbox. Paths starting with '/' \
                            are absolute; others are relative to the sandbox working directory.",
        });
        let template: ResourceTemplate = serde_json::from_value(template)
            .map_err(|e| ErrorData::internal_error(format!("invalid resource template: {e}"), None))?;
        Ok(vec![template])
    }

    /// Build resource contents from a JSON descriptor.
    fn resource_contents(descriptor: serde_json::Value) -> Result<ResourceContents, ErrorData> {
        serde_json::from_value(descriptor)
            .map_err(|e| ErrorData::internal_error(format!("invalid resource contents: {e}"), None))
    }

    async fn read_resource_uri(&self, uri: &str) -> Result<ReadResourceResult, ErrorData> {
        let parsed = ResourceUri::parse(uri).map_err(|e| match e {
            ResourceUriError::UnsupportedScheme(_) => {
                ErrorData::resource_not_found(e.to_string(), None)
            }
            ResourceUriError::Malformed(_) => ErrorData::invalid_params(e.to_string(), None),
        })?;

        let contents = match parsed {
            ResourceUri::Sandboxes => {
                tracing::debug!("Reading sandbox list resource");
                let sandboxes = self
                    .sandboxes
                    .list()
                    .await
                    .map_err(Self::core_error_data)?;
                let body = ListSandboxesResult {
                    sandboxes: sandboxes.into_iter().map(SandboxInfo::from).collect(),
                };
                let text = serde_json::to_string_pretty(&body)
                    .map_err(|e| ErrorData::internal_error(e.to_string(), None))?;
                Self::resource_contents(serde_json::json!({
                    "uri": uri,
                    "mimeType": "application/json",
                    "text": text,
                }))?
            }
            ResourceUri::File { sandbox_id, path } => {
                tracing::debug!(sandbox_id = %sandbox_id, path = %path, "Reading file resource");
                let bytes = self
                    .toolbox
                    .read_file(&sandbox_id, &path)
                    .await
                    .map_err(Self::core_error_data)?;
                match String::from_utf8(bytes.to_vec()) {
                    Ok(text) => Self::resource_contents(serde_json::json!({
                        "uri": uri,
                        "mimeType": "text/plain",
                        "text": text,
                    }))?,
                    Err(_) => Self::resource_contents(serde_json::json!({
                        "uri": uri,
                        "mimeType": "application/octet-stream",
                        "blob": base64::engine::general_purpose::STANDARD.encode(&bytes),
                    }))?,
                }
            }
        };

        Ok(ReadResourceResult {
            contents: vec![contents],
        })
    }

    // ========================================================================
    // Prompts
    // ========================================================================

    fn build_prompts() -> Result<Vec<Prompt>, ErrorData> {
        PROMPTS
            .iter()
            .map(|p| {
                serde_json::from_value(p.descriptor()).map_err(|e| {
                    ErrorData::internal_error(format!("invalid prompt {}: {e}", p.name), None)
                })
            })
            .collect()
    }

    fn render_prompt(
        name: &str,
        arguments: Option<&serde_json::Map<String, serde_json::Value>>,
    ) -> Result<GetPromptResult, ErrorData> {
        let template = prompts::find(name).map_err(|e| ErrorData::invalid_params(e.to_string(), None))?;
        let text = template
            .render(arguments)
            .map_err(|e| ErrorData::invalid_params(e.to_string(), None))?;

        Ok(GetPromptResult {
            description: Some(template.description.to_string()),
            messages: vec![PromptMessage::new_text(PromptMessageRole::User, text)],
        })
    }
}

// ============================================================================
// ServerHandler Implementation
// ============================================================================

impl ServerHandler for DaytonaServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_resources()
                .enable_prompts()
                .build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "Daytona MCP Server - Manage remote Daytona sandboxes. \
                 Use list_sandboxes and get_sandbox_info to inspect sandboxes, create_sandbox \
                 to start one from a Git repository, then execute_command to run shell commands. \
                 Use list_files, read_file and write_file for file operations. \
                 Remove sandboxes with remove_sandbox when done."
                    .into(),
            ),
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, ErrorData> {
        Ok(ListToolsResult {
            tools: Self::build_tools_list(),
            next_cursor: None,
            meta: None,
        })
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        let result = match request.name.as_ref() {
            "list_sandboxes" => self.handle_list_sandboxes().await,
            "create_sandbox" => self.handle_create_sandbox(request.arguments).await,
            "get_sandbox_info" => self.handle_get_sandbox_info(request.arguments).await,
            "remove_sandbox" => self.handle_remove_sandbox(request.arguments).await,
            "execute_command" => self.handle_execute_command(request.arguments).await,
            "list_files" => self.handle_list_files(request.arguments).await,
            "read_file" => self.handle_read_file(request.arguments).await,
            "write_file" => self.handle_write_file(request.arguments).await,
            _ => Self::error_result("validation", format!("Unknown tool: {}", request.name)),
        };

        Ok(result)
    }

    async fn list_resources(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourcesResult, ErrorData> {
        Ok(ListResourcesResult::with_all_items(Self::build_resources()))
    }

    async fn list_resource_templates(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListResourceTemplatesResult, ErrorData> {
        Ok(ListResourceTemplatesResult::with_all_items(
            Self::build_resource_templates()?,
        ))
    }

    async fn read_resource(
        &self,
        request: ReadResourceRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<ReadResourceResult, ErrorData> {
        self.read_resource_uri(&request.uri).await
    }

    async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        Ok(ListPromptsResult::with_all_items(Self::build_prompts()?))
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        Self::render_prompt(&request.name, request.arguments.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(uri: &str) -> DaytonaServer {
        let config = DaytonaMcpConfig::from_lookup(|key| match key {
            "DAYTONA_API_KEY" => Some("dtn_test".to_string()),
            "DAYTONA_SERVER_URL" => Some(uri.to_string()),
            _ => None,
        })
        .unwrap();
        DaytonaServer::new(config).unwrap()
    }

    fn args(value: serde_json::Value) -> Option<serde_json::Map<String, serde_json::Value>> {
        match value {
            serde_json::Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Text of the first content item, parsed as JSON.
    fn body(result: &CallToolResult) -> serde_json::Value {
        let text = result.content[0]
            .as_text()
            .map(|t| t.text.clone())
            .expect("text content");
        serde_json::from_str(&text).expect("JSON body")
    }

    fn is_error(result: &CallToolResult) -> bool {
        result.is_error == Some(true)
    }

    #[test]
    fn test_build_tools_list() {
        let tools = DaytonaServer::build_tools_list();
        assert_eq!(tools.len(), 8);
        for name in [
            "list_sandboxes",
            "create_sandbox",
            "get_sandbox_info",
            "remove_sandbox",
            "execute_command",
            "list_files",
            "read_file",
            "write_file",
        ] {
            assert!(tools.iter().any(|t| t.name.as_ref() == name), "missing {name}");
        }
    }

    #[test]
    fn test_tool_schemas_mark_required_fields() {
        let schema = DaytonaServer::schema_to_json_object::<WriteFileParams>();
        let required: Vec<&str> = schema["required"]
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|v| v.as_str())
            .collect();
        assert!(required.contains(&"sandbox_id"));
        assert!(required.contains(&"path"));
        assert!(required.contains(&"content"));
    }

    #[test]
    fn test_truncate_for_log() {
        assert_eq!(DaytonaServer::truncate_for_log("short", 100), "short");
        let long = "é".repeat(80);
        let truncated = DaytonaServer::truncate_for_log(&long, 101);
        assert!(truncated.ends_with("(160 bytes total)"));
    }

    #[test]
    fn test_build_resources_and_templates() {
        let resources = DaytonaServer::build_resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].raw.uri, SANDBOXES_URI);

        let templates = DaytonaServer::build_resource_templates().unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].raw.uri_template, FILE_URI_TEMPLATE);
    }

    #[test]
    fn test_build_prompts() {
        let prompts = DaytonaServer::build_prompts().unwrap();
        assert_eq!(prompts.len(), PROMPTS.len());
        assert!(prompts.iter().any(|p| p.name == "run_task"));
    }

    #[test]
    fn test_render_prompt() {
        let arguments = args(serde_json::json!({ "repository_url": "https://example.com/r.git" }));
        let result = DaytonaServer::render_prompt("explore_repository", arguments.as_ref()).unwrap();
        assert_eq!(result.messages.len(), 1);

        let missing = DaytonaServer::render_prompt("explore_repository", None);
        assert!(missing.is_err());

        let unknown = DaytonaServer::render_prompt("nope", None);
        assert!(unknown.is_err());
    }

    #[tokio::test]
    async fn test_missing_parameters_fail_before_network() {
        let mock_server = MockServer::start().await;
        let server = server_for(&mock_server.uri());

        let result = server.handle_execute_command(args(serde_json::json!({ "sandbox_id": "sb-1" }))).await;
        assert!(is_error(&result));
        assert_eq!(body(&result)["error"]["kind"], "validation");

        let result = server.handle_get_sandbox_info(None).await;
        assert!(is_error(&result));

        let result = server
            .handle_create_sandbox(args(serde_json::json!({ "repository_url": "" })))
            .await;
        assert_eq!(body(&result)["error"]["kind"], "validation");

        assert!(mock_server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_sandboxes_tool() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sandbox"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "sb-1", "state": "started", "createdAt": "2025-01-02T03:04:05Z" }
            ])))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server.handle_list_sandboxes().await;
        assert!(!is_error(&result));

        let json = body(&result);
        assert_eq!(json["sandboxes"][0]["sandbox_id"], "sb-1");
        assert_eq!(json["sandboxes"][0]["state"], "running");
    }

    #[tokio::test]
    async fn test_execute_command_tool() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/toolbox/sb-1/toolbox/process/execute"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "exitCode": 7,
                "result": ""
            })))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server
            .handle_execute_command(args(serde_json::json!({
                "sandbox_id": "sb-1",
                "command": "exit 7"
            })))
            .await;

        // A non-zero exit code is a successful tool call
        assert!(!is_error(&result));
        assert_eq!(body(&result)["exit_code"], 7);
    }

    #[tokio::test]
    async fn test_unknown_sandbox_is_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/toolbox/ghost/toolbox/files"))
            .respond_with(ResponseTemplate::new(404).set_body_string("sandbox not found"))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server
            .handle_list_files(args(serde_json::json!({ "sandbox_id": "ghost", "path": "/" })))
            .await;

        assert!(is_error(&result));
        assert_eq!(body(&result)["error"]["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_read_file_tool_encodings() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/toolbox/sb-1/toolbox/files/download"))
            .and(query_param("path", "/tmp/a.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/toolbox/sb-1/toolbox/files/download"))
            .and(query_param("path", "/tmp/a.bin"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xff, 0xfe, 0x00]))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());

        let text = server
            .handle_read_file(args(serde_json::json!({ "sandbox_id": "sb-1", "path": "/tmp/a.txt" })))
            .await;
        assert_eq!(body(&text)["content"], "hello");
        assert_eq!(body(&text)["encoding"], "utf-8");

        let binary = server
            .handle_read_file(args(serde_json::json!({ "sandbox_id": "sb-1", "path": "/tmp/a.bin" })))
            .await;
        assert_eq!(body(&binary)["content"], "//4A");
        assert_eq!(body(&binary)["encoding"], "base64");
    }

    #[tokio::test]
    async fn test_write_file_tool() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/toolbox/sb-1/toolbox/files/upload"))
            .and(query_param("path", "/tmp/out.txt"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server
            .handle_write_file(args(serde_json::json!({
                "sandbox_id": "sb-1",
                "path": "/tmp/out.txt",
                "content": "data"
            })))
            .await;

        assert!(!is_error(&result));
        assert_eq!(body(&result)["bytes_written"], 4);
    }

    #[tokio::test]
    async fn test_remove_sandbox_surfaces_not_found() {
        let mock_server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/sandbox/sb-gone"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server
            .handle_remove_sandbox(args(serde_json::json!({ "sandbox_id": "sb-gone" })))
            .await;
        assert_eq!(body(&result)["error"]["kind"], "not_found");
    }

    #[tokio::test]
    async fn test_read_resource_file() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/toolbox/sb-1/toolbox/files/download"))
            .and(query_param("path", "/etc/hostname"))
            .respond_with(ResponseTemplate::new(200).set_body_string("sandbox-host\n"))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let uri = "daytona://sb-1/files//etc/hostname";
        let result = server.read_resource_uri(uri).await.unwrap();

        let contents = serde_json::to_value(&result.contents[0]).unwrap();
        assert_eq!(contents["uri"], uri);
        assert_eq!(contents["text"], "sandbox-host\n");
    }

    #[tokio::test]
    async fn test_read_resource_errors() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/toolbox/sb-1/toolbox/files/download"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());

        let missing = server
            .read_resource_uri("daytona://sb-1/files/missing.txt")
            .await
            .unwrap_err();
        assert_eq!(missing.code, ErrorCode::RESOURCE_NOT_FOUND);

        let malformed = server.read_resource_uri("daytona://sb-1").await.unwrap_err();
        assert_eq!(malformed.code, ErrorCode::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_read_resource_keeps_error_kind() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sandbox"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad key"))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let error = server.read_resource_uri(SANDBOXES_URI).await.unwrap_err();
        assert_eq!(error.code, ErrorCode::INTERNAL_ERROR);
        assert_eq!(error.data, Some(serde_json::json!({ "kind": "auth" })));
    }

    #[tokio::test]
    async fn test_read_sandboxes_resource() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sandbox"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                { "id": "sb-1", "state": "started" },
                { "id": "sb-2" }
            ])))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server.read_resource_uri(SANDBOXES_URI).await.unwrap();

        let contents = serde_json::to_value(&result.contents[0]).unwrap();
        assert_eq!(contents["uri"], SANDBOXES_URI);
        assert_eq!(contents["mimeType"], "application/json");

        let listed: serde_json::Value =
            serde_json::from_str(contents["text"].as_str().unwrap()).unwrap();
        assert_eq!(listed["sandboxes"][0]["sandbox_id"], "sb-1");
        assert_eq!(listed["sandboxes"][1]["state"], "unknown");
    }

    #[tokio::test]
    async fn test_read_binary_file_resource() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/toolbox/sb-1/toolbox/files/download"))
            .and(query_param("path", "logo.png"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0xff]))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let uri = "daytona://sb-1/files/logo.png";
        let result = server.read_resource_uri(uri).await.unwrap();

        let contents = serde_json::to_value(&result.contents[0]).unwrap();
        assert_eq!(contents["uri"], uri);
        assert_eq!(contents["mimeType"], "application/octet-stream");
        assert_eq!(contents["blob"], "iVD/");
        assert!(contents.get("text").is_none());
    }

    #[tokio::test]
    async fn test_create_sandbox_tool() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sandbox"))
            .and(body_json(serde_json::json!({ "repository": "https://example.com/r.git" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "sb-new",
                "state": "creating"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server
            .handle_create_sandbox(args(serde_json::json!({
                "repository_url": "https://example.com/r.git"
            })))
            .await;

        assert!(!is_error(&result));
        let json = body(&result);
        assert_eq!(json["sandbox_id"], "sb-new");
        assert_eq!(json["state"], "creating");
        assert_eq!(json["repository_url"], "https://example.com/r.git");
    }

    #[tokio::test]
    async fn test_get_sandbox_info_tool() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/sandbox/sb-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "sb-1",
                "state": "started",
                "target": "eu",
                "labels": { "team": "infra" }
            })))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server
            .handle_get_sandbox_info(args(serde_json::json!({ "sandbox_id": "sb-1" })))
            .await;

        assert!(!is_error(&result));
        let json = body(&result);
        assert_eq!(json["sandbox_id"], "sb-1");
        assert_eq!(json["state"], "running");
        assert_eq!(json["target"], "eu");
        assert_eq!(json["labels"]["team"], "infra");
    }
}
