//! MCP Server implementation for the Topz OData API
//!
//! Routes JSON-RPC methods and dispatches tool calls by name

use crate::mcp::protocol::*;
use crate::mcp::tools::{self, GET_SCHEMA, QUERY_ORDERS, QUERY_PAYMENT_TERMS};
use crate::odata::ODataClient;
use serde_json::Value;
use std::sync::Arc;

/// MCP Server for the Topz OData API
pub struct TopzMcpServer {
    client: Arc<ODataClient>,
}

impl TopzMcpServer {
    /// Create a new MCP server instance
    pub fn new(client: Arc<ODataClient>) -> Self {
        Self { client }
    }

    /// Get list of available tools
    pub fn get_tools(&self) -> Vec<Tool> {
        tools::get_tools()
    }

    /// Handle a tool call. Every outcome, including unknown tools and bad
    /// arguments, comes back as a result with the error flag set.
    pub async fn call_tool(&self, name: &str, args: Option<&Value>) -> CallToolResult {
        tracing::info!("Tool call: {}", name);

        let outcome = match name {
            GET_SCHEMA => match tools::validate_no_input(GET_SCHEMA, args) {
                Ok(()) => tools::execute_get_schema(&self.client).await,
                Err(e) => Err(e),
            },
            QUERY_ORDERS => match tools::validate_query_input(QUERY_ORDERS, args) {
                Ok(input) => tools::execute_query_orders(&self.client, input).await,
                Err(e) => Err(e),
            },
            QUERY_PAYMENT_TERMS => match tools::validate_query_input(QUERY_PAYMENT_TERMS, args) {
                Ok(input) => tools::execute_query_payment_terms(&self.client, input).await,
                Err(e) => Err(e),
            },
            _ => return CallToolResult::error(format!("Unknown tool: {}", name)),
        };

        match outcome {
            Ok(text) => CallToolResult::text(text),
            Err(e) => {
                tracing::warn!("Tool {} failed: {}", name, e);
                CallToolResult::error(e.to_string())
            }
        }
    }

    /// Handle one JSON-RPC message. Returns `None` for notifications.
    pub async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        if request.is_notification() {
            tracing::debug!("Notification: {}", request.method);
            return None;
        }

        let id = request.id.clone();

        let response = match request.method.as_str() {
            "initialize" => {
                let result = InitializeResult {
                    protocol_version: PROTOCOL_VERSION.to_string(),
                    capabilities: ServerCapabilities {
                        tools: Some(ToolsCapability {
                            list_changed: Some(false),
                        }),
                    },
                    server_info: ServerInfo {
                        name: env!("CARGO_PKG_NAME").to_string(),
                        version: env!("CARGO_PKG_VERSION").to_string(),
                    },
                };
                to_response(id, &result)
            }

            "tools/list" => {
                let result = ListToolsResult {
                    tools: self.get_tools(),
                };
                to_response(id, &result)
            }

            "tools/call" => {
                let params: CallToolParams = match request.params {
                    Some(p) => match serde_json::from_value(p) {
                        Ok(params) => params,
                        Err(e) => {
                            return Some(JsonRpcResponse::error(
                                id,
                                INVALID_PARAMS,
                                &format!("Invalid params: {}", e),
                            ));
                        }
                    },
                    None => {
                        return Some(JsonRpcResponse::error(id, INVALID_PARAMS, "Missing params"));
                    }
                };

                let result = self.call_tool(&params.name, params.arguments.as_ref()).await;
                to_response(id, &result)
            }

            "ping" => JsonRpcResponse::success(id, serde_json::json!({})),

            _ => JsonRpcResponse::error(
                id,
                METHOD_NOT_FOUND,
                &format!("Method not found: {}", request.method),
            ),
        };

        Some(response)
    }
}

fn to_response<T: serde::Serialize>(id: Option<Value>, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, INTERNAL_ERROR, &format!("Internal error: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn server_for(base_url: &str) -> TopzMcpServer {
        let client = ODataClient::new(&Config::new(base_url, "test-key")).unwrap();
        TopzMcpServer::new(Arc::new(client))
    }

    fn request(id: Option<Value>, method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: "2.0".to_string(),
            id,
            method: method.to_string(),
            params,
        }
    }

    fn result_text(result: &CallToolResult) -> &str {
        &result.content[0].text
    }

    #[test]
    fn test_unknown_tool_is_error_result() {
        let server = server_for("http://127.0.0.1:1");
        let result = tokio_test::block_on(server.call_tool("delete_orders", None));
        assert!(result.is_error());
        assert_eq!(result_text(&result), "Unknown tool: delete_orders");
    }

    #[test]
    fn test_notification_gets_no_response() {
        let server = server_for("http://127.0.0.1:1");
        let response = tokio_test::block_on(
            server.handle_request(request(None, "notifications/initialized", None)),
        );
        assert!(response.is_none());
    }

    #[test]
    fn test_initialize_and_list() {
        let server = server_for("http://127.0.0.1:1");

        let response = tokio_test::block_on(server.handle_request(request(
            Some(json!(1)),
            "initialize",
            Some(json!({})),
        )))
        .unwrap();
        let result = response.result.unwrap();
        assert_eq!(result["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(result["serverInfo"]["name"], "topz-odata-mcp");
        assert!(result["capabilities"]["tools"].is_object());

        let response =
            tokio_test::block_on(server.handle_request(request(Some(json!(2)), "tools/list", None)))
                .unwrap();
        assert_eq!(response.id, Some(json!(2)));
        assert_eq!(response.result.unwrap()["tools"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_unknown_method_and_missing_params() {
        let server = server_for("http://127.0.0.1:1");

        let response = tokio_test::block_on(
            server.handle_request(request(Some(json!(3)), "resources/list", None)),
        )
        .unwrap();
        assert_eq!(response.error.unwrap().code, METHOD_NOT_FOUND);

        let response =
            tokio_test::block_on(server.handle_request(request(Some(json!(4)), "tools/call", None)))
                .unwrap();
        assert_eq!(response.error.unwrap().code, INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_invalid_input_makes_no_request() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"objects": []})))
            .expect(0)
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server
            .call_tool(QUERY_ORDERS, Some(&json!({"top": "ten"})))
            .await;

        assert!(result.is_error());
        assert!(result_text(&result).starts_with("Invalid arguments for query_orders"));
    }

    #[tokio::test]
    async fn test_query_orders_tool_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1.0/odata/order"))
            .and(query_param("$filter", "total gt 300000"))
            .and(query_param("$top", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 7,
                "done": false,
                "objects": [
                    {"id": 10, "name": "A", "total": 400000},
                    {"id": 11, "name": "B", "total": 350000}
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server
            .call_tool(
                QUERY_ORDERS,
                Some(&json!({"filter": "total gt 300000", "top": 2})),
            )
            .await;

        assert!(!result.is_error());
        let payload: Value = serde_json::from_str(result_text(&result)).unwrap();
        assert_eq!(payload["count"], 2);
        assert_eq!(payload["totalSize"], 7);
        assert_eq!(payload["done"], false);
        assert_eq!(payload["data"][0]["name"], "A");
    }

    #[tokio::test]
    async fn test_query_payment_terms_failure_is_prefixed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1.0/odata/payment_term"))
            .respond_with(
                ResponseTemplate::new(500).set_body_json(json!({"message": "database unavailable"})),
            )
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let result = server.call_tool(QUERY_PAYMENT_TERMS, None).await;

        assert!(result.is_error());
        assert_eq!(
            result_text(&result),
            "Failed to query payment terms: API error (500): database unavailable"
        );
    }

    #[tokio::test]
    async fn test_get_schema_tool_pretty_prints() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/api/v1.0/schema"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"order": {"id": "number"}})))
            .mount(&mock_server)
            .await;

        let server = server_for(&mock_server.uri());
        let response = server
            .handle_request(request(
                Some(json!("abc")),
                "tools/call",
                Some(json!({"name": "get_schema", "arguments": {}})),
            ))
            .await
            .unwrap();

        let result = response.result.unwrap();
        assert!(result.get("isError").is_none());
        assert_eq!(
            result["content"][0]["text"],
            "{\n  \"order\": {\n    \"id\": \"number\"\n  }\n}"
        );
    }
}
