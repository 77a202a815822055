//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.

use std::sync::Arc;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};

use crate::state::AppState;
use crate::tools::{
    QuoteDetailParams, QuoteListParams, VerseGetParams, VerseSearchParams, WarmQuotesParams, quote_detail,
    quote_list, verse_get, verse_search, warm_quotes,
};

/// The main MCP server handler for redletter.
#[derive(Clone)]
pub struct RedletterServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl RedletterServer {
    pub fn new(state: AppState) -> Self {
        Self { state: Arc::new(state), tool_router: Self::tool_router() }
    }

    #[tool(
        description = "List curated red-letter quotes with their cached verse text. Filter by exact book name or by text; 20 per page."
    )]
    async fn quote_list(&self, params: Parameters<QuoteListParams>) -> Result<CallToolResult, McpError> {
        quote_list::list_impl(&self.state, params.0).await
    }

    #[tool(description = "Show one quote with its verse text, fetching and caching the verses if needed.")]
    async fn quote_detail(&self, params: Parameters<QuoteDetailParams>) -> Result<CallToolResult, McpError> {
        quote_detail::detail_impl(&self.state, params.0).await
    }

    #[tool(description = "Get the text of a single verse by identifier, e.g. MAT.5.3. Served from cache when available.")]
    async fn verse_get(&self, params: Parameters<VerseGetParams>) -> Result<CallToolResult, McpError> {
        verse_get::get_impl(&self.state, params.0).await
    }

    #[tool(
        description = "Search verse text through API.Bible. Results are cached for a day. Requires REDLETTER_API_BIBLE_KEY; returns no results without it."
    )]
    async fn verse_search(&self, params: Parameters<VerseSearchParams>) -> Result<CallToolResult, McpError> {
        verse_search::search_impl(&self.state, params.0).await
    }

    #[tool(description = "Cache verses for a few quotes that have none yet. Does nothing if a warm pass is running.")]
    async fn warm_quotes(&self, params: Parameters<WarmQuotesParams>) -> Result<CallToolResult, McpError> {
        warm_quotes::warm_impl(&self.state, params.0).await
    }
}

impl ServerHandler for RedletterServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "redletter".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeVerses, fixture};

    #[tokio::test]
    async fn test_all_tools_registered() {
        let fx = fixture(FakeVerses::default()).await;
        let server = RedletterServer::new(fx.state);

        let mut names: Vec<String> = server.tool_router.list_all().into_iter().map(|t| t.name.to_string()).collect();
        names.sort();
        assert_eq!(names, ["quote_detail", "quote_list", "verse_get", "verse_search", "warm_quotes"]);
    }

    #[tokio::test]
    async fn test_server_info() {
        let fx = fixture(FakeVerses::default()).await;
        let info = RedletterServer::new(fx.state).get_info();
        assert_eq!(info.server_info.name, "redletter");
        assert!(info.capabilities.tools.is_some());
    }
}
