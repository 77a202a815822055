//! warm_quotes tool implementation.
//!
//! Caches verses for a few quotes that have none yet.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Input parameters for warm_quotes tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct WarmQuotesParams {
    /// Maximum number of uncached quotes to warm (default 3, max 20).
    #[serde(default)]
    pub max: Option<usize>,
}

/// Output structure for warm_quotes tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WarmQuotesOutput {
    /// Verses fetched from the remote source.
    pub fetched: usize,
    /// True when another warm pass was already running and nothing was done.
    pub skipped: bool,
}

/// Implementation of the warm_quotes tool.
pub async fn warm_impl(state: &AppState, params: WarmQuotesParams) -> Result<CallToolResult, McpError> {
    let max = params.max.unwrap_or(3).clamp(1, 20);

    let skipped = state.warmer.is_busy();
    let fetched = if skipped { 0 } else { state.warmer.warm_uncached(max).await };
    tracing::info!(max, fetched, skipped, "warm_quotes");

    Ok(json_result(&WarmQuotesOutput { fetched, skipped }))
}
