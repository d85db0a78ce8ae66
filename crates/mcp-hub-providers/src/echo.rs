// crates/mcp-hub-providers/src/echo.rs
// ============================================================================
// Module: Echo Provider
// Description: Diagnostic provider returning its input.
// Purpose: Exercise the hub end to end without any upstream service.
// Dependencies: mcp-hub-core
// ============================================================================

//! Diagnostic provider returning its input.

use std::sync::Arc;

use async_trait::async_trait;
use mcp_hub_core::FieldSpec;
use mcp_hub_core::Provider;
use mcp_hub_core::ToolDescriptor;
use mcp_hub_core::ToolError;
use mcp_hub_core::ToolHandler;
use mcp_hub_core::ToolOutput;
use mcp_hub_core::ToolSchema;
use serde_json::Value;

/// Provider name.
pub const NAME: &str = "echo";

/// Returns the `text` argument unchanged.
struct SayHandler;

#[async_trait]
impl ToolHandler for SayHandler {
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        let text = args
            .get("text")
            .and_then(Value::as_str)
            .ok_or_else(|| ToolError::InvalidArguments("text must be a string".to_string()))?;
        Ok(ToolOutput::text(text))
    }
}

/// Builds the echo provider.
#[must_use]
pub fn provider() -> Provider {
    let say = ToolDescriptor::new(
        "echo.say",
        "Echo: Say",
        "Returns the supplied text unchanged",
        ToolSchema::new().field(FieldSpec::string("text").required().describe("Text to echo")),
        Arc::new(SayHandler),
    );
    Provider::new(NAME, vec![say])
}
