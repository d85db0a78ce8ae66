// crates/mcp-hub-core/src/tool.rs
// ============================================================================
// Module: Tool Descriptors
// Description: Named, schema-validated units of provider functionality.
// Purpose: Define the handler seam and the result shape returned to callers.
// Dependencies: async-trait, serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ToolDescriptor`] binds a fully-qualified `<provider>.<verb>` name to a
//! declarative input schema and an async handler. Handlers only ever see
//! arguments that already passed schema validation, with defaults applied.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::ToolError;
use crate::schema::ToolSchema;

// ============================================================================
// SECTION: Tool Output
// ============================================================================

/// One content item of a tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    /// Plain text content.
    Text {
        /// Text payload.
        text: String,
    },
    /// Structured JSON content.
    Json {
        /// JSON payload.
        json: Value,
    },
}

/// Successful tool result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolOutput {
    /// Ordered content items.
    pub content: Vec<ToolContent>,
}

impl ToolOutput {
    /// Builds a single-item text result.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: text.into(),
            }],
        }
    }

    /// Builds a text result holding pretty-printed JSON.
    #[must_use]
    pub fn pretty_json(value: &Value) -> Self {
        let text = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
        Self::text(text)
    }

    /// Builds a single-item structured result.
    #[must_use]
    pub fn json(json: Value) -> Self {
        Self {
            content: vec![ToolContent::Json {
                json,
            }],
        }
    }

    /// Returns the first text item, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|item| match item {
            ToolContent::Text {
                text,
            } => Some(text.as_str()),
            ToolContent::Json {
                ..
            } => None,
        })
    }
}

// ============================================================================
// SECTION: Tool Handler
// ============================================================================

/// Async handler invoked with validated arguments.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Executes the tool.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool fails; the dispatcher records the
    /// failure and re-raises it unchanged.
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError>;
}

/// Adapter turning an async closure into a [`ToolHandler`].
pub struct FnHandler<F> {
    /// Wrapped closure.
    func: F,
}

impl<F> FnHandler<F> {
    /// Wraps a closure returning a boxed future.
    #[must_use]
    pub const fn new(func: F) -> Self {
        Self {
            func,
        }
    }
}

#[async_trait]
impl<F, Fut> ToolHandler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ToolOutput, ToolError>> + Send,
{
    async fn call(&self, args: Value) -> Result<ToolOutput, ToolError> {
        (self.func)(args).await
    }
}

// ============================================================================
// SECTION: Tool Descriptor
// ============================================================================

/// Registered tool: identity, presentation, input contract, and handler.
#[derive(Clone)]
pub struct ToolDescriptor {
    /// Fully-qualified tool name (`<provider>.<verb>`).
    pub name: String,
    /// Human-readable title.
    pub title: String,
    /// Tool description shown in `tools/list`.
    pub description: String,
    /// Declarative input schema.
    pub schema: ToolSchema,
    /// Handler invoked with validated arguments.
    pub handler: Arc<dyn ToolHandler>,
}

impl ToolDescriptor {
    /// Creates a tool descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        schema: ToolSchema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            description: description.into(),
            schema,
            handler,
        }
    }
}

impl fmt::Debug for ToolDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDescriptor")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("schema", &self.schema)
            .finish_non_exhaustive()
    }
}
