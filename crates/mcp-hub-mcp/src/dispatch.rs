// crates/mcp-hub-mcp/src/dispatch.rs
// ============================================================================
// Module: Tool Registry and Dispatcher
// Description: One addressable namespace over every mounted provider's tools.
// Purpose: Validate, invoke, time, and record each tool call.
// Dependencies: mcp-hub-core, serde_json
// ============================================================================

//! ## Overview
//! The [`ToolRegistry`] is built once from the mounted providers and is
//! immutable afterwards; a later duplicate name replaces the earlier one.
//! The [`Dispatcher`] rejects unknown tools and invalid arguments without
//! touching the handler or the usage log, then runs the handler and appends
//! exactly one usage record before returning the handler's own result. A
//! usage log failure is audited as `hub_usage_error` and never replaces the
//! handler's result.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use mcp_hub_core::Provider;
use mcp_hub_core::SchemaValidator;
use mcp_hub_core::SharedUsageRecorder;
use mcp_hub_core::ToolDescriptor;
use mcp_hub_core::ToolError;
use mcp_hub_core::ToolOutput;
use mcp_hub_core::UsageRecord;
use mcp_hub_core::UsageRecorder;
use mcp_hub_core::run_blocking;
use mcp_hub_core::time::unix_millis;
use serde::Serialize;
use serde_json::Value;

use crate::audit::HubAuditSink;
use crate::audit::HubUsageErrorEvent;

// ============================================================================
// SECTION: Registry
// ============================================================================

/// A tool bound to its owning provider and compiled validator.
pub struct RegisteredTool {
    /// Owning provider name.
    pub provider: String,
    /// Tool descriptor.
    pub descriptor: ToolDescriptor,
    /// Compiled argument validator.
    validator: SchemaValidator,
    /// Rendered JSON Schema for `tools/list`.
    input_schema: Value,
}

/// Tool entry as listed by `tools/list`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    /// Fully-qualified name.
    pub name: String,
    /// Human title.
    pub title: String,
    /// Description.
    pub description: String,
    /// JSON Schema of the arguments.
    pub input_schema: Value,
}

/// Flat map of every registered tool.
#[derive(Default)]
pub struct ToolRegistry {
    /// Tools keyed by name.
    tools: BTreeMap<String, RegisteredTool>,
    /// Tool names in registration order (duplicates listed once).
    order: Vec<String>,
    /// Mounted provider names in mount order.
    providers: Vec<String>,
}

impl ToolRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from mounted providers.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Internal`] when a tool schema does not compile.
    pub fn from_providers(providers: &[Provider]) -> Result<Self, ToolError> {
        let mut registry = Self::new();
        for provider in providers {
            registry.mount(provider)?;
        }
        Ok(registry)
    }

    /// Registers every tool of one provider.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Internal`] when a tool schema does not compile.
    pub fn mount(&mut self, provider: &Provider) -> Result<(), ToolError> {
        if !self.providers.contains(&provider.name) {
            self.providers.push(provider.name.clone());
        }
        for descriptor in &provider.tools {
            self.register(&provider.name, descriptor.clone())?;
        }
        Ok(())
    }

    /// Registers one tool, replacing any earlier tool with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Internal`] when the schema does not compile.
    pub fn register(&mut self, provider: &str, descriptor: ToolDescriptor) -> Result<(), ToolError> {
        let validator = SchemaValidator::compile(&descriptor.schema).map_err(|err| {
            ToolError::Internal(format!("tool {} schema invalid: {err}", descriptor.name))
        })?;
        let input_schema = descriptor.schema.to_json_schema();
        let name = descriptor.name.clone();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(
            name,
            RegisteredTool {
                provider: provider.to_string(),
                descriptor,
                validator,
                input_schema,
            },
        );
        Ok(())
    }

    /// Looks up a tool by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.get(name)
    }

    /// Mounted provider names.
    #[must_use]
    pub fn provider_names(&self) -> &[String] {
        &self.providers
    }

    /// Registered tool names in registration order.
    #[must_use]
    pub fn tool_names(&self) -> &[String] {
        &self.order
    }

    /// Tool definitions in registration order.
    #[must_use]
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| ToolDefinition {
                name: tool.descriptor.name.clone(),
                title: tool.descriptor.title.clone(),
                description: tool.descriptor.description.clone(),
                input_schema: tool.input_schema.clone(),
            })
            .collect()
    }
}

// ============================================================================
// SECTION: Dispatcher
// ============================================================================

/// Routes invocations to handlers and records usage.
#[derive(Clone)]
pub struct Dispatcher {
    /// Immutable tool registry.
    registry: Arc<ToolRegistry>,
    /// Usage log.
    usage: SharedUsageRecorder,
    /// Sink for usage log failures.
    audit: Arc<dyn HubAuditSink>,
}

impl Dispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        registry: Arc<ToolRegistry>,
        usage: SharedUsageRecorder,
        audit: Arc<dyn HubAuditSink>,
    ) -> Self {
        Self {
            registry,
            usage,
            audit,
        }
    }

    /// Tool registry.
    #[must_use]
    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Usage log.
    #[must_use]
    pub const fn usage(&self) -> &SharedUsageRecorder {
        &self.usage
    }

    /// Invokes a tool by name.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownTool`] or [`ToolError::InvalidArguments`]
    /// without invoking the handler, or the handler's own failure after its
    /// usage record is appended.
    pub async fn invoke(&self, name: &str, raw_args: Value) -> Result<ToolOutput, ToolError> {
        let tool =
            self.registry.get(name).ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let args = tool.validator.validate(&raw_args)?;
        let subject = args.get("subject").and_then(Value::as_str).map(str::to_string);

        let started = Instant::now();
        let result = tool.descriptor.handler.call(args).await;
        let latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let record = UsageRecord {
            provider: tool.provider.clone(),
            tool_name: tool.descriptor.name.clone(),
            subject,
            success: result.is_ok(),
            latency_ms,
            error_message: result.as_ref().err().map(ToString::to_string),
            created_at_ms: unix_millis(),
        };
        if let Err(err) = run_blocking(|| self.usage.record(record)) {
            self.audit.record_usage_error(&HubUsageErrorEvent::new(
                &tool.provider,
                &tool.descriptor.name,
                &err.to_string(),
            ));
        }
        result
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
