// crates/mcp-hub-core/src/schema.rs
// ============================================================================
// Module: Declarative Tool Schemas
// Description: Field descriptors rendered to JSON Schema and validated.
// Purpose: Describe tool inputs as data and validate raw arguments once.
// Dependencies: jsonschema, serde_json, url
// ============================================================================

//! ## Overview
//! Tool inputs are described as ordered [`FieldSpec`] lists. A [`ToolSchema`]
//! renders to a draft 2020-12 JSON Schema (published as `inputSchema`) and
//! compiles into a [`SchemaValidator`] at registration time.
//!
//! Validation order:
//! 1. the payload must be an object (`null` is treated as `{}`)
//! 2. defaults are applied for absent fields
//! 3. `require_one_of` groups are checked
//! 4. the compiled JSON Schema runs and every violation is reported
//!
//! Unknown fields are passed through untouched.

use jsonschema::Draft;
use jsonschema::Validator;
use serde_json::Map;
use serde_json::Value;
use serde_json::json;
use url::Url;

use crate::error::ToolError;

// ============================================================================
// SECTION: Field Types
// ============================================================================

/// Structural type of a tool input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 string.
    String,
    /// Integral number.
    Integer,
    /// Any JSON number.
    Number,
    /// Boolean flag.
    Boolean,
    /// Homogeneous array.
    Array(Box<FieldType>),
    /// Free-form JSON object.
    Object,
    /// Any JSON value.
    Any,
    /// Any one of several types.
    OneOf(Vec<FieldType>),
    /// String restricted to fixed values.
    Enum(Vec<String>),
}

impl FieldType {
    /// Builds an array type over `item`.
    #[must_use]
    pub fn array(item: Self) -> Self {
        Self::Array(Box::new(item))
    }

    /// Builds a string enum from literal values.
    #[must_use]
    pub fn one_of_values(values: &[&str]) -> Self {
        Self::Enum(values.iter().map(|value| (*value).to_string()).collect())
    }

    /// Renders the bare type as JSON Schema.
    fn to_json_schema(&self) -> Value {
        match self {
            Self::String => json!({ "type": "string" }),
            Self::Integer => json!({ "type": "integer" }),
            Self::Number => json!({ "type": "number" }),
            Self::Boolean => json!({ "type": "boolean" }),
            Self::Array(item) => json!({ "type": "array", "items": item.to_json_schema() }),
            Self::Object => json!({ "type": "object" }),
            Self::Any => json!({}),
            Self::OneOf(options) => {
                let options: Vec<Value> = options.iter().map(Self::to_json_schema).collect();
                json!({ "anyOf": options })
            }
            Self::Enum(values) => json!({ "type": "string", "enum": values }),
        }
    }

    /// Returns true when length constraints apply to strings.
    const fn is_string_like(&self) -> bool {
        matches!(self, Self::String | Self::Enum(_))
    }
}

// ============================================================================
// SECTION: Field Specs
// ============================================================================

/// Named, typed tool input field with constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Field name.
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// Whether the field must be present.
    pub required: bool,
    /// Default applied when the field is absent.
    pub default: Option<Value>,
    /// Human description.
    pub description: Option<String>,
    /// Inclusive numeric minimum.
    pub min: Option<f64>,
    /// Inclusive numeric maximum.
    pub max: Option<f64>,
    /// Minimum string length or array item count.
    pub min_length: Option<usize>,
    /// Maximum string length or array item count.
    pub max_length: Option<usize>,
    /// Whether string values must parse as absolute URLs.
    pub url: bool,
}

impl FieldSpec {
    /// Creates an optional field of the given type.
    #[must_use]
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: false,
            default: None,
            description: None,
            min: None,
            max: None,
            min_length: None,
            max_length: None,
            url: false,
        }
    }

    /// Creates an optional string field.
    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Creates an optional integer field.
    #[must_use]
    pub fn integer(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Integer)
    }

    /// Creates an optional number field.
    #[must_use]
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    /// Creates an optional boolean field.
    #[must_use]
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Creates an optional object field.
    #[must_use]
    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Object)
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets an inclusive numeric range.
    #[must_use]
    pub const fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    /// Sets the minimum length or item count.
    #[must_use]
    pub const fn min_length(mut self, min: usize) -> Self {
        self.min_length = Some(min);
        self
    }

    /// Sets the maximum length or item count.
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Requires an exact length or item count.
    #[must_use]
    pub const fn length(mut self, len: usize) -> Self {
        self.min_length = Some(len);
        self.max_length = Some(len);
        self
    }

    /// Requires string values to be absolute URLs.
    #[must_use]
    pub const fn url(mut self) -> Self {
        self.url = true;
        self
    }

    /// Renders the field as a JSON Schema property.
    fn to_json_schema(&self) -> Value {
        let mut schema = match self.field_type.to_json_schema() {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        if let Some(description) = &self.description {
            schema.insert("description".to_string(), Value::String(description.clone()));
        }
        if let Some(default) = &self.default {
            schema.insert("default".to_string(), default.clone());
        }
        if let Some(min) = self.min {
            schema.insert("minimum".to_string(), number_value(min));
        }
        if let Some(max) = self.max {
            schema.insert("maximum".to_string(), number_value(max));
        }
        let (min_key, max_key) = if self.field_type.is_string_like() {
            ("minLength", "maxLength")
        } else {
            ("minItems", "maxItems")
        };
        if let Some(min) = self.min_length {
            schema.insert(min_key.to_string(), json!(min));
        }
        if let Some(max) = self.max_length {
            schema.insert(max_key.to_string(), json!(max));
        }
        if self.url {
            schema.insert("format".to_string(), Value::String("uri".to_string()));
        }
        Value::Object(schema)
    }
}

/// Renders a bound as an integer when it has no fractional part.
fn number_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < 9.0e15 {
        #[allow(clippy::cast_possible_truncation, reason = "Checked integral and in range.")]
        let integral = value as i64;
        json!(integral)
    } else {
        json!(value)
    }
}

// ============================================================================
// SECTION: Tool Schemas
// ============================================================================

/// Ordered field list plus "provide either" groups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolSchema {
    /// Declared fields in presentation order.
    pub fields: Vec<FieldSpec>,
    /// Groups where at least one member must be present.
    pub require_one_of: Vec<Vec<String>>,
}

impl ToolSchema {
    /// Creates an empty schema (accepts any object).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a field.
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Requires at least one of the named fields.
    #[must_use]
    pub fn require_one_of(mut self, names: &[&str]) -> Self {
        self.require_one_of.push(names.iter().map(|name| (*name).to_string()).collect());
        self
    }

    /// Renders the schema as a draft 2020-12 JSON Schema document.
    #[must_use]
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();
        for field in &self.fields {
            properties.insert(field.name.clone(), field.to_json_schema());
            if field.required {
                required.push(Value::String(field.name.clone()));
            }
        }
        let mut schema = Map::new();
        schema.insert("type".to_string(), Value::String("object".to_string()));
        schema.insert("properties".to_string(), Value::Object(properties));
        if !required.is_empty() {
            schema.insert("required".to_string(), Value::Array(required));
        }
        schema.insert("additionalProperties".to_string(), Value::Bool(true));
        Value::Object(schema)
    }
}

// ============================================================================
// SECTION: Validator
// ============================================================================

/// Compiled validator for one tool's input.
pub struct SchemaValidator {
    /// Source schema (defaults, groups, URL fields).
    schema: ToolSchema,
    /// Compiled JSON Schema.
    compiled: Validator,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").field("schema", &self.schema).finish_non_exhaustive()
    }
}

impl SchemaValidator {
    /// Compiles a validator for the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::Internal`] when the rendered schema does not compile.
    pub fn compile(schema: &ToolSchema) -> Result<Self, ToolError> {
        let document = schema.to_json_schema();
        let compiled = jsonschema::options()
            .with_draft(Draft::Draft202012)
            .build(&document)
            .map_err(|err| ToolError::Internal(format!("schema compile failed: {err}")))?;
        Ok(Self {
            schema: schema.clone(),
            compiled,
        })
    }

    /// Validates raw arguments and returns them with defaults applied.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::InvalidArguments`] listing every violation.
    pub fn validate(&self, raw: &Value) -> Result<Value, ToolError> {
        let mut args = match raw {
            Value::Null => Map::new(),
            Value::Object(map) => map.clone(),
            _ => {
                return Err(ToolError::InvalidArguments(
                    "arguments must be a JSON object".to_string(),
                ));
            }
        };
        for field in &self.schema.fields {
            if let Some(default) = &field.default
                && !args.contains_key(&field.name)
            {
                args.insert(field.name.clone(), default.clone());
            }
        }

        let mut violations = Vec::new();
        for group in &self.schema.require_one_of {
            let present = group.iter().any(|name| args.get(name).is_some_and(|v| !v.is_null()));
            if !present {
                violations.push(format!("provide either {}", group.join(" or ")));
            }
        }
        let args = Value::Object(args);
        violations.extend(self.compiled.iter_errors(&args).map(|err| err.to_string()));
        for field in self.schema.fields.iter().filter(|field| field.url) {
            if let Some(Value::String(text)) = args.get(&field.name)
                && Url::parse(text).is_err()
            {
                violations.push(format!("{}: \"{text}\" is not a valid URL", field.name));
            }
        }

        if violations.is_empty() {
            Ok(args)
        } else {
            Err(ToolError::InvalidArguments(violations.join("; ")))
        }
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
