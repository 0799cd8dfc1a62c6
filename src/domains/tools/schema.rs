//! Tool input schemas.
//!
//! An [`InputSchema`] is the JSON-Schema object advertised in `tools/list`
//! and checked against the arguments of every `tools/call`. Schemas for
//! typed parameter structs are generated by `schemars` through rmcp, so the
//! validator understands the subset those generators emit: local `$ref`s,
//! `nullable`, type unions, `enum`/`const`, the combinators, object and array
//! structure, and the common string and numeric bounds.

use rmcp::{handler::server::tool::cached_schema_for_type, model::JsonObject};
use schemars::JsonSchema;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;

use super::error::ToolError;

const MAX_DEPTH: usize = 64;

/// A schema check failure, located by the path of the offending value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} at {path}")]
pub struct SchemaViolation {
    /// Location of the offending value, e.g. `$.toolsets[0].trigger`.
    pub path: String,
    pub message: String,
}

impl SchemaViolation {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

/// The input schema of a tool. Always describes an object.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSchema(Arc<JsonObject>);

impl InputSchema {
    /// The schema of a tool that takes no parameters.
    pub fn empty() -> Self {
        let mut object = JsonObject::new();
        object.insert("type".into(), json!("object"));
        object.insert("properties".into(), json!({}));
        object.insert("required".into(), json!([]));
        Self(Arc::new(object))
    }

    /// Derive the schema of a typed parameter struct.
    pub fn for_params<P: JsonSchema + 'static>() -> Self {
        Self(cached_schema_for_type::<P>())
    }

    /// Wrap a hand-written schema. It must be an object schema.
    pub fn from_value(value: Value) -> Result<Self, ToolError> {
        let Value::Object(object) = value else {
            return Err(ToolError::invalid_definition(
                "input schema must be a JSON object",
            ));
        };
        let schema = Self(Arc::new(object));
        schema.ensure_object_type()?;
        Ok(schema)
    }

    pub(crate) fn ensure_object_type(&self) -> Result<(), ToolError> {
        match self.0.get("type") {
            Some(Value::String(kind)) if kind == "object" => Ok(()),
            Some(other) => Err(ToolError::invalid_definition(format!(
                "input schema must describe an object, found type {other}"
            ))),
            None => Err(ToolError::invalid_definition(
                "input schema must declare \"type\": \"object\"",
            )),
        }
    }

    pub fn as_object(&self) -> &JsonObject {
        &self.0
    }

    /// Shared handle for embedding in an rmcp `Tool`.
    pub fn to_arc(&self) -> Arc<JsonObject> {
        Arc::clone(&self.0)
    }

    /// Check `arguments` against this schema.
    ///
    /// Returns the arguments as an object when they conform.
    pub fn validate(&self, arguments: &Value) -> Result<JsonObject, SchemaViolation> {
        let root = Value::Object((*self.0).clone());
        Validator { root: &root }.check(&root, arguments, "$", 0)?;

        match arguments {
            Value::Object(object) => Ok(object.clone()),
            other => Err(SchemaViolation::new(
                "$",
                format!("expected object, found {}", type_name(other)),
            )),
        }
    }
}

impl Default for InputSchema {
    fn default() -> Self {
        Self::empty()
    }
}

struct Validator<'a> {
    root: &'a Value,
}

impl<'a> Validator<'a> {
    fn check(
        &self,
        schema: &'a Value,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> Result<(), SchemaViolation> {
        if depth > MAX_DEPTH {
            return Err(SchemaViolation::new(path, "schema nesting too deep"));
        }

        let schema = match schema {
            Value::Bool(true) => return Ok(()),
            Value::Bool(false) => return Err(SchemaViolation::new(path, "no value is allowed")),
            Value::Object(schema) => schema,
            _ => return Ok(()),
        };

        if value.is_null() && schema.get("nullable").and_then(Value::as_bool) == Some(true) {
            return Ok(());
        }

        if let Some(reference) = schema.get("$ref").and_then(Value::as_str) {
            let target = self.resolve(reference).ok_or_else(|| {
                SchemaViolation::new(path, format!("unresolvable schema reference {reference}"))
            })?;
            self.check(target, value, path, depth + 1)?;
        }

        if let Some(kind) = schema.get("type") {
            let allowed: Vec<&str> = match kind {
                Value::String(kind) => vec![kind.as_str()],
                Value::Array(kinds) => kinds.iter().filter_map(Value::as_str).collect(),
                _ => Vec::new(),
            };
            if !allowed.is_empty() && !allowed.iter().any(|kind| matches_type(kind, value)) {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected {}, found {}", allowed.join(" or "), type_name(value)),
                ));
            }
        }

        if let Some(options) = schema.get("enum").and_then(Value::as_array) {
            if !options.contains(value) {
                let expected: Vec<String> = options.iter().map(Value::to_string).collect();
                return Err(SchemaViolation::new(
                    path,
                    format!("expected one of {}, found {value}", expected.join(", ")),
                ));
            }
        }

        if let Some(constant) = schema.get("const") {
            if constant != value {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected {constant}, found {value}"),
                ));
            }
        }

        if let Some(all) = schema.get("allOf").and_then(Value::as_array) {
            for sub in all {
                self.check(sub, value, path, depth + 1)?;
            }
        }

        if let Some(any) = schema.get("anyOf").and_then(Value::as_array) {
            let mut first_error = None;
            let matched = any.iter().any(|sub| match self.check(sub, value, path, depth + 1) {
                Ok(()) => true,
                Err(e) => {
                    first_error.get_or_insert(e);
                    false
                }
            });
            if !matched {
                return Err(first_error
                    .unwrap_or_else(|| SchemaViolation::new(path, "no alternative matched")));
            }
        }

        if let Some(one) = schema.get("oneOf").and_then(Value::as_array) {
            let matches = one
                .iter()
                .filter(|sub| self.check(sub, value, path, depth + 1).is_ok())
                .count();
            if matches != 1 {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected exactly one alternative to match, {matches} matched"),
                ));
            }
        }

        match value {
            Value::Object(object) => self.check_object(schema, object, path, depth),
            Value::Array(items) => self.check_array(schema, items, path, depth),
            Value::String(text) => check_string(schema, text, path),
            Value::Number(_) => check_number(schema, value, path),
            _ => Ok(()),
        }
    }

    fn check_object(
        &self,
        schema: &'a JsonObject,
        object: &JsonObject,
        path: &str,
        depth: usize,
    ) -> Result<(), SchemaViolation> {
        if let Some(required) = schema.get("required").and_then(Value::as_array) {
            for field in required.iter().filter_map(Value::as_str) {
                if !object.contains_key(field) {
                    return Err(SchemaViolation::new(
                        &child_path(path, field),
                        "required property is missing",
                    ));
                }
            }
        }

        let properties = schema.get("properties").and_then(Value::as_object);
        let additional = schema.get("additionalProperties");

        for (key, item) in object {
            let item_path = child_path(path, key);
            match properties.and_then(|p| p.get(key)) {
                Some(property) => self.check(property, item, &item_path, depth + 1)?,
                None => match additional {
                    Some(Value::Bool(false)) => {
                        return Err(SchemaViolation::new(&item_path, "unexpected property"));
                    }
                    Some(extra @ Value::Object(_)) => {
                        self.check(extra, item, &item_path, depth + 1)?
                    }
                    _ => {}
                },
            }
        }

        Ok(())
    }

    fn check_array(
        &self,
        schema: &'a JsonObject,
        items: &[Value],
        path: &str,
        depth: usize,
    ) -> Result<(), SchemaViolation> {
        if let Some(min) = schema.get("minItems").and_then(Value::as_u64) {
            if (items.len() as u64) < min {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected at least {min} items, found {}", items.len()),
                ));
            }
        }
        if let Some(max) = schema.get("maxItems").and_then(Value::as_u64) {
            if (items.len() as u64) > max {
                return Err(SchemaViolation::new(
                    path,
                    format!("expected at most {max} items, found {}", items.len()),
                ));
            }
        }

        if let Some(item_schema) = schema.get("items") {
            for (index, item) in items.iter().enumerate() {
                self.check(item_schema, item, &format!("{path}[{index}]"), depth + 1)?;
            }
        }

        Ok(())
    }

    fn resolve(&self, reference: &str) -> Option<&'a Value> {
        if reference == "#" {
            return Some(self.root);
        }
        let pointer = reference.strip_prefix('#')?;
        self.root.pointer(pointer)
    }
}

fn check_string(schema: &JsonObject, text: &str, path: &str) -> Result<(), SchemaViolation> {
    let length = text.chars().count() as u64;
    if let Some(min) = schema.get("minLength").and_then(Value::as_u64) {
        if length < min {
            return Err(SchemaViolation::new(
                path,
                format!("expected at least {min} characters"),
            ));
        }
    }
    if let Some(max) = schema.get("maxLength").and_then(Value::as_u64) {
        if length > max {
            return Err(SchemaViolation::new(
                path,
                format!("expected at most {max} characters"),
            ));
        }
    }
    Ok(())
}

fn check_number(schema: &JsonObject, value: &Value, path: &str) -> Result<(), SchemaViolation> {
    let Some(number) = value.as_f64() else {
        return Ok(());
    };
    let bound = |key: &str| schema.get(key).and_then(Value::as_f64);

    if let Some(min) = bound("minimum") {
        if number < min {
            return Err(SchemaViolation::new(path, format!("must be >= {min}")));
        }
    }
    if let Some(max) = bound("maximum") {
        if number > max {
            return Err(SchemaViolation::new(path, format!("must be <= {max}")));
        }
    }
    if let Some(min) = bound("exclusiveMinimum") {
        if number <= min {
            return Err(SchemaViolation::new(path, format!("must be > {min}")));
        }
    }
    if let Some(max) = bound("exclusiveMaximum") {
        if number >= max {
            return Err(SchemaViolation::new(path, format!("must be < {max}")));
        }
    }
    Ok(())
}

fn matches_type(kind: &str, value: &Value) -> bool {
    match kind {
        "null" => value.is_null(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => {
            value.is_i64()
                || value.is_u64()
                || value.as_f64().is_some_and(|n| n.fract() == 0.0)
        }
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn child_path(path: &str, key: &str) -> String {
    format!("{path}.{key}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Inner {
        label: String,
    }

    #[derive(Debug, Deserialize, JsonSchema)]
    #[allow(dead_code)]
    struct Params {
        name: String,
        count: Option<u32>,
        inner: Option<Inner>,
    }

    fn toolset_schema() -> InputSchema {
        InputSchema::from_value(json!({
            "type": "object",
            "properties": {
                "toolsets": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "trigger": { "type": "string", "enum": ["enable", "disable"] }
                        },
                        "required": ["name", "trigger"],
                        "additionalProperties": false
                    }
                }
            },
            "required": ["toolsets"]
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_schema_shape() {
        let schema = InputSchema::empty();
        assert_eq!(
            Value::Object(schema.as_object().clone()),
            json!({"type": "object", "properties": {}, "required": []})
        );
        assert!(schema.validate(&json!({})).is_ok());
        assert!(schema.validate(&json!({"extra": 1})).is_ok());
    }

    #[test]
    fn test_non_object_schema_rejected() {
        assert!(InputSchema::from_value(json!({"type": "string"})).is_err());
        assert!(InputSchema::from_value(json!([])).is_err());
        assert!(InputSchema::from_value(json!({"properties": {}})).is_err());
    }

    #[test]
    fn test_arguments_must_be_object() {
        let err = InputSchema::empty().validate(&json!([1, 2])).unwrap_err();
        assert_eq!(err.path, "$");
    }

    #[test]
    fn test_nested_violation_path() {
        let schema = toolset_schema();
        let ok = json!({"toolsets": [{"name": "echo", "trigger": "enable"}]});
        assert!(schema.validate(&ok).is_ok());

        let bad = json!({"toolsets": [{"name": "echo", "trigger": "enable"}, {"name": "x", "trigger": "toggle"}]});
        let err = schema.validate(&bad).unwrap_err();
        assert_eq!(err.path, "$.toolsets[1].trigger");

        let bad = json!({"toolsets": [{"name": 5, "trigger": "enable"}]});
        let err = schema.validate(&bad).unwrap_err();
        assert_eq!(err.path, "$.toolsets[0].name");
        assert!(err.message.contains("expected string"));
    }

    #[test]
    fn test_required_and_additional_properties() {
        let schema = toolset_schema();
        let err = schema.validate(&json!({})).unwrap_err();
        assert_eq!(err.path, "$.toolsets");

        let bad = json!({"toolsets": [{"name": "echo", "trigger": "enable", "force": true}]});
        let err = schema.validate(&bad).unwrap_err();
        assert_eq!(err.message, "unexpected property");
    }

    #[test]
    fn test_generated_schema() {
        let schema = InputSchema::for_params::<Params>();
        assert!(schema.ensure_object_type().is_ok());

        assert!(schema.validate(&json!({"name": "a"})).is_ok());
        assert!(schema.validate(&json!({"name": "a", "count": null})).is_ok());
        assert!(schema.validate(&json!({"name": "a", "count": 3})).is_ok());
        assert!(
            schema
                .validate(&json!({"name": "a", "inner": {"label": "x"}}))
                .is_ok()
        );

        assert!(schema.validate(&json!({"count": 3})).is_err());
        assert!(schema.validate(&json!({"name": "a", "count": "3"})).is_err());

        let err = schema
            .validate(&json!({"name": "a", "inner": {"label": 1}}))
            .unwrap_err();
        assert!(err.path.starts_with("$.inner"));
    }

    #[test]
    fn test_numeric_bounds() {
        let schema = InputSchema::from_value(json!({
            "type": "object",
            "properties": { "by": { "type": "integer", "minimum": 1, "maximum": 10 } }
        }))
        .unwrap();
        assert!(schema.validate(&json!({"by": 1})).is_ok());
        assert!(schema.validate(&json!({"by": 0})).is_err());
        assert!(schema.validate(&json!({"by": 11})).is_err());
        assert!(schema.validate(&json!({"by": 1.5})).is_err());
    }
}
