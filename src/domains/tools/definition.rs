//! Tool definitions: the immutable description of one callable capability.

use rmcp::model::{Tool, ToolAnnotations};
use schemars::JsonSchema;

use super::error::ToolError;
use super::namespace::{external_description, external_name};
use super::schema::InputSchema;

/// Name, description, input schema and optional behavior hints of a tool.
#[derive(Debug, Clone)]
pub struct ToolDefinition {
    name: String,
    description: String,
    input_schema: InputSchema,
    annotations: Option<ToolAnnotations>,
}

impl ToolDefinition {
    /// Create a definition from a hand-written schema.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: InputSchema,
    ) -> Result<Self, ToolError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ToolError::invalid_definition("tool name must not be empty"));
        }
        input_schema.ensure_object_type()?;

        Ok(Self {
            name,
            description: description.into(),
            input_schema,
            annotations: None,
        })
    }

    /// Create a definition whose schema is derived from a parameter struct.
    pub fn for_params<P: JsonSchema + 'static>(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ToolError> {
        Self::new(name, description, InputSchema::for_params::<P>())
    }

    /// Create a definition for a tool that takes no parameters.
    pub fn without_params(
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<Self, ToolError> {
        Self::new(name, description, InputSchema::empty())
    }

    pub fn with_annotations(mut self, annotations: ToolAnnotations) -> Self {
        self.annotations = Some(annotations);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &InputSchema {
        &self.input_schema
    }

    pub fn annotations(&self) -> Option<&ToolAnnotations> {
        self.annotations.as_ref()
    }

    /// Whether the tool declares `readOnlyHint: true`.
    ///
    /// This is the only hint the registry acts on: it decides which tools a
    /// read-only toolset enables.
    pub fn is_read_only(&self) -> bool {
        self.annotations
            .as_ref()
            .and_then(|a| a.read_only_hint)
            .unwrap_or(false)
    }

    /// Render the rmcp `Tool` model as clients see it under `namespace`.
    pub fn to_tool(&self, namespace: Option<&str>) -> Tool {
        Tool {
            name: external_name(namespace, &self.name).into(),
            description: Some(external_description(namespace, &self.description).into()),
            input_schema: self.input_schema.to_arc(),
            annotations: self.annotations.clone(),
            output_schema: None,
            icons: None,
            meta: None,
            title: None,
        }
    }
}

/// Build a full set of behavior hints.
pub fn annotations(
    title: &str,
    read_only: bool,
    destructive: bool,
    idempotent: bool,
    open_world: bool,
) -> ToolAnnotations {
    ToolAnnotations {
        title: Some(title.to_string()),
        read_only_hint: Some(read_only),
        destructive_hint: Some(destructive),
        idempotent_hint: Some(idempotent),
        open_world_hint: Some(open_world),
    }
}
