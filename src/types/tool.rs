//! Tool calling definitions: declarations advertised to the model, the
//! invocations it sends back, and the results produced locally.

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// JSON-schema primitive types a tool parameter may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    String,
    Number,
    Integer,
    Boolean,
}

/// One named parameter of a tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ParameterType,
    pub description: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
}

impl ParameterSpec {
    pub fn new(name: impl Into<String>, kind: ParameterType, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            description: description.into(),
            required: false,
            enum_values: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn one_of<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.enum_values = Some(values.into_iter().map(Into::into).collect());
        self
    }
}

/// Static schema describing a tool to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDeclaration {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
        }
    }

    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    /// Object schema for the parameters, or `None` for a tool without any.
    pub fn parameters_schema(&self) -> Option<Value> {
        if self.parameters.is_empty() {
            return None;
        }

        let mut properties = Map::new();
        let mut required = Vec::new();
        for p in &self.parameters {
            let mut prop = json!({
                "type": p.kind,
                "description": p.description,
            });
            if let Some(values) = &p.enum_values {
                prop["enum"] = json!(values);
            }
            properties.insert(p.name.clone(), prop);
            if p.required {
                required.push(Value::String(p.name.clone()));
            }
        }

        Some(json!({
            "type": "object",
            "properties": properties,
            "required": required,
        }))
    }
}

/// Tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolInvocation {
    /// Correlation id, present only when the model supplied one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
    /// Opaque signature some models attach to a call; must be echoed back verbatim.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thought_signature: Option<String>,
}

impl ToolInvocation {
    pub fn new(name: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            id: None,
            name: name.into(),
            arguments,
            thought_signature: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_thought_signature(mut self, signature: impl Into<String>) -> Self {
        self.thought_signature = Some(signature.into());
        self
    }
}

/// Outcome of running a tool locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { value: Value },
    Failure { kind: String, message: String },
}

/// Tool result (response to a tool invocation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub outcome: ToolOutcome,
}

impl ToolResult {
    pub fn success(invocation: &ToolInvocation, value: Value) -> Self {
        Self {
            id: invocation.id.clone(),
            name: invocation.name.clone(),
            outcome: ToolOutcome::Success { value },
        }
    }

    pub fn failure(invocation: &ToolInvocation, err: &crate::Error) -> Self {
        Self {
            id: invocation.id.clone(),
            name: invocation.name.clone(),
            outcome: ToolOutcome::Failure {
                kind: err.kind().to_string(),
                message: err.to_string(),
            },
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, ToolOutcome::Failure { .. })
    }

    /// Payload handed back to the model: `{"result": ...}` or `{"error": ...}`.
    pub fn payload(&self) -> Value {
        match &self.outcome {
            ToolOutcome::Success { value } => json!({ "result": value }),
            ToolOutcome::Failure { message, .. } => json!({ "error": message }),
        }
    }
}
