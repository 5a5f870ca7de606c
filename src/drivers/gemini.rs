//! Google Gemini generateContent API driver. Key differences from chat-style APIs:
//! - Uses `contents` instead of `messages`, with `parts` instead of `content`.
//! - Roles: `user` and `model` (not `assistant`). System text goes in `system_instruction`.
//! - Tool calls are `functionCall` parts on a `model` turn; results are
//!   `functionResponse` parts on a `user` turn.
//! - Tools are advertised as `tools[0].function_declarations`.
//! - `generationConfig` wraps temperature.

use serde_json::{json, Map, Value};

use crate::client::{ModelReply, ModelRequest};
use crate::error::Error;
use crate::error_code::StandardErrorCode;
use crate::types::{Role, ToolDeclaration, ToolInvocation, Turn, TurnContent};

use super::{DriverRequest, UsageInfo};

/// Google Gemini generateContent API driver.
#[derive(Debug, Clone)]
pub struct GeminiDriver {
    model: String,
}

impl GeminiDriver {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            model: model.into(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint_path(&self) -> String {
        format!("/v1beta/models/{}:generateContent", self.model)
    }

    pub fn build_request(&self, request: &ModelRequest<'_>) -> Result<DriverRequest, Error> {
        let contents: Vec<Value> = request.history.iter().map(Self::turn_to_content).collect();

        let mut body = json!({
            "contents": contents,
        });

        if let Some(instruction) = request.instruction.filter(|s| !s.trim().is_empty()) {
            body["system_instruction"] = json!({
                "parts": [{ "text": instruction }]
            });
        }

        if !request.declarations.is_empty() {
            let declarations: Vec<Value> = request
                .declarations
                .iter()
                .map(Self::declaration_to_json)
                .collect();
            body["tools"] = json!([{ "function_declarations": declarations }]);
        }

        if let Some(t) = request.temperature {
            body["generationConfig"] = json!({ "temperature": t });
        }

        Ok(DriverRequest {
            path: self.endpoint_path(),
            body,
        })
    }

    fn turn_to_content(turn: &Turn) -> Value {
        let role = match turn.role {
            Role::Assistant => "model",
            Role::User | Role::ToolResult => "user",
        };
        let part = match &turn.content {
            TurnContent::Text { text } => json!({ "text": text }),
            TurnContent::Invocation { invocation } => {
                let mut call = json!({
                    "name": invocation.name,
                    "args": Value::Object(invocation.arguments.clone()),
                });
                if let Some(id) = &invocation.id {
                    call["id"] = json!(id);
                }
                let mut part = json!({ "functionCall": call });
                if let Some(signature) = &invocation.thought_signature {
                    part["thoughtSignature"] = json!(signature);
                }
                part
            }
            TurnContent::Result { result } => {
                let mut response = json!({
                    "name": result.name,
                    "response": result.payload(),
                });
                if let Some(id) = &result.id {
                    response["id"] = json!(id);
                }
                json!({ "functionResponse": response })
            }
        };
        json!({ "role": role, "parts": [part] })
    }

    fn declaration_to_json(decl: &ToolDeclaration) -> Value {
        let mut v = json!({
            "name": decl.name,
            "description": decl.description,
        });
        if let Some(schema) = decl.parameters_schema() {
            v["parameters"] = schema;
        }
        v
    }

    pub fn parse_response(&self, body: &Value) -> Result<ModelReply, Error> {
        if let Some(error) = body.get("error") {
            let code = error
                .get("status")
                .and_then(|s| s.as_str())
                .and_then(StandardErrorCode::from_provider_status)
                .unwrap_or(StandardErrorCode::Unknown);
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .unwrap_or("provider returned an error");
            return Err(Error::model_unavailable(code, message));
        }

        // Gemini: { candidates: [{ content: { parts: [...] }, finishReason }], usageMetadata }
        let Some(candidate) = body.pointer("/candidates/0") else {
            if let Some(reason) = body
                .pointer("/promptFeedback/blockReason")
                .and_then(|r| r.as_str())
            {
                return Err(Error::model_unavailable(
                    StandardErrorCode::InvalidRequest,
                    format!("prompt blocked: {reason}"),
                ));
            }
            return Err(Error::model_unavailable(
                StandardErrorCode::InvalidResponse,
                "response contained no candidates",
            ));
        };

        let parts: &[Value] = candidate
            .pointer("/content/parts")
            .and_then(|p| p.as_array())
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        let text: String = parts
            .iter()
            .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
            .collect();
        let text = (!text.is_empty()).then_some(text);

        let invocations = parts
            .iter()
            .filter(|p| p.get("functionCall").is_some())
            .map(Self::parse_function_call)
            .collect::<Result<Vec<_>, _>>()?;

        let finish_reason = candidate
            .get("finishReason")
            .and_then(|v| v.as_str())
            .map(|r| match r {
                "STOP" => "stop".to_string(),
                "MAX_TOKENS" => "length".to_string(),
                "SAFETY" => "content_filter".to_string(),
                "RECITATION" => "content_filter".to_string(),
                other => other.to_lowercase(),
            });

        let usage = body.get("usageMetadata").map(|u| UsageInfo {
            prompt_tokens: u["promptTokenCount"].as_u64().unwrap_or(0),
            completion_tokens: u["candidatesTokenCount"].as_u64().unwrap_or(0),
            total_tokens: u["totalTokenCount"].as_u64().unwrap_or(0),
        });

        Ok(ModelReply {
            text,
            invocations,
            finish_reason,
            usage,
        })
    }

    fn parse_function_call(part: &Value) -> Result<ToolInvocation, Error> {
        let call = &part["functionCall"];
        let name = call.get("name").and_then(|n| n.as_str()).ok_or_else(|| {
            Error::model_unavailable(
                StandardErrorCode::InvalidResponse,
                "functionCall part without a name",
            )
        })?;
        let arguments = match call.get("args") {
            None | Some(Value::Null) => Map::new(),
            Some(Value::Object(map)) => map.clone(),
            Some(other) => {
                return Err(Error::model_unavailable(
                    StandardErrorCode::InvalidResponse,
                    format!("functionCall '{name}' has non-object args: {other}"),
                ))
            }
        };
        Ok(ToolInvocation {
            id: call.get("id").and_then(|i| i.as_str()).map(String::from),
            name: name.to_string(),
            arguments,
            thought_signature: part
                .get("thoughtSignature")
                .and_then(|s| s.as_str())
                .map(String::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ParameterSpec, ParameterType, ToolResult};

    fn request<'a>(history: &'a [Turn], declarations: &'a [ToolDeclaration]) -> ModelRequest<'a> {
        ModelRequest {
            history,
            declarations,
            instruction: Some("Be concise."),
            temperature: Some(0.2),
        }
    }

    #[test]
    fn test_gemini_build_request() {
        let driver = GeminiDriver::new("gemini-2.0-flash");
        let history = vec![Turn::user("Hello")];
        let decls = vec![ToolDeclaration::new("get_weather", "Gets the weather").parameter(
            ParameterSpec::new("location", ParameterType::String, "City").required(),
        )];
        let req = driver.build_request(&request(&history, &decls)).unwrap();

        assert_eq!(req.path, "/v1beta/models/gemini-2.0-flash:generateContent");
        assert_eq!(req.body["generationConfig"]["temperature"], 0.2);
        assert_eq!(
            req.body["system_instruction"]["parts"][0]["text"],
            "Be concise."
        );
        let decl = &req.body["tools"][0]["function_declarations"][0];
        assert_eq!(decl["name"], "get_weather");
        assert_eq!(decl["parameters"]["required"][0], "location");
    }

    #[test]
    fn test_gemini_omits_empty_tools_and_parameters() {
        let driver = GeminiDriver::new("gemini-2.0-flash");
        let history = vec![Turn::user("Hi")];
        let req = driver.build_request(&request(&history, &[])).unwrap();
        assert!(req.body.get("tools").is_none());

        let decls = vec![ToolDeclaration::new("get_current_location", "Where am I")];
        let req = driver.build_request(&request(&history, &decls)).unwrap();
        assert!(req.body["tools"][0]["function_declarations"][0]
            .get("parameters")
            .is_none());
    }

    #[test]
    fn test_gemini_role_mapping_for_tool_turns() {
        let driver = GeminiDriver::new("gemini-2.0-flash");
        let inv = ToolInvocation::new("get_weather", json!({"location": "London"})).with_id("c1");
        let result = ToolResult::success(&inv, json!({"condition": "rainy"}));
        let history = vec![
            Turn::user("Weather in London?"),
            Turn::invocation(inv),
            Turn::tool_result(result),
            Turn::assistant("It's rainy."),
        ];
        let req = driver.build_request(&request(&history, &[])).unwrap();
        let contents = req.body["contents"].as_array().unwrap();

        assert_eq!(contents.len(), 4);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["args"]["location"], "London");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["id"], "c1");
        assert_eq!(contents[2]["role"], "user");
        let response = &contents[2]["parts"][0]["functionResponse"];
        assert_eq!(response["name"], "get_weather");
        assert_eq!(response["response"]["result"]["condition"], "rainy");
        assert_eq!(response["id"], "c1");
        assert_eq!(contents[3]["role"], "model");
    }

    #[test]
    fn test_gemini_parse_text_response() {
        let driver = GeminiDriver::new("gemini-2.0-flash");
        let body = json!({
            "candidates": [{
                "content": { "parts": [{"text": "Hi"}, {"text": "!"}], "role": "model" },
                "finishReason": "STOP"
            }],
            "usageMetadata": {
                "promptTokenCount": 5,
                "candidatesTokenCount": 3,
                "totalTokenCount": 8
            }
        });
        let reply = driver.parse_response(&body).unwrap();
        assert_eq!(reply.text.as_deref(), Some("Hi!"));
        assert!(!reply.has_invocations());
        assert_eq!(reply.finish_reason.as_deref(), Some("stop"));
        assert_eq!(reply.usage.unwrap().total_tokens, 8);
    }

    #[test]
    fn test_gemini_parse_function_calls() {
        let driver = GeminiDriver::new("gemini-2.0-flash");
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"functionCall": {"name": "get_weather", "args": {"location": "Tokyo"}}},
                        {"functionCall": {"name": "get_current_location"}}
                    ],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        });
        let reply = driver.parse_response(&body).unwrap();
        assert!(reply.text.is_none());
        assert_eq!(reply.invocations.len(), 2);
        assert_eq!(reply.invocations[0].arguments["location"], "Tokyo");
        assert!(reply.invocations[1].arguments.is_empty());
        assert!(reply.invocations[1].id.is_none());
    }

    #[test]
    fn test_gemini_thought_signature_is_echoed() {
        let driver = GeminiDriver::new("gemini-2.5-flash");
        let body = json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "functionCall": {"name": "get_current_location", "args": {}},
                        "thoughtSignature": "c2lnLTE="
                    }],
                    "role": "model"
                }
            }]
        });
        let reply = driver.parse_response(&body).unwrap();
        let inv = reply.invocations[0].clone();
        assert_eq!(inv.thought_signature.as_deref(), Some("c2lnLTE="));

        let result = ToolResult::success(&inv, json!({"city": "Auckland"}));
        let history = vec![
            Turn::user("Where am I?"),
            Turn::invocation(inv),
            Turn::tool_result(result),
        ];
        let req = driver.build_request(&request(&history, &[])).unwrap();
        let part = &req.body["contents"][1]["parts"][0];
        assert_eq!(part["thoughtSignature"], "c2lnLTE=");
        assert_eq!(part["functionCall"]["name"], "get_current_location");
        assert!(req.body["contents"][2]["parts"][0]
            .get("thoughtSignature")
            .is_none());

        let unsigned = vec![Turn::invocation(ToolInvocation::new(
            "get_current_location",
            json!({}),
        ))];
        let req = driver.build_request(&request(&unsigned, &[])).unwrap();
        assert!(req.body["contents"][0]["parts"][0]
            .get("thoughtSignature")
            .is_none());
    }

    #[test]
    fn test_gemini_malformed_responses() {
        let driver = GeminiDriver::new("gemini-2.0-flash");

        let err = driver.parse_response(&json!({})).unwrap_err();
        assert!(matches!(
            err,
            Error::ModelUnavailable { code: StandardErrorCode::InvalidResponse, .. }
        ));

        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = driver.parse_response(&body).unwrap_err();
        assert!(err.to_string().contains("prompt blocked: SAFETY"));

        let body = json!({
            "candidates": [{"content": {"parts": [{"functionCall": {"name": "x", "args": [1]}}]}}]
        });
        assert!(driver.parse_response(&body).is_err());
    }

    #[test]
    fn test_gemini_finish_reason_normalization() {
        let driver = GeminiDriver::new("gemini-2.0-flash");
        let body = json!({
            "candidates": [{
                "content": { "parts": [{"text": "The forecast is"}], "role": "model" },
                "finishReason": "MAX_TOKENS"
            }]
        });
        let reply = driver.parse_response(&body).unwrap();
        assert_eq!(reply.text.as_deref(), Some("The forecast is"));
        assert_eq!(reply.finish_reason.as_deref(), Some("length"));
    }

    #[test]
    fn test_gemini_blocked_candidate_has_no_text() {
        let driver = GeminiDriver::new("gemini-2.0-flash");
        for body in [
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
            json!({"candidates": [{
                "content": { "parts": [{"text": ""}], "role": "model" },
                "finishReason": "SAFETY"
            }]}),
        ] {
            let reply = driver.parse_response(&body).unwrap();
            assert!(reply.text.is_none());
            assert!(!reply.has_invocations());
            assert_eq!(reply.finish_reason.as_deref(), Some("content_filter"));
        }
    }
}
