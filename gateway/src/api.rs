use axum::{
    extract::rejection::JsonRejection, http::StatusCode, response::IntoResponse,
    response::Response, Json,
};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use relay_core::flow::endpoint_name;
use relay_core::{Config, RunRequest};

// Input: What the client sends us. Every field is optional and forwarded raw.
// `None` means the key was absent; an explicit `null` is `Some(Value::Null)`.
#[derive(Debug, Default, Deserialize)]
pub struct RunFlowBody {
    #[serde(default, deserialize_with = "present")]
    pub message: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub endpoint: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub tweaks: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub application_token: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub output_type: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub input_type: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl RunFlowBody {
    /// Fills absent fields from the configured defaults.
    pub fn into_run_request(self, config: &Config) -> RunRequest {
        let mut request = RunRequest::new(self.message.unwrap_or_else(|| json!("")), config);
        if let Some(endpoint) = self.endpoint {
            request.endpoint = endpoint_name(&endpoint);
        }
        if let Some(tweaks) = self.tweaks {
            request.tweaks = tweaks;
        }
        if let Some(token) = self.application_token {
            request.application_token = token;
        }
        if let Some(output_type) = self.output_type {
            request.output_type = output_type;
        }
        if let Some(input_type) = self.input_type {
            request.input_type = input_type;
        }
        request
    }
}

/// The relay's only failure: any error becomes `400 {"error": "..."}`.
#[derive(Debug)]
pub struct RelayError(anyhow::Error);

impl RelayError {
    /// Body rejections already carry their cause in `body_text`.
    pub fn rejected(rejection: JsonRejection) -> Self {
        Self(anyhow::anyhow!(rejection.body_text()))
    }
}

impl<E> From<E> for RelayError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": format!("{:#}", self.0) }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
