use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::Config;

/// Input and output type used when a request does not set one.
pub const DEFAULT_IO_TYPE: &str = "chat";

/// One fully-resolved call to a flow. Built fresh for every inbound request.
///
/// Caller-supplied values stay raw JSON: they are forwarded, not validated.
#[derive(Debug, Clone, PartialEq)]
pub struct RunRequest {
    pub message: Value,
    pub endpoint: String,
    pub tweaks: Value,
    /// Only a truthy token adds auth headers; a truthy non-string is an error.
    pub application_token: Value,
    pub output_type: Value,
    pub input_type: Value,
}

impl RunRequest {
    /// A request for `message` with every other field taken from `config`.
    pub fn new(message: impl Into<Value>, config: &Config) -> Self {
        Self {
            message: message.into(),
            endpoint: config.endpoint.clone(),
            tweaks: config.tweaks.to_value(),
            application_token: Value::String(config.application_token.clone()),
            output_type: Value::from(DEFAULT_IO_TYPE),
            input_type: Value::from(DEFAULT_IO_TYPE),
        }
    }

    pub fn payload(&self) -> RunPayload<'_> {
        RunPayload {
            input_value: &self.message,
            output_type: &self.output_type,
            input_type: &self.input_type,
            tweaks: is_truthy(&self.tweaks).then_some(&self.tweaks),
        }
    }

    /// The bearer token to send, if any.
    pub fn bearer_token(&self) -> Result<Option<&str>> {
        if !is_truthy(&self.application_token) {
            return Ok(None);
        }
        match &self.application_token {
            Value::String(token) => Ok(Some(token)),
            other => anyhow::bail!("application_token must be a string, got {}", other),
        }
    }
}

/// Body posted to the flow's run endpoint.
#[derive(Debug, Serialize)]
pub struct RunPayload<'a> {
    pub input_value: &'a Value,
    pub output_type: &'a Value,
    pub input_type: &'a Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweaks: Option<&'a Value>,
}

/// JSON truthiness: `null`, `false`, `0`, and empty strings, arrays and
/// objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Path segment for an endpoint value: strings as-is, anything else as its
/// JSON text.
pub fn endpoint_name(value: &Value) -> String {
    match value {
        Value::String(name) => name.clone(),
        other => other.to_string(),
    }
}

/// `{base}/lf/{tenant}/api/v1/run/{endpoint}`, substituted verbatim.
pub fn run_url(config: &Config, endpoint: &str) -> String {
    format!(
        "{}/lf/{}/api/v1/run/{}",
        config.base_api_url, config.langflow_id, endpoint
    )
}

/// Client for the downstream flow-execution API.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct FlowClient {
    http: reqwest::Client,
    config: Arc<Config>,
}

impl FlowClient {
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self { http, config })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a flow and returns its JSON response untouched.
    ///
    /// The downstream status code is not checked: any JSON body is relayed.
    /// Transport failures and non-JSON bodies are errors.
    pub async fn run(&self, request: &RunRequest) -> Result<Value> {
        let url = run_url(&self.config, &request.endpoint);
        debug!(url = %url, tweaks = is_truthy(&request.tweaks), "Posting to flow");

        let mut call = self.http.post(&url);
        if let Some(token) = request.bearer_token()? {
            call = call
                .bearer_auth(token)
                .header(CONTENT_TYPE, "application/json");
        }

        // Headers go first so `json` does not add a second content type.
        let response = call
            .json(&request.payload())
            .send()
            .await
            .with_context(|| format!("Request to flow endpoint '{}' failed", request.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            warn!(endpoint = %request.endpoint, %status, "Flow API answered with an error status");
        }

        response.json::<Value>().await.with_context(|| {
            format!(
                "Flow endpoint '{}' returned a body that is not JSON (status {})",
                request.endpoint, status
            )
        })
    }
}
