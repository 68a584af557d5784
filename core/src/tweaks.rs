use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::fs;

// Components of the default flow, each with an empty override object.
const DEFAULT_COMPONENTS: [&str; 5] = [
    "Agent-6ghf2",
    "ChatInput-atyby",
    "ChatOutput-aXeAI",
    "Prompt-ZOcYT",
    "AstraDBToolComponent-NjvxE",
];

/// Per-component overrides forwarded to the flow untouched.
///
/// Keys are component ids, values are whatever the flow accepts for that
/// component. Only the outer shape (a JSON object) is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tweaks(Map<String, Value>);

impl Default for Tweaks {
    fn default() -> Self {
        let components = DEFAULT_COMPONENTS
            .iter()
            .map(|id| (id.to_string(), Value::Object(Map::new())))
            .collect();
        Self(components)
    }
}

impl Tweaks {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }

    /// Reads a tweaks map from a JSON file whose top level is an object.
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to read tweaks at '{}': {}", path, e))?;

        let tweaks: Tweaks = serde_json::from_str(&content)
            .with_context(|| format!("Tweaks file '{}' must contain a JSON object", path))?;

        for (component, overrides) in tweaks.as_map() {
            if !overrides.is_object() {
                tracing::warn!(
                    "Tweak for component '{}' is not an object; forwarding it as-is",
                    component
                );
            }
        }

        Ok(tweaks)
    }
}
