use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::tweaks::Tweaks;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 5000;

/// Process-wide settings, read once at startup and never mutated.
///
/// The downstream variables (`BASE_API_URL`, `LANGFLOW_ID`, `ENDPOINT`, ...)
/// are not required: a missing value becomes an empty string and the
/// resulting malformed URL or missing auth shows up on the first relayed call.
#[derive(Clone)]
pub struct Config {
    pub base_api_url: String,
    /// Tenant segment of the run URL.
    pub langflow_id: String,
    /// Reserved; the run path addresses flows by endpoint name.
    pub flow_id: String,
    pub application_token: String,
    /// Endpoint used when a request does not name one.
    pub endpoint: String,
    pub tweaks: Tweaks,
    pub host: String,
    pub port: u16,
    /// `None` means the downstream call may block indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Config {
    /// Loads configuration from the process environment.
    pub async fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok()).await
    }

    /// Loads configuration through an arbitrary variable lookup.
    pub async fn from_lookup<F>(var: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| var(key).unwrap_or_default();
        let set = |key: &str| var(key).filter(|v| !v.trim().is_empty());

        let port = match set("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("PORT must be a valid port number, got '{}'", raw))?,
            None => DEFAULT_PORT,
        };

        let request_timeout = match set("REQUEST_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().with_context(|| {
                    format!("REQUEST_TIMEOUT_SECS must be a whole number of seconds, got '{}'", raw)
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        let tweaks = match set("TWEAKS_FILE") {
            Some(path) => Tweaks::load(&path).await?,
            None => Tweaks::default(),
        };

        Ok(Self {
            base_api_url: text("BASE_API_URL"),
            langflow_id: text("LANGFLOW_ID"),
            flow_id: text("FLOW_ID"),
            application_token: text("APPLICATION_TOKEN"),
            endpoint: text("ENDPOINT"),
            tweaks,
            host: set("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            request_timeout,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.application_token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("Config")
            .field("base_api_url", &self.base_api_url)
            .field("langflow_id", &self.langflow_id)
            .field("flow_id", &self.flow_id)
            .field("application_token", &token)
            .field("endpoint", &self.endpoint)
            .field("tweaks", &self.tweaks.len())
            .field("host", &self.host)
            .field("port", &self.port)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
