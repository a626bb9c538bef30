use std::fmt;
use std::time::Duration;

use clap::{Parser, ValueEnum};

/// Which transport carries the fixtures push channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PushTransport {
    /// Server-Sent Events over HTTP
    Sse,
    /// WebSocket text frames
    Websocket,
}

impl fmt::Display for PushTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PushTransport::Sse => f.write_str("sse"),
            PushTransport::Websocket => f.write_str("websocket"),
        }
    }
}

/// Live football scores in the terminal
#[derive(Parser, Debug, Clone)]
#[command(name = "livescore-client", version, about)]
pub struct Config {
    /// Fixtures service base URL
    #[arg(long, env = "FIXTURES_API_URL", default_value = "http://localhost:3000/api")]
    pub api_url: String,

    /// Timeout for one-shot requests, in seconds (the push channel has none)
    #[arg(long, env = "REQUEST_TIMEOUT_SECS", default_value = "10")]
    pub request_timeout_secs: u64,

    /// Transport used for live updates
    #[arg(long, env = "PUSH_TRANSPORT", value_enum, default_value_t = PushTransport::Sse)]
    pub push_transport: PushTransport,

    /// Do not load today's fixtures on startup
    #[arg(long, env = "NO_AUTO_LOAD", default_value = "false")]
    pub no_auto_load: bool,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.api_url)
            .map_err(|e| anyhow::anyhow!("api_url '{}' is not a valid URL: {}", self.api_url, e))?;
        if !matches!(url.scheme(), "http" | "https") {
            anyhow::bail!("api_url must use http or https, got '{}'", url.scheme());
        }
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
