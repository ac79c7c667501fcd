use clap::Parser;
use std::time::Duration;

use crate::identity::DEFAULT_IDENTITY_HEADER;
use crate::rate_limit::MAX_WINDOW_DURATION;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "tutor-gateway")]
#[command(about = "Callable AI tutoring endpoints with per-user rate limiting")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    // Base URL of the OpenAI-compatible upstream API
    #[arg(long, env = "UPSTREAM_URL", default_value = "https://api.openai.com/v1")]
    pub upstream_url: String,

    // Model identifier sent upstream
    #[arg(short, long, env = "UPSTREAM_MODEL", default_value = "gpt-4o-mini")]
    pub model: String,

    // Upstream API key, supplied out of band
    #[arg(long, env = "UPSTREAM_API_KEY", hide_env_values = true)]
    pub api_key: String,

    // Rate limit max requests per window
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..=MAX_WINDOW_DURATION.as_secs()))]
    pub rate_window: u64,

    // Wall-clock budget for one callable request, in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_seconds: u64,

    // Header carrying the authenticated user id
    #[arg(long, default_value = DEFAULT_IDENTITY_HEADER)]
    pub identity_header: String,

    // Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn invocation_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}
