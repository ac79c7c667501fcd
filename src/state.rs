use std::sync::Arc;
use std::time::Duration;
use crate::identity::DEFAULT_IDENTITY_HEADER;
use crate::rate_limit::RateLimiter;
use crate::upstream::TextGenerator;
// app's shared state

pub struct AppState {
    pub generator: Arc<dyn TextGenerator>,
    pub rate_limiter: Arc<dyn RateLimiter>,
    pub identity_header: String,     // header the auth layer puts the uid in
    pub invocation_timeout: Duration, // wall-clock budget per callable request
}

impl AppState {
    pub fn new(generator: Arc<dyn TextGenerator>, rate_limiter: Arc<dyn RateLimiter>) -> Self {
        Self {
            generator,
            rate_limiter,
            identity_header: DEFAULT_IDENTITY_HEADER.to_string(),
            invocation_timeout: Duration::from_secs(30),
        }
    }

    pub fn with_identity_header(mut self, header: impl Into<String>) -> Self {
        self.identity_header = header.into().to_ascii_lowercase();
        self
    }

    pub fn with_invocation_timeout(mut self, timeout: Duration) -> Self {
        self.invocation_timeout = timeout;
        self
    }
}
