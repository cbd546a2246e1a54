use std::time::Duration;

use crate::error::Error;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for the acl-manager client.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    base_url: String,
    timeout: Duration,
    user_agent: Option<String>,
}

impl Config {
    pub fn new(base_url: impl Into<String>) -> Result<Self, Error> {
        let base_url = base_url.into();
        let trimmed = base_url.trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(Error::BaseUrl(base_url));
        }
        Ok(Self {
            base_url: trimmed.to_string(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: None,
        })
    }

    pub fn timeout(mut self, val: Duration) -> Self {
        self.timeout = val;
        self
    }

    pub fn user_agent(mut self, val: impl Into<String>) -> Self {
        self.user_agent = Some(val.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    pub fn agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}
