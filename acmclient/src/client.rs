use std::sync::Arc;

use crate::{
    config::Config,
    error::Error,
};

/// HTTP implementation of the acl-manager backend.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct Client(Arc<ClientInner>);

struct ClientInner {
    config: Config,
    http: reqwest::Client,
}

impl Client {
    pub fn new(config: Config) -> Result<Self, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(config.request_timeout());
        if let Some(agent) = config.agent() {
            builder = builder.user_agent(agent.to_string());
        }
        Ok(Self(Arc::new(ClientInner {
            http: builder.build()?,
            config,
        })))
    }

    pub fn config(&self) -> &Config {
        &self.0.config
    }

    fn base(&self) -> &str {
        self.0.config.base_url()
    }
}

mod impls;
