use std::sync::Arc;

use reqwest::{Client, ClientBuilder};
use url::Url;

#[derive(Clone, Debug)]
pub struct OroClient {
    pub(crate) registry: Arc<Url>,
    pub(crate) client: Client,
}

impl OroClient {
    pub fn new(registry: Url) -> Self {
        Self {
            registry: Arc::new(registry),
            client: ClientBuilder::new()
                .user_agent(concat!("oro-login/", env!("CARGO_PKG_VERSION")))
                .pool_max_idle_per_host(20)
                .build()
                .expect("Failed to build HTTP client."),
        }
    }

    /// Returns a client that talks to `registry`, sharing the underlying
    /// connection pool with this one.
    pub fn with_registry(&self, registry: Url) -> Self {
        Self {
            registry: Arc::new(registry),
            client: self.client.clone(),
        }
    }

    pub fn registry(&self) -> &Url {
        &self.registry
    }
}

impl Default for OroClient {
    fn default() -> Self {
        Self::new(Url::parse("https://registry.npmjs.org/").expect("static URL is valid"))
    }
}
