use std::sync::Arc;

use async_trait::async_trait;
use indexmap::IndexMap;
use oro_client::OroClient;
use url::Url;

use crate::config::Credentials;
use crate::error::OroNpmAccountError;
use crate::login::{LegacyAuth, WebAuth};
use crate::prompt::Prompter;

/// What a strategy gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct AuthRequest<'a> {
    pub registry: &'a Url,
    pub scope: Option<&'a str>,
    /// Credentials already stored for `registry`, if any.
    pub creds: Option<&'a Credentials>,
    pub always_auth: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthOutcome {
    /// Shown to the user once the credentials are saved.
    pub message: String,
    pub new_creds: Credentials,
}

/// One way of obtaining credentials from a registry.
#[async_trait]
pub trait AuthStrategy: Send + Sync {
    async fn authenticate(
        &self,
        request: &AuthRequest<'_>,
    ) -> Result<AuthOutcome, OroNpmAccountError>;
}

/// Auth strategies, by name.
#[derive(Default)]
pub struct AuthStrategies {
    strategies: IndexMap<String, Box<dyn AuthStrategy>>,
}

impl AuthStrategies {
    pub fn new() -> Self {
        Self::default()
    }

    /// The strategies `oro-login login --auth-type` knows about: `legacy`
    /// and `web`.
    pub fn builtin(client: OroClient, prompter: Arc<dyn Prompter>) -> Self {
        Self::new()
            .with("legacy", LegacyAuth::new(client.clone(), prompter.clone()))
            .with("web", WebAuth::new(client, prompter))
    }

    pub fn with(mut self, name: impl Into<String>, strategy: impl AuthStrategy + 'static) -> Self {
        self.register(name, strategy);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, strategy: impl AuthStrategy + 'static) {
        self.strategies.insert(name.into(), Box::new(strategy));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.strategies.keys().map(String::as_str)
    }

    pub fn resolve(&self, name: &str) -> Result<&dyn AuthStrategy, OroNpmAccountError> {
        self.strategies
            .get(name)
            .map(|strategy| strategy.as_ref())
            .ok_or_else(|| OroNpmAccountError::UnknownAuthType {
                name: name.into(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }
}
