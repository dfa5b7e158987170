//! Registry accounts: logging in and out, and keeping the resulting
//! credentials in configuration.

pub mod adduser;
pub mod config;
pub mod error;
pub mod login;
pub mod logout;
pub mod prompt;
pub mod strategy;

pub use adduser::adduser;
pub use config::Credentials;
pub use error::OroNpmAccountError;
pub use logout::logout;
pub use prompt::{Prompter, TerminalPrompter};
pub use strategy::{AuthOutcome, AuthRequest, AuthStrategies, AuthStrategy};

use oro_config::{ConfigStore, ConfigTier, DEFAULT_REGISTRY};

/// Scopes are always stored with their leading `@`.
pub(crate) fn normalize_scope(scope: &str) -> Option<String> {
    match scope.trim() {
        "" => None,
        scope if scope.starts_with('@') => Some(scope.to_owned()),
        scope => Some(format!("@{scope}")),
    }
}

/// The registry a command talks to. A scope's `<scope>:registry` mapping
/// wins over the configured `registry`, unless `registry` was passed on the
/// command line.
pub(crate) fn target_registry<C>(config: &C, scope: Option<&str>) -> String
where
    C: ConfigStore + ?Sized,
{
    let scoped = scope.and_then(|scope| config.get_str(&format!("{scope}:registry"), None));
    match scoped {
        Some(registry) if config.get("registry", Some(ConfigTier::Cli)).is_none() => {
            registry.to_owned()
        }
        _ => config
            .get_str("registry", None)
            .unwrap_or(DEFAULT_REGISTRY)
            .to_owned(),
    }
}
