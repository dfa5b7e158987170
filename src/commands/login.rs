use std::sync::Arc;

use async_trait::async_trait;
use clap::Args;
use miette::Result;
use oro_client::OroClient;
use oro_config::{ConfigStore, ConfigTier, OroConfigStore};
use oro_npm_account::{adduser, AuthStrategies, TerminalPrompter};

use crate::commands::OroCommand;

/// Log in to the registry.
///
/// The resulting credentials are saved to your user config, keyed by
/// registry.
#[derive(Debug, Args)]
pub struct LoginCmd {
    /// What authentication strategy to use with login: `legacy` or `web`.
    #[arg(long)]
    auth_type: Option<String>,

    /// Associate an operation with a scope for a scoped registry.
    #[arg(long)]
    scope: Option<String>,

    /// Send the username and password with every request to this registry
    /// (legacy logins without a token only).
    #[arg(long)]
    always_auth: bool,
}

#[async_trait]
impl OroCommand for LoginCmd {
    async fn execute(self, config: &mut OroConfigStore) -> Result<()> {
        if let Some(auth_type) = self.auth_type {
            config.set("auth-type", auth_type.into(), ConfigTier::Cli);
        }
        if let Some(scope) = self.scope {
            config.set("scope", scope.into(), ConfigTier::Cli);
        }
        if self.always_auth {
            config.set("always-auth", true.into(), ConfigTier::Cli);
        }

        let strategies = AuthStrategies::builtin(OroClient::default(), Arc::new(TerminalPrompter));
        adduser(config, &strategies, |msg| println!("{msg}")).await?;
        Ok(())
    }
}
