use async_trait::async_trait;
use clap::Args;
use miette::Result;
use oro_client::OroClient;
use oro_config::{ConfigStore, ConfigTier, OroConfigStore};
use oro_npm_account::logout;

use crate::commands::OroCommand;

/// Log out of the registry.
///
/// Tokens are revoked on the registry before they're removed from your
/// user config.
#[derive(Debug, Args)]
pub struct LogoutCmd {
    /// Log out of the registry associated with this scope.
    #[arg(long)]
    scope: Option<String>,
}

#[async_trait]
impl OroCommand for LogoutCmd {
    async fn execute(self, config: &mut OroConfigStore) -> Result<()> {
        if let Some(scope) = self.scope {
            config.set("scope", scope.into(), ConfigTier::Cli);
        }
        logout(config, &OroClient::default(), |msg| println!("{msg}")).await?;
        Ok(())
    }
}
