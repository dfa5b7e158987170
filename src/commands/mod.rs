use async_trait::async_trait;
use miette::Result;
use oro_config::OroConfigStore;

pub mod login;
pub mod logout;

#[async_trait]
pub trait OroCommand {
    async fn execute(self, config: &mut OroConfigStore) -> Result<()>;
}
