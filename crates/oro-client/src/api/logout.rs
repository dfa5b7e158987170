use crate::notify::Notify;
use crate::{OroClient, OroClientError};

impl OroClient {
    /// Revokes `token` on the registry.
    pub async fn delete_token(&self, token: &str) -> Result<(), OroClientError> {
        let url = self.registry.join(&format!("-/user/token/{token}"))?;
        self.client
            .delete(url)
            .bearer_auth(token)
            .header("npm-command", "logout")
            .send()
            .await?
            .notify()
            .error_for_status()?;
        Ok(())
    }
}
