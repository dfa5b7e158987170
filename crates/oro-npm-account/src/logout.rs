use oro_client::OroClient;
use oro_config::{ConfigStore, ConfigTier};
use url::Url;

use crate::config::{clear_credentials_by_uri, get_credentials_by_uri, Credentials};
use crate::error::OroNpmAccountError;
use crate::{normalize_scope, target_registry};

/// Forgets the credentials for the configured registry, revoking the token
/// on the registry first if there is one.
///
/// With a `scope` configured, the scope's registry is logged out of instead
/// (when it has one and `registry` didn't come from the command line), and
/// the `<scope>:registry` mapping is removed.
pub async fn logout<C, O>(
    config: &mut C,
    client: &OroClient,
    mut output: O,
) -> Result<(), OroNpmAccountError>
where
    C: ConfigStore + ?Sized,
    O: FnMut(&str),
{
    let scope = config.get_str("scope", None).and_then(normalize_scope);
    let registry_str = target_registry(&*config, scope.as_deref());
    let scope_key = scope.map(|scope| format!("{scope}:registry"));
    let registry =
        Url::parse(&registry_str).map_err(|source| OroNpmAccountError::InvalidRegistry {
            registry: registry_str.clone(),
            source,
        })?;

    match get_credentials_by_uri(&*config, &registry) {
        Some(Credentials::Token(token)) => {
            tracing::info!("Revoking token on {registry}");
            client
                .with_registry(registry.clone())
                .delete_token(&token)
                .await?;
        }
        Some(Credentials::Basic { username, .. }) => {
            tracing::debug!("Forgetting password for {username} on {registry}");
        }
        None => return Err(OroNpmAccountError::NotLoggedIn(registry_str)),
    }

    clear_credentials_by_uri(config, &registry);
    if let Some(scope_key) = &scope_key {
        config.del(scope_key, ConfigTier::User);
    }
    config.save(ConfigTier::User)?;
    output(&format!("Logged out of {registry_str}."));
    Ok(())
}
