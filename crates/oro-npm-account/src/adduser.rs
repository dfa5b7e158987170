use oro_config::{ConfigStore, ConfigTier, ConfigValue, DEFAULT_AUTH_TYPE};
use url::Url;

use crate::config::{get_credentials_by_uri, set_credentials_by_uri};
use crate::error::OroNpmAccountError;
use crate::{normalize_scope, target_registry};
use crate::strategy::{AuthOutcome, AuthRequest, AuthStrategies};

/// Logs in to the configured registry and saves the new credentials to the
/// user config. A scope that already maps to a registry logs in there
/// instead, unless `registry` came from the command line.
///
/// `auth-type`, `registry`, `scope` and `always-auth` are read from
/// `config`. The auth strategy is looked up in `strategies` before anything
/// is touched, so an unknown auth type leaves the config alone. Once the
/// strategy succeeds, stale credential keys are deleted, the new ones are
/// written, a scope gets its `<scope>:registry` mapping unless it already
/// has one, and the user tier is saved exactly once. `output` only sees the
/// strategy's message after a successful save.
///
/// Nothing is rolled back if saving fails: the in-memory config keeps the
/// new credentials.
pub async fn adduser<C, O>(
    config: &mut C,
    strategies: &AuthStrategies,
    mut output: O,
) -> Result<(), OroNpmAccountError>
where
    C: ConfigStore + ?Sized,
    O: FnMut(&str),
{
    let auth_type = config
        .get_str("auth-type", None)
        .unwrap_or(DEFAULT_AUTH_TYPE)
        .to_owned();
    let scope = config.get_str("scope", None).and_then(normalize_scope);
    let registry_str = target_registry(&*config, scope.as_deref());
    let always_auth = config
        .get("always-auth", None)
        .and_then(ConfigValue::as_bool)
        .unwrap_or(false);

    let strategy = strategies.resolve(&auth_type)?;
    let registry =
        Url::parse(&registry_str).map_err(|source| OroNpmAccountError::InvalidRegistry {
            registry: registry_str.clone(),
            source,
        })?;
    let creds = get_credentials_by_uri(&*config, &registry);

    tracing::info!("Logging in to {registry} ({auth_type})");
    let AuthOutcome { message, new_creds } = strategy
        .authenticate(&AuthRequest {
            registry: &registry,
            scope: scope.as_deref(),
            creds: creds.as_ref(),
            always_auth,
        })
        .await?;
    tracing::info!("Logged in to {registry}");

    set_credentials_by_uri(config, &registry, &new_creds);

    if let Some(scope) = &scope {
        let scope_key = format!("{scope}:registry");
        match config.get_str(&scope_key, None) {
            Some(existing) => {
                tracing::debug!("Keeping existing {scope_key} = {existing}");
            }
            None => config.set(&scope_key, registry_str.into(), ConfigTier::User),
        }
    }

    config.save(ConfigTier::User)?;
    output(&message);
    Ok(())
}
