use std::fmt::Debug;

use base64::{engine::general_purpose, Engine as _};
use oro_config::{ConfigStore, ConfigTier, ConfigValue};
use url::Url;

/// Deprecated registry-agnostic token key.
pub const LEGACY_TOKEN_KEY: &str = "_token";

pub const AUTH_TOKEN: &str = "_authToken";
pub const PASSWORD: &str = "_password";
pub const USERNAME: &str = "username";
pub const EMAIL: &str = "email";
pub const ALWAYS_AUTH: &str = "always-auth";

/// Credentials for a single registry, as handed out by an auth strategy.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Bearer token issued by the registry.
    Token(String),
    /// Username and password, sent with every request.
    Basic {
        username: String,
        password: String,
        email: Option<String>,
        always_auth: bool,
    },
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(***)"),
            Self::Basic {
                username,
                email,
                always_auth,
                ..
            } => f.write_fmt(format_args!(
                "Basic(username={username},password=***,email={email:?},always_auth={always_auth})"
            )),
        }
    }
}

/// Config key for `suffix` under `registry`, e.g.
/// `//registry.npmjs.org/:_authToken`.
pub fn registry_key(registry: &Url, suffix: &str) -> String {
    format!("{}:{suffix}", oro_client::nerf_dart(registry))
}

/// Writes `credentials` for `registry` into the user tier. Stale keys from
/// an earlier login that the new credentials don't overwrite, and the legacy
/// `_token`, are deleted first.
pub fn set_credentials_by_uri<C>(config: &mut C, registry: &Url, credentials: &Credentials)
where
    C: ConfigStore + ?Sized,
{
    let key = |suffix| registry_key(registry, suffix);
    match credentials {
        Credentials::Basic {
            username,
            password,
            email,
            always_auth,
        } => {
            config.del(LEGACY_TOKEN_KEY, ConfigTier::User);
            config.del(&key(AUTH_TOKEN), ConfigTier::User);
            if email.is_none() {
                config.del(&key(EMAIL), ConfigTier::User);
            }

            config.set(
                &key(PASSWORD),
                general_purpose::STANDARD.encode(password).into(),
                ConfigTier::User,
            );
            config.set(&key(USERNAME), username.as_str().into(), ConfigTier::User);
            if let Some(email) = email {
                config.set(&key(EMAIL), email.as_str().into(), ConfigTier::User);
            }
            config.set(
                &key(ALWAYS_AUTH),
                ConfigValue::Bool(*always_auth),
                ConfigTier::User,
            );
        }
        Credentials::Token(token) => {
            config.del(LEGACY_TOKEN_KEY, ConfigTier::User);
            config.del(&key(PASSWORD), ConfigTier::User);
            config.del(&key(USERNAME), ConfigTier::User);
            config.del(&key(EMAIL), ConfigTier::User);
            config.del(&key(ALWAYS_AUTH), ConfigTier::User);

            config.set(&key(AUTH_TOKEN), token.as_str().into(), ConfigTier::User);
        }
    }
}

/// Reads back whatever credentials are configured for `registry`, across
/// all tiers. A token wins over a username/password pair.
pub fn get_credentials_by_uri<C>(config: &C, registry: &Url) -> Option<Credentials>
where
    C: ConfigStore + ?Sized,
{
    let key = |suffix| registry_key(registry, suffix);
    if let Some(token) = config.get_str(&key(AUTH_TOKEN), None) {
        return Some(Credentials::Token(token.into()));
    }

    let username = config.get_str(&key(USERNAME), None)?;
    let password = config.get_str(&key(PASSWORD), None)?;
    let password = match general_purpose::STANDARD.decode(password) {
        Ok(password) => String::from_utf8_lossy(&password).to_string(),
        Err(e) => {
            tracing::warn!("Ignoring stored password for {registry}, it is not valid base64: {e}");
            return None;
        }
    };
    Some(Credentials::Basic {
        username: username.into(),
        password,
        email: config.get_str(&key(EMAIL), None).map(String::from),
        always_auth: config
            .get(&key(ALWAYS_AUTH), None)
            .and_then(ConfigValue::as_bool)
            .unwrap_or(false),
    })
}

/// Removes every credential key for `registry` from the user tier.
pub fn clear_credentials_by_uri<C>(config: &mut C, registry: &Url)
where
    C: ConfigStore + ?Sized,
{
    config.del(LEGACY_TOKEN_KEY, ConfigTier::User);
    for suffix in [AUTH_TOKEN, PASSWORD, USERNAME, EMAIL, ALWAYS_AUTH] {
        config.del(&registry_key(registry, suffix), ConfigTier::User);
    }
}
