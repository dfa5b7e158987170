//! Layered configuration for oro-login.
//!
//! Configuration is split into tiers. Lookups without an explicit tier walk
//! them in precedence order (`cli`, `env`, `project`, `user`, `global`,
//! `default`) and return the first hit. The `project`, `user`, and `global`
//! tiers are backed by KDL files and can be written back with
//! [`ConfigStore::save`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

pub use error::OroConfigError;
pub use store::OroConfigStore;

mod error;
mod kdl_source;
mod store;

/// Registry used when nothing else is configured.
pub const DEFAULT_REGISTRY: &str = "https://registry.npmjs.org/";

/// Auth strategy used when nothing else is configured.
pub const DEFAULT_AUTH_TYPE: &str = "legacy";

/// Prefix for environment variables that feed the `env` tier.
/// `ORO_CONFIG_AUTH_TYPE=web` becomes `auth-type = "web"`.
pub const ENV_PREFIX: &str = "ORO_CONFIG_";

/// A configuration layer, in lookup precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigTier {
    Cli,
    Env,
    Project,
    User,
    Global,
    Default,
}

impl ConfigTier {
    pub const ALL: [ConfigTier; 6] = [
        ConfigTier::Cli,
        ConfigTier::Env,
        ConfigTier::Project,
        ConfigTier::User,
        ConfigTier::Global,
        ConfigTier::Default,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfigTier::Cli => "cli",
            ConfigTier::Env => "env",
            ConfigTier::Project => "project",
            ConfigTier::User => "user",
            ConfigTier::Global => "global",
            ConfigTier::Default => "default",
        }
    }

    /// Whether this tier is read from, and saved to, a file.
    pub fn is_file_backed(&self) -> bool {
        matches!(
            self,
            ConfigTier::Project | ConfigTier::User | ConfigTier::Global
        )
    }
}

impl fmt::Display for ConfigTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigTier {
    type Err = OroConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigTier::ALL
            .into_iter()
            .find(|tier| tier.as_str() == s)
            .ok_or_else(|| OroConfigError::UnknownTier(s.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValue {
    String(String),
    Bool(bool),
    Integer(i64),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Booleans, plus the strings `"true"` and `"false"`, since environment
    /// variables can only ever be strings.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Bool(b) => Some(*b),
            ConfigValue::String(s) => s.parse().ok(),
            ConfigValue::Integer(_) => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => f.write_str(s),
            ConfigValue::Bool(b) => write!(f, "{b}"),
            ConfigValue::Integer(i) => write!(f, "{i}"),
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.into())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

/// Tiered key/value configuration that can be written back to disk.
pub trait ConfigStore {
    /// Looks `key` up in `tier`, or in every tier in precedence order when
    /// `tier` is `None`.
    fn get(&self, key: &str, tier: Option<ConfigTier>) -> Option<&ConfigValue>;

    fn set(&mut self, key: &str, value: ConfigValue, tier: ConfigTier);

    fn del(&mut self, key: &str, tier: ConfigTier);

    /// Persists `tier`. In-memory changes are kept if this fails.
    fn save(&mut self, tier: ConfigTier) -> Result<(), OroConfigError>;

    fn get_str(&self, key: &str, tier: Option<ConfigTier>) -> Option<&str> {
        self.get(key, tier).and_then(ConfigValue::as_str)
    }
}

pub struct OroConfigOptions {
    env: bool,
    defaults: bool,
    pkg_root: Option<PathBuf>,
    user_config_file: Option<PathBuf>,
    global_config_file: Option<PathBuf>,
    cli: Vec<(String, ConfigValue)>,
}

impl Default for OroConfigOptions {
    fn default() -> Self {
        OroConfigOptions {
            env: true,
            defaults: true,
            pkg_root: None,
            user_config_file: None,
            global_config_file: None,
            cli: Vec::new(),
        }
    }
}

impl OroConfigOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn env(mut self, env: bool) -> Self {
        self.env = env;
        self
    }

    pub fn defaults(mut self, defaults: bool) -> Self {
        self.defaults = defaults;
        self
    }

    /// Project root. Its `oro.kdl` backs the `project` tier.
    pub fn pkg_root(mut self, root: Option<PathBuf>) -> Self {
        self.pkg_root = root;
        self
    }

    pub fn user_config_file(mut self, file: Option<PathBuf>) -> Self {
        self.user_config_file = file;
        self
    }

    pub fn global_config_file(mut self, file: Option<PathBuf>) -> Self {
        self.global_config_file = file;
        self
    }

    /// Adds a value to the `cli` tier, which takes precedence over
    /// everything else.
    pub fn cli(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.cli.push((key.into(), value.into()));
        self
    }

    pub fn load(self) -> Result<OroConfigStore, OroConfigError> {
        let mut store = OroConfigStore::new();
        if self.defaults {
            store.set("registry", DEFAULT_REGISTRY.into(), ConfigTier::Default);
            store.set("auth-type", DEFAULT_AUTH_TYPE.into(), ConfigTier::Default);
        }
        if let Some(file) = self.global_config_file {
            store.load_file(ConfigTier::Global, file)?;
        }
        if let Some(file) = self.user_config_file {
            store.load_file(ConfigTier::User, file)?;
        }
        if let Some(root) = self.pkg_root {
            store.load_file(ConfigTier::Project, root.join("oro.kdl"))?;
        }
        if self.env {
            for (var, value) in std::env::vars() {
                if let Some(key) = env_config_key(&var) {
                    store.set(&key, value.into(), ConfigTier::Env);
                }
            }
        }
        for (key, value) in self.cli {
            store.set(&key, value, ConfigTier::Cli);
        }
        Ok(store)
    }
}

/// Maps an `ORO_CONFIG_*` environment variable to its config key:
/// `ORO_CONFIG_AUTH_TYPE` is `auth-type`.
fn env_config_key(var: &str) -> Option<String> {
    var.strip_prefix(ENV_PREFIX)
        .filter(|key| !key.is_empty())
        .map(|key| key.to_lowercase().replace('_', "-"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::env;
    use std::fs;

    use miette::{IntoDiagnostic, Result};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn env_configs() -> Result<()> {
        env::set_var("ORO_CONFIG_ENV_CONFIGS_TEST", "hello");
        let config = OroConfigOptions::new().load()?;
        env::remove_var("ORO_CONFIG_ENV_CONFIGS_TEST");
        assert_eq!(
            config.get_str("env-configs-test", Some(ConfigTier::Env)),
            Some("hello")
        );
        Ok(())
    }

    #[test]
    fn env_config_keys() {
        assert_eq!(
            env_config_key("ORO_CONFIG_AUTH_TYPE").as_deref(),
            Some("auth-type")
        );
        assert_eq!(
            env_config_key("ORO_CONFIG_ALWAYS_AUTH").as_deref(),
            Some("always-auth")
        );
        assert_eq!(env_config_key("ORO_CONFIG_").as_deref(), None);
        assert_eq!(env_config_key("NPM_CONFIG_REGISTRY").as_deref(), None);
    }

    #[test]
    fn user_config() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let file = dir.path().join("oro.kdl");
        fs::write(&file, "options {\n    registry \"https://registry.example.org/\"\n}\n")
            .into_diagnostic()?;
        let config = OroConfigOptions::new()
            .env(false)
            .user_config_file(Some(file))
            .load()?;
        assert_eq!(
            config.get_str("registry", None),
            Some("https://registry.example.org/")
        );
        assert_eq!(
            config.get_str("registry", Some(ConfigTier::Default)),
            Some(DEFAULT_REGISTRY)
        );
        Ok(())
    }

    #[test]
    fn precedence() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        fs::write(
            dir.path().join("oro.kdl"),
            "options {\n    auth-type \"web\"\n    scope \"@project\"\n}\n",
        )
        .into_diagnostic()?;
        let config = OroConfigOptions::new()
            .env(false)
            .pkg_root(Some(dir.path().to_owned()))
            .cli("scope", "@cli")
            .load()?;
        assert_eq!(config.get_str("auth-type", None), Some("web"));
        assert_eq!(config.get_str("scope", None), Some("@cli"));
        assert_eq!(
            config.get_str("scope", Some(ConfigTier::Project)),
            Some("@project")
        );
        Ok(())
    }

    #[test]
    fn missing_config() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let config = OroConfigOptions::new()
            .env(false)
            .defaults(false)
            .user_config_file(Some(dir.path().join("nope.kdl")))
            .load()?;
        assert!(config.get("registry", None).is_none());
        Ok(())
    }

    #[test]
    fn tier_names() -> Result<()> {
        assert_eq!("user".parse::<ConfigTier>()?, ConfigTier::User);
        assert!("nope".parse::<ConfigTier>().is_err());
        Ok(())
    }
}
