use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use kdl::KdlDocument;

use crate::kdl_source::{read_options, write_options};
use crate::{ConfigStore, ConfigTier, ConfigValue, OroConfigError};

#[derive(Debug, Default)]
struct ConfigLayer {
    values: IndexMap<String, ConfigValue>,
    file: Option<PathBuf>,
    document: KdlDocument,
}

/// The standard [`ConfigStore`]: one ordered map per tier, with file-backed
/// tiers remembering the KDL document they were read from.
#[derive(Debug, Default)]
pub struct OroConfigStore {
    layers: BTreeMap<ConfigTier, ConfigLayer>,
}

impl OroConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points `tier` at `path` and loads it. A missing file is fine: the
    /// tier simply starts out empty and the file is created on save.
    pub fn load_file(
        &mut self,
        tier: ConfigTier,
        path: impl Into<PathBuf>,
    ) -> Result<(), OroConfigError> {
        let path = path.into();
        let document: KdlDocument = match std::fs::read_to_string(&path) {
            Ok(text) => text.parse()?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No {tier} config at {}", path.display());
                KdlDocument::new()
            }
            Err(source) => return Err(OroConfigError::ReadError { path, source }),
        };
        tracing::debug!("Loaded {tier} config from {}", path.display());
        let layer = self.layers.entry(tier).or_default();
        layer.values = read_options(&document);
        layer.document = document;
        layer.file = Some(path);
        Ok(())
    }

    /// The file backing `tier`, if any.
    pub fn file(&self, tier: ConfigTier) -> Option<&Path> {
        self.layers
            .get(&tier)
            .and_then(|layer| layer.file.as_deref())
    }

    /// The highest-precedence tier that defines `key`.
    pub fn tier_of(&self, key: &str) -> Option<ConfigTier> {
        self.layers
            .iter()
            .find(|(_, layer)| layer.values.contains_key(key))
            .map(|(tier, _)| *tier)
    }
}

impl ConfigStore for OroConfigStore {
    fn get(&self, key: &str, tier: Option<ConfigTier>) -> Option<&ConfigValue> {
        match tier {
            Some(tier) => self.layers.get(&tier)?.values.get(key),
            None => self
                .layers
                .values()
                .find_map(|layer| layer.values.get(key)),
        }
    }

    fn set(&mut self, key: &str, value: ConfigValue, tier: ConfigTier) {
        tracing::trace!("config set {key} ({tier})");
        self.layers
            .entry(tier)
            .or_default()
            .values
            .insert(key.to_string(), value);
    }

    fn del(&mut self, key: &str, tier: ConfigTier) {
        tracing::trace!("config del {key} ({tier})");
        if let Some(layer) = self.layers.get_mut(&tier) {
            layer.values.shift_remove(key);
        }
    }

    fn save(&mut self, tier: ConfigTier) -> Result<(), OroConfigError> {
        if !tier.is_file_backed() {
            return Err(OroConfigError::UnsavableTier(tier));
        }
        let layer = self
            .layers
            .get_mut(&tier)
            .ok_or(OroConfigError::NoConfigFile(tier))?;
        let path = layer
            .file
            .clone()
            .ok_or(OroConfigError::NoConfigFile(tier))?;
        write_options(&mut layer.document, &layer.values);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| OroConfigError::WriteError {
                path: path.clone(),
                source,
            })?;
        }
        std::fs::write(&path, layer.document.to_string())
            .map_err(|source| OroConfigError::WriteError {
                path: path.clone(),
                source,
            })?;
        tracing::debug!("Saved {tier} config to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use miette::{IntoDiagnostic, Result};
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    #[test]
    fn tierless_get_walks_precedence() {
        let mut store = OroConfigStore::new();
        store.set("registry", "https://global.example/".into(), ConfigTier::Global);
        store.set("registry", "https://user.example/".into(), ConfigTier::User);
        assert_eq!(store.get_str("registry", None), Some("https://user.example/"));
        assert_eq!(store.tier_of("registry"), Some(ConfigTier::User));

        store.del("registry", ConfigTier::User);
        assert_eq!(
            store.get_str("registry", None),
            Some("https://global.example/")
        );
        assert_eq!(store.get("registry", Some(ConfigTier::User)), None);
    }

    #[test]
    fn save_round_trips_through_disk() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let path = dir.path().join("nested").join("oro.kdl");

        let mut store = OroConfigStore::new();
        store.load_file(ConfigTier::User, &path)?;
        store.set("//registry.example/:username", "u".into(), ConfigTier::User);
        store.set("//registry.example/:always-auth", false.into(), ConfigTier::User);
        store.save(ConfigTier::User)?;

        let mut reloaded = OroConfigStore::new();
        reloaded.load_file(ConfigTier::User, &path)?;
        assert_eq!(
            reloaded.get_str("//registry.example/:username", Some(ConfigTier::User)),
            Some("u")
        );
        assert_eq!(
            reloaded.get("//registry.example/:always-auth", None),
            Some(&ConfigValue::Bool(false))
        );
        Ok(())
    }

    #[test]
    fn unsavable_tiers() {
        let mut store = OroConfigStore::new();
        store.set("scope", "@foo".into(), ConfigTier::Cli);
        store.set("scope", "@foo".into(), ConfigTier::User);
        assert!(matches!(
            store.save(ConfigTier::Cli),
            Err(OroConfigError::UnsavableTier(ConfigTier::Cli))
        ));
        assert!(matches!(
            store.save(ConfigTier::User),
            Err(OroConfigError::NoConfigFile(ConfigTier::User))
        ));
    }

    #[test]
    fn bad_kdl_is_an_error() -> Result<()> {
        let dir = tempdir().into_diagnostic()?;
        let path = dir.path().join("oro.kdl");
        std::fs::write(&path, "options {").into_diagnostic()?;
        let mut store = OroConfigStore::new();
        assert!(matches!(
            store.load_file(ConfigTier::User, &path),
            Err(OroConfigError::KdlError(_))
        ));
        Ok(())
    }
}
