use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::ConfigTier;

#[derive(Debug, Error, Diagnostic)]
pub enum OroConfigError {
    /// A config file exists but could not be read.
    #[error("Failed to read config file at {}: {source}", path.display())]
    #[diagnostic(code(oro_config::read_error), url(docsrs))]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A config file could not be written.
    #[error("Failed to write config file at {}: {source}", path.display())]
    #[diagnostic(code(oro_config::write_error), url(docsrs))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A config file is not valid KDL.
    #[error(transparent)]
    #[diagnostic(transparent)]
    KdlError(#[from] kdl::KdlError),

    /// Tried to save a tier that only lives in memory.
    #[error("The {0} config tier can't be saved to disk.")]
    #[diagnostic(
        code(oro_config::unsavable_tier),
        url(docsrs),
        help("Only the project, user, and global tiers are backed by files.")
    )]
    UnsavableTier(ConfigTier),

    /// Tried to save a file-backed tier that has no file location.
    #[error("No config file location is configured for the {0} tier.")]
    #[diagnostic(code(oro_config::no_config_file), url(docsrs))]
    NoConfigFile(ConfigTier),

    #[error("Unknown config tier: {0}")]
    #[diagnostic(
        code(oro_config::unknown_tier),
        url(docsrs),
        help("Valid tiers are: cli, env, project, user, global, default.")
    )]
    UnknownTier(String),
}
