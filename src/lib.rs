//! `oro-login`: log in to and out of NPM registries.

use std::path::PathBuf;

use async_trait::async_trait;
use clap::{Parser, Subcommand};
use directories::ProjectDirs;
use miette::{IntoDiagnostic, Result};
use oro_config::{OroConfigOptions, OroConfigStore};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};
use url::Url;

use commands::login::LoginCmd;
use commands::logout::LogoutCmd;
use commands::OroCommand;

mod commands;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct OroLogin {
    /// Registry to log in to or out of. Defaults to the configured
    /// `registry`, or the public NPM registry.
    #[arg(global = true, long)]
    registry: Option<Url>,

    /// Package path to operate on. Its `oro.kdl` is read as project-level
    /// configuration.
    #[arg(global = true, long = "root")]
    root: Option<PathBuf>,

    /// User configuration file. Credentials are saved here.
    #[arg(global = true, long)]
    userconfig: Option<PathBuf>,

    /// Global configuration file to read configuration values from.
    #[arg(global = true, long)]
    globalconfig: Option<PathBuf>,

    /// Log output level/directive. Supports plain loglevels (off, error,
    /// warn, info, debug, trace) as well as more advanced directives in the
    /// format `target[span{field=value}]=level`.
    #[arg(global = true, long, default_value = "warn")]
    loglevel: String,

    /// Disable all logging output.
    #[arg(global = true, long, short)]
    quiet: bool,

    #[command(subcommand)]
    subcommand: OroCmd,
}

impl OroLogin {
    fn setup_logging(&self) -> Result<()> {
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr))
            .with(
                EnvFilter::builder()
                    .with_default_directive(if self.quiet {
                        LevelFilter::OFF.into()
                    } else {
                        self.loglevel.parse().into_diagnostic()?
                    })
                    .from_env_lossy(),
            )
            .init();
        Ok(())
    }

    fn config_options(&self) -> OroConfigOptions {
        let user_config = self.userconfig.clone().or_else(|| {
            ProjectDirs::from("", "", "oro-login").map(|d| d.config_dir().join("oro.kdl"))
        });
        let options = OroConfigOptions::new()
            .global_config_file(self.globalconfig.clone())
            .user_config_file(user_config)
            .pkg_root(self.root.clone());
        match &self.registry {
            Some(registry) => options.cli("registry", registry.as_str()),
            None => options,
        }
    }

    pub async fn load() -> Result<()> {
        let start = std::time::Instant::now();
        let oro = OroLogin::parse();
        oro.setup_logging()?;
        let mut config = oro.config_options().load()?;
        oro.execute(&mut config).await?;
        tracing::info!("Ran in {}s", start.elapsed().as_millis() as f32 / 1000.0);
        Ok(())
    }
}

#[derive(Debug, Subcommand)]
pub enum OroCmd {
    /// Log in to the registry.
    #[command(alias = "adduser", alias = "add-user")]
    Login(LoginCmd),

    /// Log out of the registry.
    Logout(LogoutCmd),
}

#[async_trait]
impl OroCommand for OroLogin {
    async fn execute(self, config: &mut OroConfigStore) -> Result<()> {
        tracing::debug!("Running command: {:#?}", self.subcommand);
        match self.subcommand {
            OroCmd::Login(login) => login.execute(config).await,
            OroCmd::Logout(logout) => logout.execute(config).await,
        }
    }
}
