use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum OroNpmAccountError {
    /// An error was thrown in OroClient.
    #[error(transparent)]
    #[diagnostic(transparent)]
    ClientError(#[from] oro_client::OroClientError),

    /// Configuration could not be read or saved. Surfaced exactly as the
    /// config store reported it.
    #[error(transparent)]
    #[diagnostic(transparent)]
    ConfigError(#[from] oro_config::OroConfigError),

    /// Failed to open URL.
    #[error(transparent)]
    #[diagnostic(code(oro_npm_account::url_open_error), url(docsrs))]
    OpenURLError(std::io::Error),

    /// Failed to read user input.
    #[error(transparent)]
    #[diagnostic(code(oro_npm_account::read_user_input_error), url(docsrs))]
    ReadUserInputError(std::io::Error),

    /// The configured auth type doesn't name a known auth strategy.
    #[error("no such auth module: {name}")]
    #[diagnostic(
        code(oro_npm_account::unknown_auth_type),
        url(docsrs),
        help("Available auth types: {available}.")
    )]
    UnknownAuthType { name: String, available: String },

    /// The configured registry isn't a valid URL.
    #[error("Invalid registry URL: {registry}")]
    #[diagnostic(code(oro_npm_account::invalid_registry), url(docsrs))]
    InvalidRegistry {
        registry: String,
        source: url::ParseError,
    },

    /// There are no credentials stored for this registry.
    #[error("Not logged in to {0}, so can't log out!")]
    #[diagnostic(code(oro_npm_account::not_logged_in), url(docsrs))]
    NotLoggedIn(String),

    /// Received unexpected response.
    #[error("Received unexpected response.")]
    #[diagnostic(code(oro_npm_account::unexpected_response_error), url(docsrs))]
    UnexpectedResponseError,
}
