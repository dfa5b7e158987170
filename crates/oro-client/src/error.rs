use miette::{Diagnostic, NamedSource, SourceOffset};
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum OroClientError {
    /// A registry or endpoint URL could not be parsed.
    #[error(transparent)]
    #[diagnostic(code(oro_client::url_parse_error), url(docsrs))]
    UrlParseError(#[from] url::ParseError),

    /// The HTTP request itself failed.
    #[error(transparent)]
    #[diagnostic(code(oro_client::request_error), url(docsrs))]
    RequestError(#[from] reqwest::Error),

    /// A value could not be sent as an HTTP header.
    #[error(transparent)]
    #[diagnostic(code(oro_client::invalid_header_value), url(docsrs))]
    InvalidHeaderValue(#[from] reqwest::header::InvalidHeaderValue),

    /// The registry responded with JSON we could not understand.
    #[error("{source}")]
    #[diagnostic(code(oro_client::bad_json), url(docsrs))]
    BadJson {
        source: serde_json::Error,
        url: String,
        #[source_code]
        json: NamedSource,
        #[label("here")]
        err_loc: (usize, usize),
    },

    /// The registry rejected the login because the user does not exist.
    #[error("No such user: {0}")]
    #[diagnostic(
        code(oro_client::no_such_user),
        url(docsrs),
        help("Check the username, or create the account on the registry's website first.")
    )]
    NoSuchUserError(String),

    /// A one-time password was supplied but the registry still asked for one.
    #[error("The registry requires a one-time password, but the one provided was not accepted.")]
    #[diagnostic(code(oro_client::otp_required), url(docsrs))]
    OTPRequiredError,

    #[error("Incorrect username or password.")]
    #[diagnostic(code(oro_client::incorrect_password), url(docsrs))]
    IncorrectPasswordError,

    #[error("Invalid or expired token.")]
    #[diagnostic(code(oro_client::invalid_token), url(docsrs))]
    InvalidTokenError,

    /// Anything else the registry sent back that we did not expect.
    #[error("Unexpected response from registry: {0}")]
    #[diagnostic(code(oro_client::response_error), url(docsrs))]
    ResponseError(String),
}

impl OroClientError {
    pub fn from_json_err(err: serde_json::Error, url: String, json: String) -> Self {
        // These json strings can get VERY LONG and miette doesn't (yet?)
        // support any "windowing" mechanism for displaying stuff, so we have
        // to manually shorten the string to only the relevant bits and
        // translate the spans accordingly.
        let json_len = json.len();
        let offset = SourceOffset::from_location(&json, err.line(), err.column())
            .offset()
            .min(json_len);
        let local_offset = offset.saturating_sub(40);
        let local_len = std::cmp::min(40, json_len - offset);
        let snipped_json = json[local_offset..offset + local_len].to_string();
        Self::BadJson {
            source: err,
            url: url.clone(),
            json: NamedSource::new(url, snipped_json),
            err_loc: (offset - local_offset, 0),
        }
    }
}
