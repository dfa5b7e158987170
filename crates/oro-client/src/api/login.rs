use crate::notify::Notify;
use crate::{OroClient, OroClientError};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, WWW_AUTHENTICATE};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, PartialEq)]
pub enum DoneURLResponse {
    Token(String),
    Duration(Duration),
}

/// The flavors of login the registry API knows about. Sent to the registry
/// as the `npm-auth-type` header.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum AuthType {
    Web,
    Legacy,
}

impl AuthType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthType::Web => "web",
            AuthType::Legacy => "legacy",
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub enum LoginCouchResponse {
    WebOTP { auth_url: String, done_url: String },
    ClassicOTP,
    Token(String),
    /// The registry accepted the credentials but did not hand out a token.
    /// Older couch-style registries do this, and expect the username and
    /// password to be sent on every request instead.
    Authorized,
}

#[derive(Serialize, Deserialize, Default)]
pub struct Token {
    pub token: String,
}

#[derive(Deserialize, Serialize, PartialEq, Debug)]
#[serde(rename_all = "camelCase")]
pub struct LoginWeb {
    pub login_url: String,
    pub done_url: String,
}

#[derive(Debug, Clone, Default)]
pub struct LoginOptions {
    pub scope: Option<String>,
}

#[derive(Deserialize, Serialize)]
struct LoginCouch {
    _id: String,
    name: String,
    password: String,
    r#type: String,
    roles: Vec<String>,
    date: String,
}

#[derive(Deserialize, Serialize, Default)]
struct CouchResponse {
    token: Option<String>,
}

#[derive(Deserialize, Serialize, Default)]
#[serde(rename_all = "camelCase")]
struct WebOTPResponse {
    auth_url: Option<String>,
    done_url: Option<String>,
}

impl OroClient {
    fn build_header(
        auth_type: AuthType,
        options: &LoginOptions,
    ) -> Result<HeaderMap, OroClientError> {
        let mut headers = HeaderMap::new();

        if let Some(scope) = &options.scope {
            headers.insert("npm-scope", HeaderValue::from_str(scope)?);
        }
        headers.insert("npm-auth-type", HeaderValue::from_static(auth_type.as_str()));
        headers.insert("npm-command", HeaderValue::from_static("login"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(headers)
    }

    pub async fn login_web(&self, options: &LoginOptions) -> Result<LoginWeb, OroClientError> {
        let headers = Self::build_header(AuthType::Web, options)?;
        let url = self.registry.join("-/v1/login")?;
        let text = self
            .client
            .post(url.clone())
            .headers(headers)
            .send()
            .await?
            .notify()
            .error_for_status()?
            .text()
            .await?;

        serde_json::from_str::<LoginWeb>(&text)
            .map_err(|e| OroClientError::from_json_err(e, url.to_string(), text))
    }

    pub async fn login_couch(
        &self,
        username: &str,
        password: &str,
        otp: Option<&str>,
        options: &LoginOptions,
    ) -> Result<LoginCouchResponse, OroClientError> {
        let mut headers = Self::build_header(AuthType::Legacy, options)?;
        let username_ = utf8_percent_encode(username, NON_ALPHANUMERIC).to_string();
        let url = self
            .registry
            .join(&format!("-/user/org.couchdb.user:{username_}"))?;

        if let Some(otp) = otp {
            headers.insert("npm-otp", HeaderValue::from_str(otp)?);
        }

        let body = LoginCouch {
            _id: format!("org.couchdb.user:{username}"),
            name: username.to_owned(),
            password: password.to_owned(),
            r#type: "user".to_owned(),
            roles: vec![],
            date: chrono::Local::now().to_rfc3339(),
        };

        let response = self
            .client
            .put(url.clone())
            .headers(headers)
            .basic_auth(username, Some(password))
            .json(&body)
            .send()
            .await?
            .notify();

        match response.status() {
            StatusCode::BAD_REQUEST => Err(OroClientError::NoSuchUserError(username.to_owned())),
            StatusCode::UNAUTHORIZED => {
                let www_authenticate = response
                    .headers()
                    .get(WWW_AUTHENTICATE)
                    .and_then(|header| header.to_str().ok())
                    .map(|header| header.to_lowercase())
                    .unwrap_or_default();

                let text = response.text().await?;
                let json = serde_json::from_str::<WebOTPResponse>(&text).unwrap_or_default();

                if www_authenticate.contains("otp") || text.to_lowercase().contains("one-time pass")
                {
                    if otp.is_some() {
                        return Err(OroClientError::OTPRequiredError);
                    }
                    if let (Some(auth_url), Some(done_url)) = (json.auth_url, json.done_url) {
                        Ok(LoginCouchResponse::WebOTP { auth_url, done_url })
                    } else {
                        Ok(LoginCouchResponse::ClassicOTP)
                    }
                } else if www_authenticate.contains("basic") {
                    Err(OroClientError::IncorrectPasswordError)
                } else if www_authenticate.contains("bearer") {
                    Err(OroClientError::InvalidTokenError)
                } else {
                    Err(OroClientError::ResponseError(text))
                }
            }
            status if status.is_client_error() || status.is_server_error() => Err(
                OroClientError::ResponseError(format!("{status}: {}", response.text().await?)),
            ),
            _ => {
                let text = response.text().await?;
                let body = serde_json::from_str::<CouchResponse>(&text)
                    .map_err(|e| OroClientError::from_json_err(e, url.to_string(), text))?;
                Ok(match body.token {
                    Some(token) => LoginCouchResponse::Token(token),
                    None => LoginCouchResponse::Authorized,
                })
            }
        }
    }

    pub async fn fetch_done_url(
        &self,
        done_url: impl AsRef<str>,
    ) -> Result<DoneURLResponse, OroClientError> {
        let headers = Self::build_header(AuthType::Web, &LoginOptions::default())?;

        let response = self
            .client
            .get(done_url.as_ref())
            .headers(headers)
            .send()
            .await?
            .notify();

        match response.status() {
            StatusCode::OK => {
                let text = response.text().await?;
                Ok(DoneURLResponse::Token(
                    serde_json::from_str::<Token>(&text)
                        .map_err(|e| {
                            OroClientError::from_json_err(e, done_url.as_ref().to_string(), text)
                        })?
                        .token,
                ))
            }
            StatusCode::ACCEPTED => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|header| header.to_str().ok())
                    .and_then(|header| header.trim().parse::<u64>().ok());
                match retry_after {
                    Some(secs) => Ok(DoneURLResponse::Duration(Duration::from_secs(secs))),
                    None => Err(OroClientError::ResponseError(format!(
                        "202 Accepted without a usable retry-after header: {}",
                        response.text().await?
                    ))),
                }
            }
            status => Err(OroClientError::ResponseError(format!(
                "{status}: {}",
                response.text().await?
            ))),
        }
    }
}
