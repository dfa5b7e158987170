use std::sync::Arc;

use async_trait::async_trait;
use oro_client::login::{DoneURLResponse, LoginCouchResponse, LoginOptions};
use oro_client::OroClient;

use crate::config::Credentials;
use crate::error::OroNpmAccountError;
use crate::prompt::Prompter;
use crate::strategy::{AuthOutcome, AuthRequest, AuthStrategy};

/// Username/password login against the registry's couch-style user
/// endpoint, with one-time password support.
pub struct LegacyAuth {
    client: OroClient,
    prompter: Arc<dyn Prompter>,
}

impl LegacyAuth {
    pub fn new(client: OroClient, prompter: Arc<dyn Prompter>) -> Self {
        Self { client, prompter }
    }
}

#[async_trait]
impl AuthStrategy for LegacyAuth {
    async fn authenticate(
        &self,
        request: &AuthRequest<'_>,
    ) -> Result<AuthOutcome, OroNpmAccountError> {
        let client = self.client.with_registry(request.registry.clone());
        let (default_username, default_email) = match request.creds {
            Some(Credentials::Basic {
                username, email, ..
            }) => (Some(username.as_str()), email.as_deref()),
            _ => (None, None),
        };

        let username = self
            .prompter
            .input("Username", default_username)
            .map_err(OroNpmAccountError::ReadUserInputError)?;
        let password = self
            .prompter
            .password("Password")
            .map_err(OroNpmAccountError::ReadUserInputError)?;
        let email = self
            .prompter
            .input("Email (this IS public)", default_email)
            .map_err(OroNpmAccountError::ReadUserInputError)?;

        let options = LoginOptions {
            scope: request.scope.map(String::from),
        };
        let token = match client
            .login_couch(&username, &password, None, &options)
            .await?
        {
            LoginCouchResponse::WebOTP { auth_url, done_url } => {
                self.prompter
                    .open_url(&auth_url)
                    .map_err(OroNpmAccountError::OpenURLError)?;
                Some(poll_done_url(&client, &done_url).await?)
            }
            LoginCouchResponse::ClassicOTP => {
                let otp = self
                    .prompter
                    .input(
                        "This operation requires a one-time password. Enter OTP",
                        None,
                    )
                    .map_err(OroNpmAccountError::ReadUserInputError)?;

                match client
                    .login_couch(&username, &password, Some(&otp), &options)
                    .await?
                {
                    LoginCouchResponse::Token(token) => Some(token),
                    LoginCouchResponse::Authorized => None,
                    _ => return Err(OroNpmAccountError::UnexpectedResponseError),
                }
            }
            LoginCouchResponse::Token(token) => Some(token),
            LoginCouchResponse::Authorized => None,
        };
        tracing::info!("Authorized user {username}");

        let scope_message = request
            .scope
            .map(|scope| format!(" to scope {scope}"))
            .unwrap_or_default();
        let message = format!(
            "Logged in as {username}{scope_message} on {}.",
            request.registry
        );
        let new_creds = match token {
            Some(token) => Credentials::Token(token),
            None => Credentials::Basic {
                username,
                password,
                email: Some(email),
                always_auth: request.always_auth,
            },
        };
        Ok(AuthOutcome { message, new_creds })
    }
}

/// Browser-based login: the registry hands out a login URL, and we wait for
/// the user to finish there.
pub struct WebAuth {
    client: OroClient,
    prompter: Arc<dyn Prompter>,
}

impl WebAuth {
    pub fn new(client: OroClient, prompter: Arc<dyn Prompter>) -> Self {
        Self { client, prompter }
    }
}

#[async_trait]
impl AuthStrategy for WebAuth {
    async fn authenticate(
        &self,
        request: &AuthRequest<'_>,
    ) -> Result<AuthOutcome, OroNpmAccountError> {
        let client = self.client.with_registry(request.registry.clone());
        let login_web = client
            .login_web(&LoginOptions {
                scope: request.scope.map(String::from),
            })
            .await?;
        self.prompter
            .open_url(&login_web.login_url)
            .map_err(OroNpmAccountError::OpenURLError)?;
        let token = poll_done_url(&client, &login_web.done_url).await?;

        let scope_message = request
            .scope
            .map(|scope| format!(" to scope {scope}"))
            .unwrap_or_default();
        Ok(AuthOutcome {
            message: format!("Logged in on {}{scope_message}.", request.registry),
            new_creds: Credentials::Token(token),
        })
    }
}

async fn poll_done_url(client: &OroClient, done_url: &str) -> Result<String, OroNpmAccountError> {
    loop {
        match client.fetch_done_url(done_url).await? {
            DoneURLResponse::Token(token) => break Ok(token),
            DoneURLResponse::Duration(duration) => {
                tracing::debug!("Login not done yet, checking again in {duration:?}");
                async_std::task::sleep(duration).await;
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use miette::{IntoDiagnostic, Result};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use url::Url;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Answers prompts from a script and remembers which URLs it was asked
    /// to open.
    #[derive(Default)]
    struct ScriptedPrompter {
        answers: Mutex<VecDeque<String>>,
        opened: Mutex<Vec<String>>,
    }

    impl ScriptedPrompter {
        fn new(answers: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                answers: Mutex::new(answers.iter().map(|s| s.to_string()).collect()),
                opened: Mutex::new(Vec::new()),
            })
        }

        fn next(&self) -> std::io::Result<String> {
            self.answers
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::Other, "out of answers"))
        }
    }

    impl Prompter for ScriptedPrompter {
        fn input(&self, _prompt: &str, _default: Option<&str>) -> std::io::Result<String> {
            self.next()
        }

        fn password(&self, _prompt: &str) -> std::io::Result<String> {
            self.next()
        }

        fn open_url(&self, url: &str) -> std::io::Result<()> {
            self.opened.lock().unwrap().push(url.to_owned());
            Ok(())
        }
    }

    fn request(registry: &Url) -> AuthRequest<'_> {
        AuthRequest {
            registry,
            scope: None,
            creds: None,
            always_auth: false,
        }
    }

    #[async_std::test]
    async fn legacy_token() -> Result<()> {
        let mock_server = MockServer::start().await;
        let registry: Url = mock_server.uri().parse().into_diagnostic()?;
        Mock::given(method("PUT"))
            .and(path("-/user/org.couchdb.user:u"))
            .and(header("npm-scope", "@myscope"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "XXXXXX" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let prompter = ScriptedPrompter::new(&["u", "p", "u@example.org"]);
        let auth = LegacyAuth::new(OroClient::default(), prompter);
        let outcome = auth
            .authenticate(&AuthRequest {
                scope: Some("@myscope"),
                ..request(&registry)
            })
            .await?;

        assert_eq!(outcome.new_creds, Credentials::Token("XXXXXX".into()));
        assert_eq!(
            outcome.message,
            format!("Logged in as u to scope @myscope on {registry}.")
        );
        Ok(())
    }

    #[async_std::test]
    async fn legacy_without_token() -> Result<()> {
        let mock_server = MockServer::start().await;
        let registry: Url = mock_server.uri().parse().into_diagnostic()?;
        Mock::given(method("PUT"))
            .and(path("-/user/org.couchdb.user:u"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "ok": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let prompter = ScriptedPrompter::new(&["u", "p", "u@example.org"]);
        let auth = LegacyAuth::new(OroClient::default(), prompter);
        let outcome = auth
            .authenticate(&AuthRequest {
                always_auth: true,
                ..request(&registry)
            })
            .await?;

        assert_eq!(
            outcome.new_creds,
            Credentials::Basic {
                username: "u".into(),
                password: "p".into(),
                email: Some("u@example.org".into()),
                always_auth: true,
            }
        );
        assert_eq!(outcome.message, format!("Logged in as u on {registry}."));
        Ok(())
    }

    #[async_std::test]
    async fn legacy_classic_otp() -> Result<()> {
        let mock_server = MockServer::start().await;
        let registry: Url = mock_server.uri().parse().into_diagnostic()?;
        Mock::given(method("PUT"))
            .and(path("-/user/org.couchdb.user:u"))
            .and(header("npm-otp", "123456"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "token": "OTPTOKEN" })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("PUT"))
            .and(path("-/user/org.couchdb.user:u"))
            .respond_with(
                ResponseTemplate::new(401).append_header("www-authenticate", "OTP"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let prompter = ScriptedPrompter::new(&["u", "p", "u@example.org", "123456"]);
        let auth = LegacyAuth::new(OroClient::default(), prompter);
        let outcome = auth.authenticate(&request(&registry)).await?;

        assert_eq!(outcome.new_creds, Credentials::Token("OTPTOKEN".into()));
        Ok(())
    }

    #[async_std::test]
    async fn legacy_prompt_failure() -> Result<()> {
        let registry = Url::parse("https://registry.example.org/").into_diagnostic()?;
        let prompter = ScriptedPrompter::new(&["u"]);
        let auth = LegacyAuth::new(OroClient::default(), prompter);
        assert!(matches!(
            auth.authenticate(&request(&registry)).await,
            Err(OroNpmAccountError::ReadUserInputError(_))
        ));
        Ok(())
    }

    #[async_std::test]
    async fn web_login_polls_until_done() -> Result<()> {
        let mock_server = MockServer::start().await;
        let registry: Url = mock_server.uri().parse().into_diagnostic()?;
        let done_url = format!("{}/-/v1/done", mock_server.uri());
        Mock::given(method("POST"))
            .and(path("-/v1/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "loginUrl": "https://example.com/login?next=/login/cli/foo",
                "doneUrl": done_url,
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("-/v1/done"))
            .respond_with(ResponseTemplate::new(202).append_header("retry-after", "0"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("-/v1/done"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "WEBTOKEN" })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let prompter = ScriptedPrompter::new(&[]);
        let auth = WebAuth::new(OroClient::default(), prompter.clone());
        let outcome = auth.authenticate(&request(&registry)).await?;

        assert_eq!(outcome.new_creds, Credentials::Token("WEBTOKEN".into()));
        assert_eq!(outcome.message, format!("Logged in on {registry}."));
        assert_eq!(
            *prompter.opened.lock().unwrap(),
            vec!["https://example.com/login?next=/login/cli/foo".to_string()]
        );
        Ok(())
    }
}
