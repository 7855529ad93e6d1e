//! Yammer REST client.
//!
//! Authentication follows the OAuth authorization-code flow by driving the
//! browser dialog directly: log in through the dialog's form, approve the
//! application if asked, capture the code from the redirect and exchange it
//! for an access token.

use super::login::{self, ALLOW_LINK_TEXT};
use crate::config::{Credentials, YammerSettings};
use crate::errors::FetchError;
use crate::source::MessageSource;
use async_trait::async_trait;
use reqwest::header::LOCATION;
use reqwest::redirect::{Attempt, Policy};
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use tracing::{debug, info};

const MAX_REDIRECTS: usize = 10;

/// Client for the Yammer OAuth dialog and messages API.
pub struct YammerClient {
    http_client: Client,
    settings: YammerSettings,
}

/// Follow redirects until one carries the authorization code, then stop so
/// the app's own redirect URI is never requested.
fn redirect_policy() -> Policy {
    Policy::custom(|attempt: Attempt<'_>| {
        if attempt.previous().len() >= MAX_REDIRECTS {
            attempt.error("too many redirects")
        } else if login::authorization_code(attempt.url()).is_some() {
            attempt.stop()
        } else {
            attempt.follow()
        }
    })
}

fn code_from_response(response: &Response) -> Option<String> {
    let location = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok());
    login::code_from_redirect(response.url(), location)
}

fn join_url(base: &Url, reference: &str) -> Result<Url, FetchError> {
    base.join(reference).map_err(|e| FetchError::InvalidUrl {
        url: reference.to_string(),
        reason: e.to_string(),
    })
}

fn ensure_ok(response: &Response, what: &'static str) -> Result<(), FetchError> {
    match response.status() {
        StatusCode::OK => Ok(()),
        status => Err(FetchError::Status { what, status }),
    }
}

impl YammerClient {
    /// Create a new client. The HTTP client keeps cookies across the login flow.
    pub fn new(settings: YammerSettings) -> Result<Self, FetchError> {
        let http_client = Client::builder()
            .cookie_store(true)
            .timeout(settings.timeout)
            .redirect(redirect_policy())
            .build()?;

        Ok(Self {
            http_client,
            settings,
        })
    }

    fn base_url(&self) -> Result<Url, FetchError> {
        let base = format!("{}/", self.settings.base_url);
        Url::parse(&base).map_err(|e| FetchError::InvalidUrl {
            url: base.clone(),
            reason: e.to_string(),
        })
    }

    /// URL of the OAuth dialog for `client_id`.
    pub fn dialog_url(&self, client_id: &str) -> Result<Url, FetchError> {
        let mut url = join_url(&self.base_url()?, "dialog/oauth")?;
        url.query_pairs_mut().append_pair("client_id", client_id);
        Ok(url)
    }

    /// URL of the token exchange endpoint.
    pub fn access_token_url(&self) -> Result<Url, FetchError> {
        join_url(&self.base_url()?, "oauth2/access_token")
    }

    /// URL listing the messages about `topic_id`.
    pub fn messages_about_topic_url(&self, topic_id: &str) -> Result<Url, FetchError> {
        let mut url = join_url(&self.base_url()?, "api/v1/messages/about_topic/")?;
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl {
                url: self.settings.base_url.clone(),
                reason: "cannot be a base".to_string(),
            })?
            .pop_if_empty()
            .push(&format!("{}.json", topic_id));
        Ok(url)
    }

    /// Fetch the raw messages-about-topic document.
    pub async fn messages_about_topic(
        &self,
        topic_id: &str,
        credentials: &Credentials,
    ) -> Result<String, FetchError> {
        let access_token = self.access_token(credentials).await?;

        let url = self.messages_about_topic_url(topic_id)?;
        info!("Fetching messages about topic {}", topic_id);

        let response = self
            .http_client
            .get(url)
            .bearer_auth(&access_token)
            .send()
            .await?;
        ensure_ok(&response, "Fetching messages")?;

        let body = response.text().await?;
        debug!("Received {} bytes of messages", body.len());
        Ok(body)
    }

    /// Exchange an authorization code for an access token.
    async fn access_token(&self, credentials: &Credentials) -> Result<String, FetchError> {
        let code = self.authorization_code(credentials).await?;

        debug!("Exchanging authorization code for an access token");
        let params = [
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("code", code.as_str()),
        ];
        let response = self
            .http_client
            .post(self.access_token_url()?)
            .form(&params)
            .send()
            .await?;
        ensure_ok(&response, "Access token request")?;

        let body: Value = response.json().await?;
        body.pointer("/access_token/token")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or(FetchError::AccessTokenMissing)
    }

    /// Log in through the OAuth dialog and return the authorization code.
    async fn authorization_code(&self, credentials: &Credentials) -> Result<String, FetchError> {
        let dialog_url = self.dialog_url(&credentials.client_id)?;
        debug!("Opening OAuth dialog: {}", dialog_url);

        let response = self.http_client.get(dialog_url).send().await?;
        // Already authorized in this session.
        if let Some(code) = code_from_response(&response) {
            return Ok(code);
        }
        ensure_ok(&response, "Opening the OAuth dialog")?;

        let page_url = response.url().clone();
        let page = response.text().await?;
        let form = login::find_login_form(&page).ok_or(FetchError::LoginFormNotFound)?;

        let action = join_url(&page_url, form.action.as_deref().unwrap_or(""))?;
        let fields = form.with_credentials(&credentials.email, &credentials.password);
        debug!("Submitting login form to {}", action);

        let request = if form.is_get() {
            self.http_client.get(action).query(&fields)
        } else {
            self.http_client.post(action).form(&fields)
        };
        let response = request.send().await?;
        if let Some(code) = code_from_response(&response) {
            return Ok(code);
        }
        ensure_ok(&response, "Submitting the login form")?;

        // Consent page: approve the application.
        let consent_url = response.url().clone();
        let consent = response.text().await?;
        let allow = login::find_link_with_text(&consent, ALLOW_LINK_TEXT)
            .ok_or(FetchError::AuthorizationCodeMissing)?;
        debug!("Approving application access");

        let response = self
            .http_client
            .get(join_url(&consent_url, &allow)?)
            .send()
            .await?;
        code_from_response(&response).ok_or(FetchError::AuthorizationCodeMissing)
    }
}

#[async_trait]
impl MessageSource for YammerClient {
    fn describe(&self) -> String {
        format!("Yammer topic {}", self.settings.topic_id)
    }

    async fn fetch_messages_about_topic(&self) -> Result<String, FetchError> {
        self.messages_about_topic(&self.settings.topic_id, &self.settings.credentials)
            .await
    }
}
