//! OAuth 2.0 installed-application flow with a loopback redirect.

use crate::Authorizer;
use crate::error::{AuthError, Result};
use async_trait::async_trait;
use axum::Router;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::get;
use serde::Deserialize;
use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, oneshot};
use tubedrop_types::{AccessToken, Credentials};
use url::Url;
use uuid::Uuid;

/// Google's consent page.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

/// Google's token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// How long the redirect listener may take to finish answering the browser.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

const CALLBACK_PAGE: &str = "<html><body><p>Authorization received. You can close this tab.</p></body></html>";
const REFUSED_PAGE: &str = "<html><body><p>Authorization was not granted. You can close this tab.</p></body></html>";
const MISSING_CODE_PAGE: &str = "<html><body><p>No authorization code in this request.</p></body></html>";

/// Called with the consent URL the user has to open.
pub type ConsentPrompt = Box<dyn Fn(&Url) + Send + Sync>;

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

#[derive(Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Query parameters Google appends to the redirect URI.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct RedirectParams {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
}

/// Shared with the redirect handler for one authorization.
#[derive(Clone)]
struct Callback {
    state: Arc<str>,
    outcome: mpsc::Sender<Result<String>>,
}

/// Acquires an access token by sending the user to the consent page and
/// catching the redirect on a local port.
pub struct InstalledFlow {
    client: reqwest::Client,
    auth_url: Url,
    token_url: Url,
    bind: SocketAddr,
    prompt: ConsentPrompt,
}

impl std::fmt::Debug for InstalledFlow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstalledFlow")
            .field("auth_url", &self.auth_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("bind", &self.bind)
            .finish_non_exhaustive()
    }
}

impl InstalledFlow {
    /// Creates a flow against Google's endpoints that prints the consent URL
    /// to stderr.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(format!("tubedrop/{}", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            auth_url: Url::parse(GOOGLE_AUTH_URL)?,
            token_url: Url::parse(GOOGLE_TOKEN_URL)?,
            bind: SocketAddr::from((Ipv4Addr::LOCALHOST, 0)),
            prompt: Box::new(print_consent_url),
        })
    }

    /// Overrides the consent and token endpoints.
    #[must_use]
    pub fn with_endpoints(mut self, auth_url: Url, token_url: Url) -> Self {
        self.auth_url = auth_url;
        self.token_url = token_url;
        self
    }

    /// Overrides how the consent URL is presented.
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Fn(&Url) + Send + Sync + 'static) -> Self {
        self.prompt = Box::new(prompt);
        self
    }

    /// Builds the consent URL.
    #[must_use]
    pub fn consent_url(
        &self,
        credentials: &Credentials,
        scopes: &[&str],
        redirect_uri: &str,
        state: &str,
    ) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &credentials.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &scopes.join(" "))
            .append_pair("state", state);
        url
    }

    /// Serves the redirect URI on `listener` until consent is given or
    /// refused, and returns the authorization code.
    async fn wait_for_code(&self, listener: TcpListener, state: &str) -> Result<String> {
        let (outcome, mut outcomes) = mpsc::channel(1);
        let (stop, stopped) = oneshot::channel::<()>();
        let app = Router::new().route("/", get(redirect)).with_state(Callback {
            state: Arc::from(state),
            outcome,
        });

        let mut server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    stopped.await.ok();
                })
                .await
        });

        let received = outcomes.recv().await;

        if stop.send(()).is_err() {
            tracing::debug!("redirect listener already stopped");
        }
        match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
            Ok(Ok(Err(e))) => tracing::debug!(error = %e, "redirect listener failed"),
            Ok(_) => {}
            Err(_) => {
                tracing::debug!("redirect listener did not drain, aborting");
                server.abort();
            }
        }

        received.ok_or_else(|| AuthError::Callback("redirect listener stopped".to_string()))?
    }

    /// Trades an authorization code for an access token.
    async fn exchange(
        &self,
        credentials: &Credentials,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken> {
        let params = [
            ("code", code),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
            ("redirect_uri", redirect_uri),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(self.token_url.clone())
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&body).map_or(body, |e| {
                e.error_description
                    .map_or_else(|| e.error.clone(), |d| format!("{}: {d}", e.error))
            });
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                message,
            });
        }

        let token: TokenResponse = response.json().await?;
        let access_token = AccessToken::new(token.access_token);
        Ok(match token.expires_in {
            Some(seconds) => access_token.with_expires_in(seconds),
            None => access_token,
        })
    }
}

#[async_trait]
impl Authorizer for InstalledFlow {
    async fn authorize(&self, credentials: &Credentials, scopes: &[&str]) -> Result<AccessToken> {
        let listener = TcpListener::bind(self.bind).await.map_err(AuthError::Listen)?;
        let port = listener.local_addr().map_err(AuthError::Listen)?.port();
        let redirect_uri = format!("http://127.0.0.1:{port}");
        let state = Uuid::new_v4().simple().to_string();

        let url = self.consent_url(credentials, scopes, &redirect_uri, &state);
        tracing::info!(name = %credentials.name, %redirect_uri, "waiting for authorization");
        (self.prompt)(&url);

        let code = self.wait_for_code(listener, &state).await?;
        let token = self.exchange(credentials, &code, &redirect_uri).await?;
        tracing::info!(expires_in = ?token.expires_in(), "authorized");
        Ok(token)
    }
}

fn print_consent_url(url: &Url) {
    eprintln!("Open this URL in your browser to authorize the upload:\n\n  {url}\n");
}

/// Handles one request to the redirect URI.
///
/// Requests without a code or an error are answered and otherwise ignored,
/// so the flow keeps waiting for the real redirect.
async fn redirect(
    State(callback): State<Callback>,
    Query(params): Query<RedirectParams>,
) -> (StatusCode, Html<&'static str>) {
    let (reply, outcome) = match parse_redirect(&params, &callback.state) {
        Ok(None) => return (StatusCode::BAD_REQUEST, Html(MISSING_CODE_PAGE)),
        Ok(Some(code)) => ((StatusCode::OK, Html(CALLBACK_PAGE)), Ok(code)),
        Err(e) => ((StatusCode::OK, Html(REFUSED_PAGE)), Err(e)),
    };
    if callback.outcome.try_send(outcome).is_err() {
        tracing::debug!("redirect already handled");
    }
    reply
}

/// Extracts the authorization code from the redirect parameters.
///
/// Returns `Ok(None)` when the request carries neither a code nor an error.
pub(crate) fn parse_redirect(params: &RedirectParams, state: &str) -> Result<Option<String>> {
    if let Some(error) = &params.error {
        return Err(AuthError::Denied(error.clone()));
    }
    let Some(code) = &params.code else {
        return Ok(None);
    };
    if params.state.as_deref() != Some(state) {
        return Err(AuthError::Callback("state mismatch".to_string()));
    }
    Ok(Some(code.clone()))
}
