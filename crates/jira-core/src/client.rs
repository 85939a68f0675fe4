// crates/jira-core/src/client.rs - HTTP client with transparent re-authentication
//
// Every API call goes through `JiraClient::execute`. Jira names the
// authenticated user in the `X-Ausername` response header; when it is
// missing or says `anonymous` the session has expired (or never existed), so
// the client logs in and sends the original request again. Callers only ever
// see the outcome of that second attempt.
//
// REAUTHENTICATION:
// 1. quiet output is forced on for the duration of the login
// 2. the authenticator runs; its own requests pass through untouched
// 3. a login failure becomes the result of the original request
// 4. otherwise the saved copy of the request is sent exactly once more
//
// The session itself lives in the reqwest cookie store, which is shared by
// the login request and every later request.

use std::cell::Cell;
use std::path::{Path, PathBuf};

use reqwest::Method;
use reqwest::StatusCode;
use reqwest::blocking::{Client, ClientBuilder, RequestBuilder, Response};
use reqwest::header::HeaderMap;
use thiserror::Error;
use tracing::{debug, warn};

use crate::quiet::QuietFlag;

/// Response header naming the authenticated user
pub const IDENTITY_HEADER: &str = "X-Ausername";

/// Header value Jira uses for unauthenticated requests
pub const ANONYMOUS: &str = "anonymous";

/// Errors from talking to the Jira service
#[derive(Error, Debug)]
pub enum HttpError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Login failed: {0:#}")]
    Login(anyhow::Error),

    #[error("{url} returned {status}: {message}")]
    Status {
        url: String,
        status: StatusCode,
        message: String,
    },

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    Endpoint { endpoint: String, reason: String },

    #[error("Cannot connect through unix socket {path}: {reason}")]
    UnixSocket { path: PathBuf, reason: String },

    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),
}

/// Result type for HTTP operations
pub type HttpResult<T> = Result<T, HttpError>;

/// Who the service thinks sent the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionIdentity {
    User(String),
    Anonymous,
}

impl SessionIdentity {
    /// Read the identity from response headers
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match headers
            .get(IDENTITY_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
        {
            None | Some("") | Some(ANONYMOUS) => SessionIdentity::Anonymous,
            Some(user) => SessionIdentity::User(user.to_string()),
        }
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, SessionIdentity::Anonymous)
    }
}

/// Establishes a session for the client
///
/// Implementations typically prompt for credentials and post them through
/// `client`, whose cookie store then carries the session.
pub trait Authenticator {
    fn login(&self, client: &JiraClient) -> anyhow::Result<()>;
}

/// Transport settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientOptions {
    /// Base URL, e.g. `https://jira.example.com`
    pub endpoint: String,
    /// Accept any TLS certificate
    pub insecure: bool,
    /// Send every request over this unix socket instead of TCP
    pub unixproxy: Option<PathBuf>,
}

/// Marks a login in progress; restores the previous state on drop
struct LoginScope<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> LoginScope<'a> {
    fn enter(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for LoginScope<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

/// Jira HTTP client
pub struct JiraClient {
    http: Client,
    endpoint: String,
    quiet: QuietFlag,
    authenticator: Box<dyn Authenticator>,
    logging_in: Cell<bool>,
}

impl JiraClient {
    pub fn new(
        options: &ClientOptions,
        quiet: QuietFlag,
        authenticator: Box<dyn Authenticator>,
    ) -> HttpResult<Self> {
        let endpoint = options.endpoint.trim_end_matches('/').to_string();
        let url = reqwest::Url::parse(&endpoint).map_err(|e| HttpError::Endpoint {
            endpoint: endpoint.clone(),
            reason: e.to_string(),
        })?;

        let mut builder = Client::builder()
            .cookie_store(true)
            .user_agent(concat!("jira/", env!("CARGO_PKG_VERSION")));

        if options.insecure {
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(path) = &options.unixproxy {
            builder = unix_socket(builder, path)?.no_proxy();
        } else if matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]")) {
            // environment proxies never apply to a local service
            builder = builder.no_proxy();
        }

        Ok(Self {
            http: builder.build()?,
            endpoint,
            quiet,
            authenticator,
            logging_in: Cell::new(false),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn quiet(&self) -> &QuietFlag {
        &self.quiet
    }

    /// Start a request for `path` relative to the endpoint
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.http.request(method, format!("{}{}", self.endpoint, path))
    }

    /// Send a request, logging in and replaying it if the session is anonymous
    pub fn execute(&self, request: RequestBuilder) -> HttpResult<Response> {
        let request = request.build()?;
        let replay = request.try_clone();

        debug!(method = %request.method(), url = %request.url(), "sending request");
        let response = self.http.execute(request)?;

        if self.logging_in.get() {
            return Ok(response);
        }
        if !SessionIdentity::from_headers(response.headers()).is_anonymous() {
            return Ok(response);
        }

        let Some(replay) = replay else {
            warn!(url = %response.url(), "anonymous response to a request that cannot be replayed");
            return Ok(response);
        };
        drop(response);

        debug!(url = %replay.url(), "session is anonymous, logging in");
        {
            let _quiet = self.quiet.suppress();
            self.login()?;
        }

        debug!(method = %replay.method(), url = %replay.url(), "replaying request");
        Ok(self.http.execute(replay)?)
    }

    /// Run the authenticator
    ///
    /// Responses to requests made while it runs are never intercepted, so a
    /// login flow that itself sees anonymous responses cannot recurse.
    pub fn login(&self) -> HttpResult<()> {
        let _scope = LoginScope::enter(&self.logging_in);
        self.authenticator.login(self).map_err(HttpError::Login)
    }

    /// Whether a login is currently running
    pub fn is_logging_in(&self) -> bool {
        self.logging_in.get()
    }
}

/// Send every request over the unix socket at `path` instead of TCP
#[cfg(unix)]
fn unix_socket(builder: ClientBuilder, path: &Path) -> HttpResult<ClientBuilder> {
    debug!(socket = %path.display(), "connecting through unix socket");
    Ok(builder.unix_socket(path.to_path_buf()))
}

#[cfg(not(unix))]
fn unix_socket(_builder: ClientBuilder, path: &Path) -> HttpResult<ClientBuilder> {
    Err(HttpError::UnixSocket {
        path: path.to_path_buf(),
        reason: "unix sockets are not supported on this platform".to_string(),
    })
}
