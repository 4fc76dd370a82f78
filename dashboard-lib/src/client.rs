//! Main DashboardClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::auth::TokenProvider;
use crate::error::ApiError;
use crate::error::Error;

/// REST client for the dashboard backend.
///
/// Implements [`DataGateway`](crate::api::DataGateway) over
/// `/api/{kind}` and `/api/{kind}/{id}`. Cheap to clone (uses `Arc`
/// internally).
///
/// # Example
///
/// ```ignore
/// use dashboard_lib::{DashboardClient, auth::StaticTokenProvider};
///
/// let client = DashboardClient::builder()
///     .url("http://localhost:5000")
///     .token_provider(StaticTokenProvider::new("my-token"))
///     .build()?;
///
/// let products = client.list(&EntityKind::products()).await?;
/// ```
#[derive(Clone)]
pub struct DashboardClient {
    pub(crate) inner: Arc<DashboardClientInner>,
}

pub(crate) struct DashboardClientInner {
    pub(crate) base_url: Url,
    pub(crate) api_prefix: String,
    pub(crate) token_provider: Arc<dyn TokenProvider>,
    pub(crate) http_client: Client,
    pub(crate) timeout: Option<Duration>,
}

impl DashboardClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> DashboardClientBuilder<Missing, Missing> {
        DashboardClientBuilder::new()
    }

    /// Returns the base URL of the backend.
    pub fn base_url(&self) -> &str {
        self.inner.base_url.as_str()
    }

    /// Returns the path prefix of the REST resources.
    pub fn api_prefix(&self) -> &str {
        &self.inner.api_prefix
    }
}

impl std::fmt::Debug for DashboardClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("api_prefix", &self.inner.api_prefix)
            .field("timeout", &self.inner.timeout)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`DashboardClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile time.
///
/// # Required Fields
///
/// - `url` - The backend base URL
/// - `token_provider` - The session's [`TokenProvider`]
pub struct DashboardClientBuilder<Url, Provider> {
    url: Url,
    token_provider: Provider,
    api_prefix: String,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl DashboardClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            url: Missing,
            token_provider: Missing,
            api_prefix: "/api".to_string(),
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for DashboardClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> DashboardClientBuilder<Missing, P> {
    /// Sets the backend base URL.
    pub fn url(self, url: impl Into<String>) -> DashboardClientBuilder<Set<String>, P> {
        DashboardClientBuilder {
            url: Set(url.into()),
            token_provider: self.token_provider,
            api_prefix: self.api_prefix,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U> DashboardClientBuilder<U, Missing> {
    /// Sets the token provider for authentication.
    pub fn token_provider<T: TokenProvider + 'static>(
        self,
        provider: T,
    ) -> DashboardClientBuilder<U, Set<Arc<dyn TokenProvider>>> {
        self.shared_token_provider(Arc::new(provider))
    }

    /// Sets an already shared token provider.
    pub fn shared_token_provider(
        self,
        provider: Arc<dyn TokenProvider>,
    ) -> DashboardClientBuilder<U, Set<Arc<dyn TokenProvider>>> {
        DashboardClientBuilder {
            url: self.url,
            token_provider: Set(provider),
            api_prefix: self.api_prefix,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<U, P> DashboardClientBuilder<U, P> {
    /// Sets the path prefix of the REST resources.
    ///
    /// Defaults to `/api`.
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl DashboardClientBuilder<Set<String>, Set<Arc<dyn TokenProvider>>> {
    /// Builds the [`DashboardClient`].
    ///
    /// Fails if the URL does not parse as an absolute http(s) URL or the
    /// HTTP client cannot be constructed.
    pub fn build(self) -> Result<DashboardClient, Error> {
        let base_url = Url::parse(&self.url.0)
            .map_err(|e| ApiError::InvalidUrl(format!("{}: {}", self.url.0, e)))?;
        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(ApiError::InvalidUrl(self.url.0).into());
        }

        let http_client = match self.http_client {
            Some(client) => client,
            None => {
                let mut builder = Client::builder();
                if let Some(timeout) = self.connect_timeout {
                    builder = builder.connect_timeout(timeout);
                }
                builder.build().map_err(ApiError::from)?
            }
        };

        Ok(DashboardClient {
            inner: Arc::new(DashboardClientInner {
                base_url,
                api_prefix: self.api_prefix,
                token_provider: self.token_provider.0,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
