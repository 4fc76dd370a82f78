//! Effective connection settings for one invocation.

use std::sync::Arc;

use dashboard_lib::DashboardClient;
use dashboard_lib::auth::StaticTokenProvider;
use dashboard_lib::error::Error;
use dashboard_lib::table::TableConfig;

use crate::settings::SettingsError;
use crate::settings::SettingsProvider;

/// Backend URL, token and table settings, with flags and environment taking
/// precedence over stored values.
#[derive(Debug, Clone)]
pub struct Session {
    url: String,
    token: Option<String>,
    config: TableConfig,
}

impl Session {
    pub async fn resolve(
        url: Option<String>,
        token: Option<String>,
        settings: &SettingsProvider,
    ) -> Result<Self, SettingsError> {
        let url = match url {
            Some(url) => url,
            None => settings.api_url().await?,
        };
        let token = match token {
            Some(token) => Some(token),
            None => settings.token().await?,
        };
        let mut config = TableConfig::default();
        if let Some(n) = settings.items_per_page().await? {
            config.items_per_page = n;
        }
        Ok(Self { url, token, config })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_signed_in(&self) -> bool {
        self.token.as_deref().is_some_and(|t| !t.is_empty())
    }

    pub fn table_config(&self) -> TableConfig {
        self.config
    }

    /// Builds the gateway client. Without a token every call fails with a
    /// "not signed in" error before reaching the network.
    pub fn client(&self) -> Result<DashboardClient, Error> {
        let provider = StaticTokenProvider::new(self.token.clone().unwrap_or_default());
        DashboardClient::builder()
            .url(&self.url)
            .shared_token_provider(Arc::new(provider))
            .build()
    }
}
