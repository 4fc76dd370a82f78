//! HTTP execution of gateway calls
//!
//! Maps the gateway operations onto `GET/POST /api/{kind}` and
//! `PUT/DELETE /api/{kind}/{id}` with a bearer token from the session.

use async_trait::async_trait;
use reqwest::Method;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use url::Url;

use super::DataGateway;
use crate::DashboardClient;
use crate::error::ApiError;
use crate::error::AuthError;
use crate::error::Error;
use crate::model::EntityKind;
use crate::model::FieldMap;
use crate::model::Record;
use crate::model::RecordId;

impl DashboardClient {
    /// Builds `{base}{prefix}/{kind}[/{id}]`, percent-encoding each segment.
    pub(crate) fn resource_url(
        &self,
        kind: &EntityKind,
        id: Option<&RecordId>,
    ) -> Result<Url, Error> {
        let mut url = self.inner.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ApiError::InvalidUrl(self.inner.base_url.to_string()))?;
            segments.pop_if_empty();
            for part in self.inner.api_prefix.split('/').filter(|p| !p.is_empty()) {
                segments.push(part);
            }
            segments.push(kind.as_str());
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        Ok(url)
    }

    /// Sends one authenticated request and turns non-2xx answers into errors.
    ///
    /// 401 and 403 become [`AuthError::Rejected`]; every other failure status
    /// becomes [`ApiError::Http`] carrying the backend's message.
    pub(crate) async fn request(
        &self,
        method: Method,
        url: Url,
        body: Option<&FieldMap>,
    ) -> Result<reqwest::Response, Error> {
        let token = self
            .inner
            .token_provider
            .get_token(self.base_url())
            .await?;

        log::debug!("{} {}", method, url);

        let mut request = self
            .inner
            .http_client
            .request(method.clone(), url.clone())
            .bearer_auth(&token.access_token);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = server_message(status, &body);
        log::warn!("{} {} failed with {}: {}", method, url, status.as_u16(), message);

        if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(AuthError::Rejected {
                status: status.as_u16(),
                message,
            }
            .into());
        }
        Err(ApiError::http(status.as_u16(), message).into())
    }
}

/// Reads a JSON body, treating an empty body as a parse failure.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, Error> {
    let text = response.text().await.map_err(ApiError::from)?;
    if text.trim().is_empty() {
        return Err(ApiError::parse("Empty response from server").into());
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(e) => Err(ApiError::parse_with_body(e.to_string(), text).into()),
    }
}

/// Extracts the human-readable message from an error body.
///
/// The backend answers `{"message": ...}` or `{"msg": ...}`; anything else is
/// shown as-is, and an empty body falls back to the status reason.
fn server_message(status: StatusCode, body: &str) -> String {
    if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["message", "msg", "error"] {
            if let Some(serde_json::Value::String(message)) = map.get(key) {
                return message.clone();
            }
        }
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() {
        return trimmed.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}

#[async_trait]
impl DataGateway for DashboardClient {
    async fn list(&self, kind: &EntityKind) -> Result<Vec<Record>, Error> {
        let url = self.resource_url(kind, None)?;
        let response = self.request(Method::GET, url, None).await?;
        read_json(response).await
    }

    async fn create(&self, kind: &EntityKind, fields: &FieldMap) -> Result<Record, Error> {
        let url = self.resource_url(kind, None)?;
        let response = self.request(Method::POST, url, Some(fields)).await?;
        read_json(response).await
    }

    async fn update(
        &self,
        kind: &EntityKind,
        id: &RecordId,
        fields: &FieldMap,
    ) -> Result<Record, Error> {
        let url = self.resource_url(kind, Some(id))?;
        let response = self.request(Method::PUT, url, Some(fields)).await?;
        read_json(response).await
    }

    async fn delete(&self, kind: &EntityKind, id: &RecordId) -> Result<(), Error> {
        let url = self.resource_url(kind, Some(id))?;
        // Acknowledgement body, if any, carries nothing the table needs.
        self.request(Method::DELETE, url, None).await?;
        Ok(())
    }
}
