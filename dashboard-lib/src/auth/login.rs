//! Email/password login against the dashboard backend

use reqwest::header::HeaderMap;
use reqwest::header::SET_COOKIE;
use serde::Deserialize;
use serde::Serialize;

use super::AccessToken;
use crate::error::AuthError;

const ACCESS_COOKIE: &str = "access_token_cookie";
const REFRESH_COOKIE: &str = "refresh_token_cookie";

#[derive(Serialize)]
struct LoginRequest<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Deserialize, Default)]
struct LoginErrorResponse {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Exchanges an email and password for a bearer token.
///
/// Posts `{"email", "password"}` to `{base_url}/login`. The backend sets the
/// JWT in the `access_token_cookie` cookie (and the refresh token in
/// `refresh_token_cookie`); an `access_token` field in the JSON body is
/// accepted when no cookie is set.
///
/// # Example
///
/// ```ignore
/// use dashboard_lib::auth::PasswordLogin;
///
/// let token = PasswordLogin::new("http://localhost:5000", "merchant@shop.io", "secret")
///     .authenticate()
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct PasswordLogin {
    base_url: String,
    email: String,
    password: String,
    http_client: reqwest::Client,
}

impl PasswordLogin {
    /// Creates a login for the given backend and credentials.
    pub fn new(
        base_url: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            email: email.into(),
            password: password.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Uses a custom HTTP client.
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = client;
        self
    }

    fn login_url(&self) -> String {
        format!("{}/login", self.base_url.trim_end_matches('/'))
    }

    /// Performs the login request.
    pub async fn authenticate(&self) -> Result<AccessToken, AuthError> {
        let url = self.login_url();
        log::debug!("POST {}", url);

        let response = self
            .http_client
            .post(&url)
            .json(&LoginRequest {
                email: &self.email,
                password: &self.password,
            })
            .send()
            .await?;

        self.handle_response(response).await
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<AccessToken, AuthError> {
        let status = response.status();
        if status.is_success() {
            if let Some(access) = cookie_value(response.headers(), ACCESS_COOKIE) {
                let mut token = AccessToken::new(access);
                token.refresh_token = cookie_value(response.headers(), REFRESH_COOKIE);
                return Ok(token);
            }
            let body: LoginResponse = response
                .json()
                .await
                .map_err(|e| AuthError::Parse(e.to_string()))?;
            let access = body.access_token.ok_or_else(|| {
                AuthError::Parse("no access token in cookies or body".to_string())
            })?;
            let mut token = AccessToken::new(access);
            token.refresh_token = body.refresh_token;
            return Ok(token);
        }

        if status.as_u16() == 401 {
            return Err(AuthError::InvalidCredentials);
        }

        let error: LoginErrorResponse = response.json().await.unwrap_or_default();
        let message = error
            .msg
            .or(error.message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("login failed").to_string());
        Err(AuthError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

/// Value of the cookie `name` among the response's `Set-Cookie` headers.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .find_map(|cookie| {
            let (key, value) = cookie.split(';').next()?.split_once('=')?;
            let value = value.trim();
            (key.trim() == name && !value.is_empty()).then(|| value.to_string())
        })
}
