//! Authentication error types

/// Errors that can occur while obtaining or presenting a session token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No token is available in the session.
    #[error("Not signed in: no session token")]
    MissingToken,

    /// Invalid email or password.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The backend refused the bearer token (401/403).
    #[error("Request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// Network error during login.
    #[error("Network error during auth: {0}")]
    Network(#[from] reqwest::Error),

    /// Failed to parse the login response.
    #[error("Auth response parse error: {0}")]
    Parse(String),
}
