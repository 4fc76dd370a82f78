//! Error types

mod api;
mod auth;
mod import;
mod validation;

pub use api::*;
pub use auth::*;
pub use import::*;
pub use validation::*;

/// Top-level error returned by the gateway and the table protocol.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The request failed in transit or the server answered with an error.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The session could not provide a token, or the server rejected it.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Client-side form or argument check failed before any request was made.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A CSV upload was rejected.
    #[error(transparent)]
    Import(#[from] ImportError),
}

impl Error {
    /// Returns `true` if the request could not complete.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Api(ApiError::Network(_)) | Self::Auth(AuthError::Network(_)))
    }

    /// Returns `true` for missing, invalid or rejected credentials.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Returns `true` for non-2xx responses other than auth rejections.
    pub fn is_server(&self) -> bool {
        matches!(self, Self::Api(ApiError::Http { .. }))
    }

    /// Returns `true` for unexpected or empty response bodies.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Api(ApiError::Parse { .. }) | Self::Auth(AuthError::Parse(_)))
    }

    /// Returns `true` for client-side validation failures.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Import(_))
    }

    /// Returns the HTTP status code, if the server produced one.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api(api) => api.status_code(),
            Self::Auth(AuthError::Rejected { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification() {
        let server: Error = ApiError::http(500, "boom").into();
        assert!(server.is_server());
        assert!(!server.is_parse());
        assert_eq!(server.status_code(), Some(500));

        let parse: Error = ApiError::parse("Empty response from server").into();
        assert!(parse.is_parse());
        assert_eq!(parse.status_code(), None);

        let auth: Error = AuthError::MissingToken.into();
        assert!(auth.is_auth());
        assert!(!auth.is_network());

        let invalid: Error = ValidationError::EntityKind("a/b".to_string()).into();
        assert!(invalid.is_validation());
    }

    #[test]
    fn test_message_is_human_readable() {
        let err: Error = ApiError::http(404, "Product not found").into();
        assert_eq!(err.to_string(), "HTTP 404: Product not found");
    }
}
