//! Authentication
//!
//! The gateway never reads tokens from ambient storage: a [`TokenProvider`]
//! is handed to the client builder and asked for a token on every request.

mod login;
mod token;

pub use login::PasswordLogin;
pub use token::AccessToken;
pub use token::StaticTokenProvider;
pub use token::TokenProvider;
