//! Typed failures for token operations against a portal and its federated
//! servers.
//!
//! Credential managers return a [`TokenRequestError`] whenever refreshing an
//! access token, exchanging a refresh token or generating a server token
//! fails. Callers branch on [`TokenRequestError::code`] to decide whether to
//! re-authenticate, report a federation problem or inspect the raw response.

mod error;
mod http;
mod options;
mod request;
mod token_error;
mod tokens;

// Core
pub use error::Error;
pub use token_error::{
    CredentialManager, RecoveryAction, TokenRequestError, TokenRequestErrorBuilder,
    TokenRequestErrorCode,
};

// Request boundary
pub use http::{HttpClient, HttpRequest, HttpResponse};
pub use options::{HttpMethod, RequestOptions};
pub use request::{create_token_request, send_token_request};
pub use tokens::TokenResponse;

// Default HTTP client (behind feature flag)
#[cfg(feature = "reqwest-client")]
pub use http::ReqwestClient;
