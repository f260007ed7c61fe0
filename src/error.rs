use crate::token_error::{TokenRequestError, TokenRequestErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A token operation failed. The wrapped error is also this error's
    /// `source()`.
    #[error("{0}")]
    TokenRequest(#[from] TokenRequestError),

    /// A required field is missing from the token response JSON.
    #[error("Missing or invalid field: {field}")]
    MissingField { field: &'static str },

    /// A string that is not one of the token-request error codes.
    #[error("Unknown token request error code: {value}")]
    InvalidErrorCode { value: String },

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub fn token_request(&self) -> Option<&TokenRequestError> {
        match self {
            Error::TokenRequest(err) => Some(err),
            _ => None,
        }
    }

    /// The token-request code, if this is a token-request failure.
    pub fn code(&self) -> Option<TokenRequestErrorCode> {
        self.token_request().map(TokenRequestError::code)
    }
}
