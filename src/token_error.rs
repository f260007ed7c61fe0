use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::options::RequestOptions;

/// Why a token operation failed.
///
/// The string values are stable: consumers persist, log and compare them
/// across versions, so variants serialize by name and never by ordinal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenRequestErrorCode {
    /// A request to obtain a new access token failed.
    TokenRefreshFailed,
    /// A request for a token scoped to a specific federated server failed.
    GenerateTokenForServerFailed,
    /// Exchanging a refresh token for a new one failed.
    RefreshTokenExchangeFailed,
    /// The target server is not federated with the configured portal.
    NotFederated,
    /// The failure could not be classified; inspect the attached response.
    #[default]
    UnknownErrorCode,
}

impl TokenRequestErrorCode {
    pub const ALL: [Self; 5] = [
        Self::TokenRefreshFailed,
        Self::GenerateTokenForServerFailed,
        Self::RefreshTokenExchangeFailed,
        Self::NotFederated,
        Self::UnknownErrorCode,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TokenRefreshFailed => "TOKEN_REFRESH_FAILED",
            Self::GenerateTokenForServerFailed => "GENERATE_TOKEN_FOR_SERVER_FAILED",
            Self::RefreshTokenExchangeFailed => "REFRESH_TOKEN_EXCHANGE_FAILED",
            Self::NotFederated => "NOT_FEDERATED",
            Self::UnknownErrorCode => "UNKNOWN_ERROR_CODE",
        }
    }

    /// What a caller should do about a failure with this code.
    pub fn recovery(self) -> RecoveryAction {
        match self {
            Self::TokenRefreshFailed | Self::RefreshTokenExchangeFailed => {
                RecoveryAction::Reauthenticate
            }
            Self::GenerateTokenForServerFailed | Self::NotFederated => {
                RecoveryAction::FixFederation
            }
            Self::UnknownErrorCode => RecoveryAction::InspectResponse,
        }
    }

    /// The credential managers that may raise this code.
    pub fn raised_by(self) -> &'static [CredentialManager] {
        match self {
            Self::TokenRefreshFailed | Self::UnknownErrorCode => &[
                CredentialManager::IdentitySession,
                CredentialManager::ApplicationCredentials,
            ],
            Self::GenerateTokenForServerFailed
            | Self::RefreshTokenExchangeFailed
            | Self::NotFederated => &[CredentialManager::IdentitySession],
        }
    }
}

impl fmt::Display for TokenRequestErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TokenRequestErrorCode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|code| code.as_str() == s)
            .ok_or_else(|| Error::InvalidErrorCode {
                value: s.to_string(),
            })
    }
}

/// Recovery guidance implied by a [`TokenRequestErrorCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecoveryAction {
    /// Credentials are likely invalid; the user has to sign in again.
    Reauthenticate,
    /// The portal/server federation is misconfigured. Neither a retry nor a
    /// new sign-in resolves it.
    FixFederation,
    /// No safe default; classify using the attached response.
    InspectResponse,
}

impl RecoveryAction {
    /// None of the codes describe a transient failure.
    pub fn is_retryable(self) -> bool {
        false
    }
}

/// The collaborators that raise [`TokenRequestError`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CredentialManager {
    /// Manages a signed-in user's session with the portal and its federated
    /// servers.
    IdentitySession,
    /// Manages tokens obtained from application (client) credentials.
    ApplicationCredentials,
}

impl CredentialManager {
    pub fn can_raise(self, code: TokenRequestErrorCode) -> bool {
        code.raised_by().contains(&self)
    }
}

pub(crate) const DEFAULT_MESSAGE: &str = "UNKNOWN_ERROR";

/// A failed token-acquisition attempt.
///
/// Built once at the failure site and returned as `Err`. Fields are read-only
/// after construction. `response` and `options` are shared with the caller
/// rather than copied.
///
/// A caught error exposes accessors only; its context cannot be replaced:
///
/// ```compile_fail
/// use portal_auth::{TokenRequestError, TokenRequestErrorCode};
///
/// let err = TokenRequestError::new("Invalid token.", TokenRequestErrorCode::TokenRefreshFailed);
/// let _ = err.url("https://other.test");
/// ```
#[derive(Debug, Clone, thiserror::Error, Serialize, Deserialize)]
#[serde(into = "TokenRequestErrorRepr", try_from = "TokenRequestErrorRepr")]
#[error("{message}")]
pub struct TokenRequestError {
    message: String,
    original_message: String,
    code: TokenRequestErrorCode,
    response: Option<Arc<serde_json::Value>>,
    url: Option<String>,
    options: Option<Arc<RequestOptions>>,
}

impl TokenRequestError {
    /// Kind identifier. Stays comparable after the error has been boxed,
    /// wrapped or serialized.
    pub const NAME: &'static str = "TokenRequestError";

    pub fn new(message: impl Into<String>, code: TokenRequestErrorCode) -> Self {
        let original_message = message.into();
        Self {
            message: format!("{code}: {original_message}"),
            original_message,
            code,
            response: None,
            url: None,
            options: None,
        }
    }

    /// Start an error that carries request context. Context can only be
    /// attached before [`TokenRequestErrorBuilder::build`].
    pub fn builder(
        message: impl Into<String>,
        code: TokenRequestErrorCode,
    ) -> TokenRequestErrorBuilder {
        TokenRequestErrorBuilder {
            inner: Self::new(message, code),
        }
    }

    pub fn name(&self) -> &'static str {
        Self::NAME
    }

    /// `"<code>: <original message>"`, ready for display.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// The message as passed at construction, without the code prefix.
    pub fn original_message(&self) -> &str {
        &self.original_message
    }

    pub fn code(&self) -> TokenRequestErrorCode {
        self.code
    }

    pub fn recovery(&self) -> RecoveryAction {
        self.code.recovery()
    }

    pub fn response(&self) -> Option<&serde_json::Value> {
        self.response.as_deref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn options(&self) -> Option<&RequestOptions> {
        self.options.as_deref()
    }

    /// Find a token-request failure in `err` or anywhere in its source chain.
    pub fn find_in<'a>(err: &'a (dyn std::error::Error + 'static)) -> Option<&'a Self> {
        let mut current = Some(err);
        while let Some(err) = current {
            if let Some(found) = err.downcast_ref::<Self>() {
                return Some(found);
            }
            current = err.source();
        }
        None
    }

    pub fn is(err: &(dyn std::error::Error + 'static)) -> bool {
        Self::find_in(err).is_some()
    }
}

/// Assembles a [`TokenRequestError`] with its request context.
#[derive(Debug)]
#[must_use]
pub struct TokenRequestErrorBuilder {
    inner: TokenRequestError,
}

impl TokenRequestErrorBuilder {
    /// The raw payload returned by the token endpoint.
    pub fn response(mut self, response: impl Into<Arc<serde_json::Value>>) -> Self {
        self.inner.response = Some(response.into());
        self
    }

    /// The URL of the request that failed.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.inner.url = Some(url.into());
        self
    }

    /// The options of the request that failed.
    pub fn options(mut self, options: impl Into<Arc<RequestOptions>>) -> Self {
        self.inner.options = Some(options.into());
        self
    }

    pub fn build(self) -> TokenRequestError {
        self.inner
    }
}

impl Default for TokenRequestError {
    fn default() -> Self {
        Self::new(DEFAULT_MESSAGE, TokenRequestErrorCode::default())
    }
}

/// Wire form. `message` is written for readers of the payload but recomposed
/// from `code` and `originalMessage` when read back.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequestErrorRepr {
    name: String,
    #[serde(default)]
    message: String,
    original_message: String,
    code: TokenRequestErrorCode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    response: Option<Arc<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    options: Option<Arc<RequestOptions>>,
}

impl From<TokenRequestError> for TokenRequestErrorRepr {
    fn from(err: TokenRequestError) -> Self {
        Self {
            name: TokenRequestError::NAME.to_string(),
            message: err.message,
            original_message: err.original_message,
            code: err.code,
            response: err.response,
            url: err.url,
            options: err.options,
        }
    }
}

impl TryFrom<TokenRequestErrorRepr> for TokenRequestError {
    type Error = String;

    fn try_from(repr: TokenRequestErrorRepr) -> Result<Self, Self::Error> {
        if repr.name != TokenRequestError::NAME {
            return Err(format!(
                "expected error name `{}`, found `{}`",
                TokenRequestError::NAME,
                repr.name
            ));
        }

        let mut err = TokenRequestError::new(repr.original_message, repr.code);
        err.response = repr.response;
        err.url = repr.url;
        err.options = repr.options;
        Ok(err)
    }
}
