use crate::Error;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A successful token endpoint payload.
///
/// Portals answer with `token`/`expires` (epoch milliseconds), OAuth2
/// endpoints with `access_token`/`expires_in`; both shapes are read.
#[derive(Debug, Clone)]
pub struct TokenResponse {
    data: serde_json::Value,
    received_at: SystemTime,
}

impl TokenResponse {
    pub fn new(data: serde_json::Value) -> Self {
        Self {
            data,
            received_at: SystemTime::now(),
        }
    }

    pub fn data(&self) -> &serde_json::Value {
        &self.data
    }

    pub fn access_token(&self) -> Result<&str, Error> {
        self.data["access_token"]
            .as_str()
            .or_else(|| self.data["token"].as_str())
            .ok_or(Error::MissingField {
                field: "access_token",
            })
    }

    pub fn expires_in_seconds(&self) -> Result<u64, Error> {
        self.data["expires_in"].as_u64().ok_or(Error::MissingField {
            field: "expires_in",
        })
    }

    pub fn expires_at(&self) -> Result<SystemTime, Error> {
        if let Some(expires_ms) = self.data["expires"].as_u64() {
            return Ok(UNIX_EPOCH + Duration::from_millis(expires_ms));
        }
        let expires_in = self.expires_in_seconds()?;
        Ok(self.received_at + Duration::from_secs(expires_in))
    }

    pub fn has_refresh_token(&self) -> bool {
        self.data["refresh_token"].is_string()
    }

    pub fn refresh_token(&self) -> Result<&str, Error> {
        self.data["refresh_token"]
            .as_str()
            .ok_or(Error::MissingField {
                field: "refresh_token",
            })
    }

    pub fn refresh_token_expires_in_seconds(&self) -> Result<u64, Error> {
        self.data["refresh_token_expires_in"]
            .as_u64()
            .ok_or(Error::MissingField {
                field: "refresh_token_expires_in",
            })
    }

    pub fn username(&self) -> Result<&str, Error> {
        self.data["username"]
            .as_str()
            .ok_or(Error::MissingField { field: "username" })
    }

    /// Whether the portal requires HTTPS for requests made with this token.
    /// Absent means `false`.
    pub fn ssl(&self) -> bool {
        self.data["ssl"].as_bool().unwrap_or(false)
    }
}
