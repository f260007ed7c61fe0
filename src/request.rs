use std::sync::Arc;

use crate::http::{HttpClient, HttpRequest, HttpResponse};
use crate::options::{HttpMethod, RequestOptions};
use crate::token_error::{DEFAULT_MESSAGE, TokenRequestError, TokenRequestErrorCode};
use crate::tokens::TokenResponse;

/// Build a token request from `options`.
/// Always asks for JSON (`f=json`) unless the caller set `f`. POST sends the
/// params form-encoded in the body, GET appends them to the query.
pub fn create_token_request(url: &str, options: &RequestOptions) -> HttpRequest {
    let mut pairs = options.form_pairs();
    if !options.params.contains_key("f") {
        pairs.push(("f".to_string(), "json".to_string()));
    }

    let encoded = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(&pairs)
        .finish();

    let mut headers = vec![
        ("Accept".to_string(), "application/json".to_string()),
        ("User-Agent".to_string(), "portal-auth".to_string()),
    ];

    let (url, body) = match options.http_method {
        HttpMethod::Post => {
            headers.insert(
                0,
                (
                    "Content-Type".to_string(),
                    "application/x-www-form-urlencoded".to_string(),
                ),
            );
            (url.to_string(), encoded.into_bytes())
        }
        HttpMethod::Get => {
            let separator = if url.contains('?') { '&' } else { '?' };
            (format!("{url}{separator}{encoded}"), Vec::new())
        }
    };

    headers.extend(
        options
            .headers
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );

    HttpRequest {
        method: options.http_method,
        url,
        headers,
        body,
    }
}

/// Send a token request and interpret the response.
/// - 200 JSON without a non-null `error` member -> Ok(TokenResponse)
/// - transport failure -> Err, no response attached
/// - body is not JSON -> Err, body attached as a JSON string, or as an array
///   of byte values when it is not valid UTF-8
/// - JSON with a non-null `error` member (any status) -> Err, parsed JSON attached
/// - other status -> Err, parsed JSON attached
///
/// Every error carries `code`, `url` and the shared `options`.
pub async fn send_token_request(
    client: &(impl HttpClient + ?Sized),
    url: &str,
    options: impl Into<Arc<RequestOptions>>,
    code: TokenRequestErrorCode,
) -> Result<TokenResponse, TokenRequestError> {
    let options = options.into();
    let request = create_token_request(url, &options);
    let failure = |message: String| {
        TokenRequestError::builder(message, code)
            .url(url)
            .options(Arc::clone(&options))
    };

    tracing::debug!(%code, url, method = %options.http_method, "sending token request");

    let response: HttpResponse = match client.send(request).await {
        Ok(response) => response,
        Err(e) => {
            tracing::warn!(%code, url, error = %e, "token request transport failure");
            return Err(failure(e.to_string()).build());
        }
    };

    let json = match serde_json::from_slice::<serde_json::Value>(&response.body) {
        Ok(json) => json,
        Err(_) => {
            tracing::warn!(%code, url, status = response.status, "token response is not JSON");
            return Err(failure(format!(
                "Unexpected response body (HTTP {})",
                response.status
            ))
            .response(raw_body(response.body))
            .build());
        }
    };

    if !json["error"].is_null() {
        let message = error_message(&json);
        tracing::warn!(
            %code,
            url,
            status = response.status,
            reason = %message,
            "token endpoint returned an error"
        );
        return Err(failure(message).response(json).build());
    }

    if response.status != 200 {
        tracing::warn!(%code, url, status = response.status, "unexpected token endpoint status");
        return Err(failure(format!("Unexpected HTTP status: {}", response.status))
            .response(json)
            .build());
    }

    Ok(TokenResponse::new(json))
}

/// Non-JSON body kept byte for byte: text as a string, anything else as the
/// array of byte values.
fn raw_body(body: Vec<u8>) -> serde_json::Value {
    match String::from_utf8(body) {
        Ok(text) => serde_json::Value::String(text),
        Err(e) => e.into_bytes().into_iter().map(serde_json::Value::from).collect(),
    }
}

/// Portals nest the message (`{"error": {"message": ..}}`), OAuth2 endpoints
/// use `error_description` or a bare `error` string.
fn error_message(json: &serde_json::Value) -> String {
    json["error"]["message"]
        .as_str()
        .or_else(|| json["error_description"].as_str())
        .or_else(|| json["error"].as_str())
        .unwrap_or(DEFAULT_MESSAGE)
        .to_string()
}
