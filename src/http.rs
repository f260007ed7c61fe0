use std::future::Future;

use crate::options::HttpMethod;

/// A token request as it goes over the wire, built by
/// [`create_token_request`](crate::create_token_request).
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    /// Form-encoded params for POST, empty for GET.
    pub body: Vec<u8>,
}

/// Status and raw body of a token endpoint answer.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// Transport used by [`send_token_request`](crate::send_token_request).
///
/// A transport error becomes a `TokenRequestError` whose message is the
/// error's `Display` text. Implementations must be `Send + Sync`.
pub trait HttpClient: Send + Sync {
    fn send(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>>> + Send;
}

#[cfg(feature = "reqwest-client")]
mod reqwest_impl {
    use super::{HttpClient, HttpRequest, HttpResponse};
    use crate::options::HttpMethod;

    impl From<HttpMethod> for reqwest::Method {
        fn from(method: HttpMethod) -> Self {
            match method {
                HttpMethod::Get => reqwest::Method::GET,
                HttpMethod::Post => reqwest::Method::POST,
            }
        }
    }

    /// [`HttpClient`] over a shared `reqwest::Client`.
    #[derive(Debug, Clone, Default)]
    pub struct ReqwestClient {
        inner: reqwest::Client,
    }

    impl ReqwestClient {
        pub fn new() -> Self {
            Self::default()
        }

        /// Reuse an existing client (proxies, timeouts, TLS roots).
        pub fn with_client(inner: reqwest::Client) -> Self {
            Self { inner }
        }
    }

    impl HttpClient for ReqwestClient {
        async fn send(
            &self,
            req: HttpRequest,
        ) -> Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>> {
            let mut builder = self.inner.request(req.method.into(), &req.url);

            for (name, value) in &req.headers {
                builder = builder.header(name, value);
            }

            if !req.body.is_empty() {
                builder = builder.body(req.body);
            }

            let response = builder.send().await?;
            let status = response.status().as_u16();
            let body = response.bytes().await?.to_vec();

            Ok(HttpResponse { status, body })
        }
    }

}

#[cfg(feature = "reqwest-client")]
pub use reqwest_impl::ReqwestClient;
