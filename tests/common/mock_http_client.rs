use portal_auth::{HttpClient, HttpRequest, HttpResponse};
use std::sync::Mutex;

/// An `HttpClient` implementation that records requests and returns
/// pre-configured responses. An empty queue behaves like an unreachable
/// host.
pub struct MockHttpClient {
    /// Pre-configured responses to return in order.
    responses: Mutex<Vec<HttpResponse>>,
    /// Recorded requests for assertion.
    recorded: Mutex<Vec<HttpRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            recorded: Mutex::new(Vec::new()),
        }
    }

    /// Add a response to the queue. Responses are returned in FIFO order.
    pub fn enqueue_response(&self, response: HttpResponse) {
        self.responses.lock().unwrap().push(response);
    }

    pub fn enqueue_json(&self, status: u16, body: serde_json::Value) {
        self.enqueue_response(HttpResponse {
            status,
            body: serde_json::to_vec(&body).unwrap(),
        });
    }

    /// Drain and return all recorded requests.
    pub fn take_requests(&self) -> Vec<HttpRequest> {
        self.recorded.lock().unwrap().drain(..).collect()
    }
}

impl HttpClient for MockHttpClient {
    async fn send(
        &self,
        request: HttpRequest,
    ) -> Result<HttpResponse, Box<dyn std::error::Error + Send + Sync>> {
        self.recorded.lock().unwrap().push(request);
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            return Err("no route to host".into());
        }
        Ok(responses.remove(0))
    }
}
