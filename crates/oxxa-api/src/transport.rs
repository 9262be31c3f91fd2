//! The HTTP layer underneath every API call.

use reqwest::blocking::Client;
use reqwest::header::USER_AGENT;
use thiserror::Error;

/// An outbound GET, with the query already encoded into name/value pairs.
#[derive(Debug, Clone)]
pub struct HttpRequest<'a> {
    pub url: &'a str,
    pub query: &'a [(String, String)],
    pub user_agent: &'a str,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: String,
    pub body: Vec<u8>,
}

/// The exchange did not produce a usable response.
#[derive(Error, Debug, Clone)]
#[error("{message}")]
pub struct HttpFailure {
    /// Set when the status line arrived but reading the body failed.
    pub status: Option<u16>,
    pub message: String,
    pub body: Vec<u8>,
}

/// Blocking GET. Timeouts and TLS are the implementation's business.
pub trait Transport {
    fn get(&self, request: &HttpRequest<'_>) -> Result<HttpResponse, HttpFailure>;
}

/// [`Transport`] on top of `reqwest::blocking`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Use a preconfigured client (proxy, timeouts, ...).
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn get(&self, request: &HttpRequest<'_>) -> Result<HttpResponse, HttpFailure> {
        let response = self
            .client
            .get(request.url)
            .header(USER_AGENT, request.user_agent)
            .query(request.query)
            .send()
            .map_err(|e| HttpFailure {
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
                body: Vec::new(),
            })?;

        let status = response.status();
        let body = response.bytes().map_err(|e| HttpFailure {
            status: Some(status.as_u16()),
            message: e.to_string(),
            body: Vec::new(),
        })?;

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default().to_string(),
            body: body.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const USER_AGENT_VALUE: &str = "oxxa-api-test";

    fn query(command: &str) -> Vec<(String, String)> {
        [("apiuser", "USER"), ("apipassword", "MD5a&b=c d"), ("command", command)]
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    /// `reqwest::blocking` refuses to run on a runtime thread.
    async fn get_blocking(
        url: String,
        query: Vec<(String, String)>,
    ) -> Result<HttpResponse, HttpFailure> {
        tokio::task::spawn_blocking(move || {
            let request = HttpRequest {
                url: &url,
                query: &query,
                user_agent: USER_AGENT_VALUE,
            };
            HttpTransport::new().get(&request)
        })
        .await
        .expect("blocking task")
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn returns_body_of_successful_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/command.php"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<channel/>"))
            .expect(1)
            .mount(&server)
            .await;

        let response = get_blocking(format!("{}/command.php", server.uri()), query("domain_list"))
            .await
            .expect("response");

        assert_eq!(response.status, 200);
        assert_eq!(response.reason, "OK");
        assert_eq!(response.body, b"<channel/>");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn error_status_keeps_reason_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .expect(1)
            .mount(&server)
            .await;

        let response = get_blocking(server.uri(), query("domain_list")).await.expect("response");

        assert_eq!(response.status, 503);
        assert_eq!(response.reason, "Service Unavailable");
        assert_eq!(response.body, b"maintenance");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn sends_encoded_query_and_user_agent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("command", "domain_check"))
            .and(query_param("apiuser", "USER"))
            .and(query_param("apipassword", "MD5a&b=c d"))
            .and(header("user-agent", USER_AGENT_VALUE))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let response = get_blocking(server.uri(), query("domain_check")).await.expect("response");
        assert_eq!(response.status, 200);

        let requests = server.received_requests().await.expect("recorded requests");
        assert_eq!(requests.len(), 1);
        let raw = requests[0].url.query().unwrap_or_default();
        assert!(!raw.contains("a&b"), "password not encoded: {raw}");
    }

    #[test]
    fn refused_connection_is_a_failure_without_status() {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().expect("local addr");
        drop(listener);

        let query = query("domain_list");
        let url = format!("http://{addr}/command.php");
        let request = HttpRequest {
            url: &url,
            query: &query,
            user_agent: USER_AGENT_VALUE,
        };
        let failure = HttpTransport::new().get(&request).expect_err("nothing listening");
        assert_eq!(failure.status, None);
        assert!(failure.body.is_empty());
        assert!(!failure.message.is_empty());
    }
}
