//! Testing utilities: a scripted transport that replays canned responses.
//!
//! Useful for exercising code built on this crate without talking to the
//! real API:
//!
//! ```
//! use oxxa_api::testing::{order_body, scripted_client};
//!
//! let (api, transport) = scripted_client();
//! transport.push(
//!     &[("command", "domain_check"), ("sld", "example"), ("tld", "com")],
//!     &order_body("XMLOK 11", ""),
//! );
//! assert!(api.domains().get("example.com").is_free()?);
//! assert_eq!(transport.calls(), 1);
//! # Ok::<(), oxxa_api::OxxaError>(())
//! ```

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::client::Oxxa;
use crate::credentials::Credentials;
use crate::session::ClientConfig;
use crate::transport::{HttpFailure, HttpRequest, HttpResponse, Transport};

/// Parameters the session adds to every request; never part of an expectation.
const SESSION_PARAMS: [&str; 3] = ["apiuser", "apipassword", "test"];

enum Reply {
    Http(HttpResponse),
    Failure(String),
}

struct Exchange {
    expected: BTreeMap<String, String>,
    reply: Reply,
}

#[derive(Default)]
struct Script {
    exchanges: VecDeque<Exchange>,
    requests: Vec<Vec<(String, String)>>,
    urls: Vec<String>,
}

/// A [`Transport`] answering from a queue of expected requests.
///
/// Each pushed exchange names the exact parameters the next request must
/// carry, credentials and the test flag excluded. A mismatch or an
/// unexpected extra request panics. Clones share the same queue, so a test
/// can keep one handle and give the other to the client.
#[derive(Clone, Default)]
pub struct ScriptedTransport {
    script: Rc<RefCell<Script>>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Expect `params`, answer HTTP 200 with `body`.
    pub fn push(&self, params: &[(&str, &str)], body: &[u8]) {
        self.push_status(params, 200, "OK", body);
    }

    pub fn push_status(&self, params: &[(&str, &str)], status: u16, reason: &str, body: &[u8]) {
        self.push_reply(
            params,
            Reply::Http(HttpResponse {
                status,
                reason: reason.to_string(),
                body: body.to_vec(),
            }),
        );
    }

    /// Expect `params`, fail without any HTTP response.
    pub fn push_failure(&self, params: &[(&str, &str)], message: &str) {
        self.push_reply(params, Reply::Failure(message.to_string()));
    }

    fn push_reply(&self, params: &[(&str, &str)], reply: Reply) {
        let expected = params
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        self.script
            .borrow_mut()
            .exchanges
            .push_back(Exchange { expected, reply });
    }

    /// Number of requests sent so far.
    pub fn calls(&self) -> usize {
        self.script.borrow().requests.len()
    }

    /// Full query of every request sent, session parameters included.
    pub fn requests(&self) -> Vec<Vec<(String, String)>> {
        self.script.borrow().requests.clone()
    }

    pub fn urls(&self) -> Vec<String> {
        self.script.borrow().urls.clone()
    }

    /// Exchanges pushed but not consumed yet.
    pub fn pending(&self) -> usize {
        self.script.borrow().exchanges.len()
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, request: &HttpRequest<'_>) -> Result<HttpResponse, HttpFailure> {
        let mut script = self.script.borrow_mut();
        script.requests.push(request.query.to_vec());
        script.urls.push(request.url.to_string());

        let exchange = match script.exchanges.pop_front() {
            Some(exchange) => exchange,
            None => panic!("unexpected request {:?}", request.query),
        };
        let sent: BTreeMap<String, String> = request
            .query
            .iter()
            .filter(|(k, _)| !SESSION_PARAMS.contains(&k.as_str()))
            .cloned()
            .collect();
        assert_eq!(sent, exchange.expected, "request parameters differ from script");

        match exchange.reply {
            Reply::Http(response) => Ok(response),
            Reply::Failure(message) => Err(HttpFailure {
                status: None,
                message,
                body: Vec::new(),
            }),
        }
    }
}

/// `USER` with the digest of `PASS`.
pub fn test_credentials() -> Credentials {
    Credentials::new("USER", "MD57a95bf926a0333f57705aeac07a362a2")
}

/// A client wired to a fresh [`ScriptedTransport`].
pub fn scripted_client() -> (Oxxa, ScriptedTransport) {
    let transport = ScriptedTransport::new();
    let config = ClientConfig {
        api_url: "https://BOGO-OXXA/command.php".to_string(),
        ..ClientConfig::default()
    };
    let api = Oxxa::with_transport(test_credentials(), config, transport.clone());
    (api, transport)
}

/// A complete `<channel>` response with `details_xml` inside `<details>`.
pub fn order_body(status_code: &str, details_xml: &str) -> Vec<u8> {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<channel>
  <order>
    <order_id>173714200</order_id>
    <status_code>{status_code}</status_code>
    <status_description>status {status_code}</status_description>
    <price>0.00</price>
    <details>{details_xml}</details>
    <order_complete>TRUE</order_complete>
    <done>TRUE</done>
  </order>
</channel>
"#
    )
    .into_bytes()
}
