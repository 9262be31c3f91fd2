//! Client configuration and the single-shot command call.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::credentials::Credentials;
use crate::error::{Result, TransactionError, TransportError};
use crate::request::{Params, Request};
use crate::response::Order;
use crate::transport::{HttpRequest, Transport};

/// `url?apiuser=USER&apipassword=PASS&command=CMD[&test=Y]`
pub const API_URL: &str = "https://api.oxxa.com/command.php";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_url: String,
    pub user_agent: String,
    /// Send `test=Y`: the API validates the command without executing it.
    pub test_mode: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: API_URL.to_string(),
            user_agent: concat!("oxxa-api/", env!("CARGO_PKG_VERSION")).to_string(),
            test_mode: false,
        }
    }
}

/// Everything a single API call needs.
pub struct Session {
    credentials: Credentials,
    config: ClientConfig,
    transport: Box<dyn Transport>,
}

impl Session {
    pub fn new(
        credentials: Credentials,
        config: ClientConfig,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            credentials,
            config,
            transport,
        }
    }

    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Run `command` and return its order, failing on `XMLERR` statuses.
    pub fn call(&self, command: &str, params: Params) -> Result<Order> {
        let order = self.xml_call(command, params)?;
        let status = order.status();
        if !status.ok {
            warn!(
                command,
                code = status.code,
                description = status.message,
                "API reported failure"
            );
            return Err(TransactionError {
                code: status.code,
                message: status.message.to_string(),
                request: order.request().clone(),
                order: Box::new(order),
            }
            .into());
        }
        Ok(order)
    }

    /// Run `command` and return its order, whatever its status.
    fn xml_call(&self, command: &str, params: Params) -> Result<Order, TransportError> {
        let request = Request::new(&self.config.api_url, command, params);

        let mut extra = vec![
            ("apiuser", self.credentials.username().to_string()),
            ("apipassword", self.credentials.password().to_string()),
        ];
        if self.config.test_mode {
            extra.push(("test", "Y".to_string()));
        }
        let query = request.query(&extra);

        debug!(
            command,
            params = ?request.params().keys().collect::<Vec<_>>(),
            test_mode = self.config.test_mode,
            "sending command"
        );
        let result = self.transport.get(&HttpRequest {
            url: request.url(),
            query: &query,
            user_agent: &self.config.user_agent,
        });
        let response = match result {
            Ok(response) => response,
            Err(failure) => {
                warn!(command, error = %failure.message, "no usable HTTP response");
                return Err(TransportError {
                    http_status: failure.status,
                    message: failure.message,
                    request,
                    response: failure.body,
                });
            }
        };
        debug!(command, status = response.status, bytes = response.body.len(), "received response");

        if response.status != 200 {
            warn!(command, status = response.status, "unexpected HTTP status");
            return Err(TransportError {
                http_status: Some(response.status),
                message: response.reason,
                request,
                response: response.body,
            });
        }

        match Order::extract(&response.body, request.clone()) {
            Ok(order) => Ok(order),
            Err(e) => {
                warn!(command, error = %e, "unparseable response");
                Err(TransportError {
                    http_status: Some(response.status),
                    message: e.to_string(),
                    request,
                    response: response.body,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OxxaError;
    use crate::params;
    use crate::testing::{order_body, test_credentials, ScriptedTransport};

    fn session(transport: &ScriptedTransport, config: ClientConfig) -> Session {
        Session::new(test_credentials(), config, Box::new(transport.clone()))
    }

    #[test]
    fn credentials_and_test_flag_are_sent() {
        let transport = ScriptedTransport::new();
        transport.push(
            &[("command", "domain_check"), ("sld", "example"), ("tld", "com")],
            &order_body("XMLOK 10", ""),
        );
        let config = ClientConfig {
            test_mode: true,
            ..ClientConfig::default()
        };
        session(&transport, config)
            .call("domain_check", params! { "sld" => "example", "tld" => "com" })
            .expect("call");

        let sent = &transport.requests()[0];
        assert!(sent.contains(&("apiuser".to_string(), "USER".to_string())));
        let digest = "MD57a95bf926a0333f57705aeac07a362a2".to_string();
        assert!(sent.contains(&("apipassword".to_string(), digest)));
        assert!(sent.contains(&("test".to_string(), "Y".to_string())));
        assert_eq!(transport.urls()[0], API_URL);
    }

    #[test]
    fn network_failure_has_no_status() {
        let transport = ScriptedTransport::new();
        transport.push_failure(&[("command", "domain_list")], "connection refused");
        let err = session(&transport, ClientConfig::default())
            .call("domain_list", params! {})
            .expect_err("no response");
        match err {
            OxxaError::Transport(e) => {
                assert_eq!(e.http_status, None);
                assert_eq!(e.message, "connection refused");
                assert!(e.response.is_empty());
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn order_ok_is_returned() {
        let transport = ScriptedTransport::new();
        transport.push(&[("command", "domain_check")], &order_body("XMLOK18", "<x>1</x>"));
        let order = session(&transport, ClientConfig::default())
            .call("domain_check", params! {})
            .expect("call");
        assert_eq!(order.status().code, 18);
        assert_eq!(order.details().expect("details").int_value("x").expect("int"), 1);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ClientConfig = serde_json::from_str(r#"{"test_mode": true}"#).expect("config");
        assert!(config.test_mode);
        assert_eq!(config.api_url, API_URL);
        assert!(config.user_agent.starts_with("oxxa-api/"));
    }
}
