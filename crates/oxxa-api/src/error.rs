use thiserror::Error;

use crate::request::Request;
use crate::response::Order;
use crate::xml::XmlNode;

pub type Result<T, E = OxxaError> = std::result::Result<T, E>;

/// Any failure of an API call.
#[derive(Error, Debug, Clone)]
pub enum OxxaError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Transaction(#[from] TransactionError),
    #[error(transparent)]
    Application(#[from] ApplicationError),
}

impl OxxaError {
    pub fn request(&self) -> &Request {
        match self {
            Self::Transport(e) => &e.request,
            Self::Transaction(e) => &e.request,
            Self::Application(e) => &e.request,
        }
    }
}

/// No response, a non-200 response, or a body that is not a valid order.
#[derive(Error, Debug, Clone)]
#[error("transport error (HTTP {}): {message}", http_status_label(.http_status))]
pub struct TransportError {
    /// `None` when the request never got an HTTP response.
    pub http_status: Option<u16>,
    pub message: String,
    pub request: Request,
    /// Raw body, possibly empty.
    pub response: Vec<u8>,
}

/// The API answered with an `XMLERR` status.
#[derive(Error, Debug, Clone)]
#[error("transaction failed (XMLERR {code}): {message}")]
pub struct TransactionError {
    pub code: u32,
    pub message: String,
    pub request: Request,
    pub order: Box<Order>,
}

/// A successful response that the client could not make sense of.
#[derive(Error, Debug, Clone)]
#[error("application error ({code}): {message}")]
pub struct ApplicationError {
    /// Status code that triggered the error, 0 when not status related.
    pub code: u32,
    pub message: String,
    pub request: Request,
    /// The node that was being interpreted (an order, its details, or a
    /// record below it).
    pub response: XmlNode,
}

fn http_status_label(status: &Option<u16>) -> String {
    status.map_or_else(|| "none".to_string(), |s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    #[test]
    fn transport_error_display() {
        let request =
            Request::new("https://api.example/", "domain_list", params! { "records" => -1 });
        let err = TransportError {
            http_status: Some(503),
            message: "Service Unavailable".to_string(),
            request: request.clone(),
            response: b"<html>broken</html>".to_vec(),
        };
        assert_eq!(err.to_string(), "transport error (HTTP 503): Service Unavailable");

        let err = OxxaError::from(TransportError {
            http_status: None,
            message: "connection refused".to_string(),
            request,
            response: Vec::new(),
        });
        assert_eq!(err.to_string(), "transport error (HTTP none): connection refused");
        assert_eq!(err.request().command(), "domain_list");
    }
}
