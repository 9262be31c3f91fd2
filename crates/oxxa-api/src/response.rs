//! The `<channel><order/></channel>` response envelope.
//!
//! ```text
//! <channel>
//!   <order>
//!     <order_id>1234567</order_id>
//!     <command>domain_list</command>
//!     <status_code>XMLOK18</status_code>
//!     <status_description>In DETAILS vindt u ...</status_description>
//!     <price>0.00</price>
//!     <details>...</details>
//!     <order_complete>TRUE</order_complete>  <!-- TRUE, PENDING or FALSE -->
//!     <done>TRUE</done>                      <!-- end of output -->
//!   </order>
//! </channel>
//! ```

use thiserror::Error;

use crate::error::ApplicationError;
use crate::request::Request;
use crate::xml::{decode_bool, decode_completion, Completion, Record, XmlNode};

const ENVELOPE_TAG: &str = "channel";
const ORDER_TAG: &str = "order";
const OK_PREFIX: &str = "XMLOK";
const ERR_PREFIX: &str = "XMLERR";

/// Why a body could not be turned into an [`Order`].
#[derive(Error, Debug)]
pub(crate) enum ParseError {
    #[error("XML parse failure: {0}")]
    Xml(#[from] roxmltree::Error),
    #[error("unexpected response shape: <{0}> is not a <channel> holding one <order>")]
    Envelope(String),
    #[error("unexpected status_code {0:?}")]
    StatusCode(String),
    #[error("unexpected {tag} {value:?}")]
    Flag { tag: &'static str, value: String },
    #[error(transparent)]
    Field(#[from] ApplicationError),
}

/// Decoded `status_code`: `(ok, code)`.
///
/// `XMLOK18` and `XMLERR 24` are both valid, the number may be space padded.
pub fn parse_status_code(status_code: &str) -> Option<(bool, u32)> {
    let (ok, rest) = if let Some(rest) = status_code.strip_prefix(OK_PREFIX) {
        (true, rest)
    } else if let Some(rest) = status_code.strip_prefix(ERR_PREFIX) {
        (false, rest)
    } else {
        return None;
    };
    rest.trim().parse().ok().map(|code| (ok, code))
}

/// Outcome of an order, derived from `status_code` and `status_description`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status<'a> {
    pub ok: bool,
    pub code: u32,
    pub message: &'a str,
}

/// One command result.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    request: Request,
    root: XmlNode,
    order_id: i64,
    status_code: String,
    status_description: String,
    order_complete: Completion,
    done: bool,
}

impl Order {
    /// Parse a response body and pull the order out of its envelope.
    pub(crate) fn extract(body: &[u8], request: Request) -> Result<Self, ParseError> {
        let text = XmlNode::decode_body(body);
        let root = XmlNode::parse(&text)?;

        if root.name() != ENVELOPE_TAG {
            return Err(ParseError::Envelope(root.name().to_string()));
        }
        match root.children() {
            [order] if order.name() == ORDER_TAG => Self::from_node(order.clone(), request),
            _ => Err(ParseError::Envelope(root.name().to_string())),
        }
    }

    fn from_node(root: XmlNode, request: Request) -> Result<Self, ParseError> {
        let record = Record::new(&root, &request);
        let order_id = record.int_value("order_id")?;

        let status_code = record.str_value("status_code").to_string();
        if parse_status_code(&status_code).is_none() {
            return Err(ParseError::StatusCode(status_code));
        }
        let status_description = record.str_value("status_description").to_string();

        let value = record.str_value("order_complete");
        let order_complete = decode_completion(value).ok_or_else(|| ParseError::Flag {
            tag: "order_complete",
            value: value.to_string(),
        })?;
        let value = record.str_value("done");
        let done = decode_bool(value).ok_or_else(|| ParseError::Flag {
            tag: "done",
            value: value.to_string(),
        })?;

        Ok(Self {
            request,
            root,
            order_id,
            status_code,
            status_description,
            order_complete,
            done,
        })
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn node(&self) -> &XmlNode {
        &self.root
    }

    /// The `<order>` element as a record, for reading extra fields.
    pub fn record(&self) -> Record<'_> {
        Record::new(&self.root, &self.request)
    }

    pub fn order_id(&self) -> i64 {
        self.order_id
    }

    pub fn status_code(&self) -> &str {
        &self.status_code
    }

    pub fn status_description(&self) -> &str {
        &self.status_description
    }

    pub fn status(&self) -> Status<'_> {
        // validated in from_node
        let (ok, code) = parse_status_code(&self.status_code).unwrap_or((false, 0));
        Status {
            ok,
            code,
            message: &self.status_description,
        }
    }

    pub fn order_complete(&self) -> Completion {
        self.order_complete
    }

    pub fn is_order_complete(&self, completion: Completion) -> bool {
        self.order_complete == completion
    }

    pub fn done(&self) -> bool {
        self.done
    }

    /// The single `<details>` child.
    pub fn details(&self) -> Result<Record<'_>, ApplicationError> {
        self.record().child("details")
    }

    /// An [`ApplicationError`] about this order as a whole.
    pub fn error(&self, code: u32, message: impl Into<String>) -> ApplicationError {
        self.record().error(code, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params;

    fn request() -> Request {
        Request::new(
            "https://api.example/command.php",
            "domain_inf",
            params! { "sld" => "example", "tld" => "nl" },
        )
    }

    fn envelope(status_code: &str, complete: &str) -> Vec<u8> {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<channel>
  <order>
    <order_id>173717176</order_id>
    <command>domain_inf</command>
    <status_code>{status_code}</status_code>
    <status_description>Dit domein is niet onder beheer van deze
      gebruiker</status_description>
    <price>0</price>
    <details>42</details>
    <order_complete>{complete}</order_complete>
    <done>TRUE</done>
  </order>
</channel>
"#
        )
        .into_bytes()
    }

    #[test]
    fn status_codes() {
        assert_eq!(parse_status_code("XMLOK18"), Some((true, 18)));
        assert_eq!(parse_status_code("XMLOK 33"), Some((true, 33)));
        assert_eq!(parse_status_code("XMLERR 24"), Some((false, 24)));
        assert_eq!(parse_status_code("XMLERR24"), Some((false, 24)));
        assert_eq!(parse_status_code("OK 18"), None);
        assert_eq!(parse_status_code("XMLOK"), None);
        assert_eq!(parse_status_code("XMLOKxx"), None);
    }

    #[test]
    fn extracts_order_fields() {
        let order =
            Order::extract(&envelope("XMLERR 24", "FALSE"), request()).expect("extract order");
        assert_eq!(order.order_id(), 173_717_176);
        assert_eq!(order.status_code(), "XMLERR 24");
        let status = order.status();
        assert!(!status.ok);
        assert_eq!(status.code, 24);
        assert!(status.message.starts_with("Dit domein is niet onder beheer van"));
        assert_eq!(order.order_complete(), Completion::Incomplete);
        assert!(order.is_order_complete(Completion::Incomplete));
        assert!(!order.is_order_complete(Completion::Pending));
        assert!(order.done());
        assert_eq!(order.request().command(), "domain_inf");
        assert_eq!(order.details().expect("details").node().text(), "42");
        assert_eq!(
            order.record().decimal_value("price").expect("price"),
            rust_decimal::Decimal::ZERO
        );
    }

    #[test]
    fn pending_completion() {
        let order =
            Order::extract(&envelope("XMLOK 1", "PENDING"), request()).expect("extract order");
        assert!(order.status().ok);
        assert_eq!(order.order_complete(), Completion::Pending);
    }

    #[test]
    fn truncated_xml_is_a_parse_error() {
        let body = envelope("XMLOK18", "TRUE");
        let err = Order::extract(&body[..body.len() / 2], request()).expect_err("truncated");
        assert!(matches!(err, ParseError::Xml(_)));
        assert!(err.to_string().starts_with("XML parse failure"));
    }

    #[test]
    fn wrong_envelope_is_rejected() {
        let err = Order::extract(b"<order><order_id>1</order_id></order>", request())
            .expect_err("no channel");
        assert!(matches!(err, ParseError::Envelope(ref tag) if tag == "order"));

        let err = Order::extract(b"<channel><order/><order/></channel>", request())
            .expect_err("two orders");
        assert!(matches!(err, ParseError::Envelope(_)));
    }

    #[test]
    fn bad_order_fields_are_rejected() {
        let err = Order::extract(&envelope("OK18", "TRUE"), request()).expect_err("bad status");
        assert!(matches!(err, ParseError::StatusCode(_)));

        let err = Order::extract(&envelope("XMLOK18", "MAYBE"), request()).expect_err("bad flag");
        assert_eq!(err.to_string(), "unexpected order_complete \"MAYBE\"");

        let body = b"<channel><order><order_id>x</order_id></order></channel>";
        let err = Order::extract(body, request()).expect_err("bad id");
        assert!(matches!(err, ParseError::Field(_)));
        assert!(err.to_string().ends_with("bad integer in order_id"));
    }
}
