//! Owned XML tree and typed value extraction.
//!
//! Responses are parsed with `roxmltree` and copied into an owned
//! [`XmlNode`] tree, so an [`Order`](crate::Order) or an error can keep the
//! document around after the body buffer is gone. [`Record`] pairs a node
//! with the request that produced it and knows how to decode the API's
//! field encodings.

use std::borrow::Cow;
use std::ops::RangeInclusive;
use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ApplicationError;
use crate::request::Request;

const YEARS: RangeInclusive<u32> = 1900..=9999;
const DAYS: RangeInclusive<u32> = 1..=31;

/// An element with its first text chunk and its element children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlNode {
    name: String,
    text: String,
    children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parse a document and return its root element.
    pub fn parse(text: &str) -> Result<Self, roxmltree::Error> {
        let doc = roxmltree::Document::parse(text)?;
        Ok(Self::from_element(doc.root_element()))
    }

    /// Decode a response body. The API declares ISO-8859-1 but usually
    /// sends UTF-8; try UTF-8 first.
    pub fn decode_body(body: &[u8]) -> Cow<'_, str> {
        match std::str::from_utf8(body) {
            Ok(text) => Cow::Borrowed(text),
            Err(_) => Cow::Owned(body.iter().map(|&b| char::from(b)).collect()),
        }
    }

    fn from_element(node: roxmltree::Node<'_, '_>) -> Self {
        Self {
            name: node.tag_name().name().to_string(),
            text: node.text().unwrap_or_default().to_string(),
            children: node
                .children()
                .filter(|child| child.is_element())
                .map(Self::from_element)
                .collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlNode] {
        &self.children
    }

    /// First immediate child called `tag`.
    pub fn find(&self, tag: &str) -> Option<&XmlNode> {
        self.children.iter().find(|child| child.name == tag)
    }
}

/// Tri-state `order_complete` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Complete,
    Incomplete,
    Pending,
}

/// `TRUE`/`Y` and `FALSE`/`N`; anything else is `None`.
pub fn decode_bool(value: &str) -> Option<bool> {
    match value {
        "TRUE" | "Y" => Some(true),
        "FALSE" | "N" => Some(false),
        _ => None,
    }
}

pub fn decode_completion(value: &str) -> Option<Completion> {
    if value == "PENDING" {
        return Some(Completion::Pending);
    }
    decode_bool(value).map(|done| if done { Completion::Complete } else { Completion::Incomplete })
}

/// `YYYY-MM-DD` or `DD-MM-YYYY`, years limited to 1900..=9999.
pub fn decode_date(value: &str) -> Option<NaiveDate> {
    let parts = value
        .split('-')
        .map(|part| part.trim().parse::<u32>())
        .collect::<Result<Vec<_>, _>>()
        .ok()?;
    let [mut year, month, mut day] = <[u32; 3]>::try_from(parts).ok()?;

    if !YEARS.contains(&year) && YEARS.contains(&day) && DAYS.contains(&year) {
        std::mem::swap(&mut year, &mut day);
    }
    if !YEARS.contains(&year) {
        return None;
    }
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// A node viewed as an API record, tied to the request it came from.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    node: &'a XmlNode,
    request: &'a Request,
}

impl<'a> Record<'a> {
    pub fn new(node: &'a XmlNode, request: &'a Request) -> Self {
        Self { node, request }
    }

    pub fn node(&self) -> &'a XmlNode {
        self.node
    }

    pub fn request(&self) -> &'a Request {
        self.request
    }

    /// An [`ApplicationError`] pointing at this record.
    pub fn error(&self, code: u32, message: impl Into<String>) -> ApplicationError {
        ApplicationError {
            code,
            message: message.into(),
            request: self.request.clone(),
            response: self.node.clone(),
        }
    }

    pub fn has(&self, tag: &str) -> bool {
        self.node.find(tag).is_some()
    }

    /// Text of the first `tag` child; empty when absent.
    pub fn str_value(&self, tag: &str) -> &'a str {
        self.node.find(tag).map(XmlNode::text).unwrap_or_default()
    }

    /// Panics on anything but `TRUE`/`FALSE`/`Y`/`N`: the API guarantees
    /// these for every boolean field.
    pub fn bool_value(&self, tag: &str) -> bool {
        let value = self.str_value(tag);
        match decode_bool(value) {
            Some(b) => b,
            None => panic!("unexpected boolean {value:?} in <{tag}> of {}", self.request),
        }
    }

    /// Like [`bool_value`](Self::bool_value), `None` when the child is absent.
    pub fn opt_bool_value(&self, tag: &str) -> Option<bool> {
        self.has(tag).then(|| self.bool_value(tag))
    }

    pub fn int_value(&self, tag: &str) -> Result<i64, ApplicationError> {
        self.str_value(tag)
            .trim()
            .parse()
            .map_err(|_| self.error(0, format!("bad integer in {tag}")))
    }

    pub fn decimal_value(&self, tag: &str) -> Result<Decimal, ApplicationError> {
        Decimal::from_str(self.str_value(tag).trim())
            .map_err(|_| self.error(0, format!("bad decimal in {tag}")))
    }

    pub fn date_value(&self, tag: &str) -> Result<NaiveDate, ApplicationError> {
        decode_date(self.str_value(tag)).ok_or_else(|| self.error(0, format!("bad date in {tag}")))
    }

    /// Empty or missing dates are `None`; garbage is still an error.
    pub fn opt_date_value(&self, tag: &str) -> Result<Option<NaiveDate>, ApplicationError> {
        match self.date_value(tag) {
            Ok(date) => Ok(Some(date)),
            Err(_) if self.str_value(tag).trim().is_empty() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Exactly one `tag` child.
    pub fn child(&self, tag: &str) -> Result<Record<'a>, ApplicationError> {
        let mut matches = self.node.children().iter().filter(|node| node.name() == tag);
        match (matches.next(), matches.next()) {
            (Some(only), None) => Ok(Record::new(only, self.request)),
            _ => Err(self.error(0, format!("non-1 children of {tag}"))),
        }
    }

    /// All `tag` children in document order.
    pub fn children(&self, tag: &str) -> Vec<Record<'a>> {
        self.node
            .children()
            .iter()
            .filter(|node| node.name() == tag)
            .map(|node| Record::new(node, self.request))
            .collect()
    }

    /// Every element child, whatever its name.
    pub fn elements(&self) -> impl Iterator<Item = Record<'a>> + 'a {
        let request = self.request;
        self.node.children().iter().map(move |node| Record::new(node, request))
    }
}
