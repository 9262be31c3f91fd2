//! Nameserver groups: `nsgroup_list` and `nsgroup_get`.
//!
//! ```text
//! <nsgroup>
//!   <handle>YDNR00000</handle>
//!   <alias>Managed DNS service</alias>
//!   <nameservers>
//!     <ns1_fqdn>ns1.thednscompany.com</ns1_fqdn>
//!     <ns2_fqdn>ns2.thednscompany.com</ns2_fqdn>
//!   </nameservers>
//! </nsgroup>
//! ```

use serde::Serialize;

use super::cache::{HandleCache, Slot};
use super::{handle_identity, insert_opt, HandleResource};
use crate::client::Oxxa;
use crate::error::{ApplicationError, Result};
use crate::request::Params;
use crate::xml::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NsgroupDetails {
    pub alias: String,
    /// `ns<N>_fqdn` values in document order, empty ones left out.
    pub nameservers: Vec<String>,
}

impl NsgroupDetails {
    fn from_record(record: Record<'_>) -> Self {
        let nameservers = record
            .children("nameservers")
            .iter()
            .flat_map(|list| list.elements())
            .filter(|ns| is_nameserver_tag(ns.node().name()))
            .map(|ns| ns.node().text().trim().to_string())
            .filter(|fqdn| !fqdn.is_empty())
            .collect();

        Self {
            alias: record.str_value("alias").to_string(),
            nameservers,
        }
    }
}

fn is_nameserver_tag(tag: &str) -> bool {
    tag.strip_prefix("ns")
        .and_then(|rest| rest.strip_suffix("_fqdn"))
        .map(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
        .unwrap_or(false)
}

/// A nameserver group handle.
#[derive(Clone)]
pub struct Nsgroup {
    api: Oxxa,
    handle: String,
    details: Slot<NsgroupDetails>,
}

handle_identity!(Nsgroup);

impl HandleResource for Nsgroup {
    type Details = NsgroupDetails;

    const LIST_COMMAND: &'static str = "nsgroup_list";
    const FETCH_COMMAND: &'static str = "nsgroup_get";
    const RECORD_TAG: &'static str = "nsgroup";
    const HANDLE_PARAM: &'static str = "nsgroup";

    fn cache(api: &Oxxa) -> &HandleCache<NsgroupDetails> {
        api.nsgroup_cache()
    }

    fn parse_details(record: Record<'_>) -> Result<NsgroupDetails, ApplicationError> {
        Ok(NsgroupDetails::from_record(record))
    }

    fn from_parts(api: Oxxa, handle: String, details: Slot<NsgroupDetails>) -> Self {
        Self { api, handle, details }
    }
}

impl Nsgroup {
    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn details(&self) -> Result<&NsgroupDetails> {
        super::resolve::<Self>(&self.api, &self.handle, &self.details)
    }

    pub fn alias(&self) -> Result<&str> {
        Ok(&self.details()?.alias)
    }

    pub fn nameservers(&self) -> Result<&[String]> {
        Ok(&self.details()?.nameservers)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NsgroupFilter {
    /// Sent as `nsgroup`.
    pub handle: Option<String>,
    pub alias: Option<String>,
    pub global_search: Option<String>,
}

impl NsgroupFilter {
    fn params(&self) -> Params {
        let mut params = Params::new();
        insert_opt(&mut params, "nsgroup", &self.handle);
        insert_opt(&mut params, "alias", &self.alias);
        insert_opt(&mut params, "global_search", &self.global_search);
        params
    }
}

pub struct Nsgroups<'a> {
    api: &'a Oxxa,
}

impl<'a> Nsgroups<'a> {
    pub(crate) fn new(api: &'a Oxxa) -> Self {
        Self { api }
    }

    pub fn get(&self, handle: &str) -> Nsgroup {
        super::get(self.api, handle)
    }

    pub fn all(&self) -> Result<Vec<Nsgroup>> {
        self.filter(&NsgroupFilter::default())
    }

    pub fn filter(&self, filter: &NsgroupFilter) -> Result<Vec<Nsgroup>> {
        super::list(self.api, filter.params())
    }
}
