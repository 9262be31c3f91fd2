//! Reseller handles: `resellerlist` and `resellerget`.
//!
//! The list wraps each reseller in an `<identity>` element and carries
//! `alias` and `company`, not `name`/`company_name`:
//!
//! ```text
//! <identity>
//!   <handle>KULB12345</handle>
//!   <alias>ACME Registrar</alias>
//!   <company>ACME Inc</company>
//! </identity>
//! ```

use serde::Serialize;

use super::cache::{HandleCache, Slot};
use super::{handle_identity, insert_opt, HandleResource};
use crate::client::Oxxa;
use crate::error::{ApplicationError, Result};
use crate::request::Params;
use crate::xml::Record;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResellerDetails {
    pub alias: String,
    pub company: String,
}

#[derive(Clone)]
pub struct Reseller {
    api: Oxxa,
    handle: String,
    details: Slot<ResellerDetails>,
}

handle_identity!(Reseller);

impl HandleResource for Reseller {
    type Details = ResellerDetails;

    const LIST_COMMAND: &'static str = "resellerlist";
    const FETCH_COMMAND: &'static str = "resellerget";
    const RECORD_TAG: &'static str = "identity";
    const HANDLE_PARAM: &'static str = "handle";

    fn cache(api: &Oxxa) -> &HandleCache<ResellerDetails> {
        api.reseller_cache()
    }

    fn parse_details(record: Record<'_>) -> Result<ResellerDetails, ApplicationError> {
        Ok(ResellerDetails {
            alias: record.str_value("alias").to_string(),
            company: record.str_value("company").to_string(),
        })
    }

    fn from_parts(api: Oxxa, handle: String, details: Slot<ResellerDetails>) -> Self {
        Self { api, handle, details }
    }
}

impl Reseller {
    pub fn handle(&self) -> &str {
        &self.handle
    }

    pub fn details(&self) -> Result<&ResellerDetails> {
        super::resolve::<Self>(&self.api, &self.handle, &self.details)
    }

    pub fn alias(&self) -> Result<&str> {
        Ok(&self.details()?.alias)
    }

    pub fn company(&self) -> Result<&str> {
        Ok(&self.details()?.company)
    }
}

/// A reseller slot on a domain or in a request.
///
/// `Unset` means nothing known or nothing to send; `None` is the explicit
/// "no reseller", sent as an empty handle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ResellerRef {
    #[default]
    Unset,
    None,
    Some(Reseller),
}

impl ResellerRef {
    /// `None` for an empty handle, otherwise a reference to it.
    pub fn resolve(api: &Oxxa, handle: &str) -> Self {
        if handle.is_empty() {
            Self::None
        } else {
            Self::Some(api.resellers().get(handle))
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Handle to send as `identity-reseller`, if any.
    pub fn param(&self) -> Option<String> {
        match self {
            Self::Unset => None,
            Self::None => Some(String::new()),
            Self::Some(reseller) => Some(reseller.handle().to_string()),
        }
    }

    pub fn handle(&self) -> Option<&str> {
        match self {
            Self::Some(reseller) => Some(reseller.handle()),
            Self::Unset | Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResellerFilter {
    pub handle: Option<String>,
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub alias: Option<String>,
}

impl ResellerFilter {
    fn params(&self) -> Params {
        let mut params = Params::new();
        insert_opt(&mut params, "handle", &self.handle);
        insert_opt(&mut params, "name", &self.name);
        insert_opt(&mut params, "company_name", &self.company_name);
        insert_opt(&mut params, "alias", &self.alias);
        params
    }
}

pub struct Resellers<'a> {
    api: &'a Oxxa,
}

impl<'a> Resellers<'a> {
    pub(crate) fn new(api: &'a Oxxa) -> Self {
        Self { api }
    }

    pub fn get(&self, handle: &str) -> Reseller {
        super::get(self.api, handle)
    }

    /// The explicit "no reseller" value, for filtering and updates.
    pub fn none(&self) -> ResellerRef {
        ResellerRef::None
    }

    pub fn all(&self) -> Result<Vec<Reseller>> {
        self.filter(&ResellerFilter::default())
    }

    pub fn filter(&self, filter: &ResellerFilter) -> Result<Vec<Reseller>> {
        super::list(self.api, filter.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{order_body, scripted_client};

    #[test]
    fn list_reads_identity_records() {
        let (api, transport) = scripted_client();
        transport.push(
            &[("command", "resellerlist"), ("records", "-1")],
            &order_body(
                "XMLOK 18",
                "<identity><handle>KULB12345</handle><alias>ACME Registrar</alias>\
                 <company>ACME Inc</company></identity>",
            ),
        );
        let resellers = api.resellers().all().expect("list");
        assert_eq!(resellers.len(), 1);
        assert_eq!(resellers[0].handle(), "KULB12345");
        assert_eq!(resellers[0].company().expect("company"), "ACME Inc");
        assert_eq!(resellers[0].alias().expect("alias"), "ACME Registrar");
    }

    #[test]
    fn reseller_refs() {
        let (api, transport) = scripted_client();
        assert_eq!(ResellerRef::resolve(&api, ""), ResellerRef::None);
        assert_eq!(api.resellers().none(), ResellerRef::None);
        let some = ResellerRef::resolve(&api, "KULB12345");
        assert_eq!(some.handle(), Some("KULB12345"));
        assert_eq!(some.param().as_deref(), Some("KULB12345"));
        assert_eq!(ResellerRef::None.param().as_deref(), Some(""));
        assert_eq!(ResellerRef::Unset.param(), None);
        assert!(ResellerRef::default().is_unset());
        assert_eq!(transport.calls(), 0);
    }

    #[test]
    fn lazy_fetch_uses_resellerget() {
        let (api, transport) = scripted_client();
        transport.push(
            &[("command", "resellerget"), ("handle", "KULB12345")],
            &order_body("XMLOK 1", "<alias>ACME Registrar</alias><company>ACME Inc</company>"),
        );
        let reseller = api.resellers().get("KULB12345");
        assert_eq!(reseller.alias().expect("alias"), "ACME Registrar");
        assert_eq!(reseller.company().expect("company"), "ACME Inc");
        assert_eq!(transport.calls(), 1);
    }
}
