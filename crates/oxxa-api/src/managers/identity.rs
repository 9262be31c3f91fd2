//! Contact handles: `identity_list` and `identity_get`.
//!
//! ```text
//! <identity>
//!   <handle>SQGU88967</handle>
//!   <alias>ACME Inc</alias>
//!   <company_name>ACME Inc</company_name>
//!   <name>Doe, John</name>
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
pub struct IdentityDetails {
    pub alias: String,
    pub company_name: String,
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
}

impl IdentityDetails {
    fn from_record(record: Record<'_>) -> Self {
        // "Last, First"; a name without the separator is all last name
        let name = record.str_value("name");
        let (last_name, first_name) = name.split_once(", ").unwrap_or((name, ""));
        let email = record.str_value("email");

        Self {
            alias: record.str_value("alias").to_string(),
            company_name: record.str_value("company_name").to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
        }
    }
}

/// An identity (contact) handle.
#[derive(Clone)]
pub struct Identity {
    api: Oxxa,
    handle: String,
    details: Slot<IdentityDetails>,
}

handle_identity!(Identity);

impl HandleResource for Identity {
    type Details = IdentityDetails;

    const LIST_COMMAND: &'static str = "identity_list";
    const FETCH_COMMAND: &'static str = "identity_get";
    const RECORD_TAG: &'static str = "identity";
    const HANDLE_PARAM: &'static str = "handle";

    fn cache(api: &Oxxa) -> &HandleCache<IdentityDetails> {
        api.identity_cache()
    }

    fn parse_details(record: Record<'_>) -> Result<IdentityDetails, ApplicationError> {
        Ok(IdentityDetails::from_record(record))
    }

    fn from_parts(api: Oxxa, handle: String, details: Slot<IdentityDetails>) -> Self {
        Self { api, handle, details }
    }
}

impl Identity {
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Everything known about this handle, fetched on first use.
    pub fn details(&self) -> Result<&IdentityDetails> {
        super::resolve::<Self>(&self.api, &self.handle, &self.details)
    }

    pub fn alias(&self) -> Result<&str> {
        Ok(&self.details()?.alias)
    }

    pub fn company_name(&self) -> Result<&str> {
        Ok(&self.details()?.company_name)
    }

    pub fn first_name(&self) -> Result<&str> {
        Ok(&self.details()?.first_name)
    }

    pub fn last_name(&self) -> Result<&str> {
        Ok(&self.details()?.last_name)
    }

    pub fn email(&self) -> Result<Option<&str>> {
        Ok(self.details()?.email.as_deref())
    }

    /// `First Last <email>`, or just the name when there is no address.
    pub fn name_addr(&self) -> Result<String> {
        let details = self.details()?;
        let name = format!("{} {}", details.first_name, details.last_name);
        let name = name.trim();
        Ok(match &details.email {
            Some(email) => format!("{name} <{email}>"),
            None => name.to_string(),
        })
    }
}

/// Search parameters of `identity_list`; unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdentityFilter {
    pub handle: Option<String>,
    pub name: Option<String>,
    pub company_name: Option<String>,
    pub alias: Option<String>,
    /// Match against every field.
    pub global_search: Option<String>,
}

impl IdentityFilter {
    fn params(&self) -> Params {
        let mut params = Params::new();
        insert_opt(&mut params, "handle", &self.handle);
        insert_opt(&mut params, "name", &self.name);
        insert_opt(&mut params, "company_name", &self.company_name);
        insert_opt(&mut params, "alias", &self.alias);
        insert_opt(&mut params, "global_search", &self.global_search);
        params
    }
}

pub struct Identities<'a> {
    api: &'a Oxxa,
}

impl<'a> Identities<'a> {
    pub(crate) fn new(api: &'a Oxxa) -> Self {
        Self { api }
    }

    /// Reference to `handle`; no request until a field is read.
    pub fn get(&self, handle: &str) -> Identity {
        super::get(self.api, handle)
    }

    pub fn all(&self) -> Result<Vec<Identity>> {
        self.filter(&IdentityFilter::default())
    }

    pub fn filter(&self, filter: &IdentityFilter) -> Result<Vec<Identity>> {
        super::list(self.api, filter.params())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{order_body, scripted_client};

    const LIST: &str = "\
        <identity><handle>VQ0000000</handle><alias>Walter</alias>\
          <company_name>OSSO B.V.</company_name><name>Doekes, Walter</name></identity>\
        <identity><handle>MH0000000</handle><alias>ACME Inc</alias>\
          <company_name>ACME Inc</company_name><name>Doe, John</name></identity>";

    #[test]
    fn list_sorts_by_handle_and_fills_cache() {
        let (api, transport) = scripted_client();
        transport.push(
            &[("command", "identity_list"), ("records", "-1")],
            &order_body("XMLOK 18", LIST),
        );

        let identities = api.identities().all().expect("list");
        let handles: Vec<_> = identities.iter().map(Identity::handle).collect();
        assert_eq!(handles, ["MH0000000", "VQ0000000"]);
        assert_eq!(identities[1].first_name().expect("first"), "Walter");
        assert_eq!(identities[1].last_name().expect("last"), "Doekes");
        assert_eq!(identities[0].email().expect("email"), None);

        // served from the listing, no identity_get
        let again = api.identities().get("VQ0000000");
        assert_eq!(again.company_name().expect("company"), "OSSO B.V.");
        assert_eq!(again, identities[1]);
        assert_eq!(transport.calls(), 1);
        assert_eq!(api.identity_cache().len(), 2);
    }

    #[test]
    fn unknown_handle_is_fetched_once() {
        let (api, transport) = scripted_client();
        transport.push(
            &[("command", "identity_get"), ("handle", "SQGU88967")],
            &order_body(
                "XMLOK 1",
                "<alias>ACME</alias><name>Solo</name><email>ops@example.com</email>",
            ),
        );

        let identity = api.identities().get("SQGU88967");
        assert_eq!(transport.calls(), 0);
        assert_eq!(identity.name_addr().expect("name_addr"), "Solo <ops@example.com>");
        assert_eq!(identity.last_name().expect("last"), "Solo");
        assert_eq!(identity.first_name().expect("first"), "");
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn filter_sends_only_set_fields() {
        let (api, transport) = scripted_client();
        transport.push(
            &[("command", "identity_list"), ("records", "-1"), ("alias", "ACME Inc")],
            &order_body("XMLOK 18", ""),
        );
        let filter = IdentityFilter {
            alias: Some("ACME Inc".to_string()),
            ..IdentityFilter::default()
        };
        assert!(api.identities().filter(&filter).expect("filter").is_empty());
    }
}
