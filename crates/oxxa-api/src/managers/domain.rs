//! Domains: listing, details, availability, updates and transfers.
//!
//! A `domain_list` record and the `<details>` of `domain_inf` carry the same
//! fields, except that `identity-reseller` is only present in the latter:
//!
//! ```text
//! <domain>
//!   <domainname>example.com</domainname>
//!   <nsgroup>RG0000000</nsgroup>
//!   <identity-registrant>VQ0000000</identity-registrant>
//!   <identity-admin>VQ0000000</identity-admin>
//!   <identity-tech>MH0000000</identity-tech>
//!   <identity-billing>MH0000000</identity-billing>
//!   <start_date>2021-04-01</start_date>
//!   <expire_date>2021-10-01</expire_date>
//!   <quarantaine_end/>
//!   <notice_date>2021-10-01</notice_date>
//!   <autorenew>Y</autorenew>
//!   <usetrustee>N</usetrustee>
//! </domain>
//! ```

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::debug;

use super::identity::Identity;
use super::insert_opt;
use super::nsgroup::Nsgroup;
use super::reseller::ResellerRef;
use crate::client::Oxxa;
use crate::error::{ApplicationError, Result};
use crate::params;
use crate::request::{ParamValue, Params};
use crate::response::Order;
use crate::xml::Record;

const CHECK_TAKEN: u32 = 10;
const CHECK_FREE: u32 = 11;

const REGISTRANT: &str = "identity-registrant";
const ADMIN: &str = "identity-admin";
const TECH: &str = "identity-tech";
const BILLING: &str = "identity-billing";
const RESELLER: &str = "identity-reseller";

/// Everything a domain record says, identities and nsgroup as handles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DomainDetails {
    pub nsgroup: String,
    pub registrant: String,
    pub admin: String,
    pub tech: String,
    pub billing: String,
    pub start_date: NaiveDate,
    pub expire_date: NaiveDate,
    pub quarantaine_end: Option<NaiveDate>,
    pub notice_date: Option<NaiveDate>,
    pub autorenew: bool,
    pub lock: Option<bool>,
    pub usetrustee: Option<bool>,
}

impl DomainDetails {
    fn from_record(record: Record<'_>) -> Result<Self, ApplicationError> {
        Ok(Self {
            nsgroup: record.str_value("nsgroup").to_string(),
            registrant: record.str_value(REGISTRANT).to_string(),
            admin: record.str_value(ADMIN).to_string(),
            tech: record.str_value(TECH).to_string(),
            billing: record.str_value(BILLING).to_string(),
            start_date: record.date_value("start_date")?,
            expire_date: record.date_value("expire_date")?,
            quarantaine_end: record.opt_date_value("quarantaine_end")?,
            notice_date: record.opt_date_value("notice_date")?,
            autorenew: record.bool_value("autorenew"),
            lock: record.opt_bool_value("lock"),
            usetrustee: record.opt_bool_value("usetrustee"),
        })
    }
}

fn reseller_handle(record: Record<'_>) -> Option<String> {
    record.has(RESELLER).then(|| record.str_value(RESELLER).to_string())
}

/// A domain name, e.g. `example.com` or `example.co.uk`.
#[derive(Clone)]
pub struct Domain {
    api: Oxxa,
    name: String,
    sld: String,
    tld: String,
    details: OnceCell<DomainDetails>,
    reseller: OnceCell<String>,
}

impl Domain {
    /// Panics when `name` has no dot.
    fn new(api: &Oxxa, name: &str) -> Self {
        let Some((sld, tld)) = name.split_once('.') else {
            panic!("domain name {name:?} has no tld");
        };
        Self {
            api: api.clone(),
            name: name.to_string(),
            sld: sld.to_string(),
            tld: tld.to_string(),
            details: OnceCell::new(),
            reseller: OnceCell::new(),
        }
    }

    fn from_record(api: &Oxxa, record: Record<'_>) -> Result<Self, ApplicationError> {
        let name = record.str_value("domainname");
        if !name.contains('.') {
            return Err(record.error(0, "bad name in domainname"));
        }
        let domain = Self::new(api, name);
        let details = DomainDetails::from_record(record)?;
        Ok(Self {
            details: OnceCell::from(details),
            reseller: reseller_handle(record).map(OnceCell::from).unwrap_or_default(),
            ..domain
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sld(&self) -> &str {
        &self.sld
    }

    /// Everything after the first dot, so `co.uk` for `example.co.uk`.
    pub fn tld(&self) -> &str {
        &self.tld
    }

    fn call(&self, command: &str, mut params: Params) -> Result<Order> {
        params.insert("sld".to_string(), ParamValue::from(&self.sld));
        params.insert("tld".to_string(), ParamValue::from(&self.tld));
        self.api.session().call(command, params)
    }

    /// `domain_inf`, filling whichever of details and reseller are still
    /// unknown. A missing `identity-reseller` means no reseller.
    fn fetch(&self) -> Result<&DomainDetails> {
        debug!(domain = %self.name, "fetching domain details");
        let order = self.call("domain_inf", Params::new())?;
        let record = order.details()?;
        let details = DomainDetails::from_record(record)?;
        let _ = self.reseller.set(reseller_handle(record).unwrap_or_default());
        // listed details stay in place
        Ok(self.details.get_or_init(|| details))
    }

    /// Listed details, or a `domain_inf` fetch on first use.
    pub fn details(&self) -> Result<&DomainDetails> {
        match self.details.get() {
            Some(details) => Ok(details),
            None => self.fetch(),
        }
    }

    /// The reseller. Listings do not include it, so this costs a
    /// `domain_inf` the first time even for a listed domain.
    pub fn reseller(&self) -> Result<ResellerRef> {
        if self.reseller.get().is_none() {
            self.fetch()?;
        }
        let handle = self.reseller.get_or_init(String::new);
        Ok(ResellerRef::resolve(&self.api, handle))
    }

    pub fn nsgroup(&self) -> Result<Nsgroup> {
        Ok(self.api.nsgroups().get(&self.details()?.nsgroup))
    }

    pub fn registrant(&self) -> Result<Identity> {
        Ok(self.api.identities().get(&self.details()?.registrant))
    }

    pub fn admin(&self) -> Result<Identity> {
        Ok(self.api.identities().get(&self.details()?.admin))
    }

    pub fn tech(&self) -> Result<Identity> {
        Ok(self.api.identities().get(&self.details()?.tech))
    }

    pub fn billing(&self) -> Result<Identity> {
        Ok(self.api.identities().get(&self.details()?.billing))
    }

    pub fn start_date(&self) -> Result<NaiveDate> {
        Ok(self.details()?.start_date)
    }

    pub fn expire_date(&self) -> Result<NaiveDate> {
        Ok(self.details()?.expire_date)
    }

    pub fn quarantaine_end(&self) -> Result<Option<NaiveDate>> {
        Ok(self.details()?.quarantaine_end)
    }

    pub fn notice_date(&self) -> Result<Option<NaiveDate>> {
        Ok(self.details()?.notice_date)
    }

    pub fn autorenew(&self) -> Result<bool> {
        Ok(self.details()?.autorenew)
    }

    pub fn lock(&self) -> Result<Option<bool>> {
        Ok(self.details()?.lock)
    }

    pub fn usetrustee(&self) -> Result<Option<bool>> {
        Ok(self.details()?.usetrustee)
    }

    /// Whether the name can be registered (`domain_check`).
    pub fn is_free(&self) -> Result<bool> {
        let order = self.call("domain_check", Params::new())?;
        match order.status().code {
            CHECK_TAKEN => Ok(false),
            CHECK_FREE => Ok(true),
            code => Err(order.error(code, "unexpected status code").into()),
        }
    }

    /// Renew automatically before expiry, or not.
    pub fn set_autorenew(&mut self, autorenew: bool) -> Result<Order> {
        let order = self.call("autorenew", params! { "autorenew" => autorenew })?;
        if let Some(details) = self.details.get_mut() {
            details.autorenew = autorenew;
        }
        Ok(order)
    }

    /// Replace the identities set in `identities`, leaving the others.
    ///
    /// Panics when `identities` sets nothing.
    pub fn update_identities(&mut self, identities: &DomainIdentities) -> Result<Order> {
        let params = identities.params();
        assert!(!params.is_empty(), "no identities to update on {}", self.name);

        let order = self.call("domain_upd", params)?;
        if let Some(details) = self.details.get_mut() {
            identities.apply(details);
        }
        if let Some(handle) = identities.reseller.param() {
            self.reseller = OnceCell::from(handle);
        }
        Ok(order)
    }

    pub fn set_nsgroup(&mut self, nsgroup: &Nsgroup) -> Result<Order> {
        let order = self.call("domain_upd", params! { "nsgroup" => nsgroup.handle() })?;
        if let Some(details) = self.details.get_mut() {
            details.nsgroup = nsgroup.handle().to_string();
        }
        Ok(order)
    }
}

impl PartialEq for Domain {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Domain {}

impl PartialOrd for Domain {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Domain {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Debug for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Domain").field(&self.name).finish()
    }
}

/// Identity changes for [`Domain::update_identities`]; `None` and
/// [`ResellerRef::Unset`] leave a role alone.
#[derive(Debug, Clone, Default)]
pub struct DomainIdentities {
    pub registrant: Option<Identity>,
    pub admin: Option<Identity>,
    pub tech: Option<Identity>,
    pub billing: Option<Identity>,
    pub reseller: ResellerRef,
}

impl DomainIdentities {
    fn roles(&self) -> [(&'static str, Option<&Identity>); 4] {
        [
            (REGISTRANT, self.registrant.as_ref()),
            (ADMIN, self.admin.as_ref()),
            (TECH, self.tech.as_ref()),
            (BILLING, self.billing.as_ref()),
        ]
    }

    fn params(&self) -> Params {
        let mut params = Params::new();
        for (role, identity) in self.roles() {
            if let Some(identity) = identity {
                params.insert(role.to_string(), ParamValue::from(identity.handle()));
            }
        }
        insert_opt(&mut params, RESELLER, &self.reseller.param());
        params
    }

    fn apply(&self, details: &mut DomainDetails) {
        for (role, identity) in self.roles() {
            let Some(identity) = identity else { continue };
            let field = match role {
                REGISTRANT => &mut details.registrant,
                ADMIN => &mut details.admin,
                TECH => &mut details.tech,
                _ => &mut details.billing,
            };
            *field = identity.handle().to_string();
        }
    }
}

/// What `cart_add` needs to move a domain in.
#[derive(Debug, Clone)]
pub struct DomainTransfer {
    /// EPP code from the losing registrar.
    pub auth_code: String,
    pub registrant: Identity,
    pub admin: Identity,
    pub tech: Identity,
    pub billing: Identity,
    pub reseller: ResellerRef,
    pub nsgroup: Nsgroup,
}

/// `domain_list` search parameters plus a reseller post filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainFilter {
    /// `example` matches on sld only, `example.com` on sld and tld.
    pub domain: Option<String>,
    pub tld: Option<String>,
    pub nsgroup: Option<String>,
    /// Matches any of the four identity roles.
    pub identity: Option<String>,
    pub autorenew: Option<bool>,
    pub lock: Option<bool>,
    pub expire_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub status_days: Option<u32>,
    /// Applied client side, at one `domain_inf` per listed domain.
    pub reseller: ResellerRef,
}

impl DomainFilter {
    /// Panics on combinations the list command cannot express.
    fn params(&self) -> Params {
        let mut params = Params::new();
        match (&self.domain, &self.tld) {
            (Some(_), Some(_)) => panic!("domain filter takes domain or tld, not both"),
            (Some(domain), None) => match domain.split_once('.') {
                Some((sld, tld)) => {
                    params.insert("sld".to_string(), ParamValue::from(sld));
                    params.insert("tld".to_string(), ParamValue::from(tld));
                }
                None => {
                    params.insert("sld".to_string(), ParamValue::from(domain));
                }
            },
            (None, tld) => insert_opt(&mut params, "tld", tld),
        }
        insert_opt(&mut params, "nsgroup", &self.nsgroup);
        insert_opt(&mut params, "identity", &self.identity);
        insert_opt(&mut params, "autorenew", &self.autorenew);
        insert_opt(&mut params, "lock", &self.lock);

        if self.expire_date.is_some() {
            unimplemented!("domain filter on expire_date");
        }
        if self.status.is_some() || self.status_days.is_some() {
            unimplemented!("domain filter on status/days");
        }
        params
    }
}

pub struct Domains<'a> {
    api: &'a Oxxa,
}

impl<'a> Domains<'a> {
    pub(crate) fn new(api: &'a Oxxa) -> Self {
        Self { api }
    }

    /// Reference to `name`; no request until a field is read.
    pub fn get(&self, name: &str) -> Domain {
        Domain::new(self.api, name)
    }

    pub fn all(&self) -> DomainIter {
        self.filter(&DomainFilter::default())
    }

    /// Domains matching `filter`, in name order. Nothing is sent until the
    /// first item is pulled.
    pub fn filter(&self, filter: &DomainFilter) -> DomainIter {
        let mut params = filter.params();
        params.insert("records".to_string(), ParamValue::Int(-1));
        DomainIter {
            api: self.api.clone(),
            reseller: filter.reseller.clone(),
            state: State::Pending(params),
        }
    }

    /// Put a transfer in the cart (`cart_add`) and buy it
    /// (`cart_purchase`). Returns the purchase order.
    pub fn transfer(&self, domain: &Domain, transfer: &DomainTransfer) -> Result<Order> {
        let mut params = params! {
            "sld" => domain.sld(),
            "tld" => domain.tld(),
            "producttype" => "transfer",
            "trans_epp" => &transfer.auth_code,
            "nsgroup" => transfer.nsgroup.handle(),
            REGISTRANT => transfer.registrant.handle(),
            ADMIN => transfer.admin.handle(),
            TECH => transfer.tech.handle(),
            BILLING => transfer.billing.handle(),
        };
        insert_opt(&mut params, RESELLER, &transfer.reseller.param());

        let added = self.api.session().call("cart_add", params)?;
        let cart_id = added.record().int_value("details")?;
        debug!(domain = %domain.name(), cart_id, "transfer added to cart");
        self.api.session().call("cart_purchase", params! { "cart_id" => cart_id })
    }
}

enum State {
    Pending(Params),
    Listing(std::vec::IntoIter<Domain>),
    Done,
}

/// Lazy, single-pass domain listing.
///
/// The list command runs on the first `next()`. The first error is yielded
/// and ends the sequence.
pub struct DomainIter {
    api: Oxxa,
    reseller: ResellerRef,
    state: State,
}

impl DomainIter {
    fn list(&self, params: Params) -> Result<Vec<Domain>> {
        let order = self.api.session().call("domain_list", params)?;
        let details = order.details()?;
        let mut domains = details
            .children("domain")
            .into_iter()
            .map(|record| Domain::from_record(&self.api, record))
            .collect::<Result<Vec<_>, ApplicationError>>()?;
        domains.sort();
        debug!(count = domains.len(), "listed domains");
        Ok(domains)
    }

    fn keep(&self, domain: &Domain) -> Result<bool> {
        Ok(match &self.reseller {
            ResellerRef::Unset => true,
            ResellerRef::None => domain.reseller()? == ResellerRef::None,
            ResellerRef::Some(wanted) => domain.reseller()?.handle() == Some(wanted.handle()),
        })
    }
}

impl Iterator for DomainIter {
    type Item = Result<Domain>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match std::mem::replace(&mut self.state, State::Done) {
                State::Pending(params) => match self.list(params) {
                    Ok(domains) => self.state = State::Listing(domains.into_iter()),
                    Err(e) => return Some(Err(e)),
                },
                State::Listing(mut domains) => {
                    let domain = domains.next()?;
                    match self.keep(&domain) {
                        Ok(keep) => {
                            self.state = State::Listing(domains);
                            if keep {
                                return Some(Ok(domain));
                            }
                        }
                        Err(e) => return Some(Err(e)),
                    }
                }
                State::Done => return None,
            }
        }
    }
}
