//! Resource managers on top of the raw command exchange.
//!
//! Identities, nameserver groups and resellers share one shape: a list
//! command returning `<details>` with one element per handle, and a
//! single-record fetch keyed by that handle. `HandleResource` describes
//! that shape once; domains are keyed by name and have their own manager.

pub mod cache;
pub mod domain;
pub mod identity;
pub mod nsgroup;
pub mod reseller;

use tracing::debug;

use crate::client::Oxxa;
use crate::error::{ApplicationError, Result};
use crate::params;
use crate::request::{ParamValue, Params};
use crate::xml::Record;
use self::cache::{HandleCache, Slot};

/// A resource identified by a handle, listed and fetched by fixed commands.
pub(crate) trait HandleResource: Sized {
    type Details;

    const LIST_COMMAND: &'static str;
    const FETCH_COMMAND: &'static str;
    /// Element wrapping each listed record.
    const RECORD_TAG: &'static str;
    /// Parameter carrying the handle in the fetch command.
    const HANDLE_PARAM: &'static str;

    fn cache(api: &Oxxa) -> &HandleCache<Self::Details>;

    fn parse_details(record: Record<'_>) -> Result<Self::Details, ApplicationError>;

    fn from_parts(api: Oxxa, handle: String, details: Slot<Self::Details>) -> Self;
}

/// Reference to `handle`, sharing whatever the cache already knows.
pub(crate) fn get<R: HandleResource>(api: &Oxxa, handle: &str) -> R {
    let slot = R::cache(api).get_or_insert(handle);
    R::from_parts(api.clone(), handle.to_string(), slot)
}

/// Run the list command with `filter` and return the records sorted by
/// handle. An unfiltered listing replaces the cache contents.
pub(crate) fn list<R: HandleResource>(api: &Oxxa, filter: Params) -> Result<Vec<R>> {
    let full = filter.is_empty();
    let mut params = filter;
    params.insert("records".to_string(), ParamValue::Int(-1));

    let order = api.session().call(R::LIST_COMMAND, params)?;
    let details = order.details()?;
    let mut parsed = details
        .children(R::RECORD_TAG)
        .into_iter()
        .map(|record| Ok((record.str_value("handle").to_string(), R::parse_details(record)?)))
        .collect::<Result<Vec<_>, ApplicationError>>()?;
    parsed.sort_by(|a, b| a.0.cmp(&b.0));
    debug!(command = R::LIST_COMMAND, count = parsed.len(), full, "listed handles");

    let cache = R::cache(api);
    if full {
        cache.clear();
    }
    Ok(parsed
        .into_iter()
        .map(|(handle, details)| {
            let slot = cache.insert(&handle, details);
            R::from_parts(api.clone(), handle, slot)
        })
        .collect())
}

/// The details in `slot`, fetched with the single-record command on first use.
pub(crate) fn resolve<'s, R: HandleResource>(
    api: &Oxxa,
    handle: &str,
    slot: &'s Slot<R::Details>,
) -> Result<&'s R::Details> {
    if let Some(details) = slot.get() {
        return Ok(details);
    }
    debug!(command = R::FETCH_COMMAND, handle, "fetching details");
    let order = api.session().call(R::FETCH_COMMAND, params! { R::HANDLE_PARAM => handle })?;
    let details = R::parse_details(order.details()?)?;
    Ok(slot.get_or_init(|| details))
}

/// Add `name=value` when a filter field is set.
pub(crate) fn insert_opt<V: Into<ParamValue> + Clone>(
    params: &mut Params,
    name: &str,
    value: &Option<V>,
) {
    if let Some(value) = value {
        params.insert(name.to_string(), value.clone().into());
    }
}

/// Equality, ordering and hashing by handle.
macro_rules! handle_identity {
    ($ty:ty) => {
        impl PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                self.handle == other.handle
            }
        }

        impl Eq for $ty {}

        impl PartialOrd for $ty {
            fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $ty {
            fn cmp(&self, other: &Self) -> std::cmp::Ordering {
                self.handle.cmp(&other.handle)
            }
        }

        impl std::hash::Hash for $ty {
            fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                std::hash::Hash::hash(&self.handle, state);
            }
        }

        impl std::fmt::Debug for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.debug_tuple(stringify!($ty)).field(&self.handle).finish()
            }
        }
    };
}

pub(crate) use handle_identity;
