use std::rc::Rc;

use crate::credentials::Credentials;
use crate::error::Result;
use crate::managers::cache::HandleCache;
use crate::managers::domain::Domains;
use crate::managers::identity::{Identities, IdentityDetails};
use crate::managers::nsgroup::{NsgroupDetails, Nsgroups};
use crate::managers::reseller::{ResellerDetails, Resellers};
use crate::request::Params;
use crate::response::Order;
use crate::session::{ClientConfig, Session};
use crate::transport::{HttpTransport, Transport};

/// OXXA API client.
///
/// Prefer the managers ([`domains`](Self::domains),
/// [`identities`](Self::identities), ...) over [`raw`](Self::raw). Cloning
/// is cheap and clones share the session and handle caches; the client is
/// meant for one thread.
#[derive(Clone)]
pub struct Oxxa {
    inner: Rc<Inner>,
}

struct Inner {
    session: Session,
    identities: HandleCache<IdentityDetails>,
    nsgroups: HandleCache<NsgroupDetails>,
    resellers: HandleCache<ResellerDetails>,
}

impl Oxxa {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_config(credentials, ClientConfig::default())
    }

    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Self {
        Self::with_transport(credentials, config, HttpTransport::new())
    }

    pub fn with_transport(
        credentials: Credentials,
        config: ClientConfig,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                session: Session::new(credentials, config, Box::new(transport)),
                identities: HandleCache::new("identity"),
                nsgroups: HandleCache::new("nsgroup"),
                resellers: HandleCache::new("reseller"),
            }),
        }
    }

    /// Direct API call, e.g. `raw("domain_inf", params! { "sld" => "example", "tld" => "com" })`.
    ///
    /// See the OXXA API documentation for commands and their details.
    pub fn raw(&self, command: &str, params: Params) -> Result<Order> {
        self.session().call(command, params)
    }

    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    pub fn domains(&self) -> Domains<'_> {
        Domains::new(self)
    }

    pub fn identities(&self) -> Identities<'_> {
        Identities::new(self)
    }

    pub fn nsgroups(&self) -> Nsgroups<'_> {
        Nsgroups::new(self)
    }

    pub fn resellers(&self) -> Resellers<'_> {
        Resellers::new(self)
    }

    pub(crate) fn identity_cache(&self) -> &HandleCache<IdentityDetails> {
        &self.inner.identities
    }

    pub(crate) fn nsgroup_cache(&self) -> &HandleCache<NsgroupDetails> {
        &self.inner.nsgroups
    }

    pub(crate) fn reseller_cache(&self) -> &HandleCache<ResellerDetails> {
        &self.inner.resellers
    }
}

#[cfg(test)]
mod tests {
    use crate::params;
    use crate::testing::{order_body, scripted_client};

    #[test]
    fn raw_call_returns_order() {
        let (api, transport) = scripted_client();
        transport.push(
            &[("command", "cart_list")],
            &order_body("XMLOK 33", "<cartcount>1</cartcount><totalcartcount>1</totalcartcount>"),
        );
        let order = api.raw("cart_list", params! {}).expect("raw call");
        assert_eq!(order.status().code, 33);
        let details = order.details().expect("details");
        assert_eq!(details.int_value("cartcount").expect("count"), 1);
        assert_eq!(transport.urls(), vec!["https://BOGO-OXXA/command.php".to_string()]);
    }
}
