//! Client for the OXXA registrar XML command API.
//!
//! Every call is a single blocking HTTP GET carrying a `command` plus its
//! parameters. The reply is an XML `<channel><order>...</order></channel>`
//! document which is turned into an [`Order`]. Failures surface as one of
//! three error kinds, see [`OxxaError`].
//!
//! The managers ([`Oxxa::domains`], [`Oxxa::identities`], [`Oxxa::nsgroups`],
//! [`Oxxa::resellers`]) give a typed view on top of the raw exchange:
//!
//! ```no_run
//! use oxxa_api::{Credentials, Oxxa};
//!
//! let api = Oxxa::new(Credentials::new("USER", "MD57a95bf926a0333f57705aeac07a362a2"));
//! for domain in api.domains().all() {
//!     let domain = domain?;
//!     println!("{} autorenew={}", domain.name(), domain.autorenew()?);
//! }
//! # Ok::<(), oxxa_api::OxxaError>(())
//! ```
//!
//! Text fields are returned exactly as the XML parser decoded them. Some
//! fields come back double-encoded (a literal `&amp;` after decoding); the
//! library does not try to guess which ones, callers that care must handle it.

pub mod client;
pub mod credentials;
pub mod error;
pub mod managers;
pub mod request;
pub mod response;
pub mod session;
pub mod testing;
pub mod transport;
pub mod xml;

pub use crate::client::Oxxa;
pub use crate::credentials::Credentials;
pub use crate::error::{ApplicationError, OxxaError, Result, TransactionError, TransportError};
pub use crate::managers::domain::{
    Domain, DomainDetails, DomainFilter, DomainIdentities, DomainIter, DomainTransfer, Domains,
};
pub use crate::managers::identity::{Identities, Identity, IdentityDetails, IdentityFilter};
pub use crate::managers::nsgroup::{Nsgroup, NsgroupDetails, NsgroupFilter, Nsgroups};
pub use crate::managers::reseller::{
    Reseller, ResellerDetails, ResellerFilter, ResellerRef, Resellers,
};
pub use crate::request::{ParamValue, Params, Request};
pub use crate::response::{Order, Status};
pub use crate::session::{ClientConfig, Session, API_URL};
pub use crate::transport::{HttpFailure, HttpRequest, HttpResponse, HttpTransport, Transport};
pub use crate::xml::{Completion, Record, XmlNode};
