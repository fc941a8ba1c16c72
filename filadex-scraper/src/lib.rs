pub mod bambu;
pub mod creality;
pub mod credentials;
pub mod error;
pub mod tigertag;

pub use bambu::BambuClient;
pub use creality::CrealityClient;
pub use credentials::{CredentialSource, Credentials};
pub use error::ScrapeError;
pub use tigertag::{Endpoint, TigerTagClient, endpoint_key, resolve_catalog_endpoints, sort_catalog_list};
