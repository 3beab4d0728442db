//! Protocol constants
//!
//! Relation names, template parameters and header names the client relies on.

// Link relations published by the API root
pub const ADVERTISEMENTS_REL: &str = "advertisements";
pub const ADVERTISEMENT_REL: &str = "advertisement";

// Template variable of the `advertisement` relation
pub const ADVERTISEMENT_ID_PARAM: &str = "advertisementId";

// Out-of-band processing signal returned on HEAD
pub const PROCESSING_STATUS_HEADER: &str = "Processing-Status";

// Media types
pub const HAL_JSON: &str = "application/hal+json";
pub const JSON: &str = "application/json";
pub const ACCEPT_HAL_OR_JSON: &str = "application/hal+json, application/json";

// OAuth2
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";
pub const DEFAULT_TOKEN_TYPE: &str = "Bearer";

// Defaults
pub const DEFAULT_TOKEN_EXPIRY_MARGIN_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_USER_AGENT: &str = concat!("adpost-client/", env!("CARGO_PKG_VERSION"));
