//! Payment provider backends.
mod tap;

pub use tap::{TapGateway, TapGatewayConfig, DEFAULT_COUNTRY_CODE, DEFAULT_REDIRECT_URL, PROVIDER_NAME};
