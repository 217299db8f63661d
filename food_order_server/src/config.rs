use std::{env, net::IpAddr};

use chrono::Duration;
use fog_common::{
    helpers::{parse_boolean_flag, parse_list},
    DEFAULT_CURRENCY_CODE,
};
use food_order_engine::{gateway::PROVIDER_NAME, OrderFlowConfig, TapGatewayConfig};
use log::*;
use store_tools::StoreConfig;
use tap_tools::TapConfig;

const DEFAULT_FOG_HOST: &str = "127.0.0.1";
const DEFAULT_FOG_PORT: u16 = 8370;
const DEFAULT_PROVISIONAL_RECHECK: Duration = Duration::minutes(15);
const DEFAULT_PROVISIONAL_TIMEOUT: Duration = Duration::hours(24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Every row the server reads or writes is scoped to this tenant.
    pub tenant_id: String,
    pub branch_id: String,
    /// The user id written on every order placed through the storefront.
    pub web_user_id: String,
    pub currency: String,
    pub store: StoreConfig,
    pub tap: TapConfig,
    /// The storefront page the customer returns to after paying.
    pub payment_redirect_url: String,
    /// The callback URL registered on each charge, if any.
    pub payment_webhook_url: Option<String>,
    /// If supplied, calls to the payment webhook are only accepted from these addresses.
    /// To explicitly disable the whitelist, set this to "false", "none", or "0".
    pub webhook_whitelist: Option<Vec<IpAddr>>,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address.
    pub use_forwarded: bool,
    /// Allowed CORS origins. `*` allows any origin.
    pub cors_origins: Vec<String>,
    /// Provisional orders older than this are reconciled again by the background worker.
    pub provisional_recheck: Duration,
    /// Provisional orders that cannot be paid any more are discarded after this long.
    pub provisional_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_FOG_HOST.to_string(),
            port: DEFAULT_FOG_PORT,
            tenant_id: String::default(),
            branch_id: String::default(),
            web_user_id: String::default(),
            currency: DEFAULT_CURRENCY_CODE.to_string(),
            store: StoreConfig::default(),
            tap: TapConfig::default(),
            payment_redirect_url: food_order_engine::gateway::DEFAULT_REDIRECT_URL.to_string(),
            payment_webhook_url: None,
            webhook_whitelist: None,
            use_x_forwarded_for: false,
            use_forwarded: false,
            cors_origins: vec!["*".to_string()],
            provisional_recheck: DEFAULT_PROVISIONAL_RECHECK,
            provisional_timeout: DEFAULT_PROVISIONAL_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("FOG_HOST").ok().unwrap_or_else(|| DEFAULT_FOG_HOST.into());
        let port = env::var("FOG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for FOG_PORT. {e} Using the default, {DEFAULT_FOG_PORT}, instead."
                    );
                    DEFAULT_FOG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_FOG_PORT);
        let tenant_id = env::var("FOG_TENANT_ID").ok().unwrap_or_else(|| {
            error!("🪛️ FOG_TENANT_ID is not set. Please set it to the tenant this server serves.");
            String::default()
        });
        let branch_id = env::var("FOG_BRANCH_ID").ok().unwrap_or_else(|| {
            warn!("🪛️ FOG_BRANCH_ID is not set. Orders will be stored without a branch.");
            String::default()
        });
        let web_user_id = env::var("FOG_WEB_USER_ID").ok().unwrap_or_else(|| {
            warn!("🪛️ FOG_WEB_USER_ID is not set. Orders will be stored without an owning user.");
            String::default()
        });
        let currency = env::var("FOG_CURRENCY").ok().unwrap_or_else(|| DEFAULT_CURRENCY_CODE.to_string());
        let payment_redirect_url = env::var("FOG_PAYMENT_REDIRECT_URL").ok().unwrap_or_else(|| {
            let url = food_order_engine::gateway::DEFAULT_REDIRECT_URL;
            info!("🪛️ FOG_PAYMENT_REDIRECT_URL is not set. Customers will be sent back to {url}");
            url.to_string()
        });
        let payment_webhook_url = env::var("FOG_PAYMENT_WEBHOOK_URL").ok().filter(|s| !s.is_empty());
        let webhook_whitelist = env::var("FOG_PAYMENT_WEBHOOK_WHITELIST").ok().and_then(|s| parse_whitelist(&s));
        log_whitelist(&webhook_whitelist);
        let use_x_forwarded_for = parse_boolean_flag(env::var("FOG_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("FOG_USE_FORWARDED").ok(), false);
        let cors_origins = env::var("FOG_CORS_ORIGINS")
            .ok()
            .map(|s| parse_list(&s))
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| vec!["*".to_string()]);
        let provisional_recheck =
            duration_from_env("FOG_PROVISIONAL_RECHECK_MINUTES", Duration::minutes, DEFAULT_PROVISIONAL_RECHECK);
        let provisional_timeout =
            duration_from_env("FOG_PROVISIONAL_ORDER_TIMEOUT_HOURS", Duration::hours, DEFAULT_PROVISIONAL_TIMEOUT);
        Self {
            host,
            port,
            tenant_id,
            branch_id,
            web_user_id,
            currency,
            store: StoreConfig::new_from_env_or_default(),
            tap: TapConfig::new_from_env_or_default(),
            payment_redirect_url,
            payment_webhook_url,
            webhook_whitelist,
            use_x_forwarded_for,
            use_forwarded,
            cors_origins,
            provisional_recheck,
            provisional_timeout,
        }
    }

    pub fn order_flow_config(&self) -> OrderFlowConfig {
        OrderFlowConfig {
            tenant_id: self.tenant_id.clone(),
            branch_id: self.branch_id.clone(),
            web_user_id: self.web_user_id.clone(),
            provider_name: PROVIDER_NAME.to_string(),
        }
    }

    pub fn gateway_config(&self) -> TapGatewayConfig {
        TapGatewayConfig {
            currency: self.currency.clone(),
            redirect_url: self.payment_redirect_url.clone(),
            webhook_url: self.payment_webhook_url.clone(),
            ..Default::default()
        }
    }
}

/// Parses a comma-separated IP whitelist. `none`, `false` and `0` disable the whitelist. Invalid entries are skipped.
pub fn parse_whitelist(value: &str) -> Option<Vec<IpAddr>> {
    if ["none", "false", "0"].contains(&value.trim().to_lowercase().as_str()) {
        return None;
    }
    let ip_addrs = parse_list(value)
        .into_iter()
        .filter_map(|s| {
            s.parse::<IpAddr>()
                .map_err(|e| warn!("🪛️ Ignoring invalid IP address ({s}) in FOG_PAYMENT_WEBHOOK_WHITELIST: {e}"))
                .ok()
        })
        .collect::<Vec<IpAddr>>();
    Some(ip_addrs)
}

fn log_whitelist(whitelist: &Option<Vec<IpAddr>>) {
    match whitelist {
        Some(whitelist) if whitelist.is_empty() => {
            warn!(
                "🚨️ The payment webhook whitelist was configured, but is empty. The server will run, but won't accept \
                 any payment webhook calls."
            );
        },
        None => {
            info!("🪛️ No payment webhook whitelist is set. Webhook calls are accepted from any address.");
        },
        Some(v) => {
            let addrs = v.iter().map(|a| a.to_string()).collect::<Vec<_>>().join(", ");
            info!("🪛️ Payment webhook whitelist: {addrs}");
        },
    }
}

fn duration_from_env(name: &str, unit: fn(i64) -> Duration, default: Duration) -> Duration {
    env::var(name)
        .map_err(|_| info!("🪛️ {name} is not set. Using the default value of {} min.", default.num_minutes()))
        .and_then(|s| {
            s.parse::<i64>()
                .ok()
                .filter(|v| *v > 0)
                .map(unit)
                .ok_or_else(|| warn!("🪛️ Invalid configuration value for {name}: {s}. Using the default."))
        })
        .ok()
        .unwrap_or(default)
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that is used by request handlers. It excludes secrets to avoid passing
/// sensitive information around the system.
#[derive(Clone, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
    pub webhook_whitelist: Option<Vec<IpAddr>>,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self {
            use_x_forwarded_for: config.use_x_forwarded_for,
            use_forwarded: config.use_forwarded,
            webhook_whitelist: config.webhook_whitelist.clone(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn whitelist_parsing() {
        assert!(parse_whitelist("none").is_none());
        assert!(parse_whitelist("FALSE").is_none());
        let list = parse_whitelist("10.0.0.1, not-an-ip,::1").unwrap();
        assert_eq!(list, vec!["10.0.0.1".parse::<IpAddr>().unwrap(), "::1".parse::<IpAddr>().unwrap()]);
        assert!(parse_whitelist("garbage").unwrap().is_empty());
    }

    #[test]
    fn defaults() {
        let config = ServerConfig::new("0.0.0.0", 9000);
        assert_eq!(config.port, 9000);
        assert_eq!(config.currency, "KWD");
        assert_eq!(config.cors_origins, vec!["*"]);
        assert_eq!(config.provisional_recheck, Duration::minutes(15));
        assert_eq!(config.order_flow_config().provider_name, "tap");
        assert_eq!(config.gateway_config().redirect_url, "http://localhost:3000/payment-result");
    }
}
