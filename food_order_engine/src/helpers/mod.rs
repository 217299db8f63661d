use chrono::{DateTime, Utc};
use rand::Rng;

pub const ORDER_NUMBER_PREFIX: &str = "WEB";

/// Generates a display order number of the form `WEB-YYYYMMDD-NNNN`.
///
/// The four-digit suffix is random. Numbers are meant for humans and are not guaranteed to be unique; the order id is
/// the real identifier.
pub fn new_order_number() -> String {
    let suffix = rand::thread_rng().gen_range(0..10_000u32);
    order_number_for(Utc::now(), suffix)
}

pub fn order_number_for(date: DateTime<Utc>, suffix: u32) -> String {
    format!("{ORDER_NUMBER_PREFIX}-{}-{:04}", date.format("%Y%m%d"), suffix % 10_000)
}
