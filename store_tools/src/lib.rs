//! # Resource store tools
//!
//! A thin client for the row-oriented REST interface of the hosted database that backs the food ordering gateway.
//! Rows live in named collections and are addressed with `column, operator, value` filters; the client never sends
//! raw query text.
//!
//! * [`StoreClient`] executes `get`, `insert`, `update` and `delete` calls.
//! * [`Query`] and [`Filter`] describe which rows a call applies to.
//! * [`StoreConfig`] carries the store URL, service credential and per-call timeout.
mod client;
mod config;
mod error;
mod query;

pub use client::StoreClient;
pub use config::StoreConfig;
pub use error::StoreError;
pub use query::{Direction, Filter, FilterOp, Query};
