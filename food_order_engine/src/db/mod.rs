//! Storage backends.
//!
//! The resource store's row-level REST interface is the only persistence backend. Its schema owns the cascade from
//! an order to its line items, modifier selections and payment record.
pub mod rest;
