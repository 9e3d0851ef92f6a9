//! Repository layer: entity-scoped database operations.
//!
//! Functions take a borrowed `Connection` and are synchronous; the async
//! `RecordStore` wraps them for use from request handlers.

mod extraction;

pub use extraction::*;
