//! Functional core of the units service.
//!
//! Everything in this crate is store-agnostic: record model and composite keys,
//! schema validation, the pagination token codec and the repository contracts.
//! Storage backends live in the `units` binary crate.

pub mod pagination;
pub mod schema;
pub mod storage;
pub mod unit;
