//! In-memory storage backend.
//!
//! Emulates the single-table store closely enough for tests and local runs:
//! conditional writes, soft delete and key-ordered pagination behave the same.
//!
//! # Example
//!
//! ```rust,ignore
//! use units::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new(Arc::new(SchemaRegistry::new()));
//! // Use repo for testing...
//! ```

mod repository;

pub use repository::InMemoryRepository;
