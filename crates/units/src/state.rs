//! Application state with repository-based storage.
//!
//! This module defines the shared application state that is passed to every
//! resolver handler. It uses repository trait objects for storage abstraction;
//! the backend is chosen at compile time via feature flags.

use std::sync::Arc;

use units_core::schema::SchemaRegistry;
use units_core::storage::{UnitIdLookup, UnitRepository};
use units_core::unit::{DynamicUnit, FixedUnit};

use crate::config::{Config, UnitModel};

/// Shared application state.
///
/// Cloned for each request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    /// Record variant served by this deployment.
    pub unit_model: UnitModel,
    /// Schemas for the dynamic variant, compiled on first use.
    pub schemas: Arc<SchemaRegistry>,
    /// Repository for schema-validated units.
    pub dynamic_units: Arc<dyn UnitRepository<DynamicUnit>>,
    /// Repository for fixed-schema units.
    pub fixed_units: Arc<dyn UnitRepository<FixedUnit>>,
    /// Cross-account lookup for fixed-schema units.
    pub unit_lookup: Arc<dyn UnitIdLookup<FixedUnit>>,
}

impl AppState {
    /// Creates a new AppState backed by a single store serving both variants.
    pub fn new<S>(store: S, schemas: Arc<SchemaRegistry>, unit_model: UnitModel) -> Self
    where
        S: UnitRepository<DynamicUnit>
            + UnitRepository<FixedUnit>
            + UnitIdLookup<FixedUnit>
            + 'static,
    {
        let store = Arc::new(store);
        Self {
            unit_model,
            schemas,
            dynamic_units: store.clone(),
            fixed_units: store.clone(),
            unit_lookup: store,
        }
    }

    /// Creates application state from configuration.
    ///
    /// With the `inmemory` feature the configured table is ignored and data lives
    /// for the lifetime of the process.
    #[cfg(feature = "inmemory")]
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        use crate::storage::InMemoryRepository;

        let schemas = Arc::new(SchemaRegistry::new());
        tracing::info!(
            unit_model = %config.unit_model,
            schemas = ?schemas.list_available_schemas(),
            "Using in-memory storage"
        );

        let store = InMemoryRepository::new(schemas.clone());
        Ok(Self::new(store, schemas, config.unit_model))
    }

    /// Creates application state from configuration.
    #[cfg(feature = "dynamodb")]
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        use crate::storage::DynamoDbRepository;

        let schemas = Arc::new(SchemaRegistry::new());
        let store = DynamoDbRepository::from_config(config, schemas.clone()).await;
        tracing::info!(
            table = %store.table_name(),
            region = %config.aws_region,
            unit_model = %config.unit_model,
            "Using DynamoDB storage"
        );

        Ok(Self::new(store, schemas, config.unit_model))
    }

    /// Creates state over a fresh in-memory store, for tests.
    #[cfg(all(test, feature = "inmemory"))]
    pub fn in_memory(unit_model: UnitModel) -> Self {
        let schemas = Arc::new(SchemaRegistry::new());
        let store = crate::storage::InMemoryRepository::new(schemas.clone());
        Self::new(store, schemas, unit_model)
    }
}
