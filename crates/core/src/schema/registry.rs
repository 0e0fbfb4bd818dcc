//! Named JSON Schema documents with a compiled-schema cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use serde_json::Value;

use super::error::{SchemaError, Violation};

const COMMERCIAL_VEHICLE_TYPE: &str = "commercialVehicleType";
const COMMERCIAL_VEHICLE_TYPE_SCHEMA: &str =
    include_str!("../../schemas/commercialVehicleType.json");

/// A draft-07 schema compiled for one unit type.
pub struct CompiledSchema {
    unit_type: String,
    validator: jsonschema::Validator,
}

impl CompiledSchema {
    fn compile(unit_type: &str, source: &str) -> Result<Self, SchemaError> {
        let compile_error = |message: String| SchemaError::Compile {
            unit_type: unit_type.to_string(),
            message,
        };
        let document: Value =
            serde_json::from_str(source).map_err(|e| compile_error(e.to_string()))?;
        let validator =
            jsonschema::draft7::new(&document).map_err(|e| compile_error(e.to_string()))?;

        Ok(Self {
            unit_type: unit_type.to_string(),
            validator,
        })
    }

    pub fn unit_type(&self) -> &str {
        &self.unit_type
    }

    /// Validates `document`, collecting every violated constraint.
    pub fn validate(&self, document: &Value) -> Result<(), SchemaError> {
        let violations: Vec<Violation> = self
            .validator
            .iter_errors(document)
            .map(|error| Violation {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(SchemaError::Invalid {
                unit_type: self.unit_type.clone(),
                violations,
            })
        }
    }
}

impl std::fmt::Debug for CompiledSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompiledSchema")
            .field("unit_type", &self.unit_type)
            .finish_non_exhaustive()
    }
}

/// Schema sources keyed by unit type, plus the compiled forms loaded so far.
///
/// Built once at startup and shared behind an `Arc`. Compilation happens outside
/// the lock; when two callers race on the same unit type the first insert wins and
/// both observe that entry.
pub struct SchemaRegistry {
    sources: BTreeMap<String, String>,
    cache: RwLock<HashMap<String, Arc<CompiledSchema>>>,
}

impl SchemaRegistry {
    /// Registry with the schemas embedded in the binary.
    pub fn new() -> Self {
        Self::with_sources([(COMMERCIAL_VEHICLE_TYPE, COMMERCIAL_VEHICLE_TYPE_SCHEMA)])
    }

    /// Registry over explicit `(unit_type, schema_json)` sources.
    pub fn with_sources<I, K, V>(sources: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            sources: sources
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Unit types a schema exists for, in name order.
    pub fn list_available_schemas(&self) -> Vec<String> {
        self.sources.keys().cloned().collect()
    }

    pub fn is_supported(&self, unit_type: &str) -> bool {
        self.sources.contains_key(unit_type)
    }

    /// Returns the compiled schema for `unit_type`, compiling it on first use.
    pub fn load_schema(&self, unit_type: &str) -> Result<Arc<CompiledSchema>, SchemaError> {
        if let Some(schema) = self
            .cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(unit_type)
        {
            return Ok(Arc::clone(schema));
        }

        let source = self
            .sources
            .get(unit_type)
            .ok_or_else(|| SchemaError::UnsupportedUnitType(unit_type.to_string()))?;
        let compiled = Arc::new(CompiledSchema::compile(unit_type, source)?);
        tracing::debug!(unit_type = %unit_type, "Compiled schema");

        let mut cache = self.cache.write().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(
            cache.entry(unit_type.to_string()).or_insert(compiled),
        ))
    }

    /// Validates `document` against the schema of `unit_type`.
    pub fn validate(&self, unit_type: &str, document: &Value) -> Result<(), SchemaError> {
        self.load_schema(unit_type)?.validate(document)
    }

    /// Number of compiled schemas held in the cache.
    pub fn cached_count(&self) -> usize {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Default for SchemaRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SchemaRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaRegistry")
            .field("schemas", &self.list_available_schemas())
            .field("cached", &self.cached_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_document() -> Value {
        json!({
            "id": "test-id-123",
            "accountId": "account-456",
            "unitType": "commercialVehicleType",
            "createdAt": 1_640_995_200,
            "updatedAt": 1_640_995_200,
            "deletedAt": 0,
            "locationId": "loc-123",
            "suggestedVin": "TEST123456789",
            "make": "Honda",
            "model": "Civic"
        })
    }

    #[test]
    fn test_list_available_schemas() {
        let registry = SchemaRegistry::new();
        assert_eq!(
            registry.list_available_schemas(),
            vec!["commercialVehicleType".to_string()]
        );
        assert!(registry.is_supported("commercialVehicleType"));
        assert!(!registry.is_supported("boat"));
    }

    #[test]
    fn test_embedded_schema_accepts_valid_document() {
        let registry = SchemaRegistry::new();
        assert!(registry
            .validate("commercialVehicleType", &valid_document())
            .is_ok());
    }

    #[test]
    fn test_optional_field_may_be_null() {
        let registry = SchemaRegistry::new();
        let mut document = valid_document();
        document["locationId"] = Value::Null;
        assert!(registry.validate("commercialVehicleType", &document).is_ok());
    }

    #[test]
    fn test_unknown_field_is_named() {
        let registry = SchemaRegistry::new();
        let mut document = valid_document();
        document["invalidField"] = json!("not declared");

        let error = registry
            .validate("commercialVehicleType", &document)
            .unwrap_err();
        match &error {
            SchemaError::Invalid { violations, .. } => assert_eq!(violations.len(), 1),
            other => panic!("expected Invalid, got {other:?}"),
        }
        assert!(error.to_string().contains("invalidField"));
    }

    #[test]
    fn test_missing_account_is_reported() {
        let registry = SchemaRegistry::new();
        let mut document = valid_document();
        document.as_object_mut().unwrap().remove("accountId");

        let error = registry
            .validate("commercialVehicleType", &document)
            .unwrap_err();
        assert!(error.to_string().contains("accountId"));
    }

    #[test]
    fn test_all_violations_are_collected() {
        let registry = SchemaRegistry::new();
        let mut document = valid_document();
        document["make"] = json!(5);
        document["model"] = json!(true);

        match registry.validate("commercialVehicleType", &document) {
            Err(SchemaError::Invalid { violations, .. }) => {
                let paths: Vec<_> = violations.iter().map(|v| v.path.as_str()).collect();
                assert!(paths.contains(&"/make"));
                assert!(paths.contains(&"/model"));
            }
            other => panic!("expected Invalid, got {other:?}"),
        }
    }

    #[test]
    fn test_unsupported_unit_type() {
        let registry = SchemaRegistry::new();
        assert_eq!(
            registry.validate("boat", &valid_document()).unwrap_err(),
            SchemaError::UnsupportedUnitType("boat".to_string())
        );
        assert_eq!(registry.cached_count(), 0);
    }

    #[test]
    fn test_broken_source_is_a_compile_error() {
        let registry = SchemaRegistry::with_sources([("broken", "{ not json")]);
        assert!(matches!(
            registry.load_schema("broken"),
            Err(SchemaError::Compile { .. })
        ));

        let registry = SchemaRegistry::with_sources([("badType", r#"{"type": 12}"#)]);
        assert!(matches!(
            registry.load_schema("badType"),
            Err(SchemaError::Compile { .. })
        ));
    }

    #[test]
    fn test_schema_is_compiled_once() {
        let registry = SchemaRegistry::new();
        let first = registry.load_schema("commercialVehicleType").unwrap();
        let second = registry.load_schema("commercialVehicleType").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.cached_count(), 1);
    }

    #[test]
    fn test_concurrent_loads_converge() {
        let registry = Arc::new(SchemaRegistry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || registry.load_schema("commercialVehicleType").unwrap())
            })
            .collect();

        let loaded: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let cached = registry.load_schema("commercialVehicleType").unwrap();
        assert_eq!(registry.cached_count(), 1);
        for schema in &loaded {
            assert_eq!(schema.unit_type(), "commercialVehicleType");
        }
        // Later loads always see the single cached entry
        assert!(Arc::ptr_eq(
            &cached,
            &registry.load_schema("commercialVehicleType").unwrap()
        ));
    }
}
