//! Schema-driven unit whose payload is an attribute bag.

use serde_json::{Map, Value};

use crate::schema::SchemaRegistry;
use crate::storage::{RepositoryError, Result};

use super::keys::{split_sort_key, PARTITION_KEY, SORT_KEY};
use super::record::{
    get_optional_string, write_key, Item, Timestamps, UnitRecord, CREATED_AT, DELETED_AT,
    UPDATED_AT,
};

pub const ACCOUNT_ID: &str = "accountId";
pub const UNIT_TYPE: &str = "unitType";

/// Attributes owned by the record itself; never part of the payload bag.
pub const RESERVED_FIELDS: &[&str] = &[
    PARTITION_KEY,
    SORT_KEY,
    "id",
    ACCOUNT_ID,
    UNIT_TYPE,
    CREATED_AT,
    UPDATED_AT,
    DELETED_AT,
];

/// A unit whose attributes are validated at runtime against the schema named by
/// `unit_type`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DynamicUnit {
    pub id: String,
    pub account_id: String,
    pub unit_type: String,
    pub timestamps: Timestamps,
    /// Payload attributes, without any reserved field.
    pub data: Map<String, Value>,
}

impl DynamicUnit {
    pub fn new(unit_type: impl Into<String>) -> Self {
        Self {
            unit_type: unit_type.into(),
            ..Self::default()
        }
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = account_id.into();
        self
    }

    /// Sets a specific ID for this unit (useful for testing).
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.set_data(data);
        self
    }

    /// Replaces the payload. Reserved fields in `data` are dropped.
    pub fn set_data(&mut self, data: Map<String, Value>) {
        self.data = strip_reserved(data);
    }

    /// Overlays `delta` onto the payload: supplied keys overwrite, others are kept.
    pub fn merge_data(&mut self, delta: Map<String, Value>) {
        self.data.extend(strip_reserved(delta));
    }

    /// The payload merged with the identity and bookkeeping fields.
    ///
    /// This is the document the schema sees and the shape returned to callers.
    pub fn document(&self) -> Map<String, Value> {
        let mut doc = self.data.clone();
        doc.insert("id".to_string(), Value::String(self.id.clone()));
        doc.insert(
            ACCOUNT_ID.to_string(),
            Value::String(self.account_id.clone()),
        );
        doc.insert(UNIT_TYPE.to_string(), Value::String(self.unit_type.clone()));
        self.timestamps.write_to(&mut doc);
        doc
    }
}

impl UnitRecord for DynamicUnit {
    const ENTITY_TYPE: &'static str = "Unit";

    fn account_id(&self) -> &str {
        &self.account_id
    }

    fn discriminator(&self) -> &str {
        &self.unit_type
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn timestamps(&self) -> &Timestamps {
        &self.timestamps
    }

    fn timestamps_mut(&mut self) -> &mut Timestamps {
        &mut self.timestamps
    }

    fn validate(&mut self, schemas: &SchemaRegistry) -> Result<()> {
        let document = Value::Object(self.document());
        schemas.validate(&self.unit_type, &document)?;
        Ok(())
    }

    fn to_item(&self) -> Result<Item> {
        let key = self.key()?;
        let mut item = self.data.clone();
        write_key(&mut item, &key);
        item.insert("id".to_string(), Value::String(self.id.clone()));
        item.insert(UNIT_TYPE.to_string(), Value::String(self.unit_type.clone()));
        self.timestamps.write_to(&mut item);
        Ok(item)
    }

    fn from_item(item: &Item) -> Result<Self> {
        let sort_key = get_optional_string(item, SORT_KEY).unwrap_or_default();
        let from_sort_key = split_sort_key(&sort_key);

        let unit_type = get_optional_string(item, UNIT_TYPE)
            .or_else(|| from_sort_key.map(|(unit_type, _)| unit_type.to_string()))
            .ok_or_else(|| {
                RepositoryError::InvalidData(format!("invalid sort key format: {sort_key}"))
            })?;
        let id = get_optional_string(item, "id")
            .or_else(|| from_sort_key.map(|(_, id)| id.to_string()))
            .ok_or_else(|| RepositoryError::InvalidData("Missing or invalid field: id".into()))?;
        let account_id = get_optional_string(item, PARTITION_KEY)
            .or_else(|| get_optional_string(item, ACCOUNT_ID))
            .ok_or_else(|| RepositoryError::InvalidData("Missing or invalid field: pk".into()))?;

        Ok(Self {
            id,
            account_id,
            unit_type,
            timestamps: Timestamps::read_from(item)?,
            data: strip_reserved(item.clone()),
        })
    }

    fn to_document(&self) -> Value {
        Value::Object(self.document())
    }
}

fn strip_reserved(mut data: Map<String, Value>) -> Map<String, Value> {
    data.retain(|key, _| !RESERVED_FIELDS.contains(&key.as_str()));
    data
}
