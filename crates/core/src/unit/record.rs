//! Record bookkeeping shared by both unit variants.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::schema::SchemaRegistry;
use crate::storage::{RepositoryError, Result};

use super::keys::{UnitKey, PARTITION_KEY, SORT_KEY};

/// Store-agnostic attribute map of one item.
pub type Item = Map<String, Value>;

pub const CREATED_AT: &str = "createdAt";
pub const UPDATED_AT: &str = "updatedAt";
pub const DELETED_AT: &str = "deletedAt";

/// Creation, update and soft-delete instants, in epoch seconds.
///
/// `deleted_at == 0` means the record is live.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Timestamps {
    #[serde(default)]
    pub created_at: i64,
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub deleted_at: i64,
}

impl Timestamps {
    /// Stamps `now` as the update instant, and as the creation instant if unset.
    pub fn touch(&mut self, now: i64) {
        if self.created_at == 0 {
            self.created_at = now;
        }
        self.updated_at = now;
    }

    pub fn mark_deleted(&mut self, now: i64) {
        self.deleted_at = now;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at > 0
    }

    /// Writes the three timestamps into `item`.
    pub fn write_to(&self, item: &mut Item) {
        item.insert(CREATED_AT.to_string(), Value::from(self.created_at));
        item.insert(UPDATED_AT.to_string(), Value::from(self.updated_at));
        item.insert(DELETED_AT.to_string(), Value::from(self.deleted_at));
    }

    /// Reads the timestamps from `item`; absent attributes read as zero.
    pub fn read_from(item: &Item) -> Result<Self> {
        Ok(Self {
            created_at: get_epoch(item, CREATED_AT)?,
            updated_at: get_epoch(item, UPDATED_AT)?,
            deleted_at: get_epoch(item, DELETED_AT)?,
        })
    }
}

/// Current time in epoch seconds.
pub fn now_epoch_seconds() -> i64 {
    chrono::Utc::now().timestamp()
}

/// A new random (v4) identifier in hyphenated form.
pub fn generate_id() -> String {
    Uuid::new_v4().to_string()
}

/// Capabilities the repository needs from a record, regardless of payload typing.
pub trait UnitRecord: Clone + Send + Sync + 'static {
    /// Name used in error messages and logs.
    const ENTITY_TYPE: &'static str;

    fn account_id(&self) -> &str;

    /// The sort key discriminator: unit type or location id.
    fn discriminator(&self) -> &str;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    /// Checks the payload. Dynamic records validate against their schema.
    fn validate(&mut self, schemas: &SchemaRegistry) -> Result<()>;

    /// Flattens the record into a store item, including `pk` and `sk`.
    fn to_item(&self) -> Result<Item>;

    /// Rebuilds a record from a store item.
    fn from_item(item: &Item) -> Result<Self>;

    /// Caller-facing JSON document.
    fn to_document(&self) -> Value;

    fn key(&self) -> Result<UnitKey> {
        Ok(UnitKey::derive(
            self.account_id(),
            self.discriminator(),
            self.id(),
        )?)
    }

    /// Assigns a fresh id unless one is already present.
    fn generate_identity(&mut self) {
        if self.id().is_empty() {
            self.set_id(generate_id());
        }
    }

    fn touch(&mut self, now: i64) {
        self.timestamps_mut().touch(now);
    }

    fn mark_deleted(&mut self, now: i64) {
        self.timestamps_mut().mark_deleted(now);
    }

    fn is_deleted(&self) -> bool {
        self.timestamps().is_deleted()
    }
}

/// Inserts `pk` and `sk` for `key` into `item`.
pub fn write_key(item: &mut Item, key: &UnitKey) {
    item.insert(
        PARTITION_KEY.to_string(),
        Value::String(key.partition_key.clone()),
    );
    item.insert(SORT_KEY.to_string(), Value::String(key.sort_key.clone()));
}

/// Get a required string attribute.
pub fn get_string(item: &Item, key: &str) -> Result<String> {
    item.get(key)
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| RepositoryError::InvalidData(format!("Missing or invalid field: {key}")))
}

/// Get an optional string attribute.
pub fn get_optional_string(item: &Item, key: &str) -> Option<String> {
    item.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Get an epoch-seconds attribute, zero when absent or null.
fn get_epoch(item: &Item, key: &str) -> Result<i64> {
    match item.get(key) {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| RepositoryError::InvalidData(format!("Invalid timestamp {key}: {n}"))),
        Some(other) => Err(RepositoryError::InvalidData(format!(
            "Invalid timestamp {key}: {other}"
        ))),
    }
}
