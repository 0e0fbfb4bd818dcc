//! Pure write preparation shared by every storage backend.
//!
//! Each function applies the record bookkeeping for one repository operation and
//! returns the key and item to write. Backends only add the store call and its guard.

use serde_json::Value;

use crate::schema::SchemaRegistry;
use crate::unit::{Item, UnitKey, UnitRecord, DELETED_AT};

use super::{RepositoryError, Result};

/// A key and the full item to write under it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedWrite {
    pub key: UnitKey,
    pub item: Item,
}

/// Prepares a create: generates the id when absent, stamps both timestamps and
/// validates the payload.
///
/// Nothing is written when this fails.
pub fn prepare_create<R: UnitRecord>(
    unit: &mut R,
    schemas: &SchemaRegistry,
    now: i64,
) -> Result<PreparedWrite> {
    if unit.account_id().is_empty() {
        return Err(RepositoryError::Validation("accountId is required".into()));
    }
    if unit.discriminator().is_empty() {
        return Err(RepositoryError::Validation(format!(
            "{} discriminator is required",
            R::ENTITY_TYPE
        )));
    }

    unit.generate_identity();
    unit.touch(now);
    unit.validate(schemas)?;
    prepared(unit)
}

/// Prepares an update: refreshes `updatedAt` and re-validates the payload.
///
/// `createdAt` is written as carried by `unit`.
pub fn prepare_update<R: UnitRecord>(
    unit: &mut R,
    schemas: &SchemaRegistry,
    now: i64,
) -> Result<PreparedWrite> {
    let key = unit.key()?;
    unit.timestamps_mut().updated_at = now;
    unit.validate(schemas)?;
    Ok(PreparedWrite {
        key,
        item: unit.to_item()?,
    })
}

/// Prepares a soft delete of a live record: stamps `deletedAt` and `updatedAt`.
pub fn prepare_delete<R: UnitRecord>(unit: &mut R, now: i64) -> Result<PreparedWrite> {
    unit.mark_deleted(now);
    unit.touch(now);
    prepared(unit)
}

/// Whether a stored item is visible to readers (`deletedAt` absent or zero).
pub fn is_visible_item(item: &Item) -> bool {
    match item.get(DELETED_AT) {
        None | Some(Value::Null) => true,
        Some(Value::Number(n)) => n.as_f64() == Some(0.0),
        Some(_) => false,
    }
}

/// Rebuilds a record from an item, hiding soft-deleted ones.
pub fn visible_record<R: UnitRecord>(item: &Item) -> Result<Option<R>> {
    if !is_visible_item(item) {
        return Ok(None);
    }
    R::from_item(item).map(Some)
}

fn prepared<R: UnitRecord>(unit: &R) -> Result<PreparedWrite> {
    Ok(PreparedWrite {
        key: unit.key()?,
        item: unit.to_item()?,
    })
}
