//! In-memory repository implementation.
//!
//! Items are kept in one ordered map keyed by `(pk, sk)`, mirroring the single-table
//! layout. Queries follow the store contract: partition scoped, ordered by sort key,
//! `Limit` counts evaluated items before the soft-delete filter, and a last evaluated
//! key is returned while items remain.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use units_core::pagination::{decode_token, encode_token, KeyAttribute, PageKey};
use units_core::schema::SchemaRegistry;
use units_core::storage::{
    is_visible_item, prepare_create, prepare_delete, prepare_update, visible_record,
    ListUnitsQuery, RepositoryError, Result, UnitIdLookup, UnitPage, UnitRepository,
};
use units_core::unit::{
    get_optional_string, now_epoch_seconds, sort_key_prefix, Item, UnitKey, UnitRecord,
    ID_ATTRIBUTE, PARTITION_KEY, SORT_KEY,
};

type TableKey = (String, String);

/// In-memory storage backend for testing.
///
/// Uses a `BTreeMap` wrapped in `Arc<RwLock<_>>` for thread-safe access.
/// Data is not persisted and will be lost when the repository is dropped.
#[derive(Debug, Clone)]
pub struct InMemoryRepository {
    items: Arc<RwLock<BTreeMap<TableKey, Item>>>,
    schemas: Arc<SchemaRegistry>,
}

impl InMemoryRepository {
    /// Creates a new empty in-memory repository.
    pub fn new(schemas: Arc<SchemaRegistry>) -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
            schemas,
        }
    }

    /// Returns the stored item, soft-deleted or not.
    #[cfg(test)]
    pub async fn raw_item(&self, key: &UnitKey) -> Option<Item> {
        let items = self.items.read().await;
        items.get(&table_key(key)).cloned()
    }

    /// Number of stored items, soft-deleted ones included.
    #[cfg(test)]
    pub async fn item_count(&self) -> usize {
        self.items.read().await.len()
    }

    /// Partition-scoped query returning the visible items and the last evaluated key.
    async fn query(
        &self,
        partition_key: &str,
        prefix: Option<&str>,
        start: Option<&TableKey>,
        limit: usize,
    ) -> (Vec<Item>, Option<TableKey>) {
        let items = self.items.read().await;

        let lower = match start {
            Some(start) => Bound::Excluded(start.clone()),
            None => Bound::Included((partition_key.to_string(), String::new())),
        };
        let mut candidates = items
            .range((lower, Bound::Unbounded))
            .take_while(|((pk, _), _)| pk == partition_key)
            .filter(|((_, sk), _)| prefix.is_none_or(|prefix| sk.starts_with(prefix)))
            .peekable();

        let mut visible = Vec::new();
        let mut last_evaluated = None;
        let mut evaluated = 0;
        while evaluated < limit {
            let Some((key, item)) = candidates.next() else {
                break;
            };
            evaluated += 1;
            last_evaluated = Some(key.clone());
            if is_visible_item(item) {
                visible.push(item.clone());
            }
        }

        let more_remain = candidates.peek().is_some();
        (visible, last_evaluated.filter(|_| more_remain))
    }
}

fn table_key(key: &UnitKey) -> TableKey {
    (key.partition_key.clone(), key.sort_key.clone())
}

fn page_key(key: &TableKey) -> PageKey {
    PageKey::from([
        (PARTITION_KEY.to_string(), KeyAttribute::S(key.0.clone())),
        (SORT_KEY.to_string(), KeyAttribute::S(key.1.clone())),
    ])
}

/// The exclusive start key of a query, validated against its partition and sort key range.
fn start_key(key: &PageKey, partition_key: &str, prefix: Option<&str>) -> Result<TableKey> {
    let string_attribute = |name: &str| match key.get(name) {
        Some(KeyAttribute::S(value)) => Ok(value.clone()),
        _ => Err(RepositoryError::InvalidPaginationToken(format!(
            "missing key attribute {name}"
        ))),
    };
    let pk = string_attribute(PARTITION_KEY)?;
    if pk != partition_key {
        return Err(RepositoryError::InvalidPaginationToken(
            "token belongs to another account".to_string(),
        ));
    }
    let sk = string_attribute(SORT_KEY)?;
    if prefix.is_some_and(|prefix| !sk.starts_with(prefix)) {
        return Err(RepositoryError::InvalidPaginationToken(
            "token is outside the requested range".to_string(),
        ));
    }
    Ok((pk, sk))
}

#[async_trait]
impl<R: UnitRecord> UnitRepository<R> for InMemoryRepository {
    async fn create(&self, unit: &mut R) -> Result<()> {
        let write = prepare_create(unit, &self.schemas, now_epoch_seconds())?;

        let mut items = self.items.write().await;
        let key = table_key(&write.key);
        if items.contains_key(&key) {
            return Err(RepositoryError::AlreadyExists {
                entity_type: R::ENTITY_TYPE,
                id: write.key.to_string(),
            });
        }
        items.insert(key, write.item);
        Ok(())
    }

    async fn get_by_key(&self, account_id: &str, sort_key: &str) -> Result<Option<R>> {
        let key = UnitKey::from_parts(account_id, sort_key)?;
        let items = self.items.read().await;
        match items.get(&table_key(&key)) {
            Some(item) => visible_record(item),
            None => Ok(None),
        }
    }

    async fn update(&self, unit: &mut R) -> Result<()> {
        let write = prepare_update(unit, &self.schemas, now_epoch_seconds())?;

        let mut items = self.items.write().await;
        let key = table_key(&write.key);
        if !items.get(&key).is_some_and(is_visible_item) {
            return Err(RepositoryError::NotFoundOrDeleted {
                entity_type: R::ENTITY_TYPE,
                id: write.key.to_string(),
            });
        }
        items.insert(key, write.item);
        Ok(())
    }

    async fn delete(&self, account_id: &str, discriminator: &str, id: &str) -> Result<()> {
        let key = UnitKey::derive(account_id, discriminator, id)?;
        let Some(mut unit) =
            <Self as UnitRepository<R>>::get_by_key(self, &key.partition_key, &key.sort_key)
                .await?
        else {
            return Err(RepositoryError::NotFound {
                entity_type: R::ENTITY_TYPE,
                id: key.to_string(),
            });
        };

        let write = prepare_delete(&mut unit, now_epoch_seconds())?;
        self.items
            .write()
            .await
            .insert(table_key(&write.key), write.item);
        Ok(())
    }

    async fn list(&self, query: &ListUnitsQuery) -> Result<UnitPage<R>> {
        if query.account_id.is_empty() {
            return Err(RepositoryError::Validation("accountId is required".into()));
        }

        let prefix = query.prefix().map(sort_key_prefix);
        let start = match query.token() {
            Some(token) => match decode_token(token)? {
                Some(key) => Some(start_key(&key, &query.account_id, prefix.as_deref())?),
                None => None,
            },
            None => None,
        };

        let (items, last_evaluated) = self
            .query(
                &query.account_id,
                prefix.as_deref(),
                start.as_ref(),
                query.effective_limit(),
            )
            .await;

        let items = items.iter().map(R::from_item).collect::<Result<Vec<_>>>()?;
        let next_token = match last_evaluated {
            Some(key) => Some(encode_token(Some(&page_key(&key)))?),
            None => None,
        };

        Ok(UnitPage { items, next_token })
    }
}

#[async_trait]
impl<R: UnitRecord> UnitIdLookup<R> for InMemoryRepository {
    async fn find_by_id(&self, id: &str) -> Result<Vec<R>> {
        if id.is_empty() {
            return Err(RepositoryError::Validation("id is required".into()));
        }

        let items = self.items.read().await;
        items
            .values()
            .filter(|item| get_optional_string(item, ID_ATTRIBUTE).as_deref() == Some(id))
            .filter(|item| is_visible_item(item))
            .map(R::from_item)
            .collect()
    }
}
