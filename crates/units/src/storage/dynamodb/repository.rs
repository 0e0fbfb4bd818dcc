//! DynamoDB repository implementation.
//!
//! Implements the repository traits from `units_core::storage` on one table keyed by
//! `pk` (account id) and `sk` (`<discriminator>#<id>`), with a global index on `id`.

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;

use units_core::pagination::{decode_token, encode_token, KeyAttribute};
use units_core::schema::SchemaRegistry;
use units_core::storage::{
    prepare_create, prepare_delete, prepare_update, visible_record, ListUnitsQuery,
    RepositoryError, Result, UnitIdLookup, UnitPage, UnitRepository,
};
use units_core::unit::{
    now_epoch_seconds, sort_key_prefix, Item, UnitKey, UnitRecord, PARTITION_KEY, SORT_KEY,
};

use super::conversions::{
    attributes_to_item, attributes_to_page_key, item_to_attributes, page_key_to_attributes,
};
use super::error::{map_get_item_error, map_put_item_error, map_query_error, PutGuard};
use crate::config::Config;

const CREATE_CONDITION: &str = "attribute_not_exists(pk) AND attribute_not_exists(sk)";
const UPDATE_CONDITION: &str = "attribute_exists(pk) AND attribute_exists(sk) \
    AND (attribute_not_exists(deletedAt) OR deletedAt = :zero)";
const VISIBLE_FILTER: &str = "attribute_not_exists(deletedAt) OR deletedAt = :zero";

fn zero() -> AttributeValue {
    AttributeValue::N("0".to_string())
}

/// DynamoDB-based repository implementation.
///
/// Serves both record variants from the same table.
pub struct DynamoDbRepository {
    client: Client,
    table_name: String,
    id_index_name: String,
    schemas: Arc<SchemaRegistry>,
}

impl DynamoDbRepository {
    /// Creates a new repository with the given DynamoDB client and table name.
    pub fn new(
        client: Client,
        table_name: impl Into<String>,
        id_index_name: impl Into<String>,
        schemas: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            client,
            table_name: table_name.into(),
            id_index_name: id_index_name.into(),
            schemas,
        }
    }

    /// Creates a new repository from the loaded configuration.
    ///
    /// Uses the AWS SDK default credential chain in the configured region.
    pub async fn from_config(config: &Config, schemas: Arc<SchemaRegistry>) -> Self {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.aws_region.clone()))
            .load()
            .await;
        let client = Client::new(&sdk_config);

        Self::new(client, &config.table_name, &config.id_index_name, schemas)
    }

    /// Get the table name.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    async fn get_item(&self, key: &UnitKey) -> Result<Option<Item>> {
        let result = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(PARTITION_KEY, AttributeValue::S(key.partition_key.clone()))
            .key(SORT_KEY, AttributeValue::S(key.sort_key.clone()))
            .send()
            .await
            .map_err(map_get_item_error)?;

        result.item.as_ref().map(attributes_to_item).transpose()
    }
}

// ============================================================================
// UnitRepository implementation
// ============================================================================

#[async_trait]
impl<R: UnitRecord> UnitRepository<R> for DynamoDbRepository {
    async fn create(&self, unit: &mut R) -> Result<()> {
        let write = prepare_create(unit, &self.schemas, now_epoch_seconds())?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_attributes(&write.item)))
            .condition_expression(CREATE_CONDITION)
            .send()
            .await
            .map_err(|e| {
                map_put_item_error(
                    e,
                    Some(PutGuard::MustNotExist),
                    R::ENTITY_TYPE,
                    write.key.to_string(),
                )
            })?;

        tracing::debug!(key = %write.key, "Created unit");
        Ok(())
    }

    async fn get_by_key(&self, account_id: &str, sort_key: &str) -> Result<Option<R>> {
        let key = UnitKey::from_parts(account_id, sort_key)?;
        match self.get_item(&key).await? {
            Some(item) => visible_record(&item),
            None => Ok(None),
        }
    }

    async fn update(&self, unit: &mut R) -> Result<()> {
        let write = prepare_update(unit, &self.schemas, now_epoch_seconds())?;

        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_attributes(&write.item)))
            .condition_expression(UPDATE_CONDITION)
            .expression_attribute_values(":zero", zero())
            .send()
            .await
            .map_err(|e| {
                map_put_item_error(
                    e,
                    Some(PutGuard::MustBeLive),
                    R::ENTITY_TYPE,
                    write.key.to_string(),
                )
            })?;

        tracing::debug!(key = %write.key, "Updated unit");
        Ok(())
    }

    async fn delete(&self, account_id: &str, discriminator: &str, id: &str) -> Result<()> {
        let key = UnitKey::derive(account_id, discriminator, id)?;
        let existing = match self.get_item(&key).await? {
            Some(item) => visible_record::<R>(&item)?,
            None => None,
        };
        let Some(mut unit) = existing else {
            return Err(RepositoryError::NotFound {
                entity_type: R::ENTITY_TYPE,
                id: key.to_string(),
            });
        };

        // Last writer wins between the read above and this put
        let write = prepare_delete(&mut unit, now_epoch_seconds())?;
        self.client
            .put_item()
            .table_name(&self.table_name)
            .set_item(Some(item_to_attributes(&write.item)))
            .send()
            .await
            .map_err(|e| map_put_item_error(e, None, R::ENTITY_TYPE, write.key.to_string()))?;

        tracing::debug!(key = %write.key, "Soft deleted unit");
        Ok(())
    }

    async fn list(&self, query: &ListUnitsQuery) -> Result<UnitPage<R>> {
        if query.account_id.is_empty() {
            return Err(RepositoryError::Validation("accountId is required".into()));
        }

        let start_key = match query.token() {
            Some(token) => decode_token(token)?,
            None => None,
        };
        if let Some(key) = &start_key {
            if key.get(PARTITION_KEY) != Some(&KeyAttribute::S(query.account_id.clone())) {
                return Err(RepositoryError::InvalidPaginationToken(
                    "token belongs to another account".to_string(),
                ));
            }
            if let Some(discriminator) = query.prefix() {
                let prefix = sort_key_prefix(discriminator);
                if !matches!(key.get(SORT_KEY), Some(KeyAttribute::S(sk)) if sk.starts_with(&prefix)) {
                    return Err(RepositoryError::InvalidPaginationToken(
                        "token is outside the requested range".to_string(),
                    ));
                }
            }
        }
        let start_key = start_key.as_ref().map(page_key_to_attributes);

        let mut request = self
            .client
            .query()
            .table_name(&self.table_name)
            .filter_expression(VISIBLE_FILTER)
            .expression_attribute_values(":accountId", AttributeValue::S(query.account_id.clone()))
            .expression_attribute_values(":zero", zero())
            .limit(query.effective_limit() as i32)
            .set_exclusive_start_key(start_key);

        request = match query.prefix() {
            Some(discriminator) => request
                .key_condition_expression("pk = :accountId AND begins_with(sk, :prefix)")
                .expression_attribute_values(
                    ":prefix",
                    AttributeValue::S(sort_key_prefix(discriminator)),
                ),
            None => request.key_condition_expression("pk = :accountId"),
        };

        let result = request
            .send()
            .await
            .map_err(|e| map_query_error(e, "list"))?;

        let items = result
            .items
            .unwrap_or_default()
            .iter()
            .map(|attributes| R::from_item(&attributes_to_item(attributes)?))
            .collect::<Result<Vec<_>>>()?;

        let next_token = match result.last_evaluated_key.filter(|key| !key.is_empty()) {
            Some(key) => Some(encode_token(Some(&attributes_to_page_key(&key)?))?),
            None => None,
        };

        tracing::debug!(
            account_id = %query.account_id,
            count = items.len(),
            has_more = next_token.is_some(),
            "Listed units"
        );
        Ok(UnitPage { items, next_token })
    }
}

// ============================================================================
// UnitIdLookup implementation
// ============================================================================

#[async_trait]
impl<R: UnitRecord> UnitIdLookup<R> for DynamoDbRepository {
    async fn find_by_id(&self, id: &str) -> Result<Vec<R>> {
        if id.is_empty() {
            return Err(RepositoryError::Validation("id is required".into()));
        }

        let mut units = Vec::new();
        let mut start_key = None;
        loop {
            let result = self
                .client
                .query()
                .table_name(&self.table_name)
                .index_name(&self.id_index_name)
                .key_condition_expression("id = :id")
                .filter_expression(VISIBLE_FILTER)
                .expression_attribute_values(":id", AttributeValue::S(id.to_string()))
                .expression_attribute_values(":zero", zero())
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| map_query_error(e, "find_by_id"))?;

            for attributes in result.items.unwrap_or_default() {
                units.push(R::from_item(&attributes_to_item(&attributes)?)?);
            }

            start_key = result.last_evaluated_key.filter(|key| !key.is_empty());
            if start_key.is_none() {
                break;
            }
        }

        Ok(units)
    }
}
