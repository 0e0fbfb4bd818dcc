use async_trait::async_trait;

use crate::unit::{UnitKey, UnitRecord};

use super::{ListUnitsQuery, Result, UnitPage};

/// Repository for unit records of one variant.
///
/// Soft-deleted records are invisible to every read.
#[async_trait]
pub trait UnitRepository<R: UnitRecord>: Send + Sync {
    /// Creates a new unit.
    ///
    /// Generates the id when absent, stamps the timestamps and validates the payload
    /// before writing. Fails with `AlreadyExists` when the key is taken.
    async fn create(&self, unit: &mut R) -> Result<()>;

    /// Gets a unit by its composite primary key (`accountId` + `<discriminator>#<id>`).
    async fn get_by_key(&self, account_id: &str, sort_key: &str) -> Result<Option<R>>;

    /// Gets a unit by its id within an account and discriminator.
    async fn get_by_id(
        &self,
        account_id: &str,
        discriminator: &str,
        id: &str,
    ) -> Result<Option<R>> {
        let key = UnitKey::derive(account_id, discriminator, id)?;
        self.get_by_key(&key.partition_key, &key.sort_key).await
    }

    /// Updates an existing, non-deleted unit. Fails with `NotFoundOrDeleted` otherwise.
    async fn update(&self, unit: &mut R) -> Result<()>;

    /// Soft deletes a unit. Fails with `NotFound` when absent or already deleted.
    async fn delete(&self, account_id: &str, discriminator: &str, id: &str) -> Result<()>;

    /// Lists the live units of an account, one page at a time.
    async fn list(&self, query: &ListUnitsQuery) -> Result<UnitPage<R>>;

    /// Checks whether a live unit exists under the key.
    async fn exists(&self, account_id: &str, sort_key: &str) -> Result<bool> {
        Ok(self.get_by_key(account_id, sort_key).await?.is_some())
    }
}

/// Cross-account lookup through the global index keyed by `id`.
#[async_trait]
pub trait UnitIdLookup<R: UnitRecord>: Send + Sync {
    /// Gets every live unit carrying `id`, across accounts.
    async fn find_by_id(&self, id: &str) -> Result<Vec<R>>;
}
