//! Composite key derivation for the single-table layout.
//!
//! Pure functions for building partition and sort keys. The partition key is the
//! account id, the sort key is `<discriminator>#<id>`, where the discriminator is the
//! unit type (dynamic records) or the location id (fixed records).

use thiserror::Error;

/// Separator between the discriminator and the id inside a sort key.
pub const KEY_SEPARATOR: char = '#';

/// Partition key attribute name.
pub const PARTITION_KEY: &str = "pk";

/// Sort key attribute name.
pub const SORT_KEY: &str = "sk";

/// Attribute holding the unit id; also the hash key of the id index.
pub const ID_ATTRIBUTE: &str = "id";

/// Errors raised while building or parsing keys.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("{0} is required")]
    MissingComponent(&'static str),
    #[error("{field} must not contain '{KEY_SEPARATOR}': {value}")]
    InvalidComponent { field: &'static str, value: String },
    #[error("invalid sort key format: {0}")]
    MalformedSortKey(String),
    #[error("sort key {sort_key} does not belong to id {id}")]
    IdMismatch { sort_key: String, id: String },
}

/// Primary key of a unit item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UnitKey {
    pub partition_key: String,
    pub sort_key: String,
}

impl UnitKey {
    /// Derives the key for `(account_id, discriminator, id)`.
    ///
    /// A discriminator that is already a composite sort key is used as-is, provided
    /// its id part is `id`.
    pub fn derive(account_id: &str, discriminator: &str, id: &str) -> Result<Self, KeyError> {
        require("accountId", account_id)?;
        require("discriminator", discriminator)?;
        require("id", id)?;
        if id.contains(KEY_SEPARATOR) {
            return Err(KeyError::InvalidComponent {
                field: "id",
                value: id.to_string(),
            });
        }

        let sort_key = match split_sort_key(discriminator) {
            Some((_, existing_id)) if existing_id == id => discriminator.to_string(),
            Some(_) => {
                return Err(KeyError::IdMismatch {
                    sort_key: discriminator.to_string(),
                    id: id.to_string(),
                })
            }
            None => sort_key(discriminator, id),
        };

        Ok(Self {
            partition_key: account_id.to_string(),
            sort_key,
        })
    }

    /// Builds a key from an account id and an already composite sort key.
    pub fn from_parts(account_id: &str, sort_key: &str) -> Result<Self, KeyError> {
        require("accountId", account_id)?;
        require("sortKey", sort_key)?;
        if split_sort_key(sort_key).is_none() {
            return Err(KeyError::MalformedSortKey(sort_key.to_string()));
        }

        Ok(Self {
            partition_key: account_id.to_string(),
            sort_key: sort_key.to_string(),
        })
    }

    /// The discriminator part of the sort key.
    pub fn discriminator(&self) -> &str {
        split_sort_key(&self.sort_key)
            .map(|(discriminator, _)| discriminator)
            .unwrap_or(&self.sort_key)
    }

    /// The id part of the sort key.
    pub fn id(&self) -> &str {
        split_sort_key(&self.sort_key)
            .map(|(_, id)| id)
            .unwrap_or_default()
    }
}

impl std::fmt::Display for UnitKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.partition_key, self.sort_key)
    }
}

/// Generate a sort key.
///
/// Pattern: `<discriminator>#<id>`
pub fn sort_key(discriminator: &str, id: &str) -> String {
    format!("{discriminator}{KEY_SEPARATOR}{id}")
}

/// Generate the sort key prefix for `begins_with` queries scoped to one discriminator.
///
/// Pattern: `<discriminator>#`
pub fn sort_key_prefix(discriminator: &str) -> String {
    format!("{discriminator}{KEY_SEPARATOR}")
}

/// Split a sort key into `(discriminator, id)`.
///
/// Splits on the first separator; both parts must be non-empty.
pub fn split_sort_key(sort_key: &str) -> Option<(&str, &str)> {
    sort_key
        .split_once(KEY_SEPARATOR)
        .filter(|(discriminator, id)| !discriminator.is_empty() && !id.is_empty())
}

fn require(field: &'static str, value: &str) -> Result<(), KeyError> {
    if value.is_empty() {
        Err(KeyError::MissingComponent(field))
    } else {
        Ok(())
    }
}
