use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::unit::UnitRecord;

/// Page size used when the caller gives none or an out-of-range value.
pub const DEFAULT_LIST_LIMIT: usize = 20;

/// Largest page size a caller may request.
pub const MAX_LIST_LIMIT: usize = 100;

/// Parameters of a partition-scoped listing.
///
/// Built by the caller-facing input of each record variant, which decides what the
/// discriminator means.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListUnitsQuery {
    pub account_id: String,
    /// Narrows the listing to sort keys beginning with `<discriminator>#`: the unit
    /// type, or the location id of fixed-schema units.
    pub discriminator: Option<String>,
    pub limit: Option<i64>,
    pub next_token: Option<String>,
    /// Accepted for forward compatibility; not applied.
    pub filter: Option<Value>,
}

impl ListUnitsQuery {
    pub fn new(account_id: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            ..Self::default()
        }
    }

    pub fn with_discriminator(mut self, discriminator: impl Into<String>) -> Self {
        self.discriminator = Some(discriminator.into());
        self
    }

    pub fn with_limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_next_token(mut self, token: impl Into<String>) -> Self {
        self.next_token = Some(token.into());
        self
    }

    /// The page size to request: the caller's limit when in `1..=100`, else 20.
    pub fn effective_limit(&self) -> usize {
        match self.limit {
            Some(limit) if (1..=MAX_LIST_LIMIT as i64).contains(&limit) => limit as usize,
            _ => DEFAULT_LIST_LIMIT,
        }
    }

    /// The sort key discriminator, ignoring an empty string.
    pub fn prefix(&self) -> Option<&str> {
        self.discriminator.as_deref().filter(|s| !s.is_empty())
    }

    /// The incoming token, ignoring an empty string.
    pub fn token(&self) -> Option<&str> {
        self.next_token.as_deref().filter(|s| !s.is_empty())
    }
}

/// One page of records.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitPage<R> {
    /// Never absent; empty when nothing matched.
    pub items: Vec<R>,
    /// Set only when more results remain.
    pub next_token: Option<String>,
}

impl<R> Default for UnitPage<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next_token: None,
        }
    }
}

impl<R: UnitRecord> UnitPage<R> {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    /// Renders the page as the caller-facing list response.
    pub fn into_response(self) -> ListUnitsResponse {
        ListUnitsResponse {
            count: self.items.len(),
            items: self.items.iter().map(UnitRecord::to_document).collect(),
            next_token: self.next_token,
        }
    }
}

/// Caller-facing list result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListUnitsResponse {
    pub items: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_token: Option<String>,
    pub count: usize,
}
