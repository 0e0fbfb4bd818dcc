//! AppSync direct Lambda resolver event.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use units_core::storage::ListUnitsQuery;

/// Event delivered by the GraphQL gateway for one resolved field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSyncEvent {
    pub type_name: String,
    pub field_name: String,
    /// Field arguments; every operation wraps its payload in `input`.
    pub arguments: Value,
    pub identity: Identity,
    #[serde(skip_serializing_if = "Value::is_null")]
    pub source: Value,
    pub request: RequestInfo,
    pub info: Info,
}

/// Caller identity resolved by the gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Identity {
    pub sub: String,
    pub issuer: String,
    pub username: String,
    pub claims: Map<String, Value>,
    pub source_ip: Vec<String>,
    pub default_auth_strategy: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_arn: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub account_id: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestInfo {
    pub headers: HashMap<String, String>,
}

/// GraphQL execution info.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Info {
    pub field_name: String,
    pub parent_type_name: String,
    pub variables: Map<String, Value>,
    pub selection_set_list: Vec<String>,
    #[serde(rename = "selectionSetGraphQL")]
    pub selection_set_graphql: String,
}

/// Operation selected by the event's field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    Create,
    Read,
    Update,
    Delete,
    List,
    /// Cross-account lookup by id.
    LookupById,
    Unknown,
}

impl OperationType {
    pub fn from_field_name(field_name: &str) -> Self {
        match field_name {
            "createUnit" => Self::Create,
            "getUnit" => Self::Read,
            "updateUnit" => Self::Update,
            "deleteUnit" => Self::Delete,
            "listUnits" => Self::List,
            "getUnitsById" => Self::LookupById,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Read => "READ",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
            Self::List => "LIST",
            Self::LookupById => "LOOKUP_BY_ID",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Deserialize)]
struct InputWrapper<T> {
    input: T,
}

impl AppSyncEvent {
    pub fn operation_type(&self) -> OperationType {
        OperationType::from_field_name(&self.field_name)
    }

    /// Deserializes `arguments.input` as `T`.
    pub fn parse_input<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        let wrapper: InputWrapper<T> = serde_json::from_value(self.arguments.clone())?;
        Ok(wrapper.input)
    }
}

// ============================================================================
// Operation inputs
// ============================================================================

/// Input of `createUnit` for schema-driven units.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateUnitInput {
    pub account_id: String,
    pub unit_type: String,
    pub data: Map<String, Value>,
}

/// Input of `updateUnit` for schema-driven units. `data` is a partial delta.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateUnitInput {
    pub id: String,
    pub account_id: String,
    pub unit_type: String,
    pub data: Map<String, Value>,
}

/// Input of `getUnit` and `deleteUnit` for schema-driven units.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UnitKeyInput {
    pub id: String,
    pub account_id: String,
    pub unit_type: String,
}

/// Input of `getUnit` and `deleteUnit` for fixed-schema units.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LocationKeyInput {
    pub id: String,
    pub account_id: String,
    pub location_id: String,
}

/// Paging fields shared by both `listUnits` inputs.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageInput {
    pub limit: Option<i64>,
    pub next_token: Option<String>,
    pub filter: Option<Value>,
}

impl PageInput {
    fn into_query(self, account_id: String, discriminator: Option<String>) -> ListUnitsQuery {
        ListUnitsQuery {
            account_id,
            discriminator,
            limit: self.limit,
            next_token: self.next_token,
            filter: self.filter,
        }
    }
}

/// Input of `listUnits` for schema-driven units. Only `unitType` narrows the listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListUnitsInput {
    pub account_id: String,
    pub unit_type: Option<String>,
    #[serde(flatten)]
    pub page: PageInput,
}

impl ListUnitsInput {
    pub fn into_query(self) -> ListUnitsQuery {
        self.page.into_query(self.account_id, self.unit_type)
    }
}

/// Input of `listUnits` for fixed-schema units. Only `locationId` narrows the listing.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListLocationUnitsInput {
    pub account_id: String,
    pub location_id: Option<String>,
    #[serde(flatten)]
    pub page: PageInput,
}

impl ListLocationUnitsInput {
    pub fn into_query(self) -> ListUnitsQuery {
        self.page.into_query(self.account_id, self.location_id)
    }
}

/// Input of `getUnitsById`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct LookupByIdInput {
    pub id: String,
}
