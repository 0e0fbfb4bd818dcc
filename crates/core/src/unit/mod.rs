mod dynamic;
mod fixed;
mod keys;
mod record;

pub use dynamic::{DynamicUnit, ACCOUNT_ID, RESERVED_FIELDS, UNIT_TYPE};
pub use fixed::{AcesAttribute, ExtendedAttribute, FixedUnit, VehicleAttributes, FIXED_UNIT_TYPE};
pub use keys::{
    sort_key, sort_key_prefix, split_sort_key, KeyError, UnitKey, ID_ATTRIBUTE, KEY_SEPARATOR,
    PARTITION_KEY, SORT_KEY,
};
pub use record::{
    generate_id, get_optional_string, get_string, now_epoch_seconds, write_key, Item, Timestamps,
    UnitRecord, CREATED_AT, DELETED_AT, UPDATED_AT,
};
