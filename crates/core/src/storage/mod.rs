mod error;
mod http_mapping;
mod operations;
mod traits;
mod types;

pub use error::{RepositoryError, Result};
pub use http_mapping::{
    caller_message, error_code, repository_error_to_status_code, INTERNAL_ERROR_MESSAGE,
};
pub use operations::{
    is_visible_item, prepare_create, prepare_delete, prepare_update, visible_record,
    PreparedWrite,
};
pub use traits::{UnitIdLookup, UnitRepository};
pub use types::{
    ListUnitsQuery, ListUnitsResponse, UnitPage, DEFAULT_LIST_LIMIT, MAX_LIST_LIMIT,
};
