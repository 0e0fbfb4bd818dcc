mod codec;
mod error;

pub use codec::{decode_token, encode_token, KeyAttribute, PageKey, STRING_KEY_FIELDS};
pub use error::PaginationError;
