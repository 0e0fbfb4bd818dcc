mod error;
mod registry;

pub use error::{SchemaError, Violation};
pub use registry::{CompiledSchema, SchemaRegistry};
