//! GraphQL gateway event model and response envelope.

mod event;
mod response;

pub use event::{
    AppSyncEvent, CreateUnitInput, ListLocationUnitsInput, ListUnitsInput, LocationKeyInput,
    LookupByIdInput, OperationType, UnitKeyInput, UpdateUnitInput,
};
pub use response::{codes, Response};
