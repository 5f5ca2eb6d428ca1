//! Data model shared by the queue, the ledger, and the engine.

mod event;
mod index;
mod status;
mod transform;
mod update_type;

pub use event::Event;
pub use index::{IndexedDocument, RemoveResult};
pub use status::{StatusAction, StatusRecord};
pub use transform::{FetchResponse, TransformTarget};
pub use update_type::UpdateType;
