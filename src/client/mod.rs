//! Typed consumer of the REST API.

pub mod api;
pub mod entry_log;
pub mod session;
pub mod wire;

pub use api::{ClientError, WorklogClient};
pub use entry_log::EntryLog;
pub use session::SessionContext;
pub use wire::{EntryForm, EntryFormPatch};
