//! Dispatch core: the operations behind the form, dashboard, schedule and
//! operations chat, on top of a keyed local cache kept in sync with the store.

pub mod chat;
pub mod gateway;
pub mod service;
pub mod sync;

pub use gateway::ScriptedGateway;
pub use service::{DispatchOptions, DispatchService, Outcome};
pub use sync::spawn_sync;
