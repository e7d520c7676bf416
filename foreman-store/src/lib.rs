//! FOREMAN Store - Trace and State Storage
//!
//! The append-only trace store (the audit log) and the in-memory state
//! stores for conversations and tasks. Storage is behind traits/handles so a
//! persistent backend can replace the in-memory implementations without
//! touching the engine.

mod export;
mod memory;
mod state;
mod trace;

pub use export::TraceDocument;
pub use memory::InMemoryTraceStore;
pub use state::{ConversationStore, TaskStore};
pub use trace::{TraceStore, TraceStoreExt};
