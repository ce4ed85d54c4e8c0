//! In-memory backend for the Veritas session store.
//!
//! Sessions and their histories live behind a single async lock and vanish
//! when the process exits, when the session is ended, or when
//! [`MemoryStore::reap_idle`] finds them unused for too long.

mod store;

pub use store::MemoryStore;
pub use veritas_core::{Error, Result};

#[cfg(test)]
mod tests;
