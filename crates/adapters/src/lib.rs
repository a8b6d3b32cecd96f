//! social-scheduler adapters crate
//!
//! This crate contains infrastructure adapters implementing the domain ports:
//! - `store`: dstask process and in-memory task stores
//! - `browser`: Browser automation client
//! - `cookies`: Session cookie replay
//! - `publishers`: Per-platform publishers

mod store_dstask;
mod store_memory;
mod store_output;

pub mod browser;
pub mod cookies;
pub mod publishers;

/// Re-exports for task store adapters
pub mod store {
    pub use crate::store_dstask::{DstaskStore, MiseMode, StoreLauncher};
    pub use crate::store_memory::InMemoryTaskStore;
    pub use crate::store_output::{ParseMode, extract_json_array, parse_records};
}
