//! State Management
//!
//! The habit tracker session and its `localStorage` binding.

pub mod global;
pub mod local_store;

pub use global::{provide_global_state, GlobalState};
pub use local_store::LocalStore;
