//! Duet core domain layer.
//!
//! Pure domain types and logic for the Duet conversation client: session
//! identity, conversation and message models, the poll/pending list
//! reconciler, and the shared error type. No HTTP and no background
//! tasks live here; the infrastructure layer (`duet-client`) wires these
//! types to the remote API.

pub mod conversation;
pub mod error;
pub mod session;

// Re-export common error type
pub use error::DuetError;
