//! Core traits and types for DynamoDB-backed distributed mutexes.

pub mod clock;
pub mod error;
pub mod guard;
pub mod holder;
pub mod mutex;
pub mod prelude;
pub mod record;
pub mod store;

pub use error::{LockError, LockResult};
pub use prelude::*;
