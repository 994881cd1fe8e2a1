//! Plait Changeset — Three-way model compare
//!
//! [`compare`] diffs an ancestor and an incoming version of a model and
//! records each difference as a change-record node in the current model.

pub mod change;
pub mod compare;
pub mod error;


pub use change::{pending_changes, Change, Op, PendingChange, ValueType};
pub use compare::{compare, diff};
pub use error::{ChangesetError, Result};
