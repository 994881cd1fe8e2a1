//! Copy and paste of model subgraphs, within a model or between models
//!
//! [`copy_full`] returns every copied element in serialized form, either as
//! text values or as reference ids. [`paste_link`] resolves those values and
//! places new items on the target diagram that share the existing defining
//! elements; [`paste_full`] creates new defining elements as well.

pub mod copy;
pub mod paste;
pub mod error;

#[cfg(test)]
pub mod tests;

pub use copy::{copy, copy_full, CopyData, CopyRecord, ElementCopy, PresentationCopy};
pub use paste::{paste, paste_full, paste_link, PasteMode};
pub use error::{CopyError, Result};
