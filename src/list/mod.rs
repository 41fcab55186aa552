//! Generic list-resource management.
//!
//! One controller drives every list screen (students, teachers,
//! memorization entries, reviews); the per-collection differences live in a
//! [`Resource`] descriptor.

mod controller;
mod intent;
mod resource;

pub use controller::{Confirm, ListController, Modal, Notice, NoticeLevel, RefreshOutcome, Ticket};
pub(crate) use controller::{decode_page, decode_row};
pub use intent::{QueryIntent, SortDirection};
pub use resource::{FilterField, FilterKind, Memorizations, Resource, Reviews, Students, Teachers};
