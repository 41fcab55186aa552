//! Data models for the tahfidz program.
//!
//! Every entity comes as a record (a row as stored remotely, with the
//! gateway-assigned `id` and `created_at`) and a draft (the validated form
//! payload used for create and update):
//!
//! - [`Student`] / [`StudentDraft`]
//! - [`Teacher`] / [`TeacherDraft`]
//! - [`MemorizationEntry`] / [`MemorizationDraft`]
//! - [`ReviewEntry`] / [`ReviewDraft`]

mod memorization;
mod review;
mod student;
mod teacher;
mod types;

pub use memorization::{MemorizationDraft, MemorizationEntry};
pub use review::{ReviewDraft, ReviewEntry};
pub use student::{Student, StudentDraft, StudentRef};
pub use teacher::{Teacher, TeacherDraft, TeacherRef};
pub use types::MemorizationStatus;
