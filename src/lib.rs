//! # Tahfidz - administration of a Quran memorization program
//!
//! Tahfidz keeps the records of a memorization program: students, teachers,
//! memorization entries and review sessions. Records live behind a data
//! gateway, either a hosted PostgREST backend or a local JSON store.
//!
//! ## Features
//!
//! - **Filtered, sorted, paginated lists** driven by a single query intent
//! - **Create/edit/delete** with form validation and user notices
//! - **Reports**: export every row matching the filters as paged text or JSON
//! - **Program overview**: each student's latest memorization and review
//! - **Student progress**: history, reviews and a monthly memorization summary
//! - **Settings** stored per project in `.tahfidz.yml`
//!
//! ## Quick Start
//!
//! ```bash
//! # Initialize a project with the local backend
//! tahfidz init
//!
//! # Add a student and record a memorization entry
//! tahfidz student add "Ahmad" --class pagi
//! tahfidz memorization add --student <id> --chapter Al-Mulk --start 1 --end 10
//!
//! # List morning-class students, second page
//! tahfidz student list -f class=pagi -p 2
//!
//! # Write a memorization report
//! tahfidz export memorization -f status=memorized
//! ```
//!
//! ## Modules
//!
//! - [`cli`]: Command-line interface definitions and handlers
//! - [`config`]: Project settings
//! - [`error`]: Error types and result aliases
//! - [`gateway`]: Data gateway contract, REST and local backends, sessions
//! - [`list`]: Query intents and the list controller
//! - [`model`]: Record and draft types
//! - [`overview`]: Students with their latest memorization and review
//! - [`progress`]: Per-student progress summary
//! - [`report`]: Report export
//! - [`validation`]: Input validation utilities

/// Command-line interface definitions using clap.
pub mod cli;

/// Project settings.
///
/// Handles `.tahfidz.yml` files and project discovery.
pub mod config;

/// Error types and result aliases.
///
/// Defines `TahfidzError` enum and `Result<T>` type alias.
pub mod error;

pub mod gateway;

/// Filtered, sorted, paginated views over one collection.
pub mod list;

pub mod logging;

/// Data models for tahfidz records.
///
/// Includes `Student`, `Teacher`, `MemorizationEntry` and `ReviewEntry`.
pub mod model;

pub mod overview;
pub mod progress;
pub mod report;

/// Input validation utilities.
///
/// Validates names, verse ranges, notes, IDs and dates.
pub mod validation;
