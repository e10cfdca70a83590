//! Student records and marks, driven against the school REST backend.
//!
//! The directory and marks screens live here as headless views: they own
//! the state and the operations, and hand out snapshots for whatever draws
//! them. Toasts and confirmation dialogs go through [`feedback`].

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod feedback;
pub mod id;
pub mod marks;
pub mod routes;
pub mod students;
pub mod telemetry;

pub use app::{App, View};
pub use error::ApiError;
pub use id::RecordId;
pub use routes::Route;
