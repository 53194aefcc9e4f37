//! Local web server for the review form.

pub mod app;
pub mod error;
pub mod handlers;
pub mod state;
