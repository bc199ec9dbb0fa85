//! Core of the VCS path mapping widget of the build server admin page.
//!
//! The user picks a build configuration, the server's mapping for it is
//! fetched into an editable table, and the table is serialized into the
//! hidden `from=to` form field. [`services::preview::recompute`] holds the
//! duplicate-path rule; the rest is the state the page renders.

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod parsers;
pub mod protocol;
pub mod services;
pub mod view;

pub use error::MappingError;
