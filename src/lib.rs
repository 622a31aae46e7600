//! `SnapLabel` - client for an AI image labeling and search service
//!
//! Users log in, upload an image to receive AI-generated labels, edit the
//! label set, submit it, and later search their labeled images. The label
//! workflow is a phase-driven state machine (`LabelWorkflow`) coordinating
//! two asynchronous service calls; everything else is thin glue around the
//! service API.
//!
//! # Layout
//!
//! - [`api`]: service operations and the `reqwest` gateway
//! - [`workflow`]: the label workflow controller and label set
//! - [`auth`]: login, registration and confirmation flows
//! - [`search`]: image search with the stored session
//! - [`session`]: session token storage
//! - [`config`]: persisted client configuration
//! - [`navigation`]: views and notices emitted to the front end

// Module declarations
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod navigation;
pub mod search;
pub mod session;
pub mod utils;
pub mod workflow;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use error::{Result, SnapLabelError};
