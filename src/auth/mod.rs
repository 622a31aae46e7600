//! Account flows
//!
//! Login, registration and one-time-code confirmation on top of
//! [`AccountApi`](crate::api::AccountApi). Each flow validates its input
//! locally, calls the service, and reports an [`AuthOutcome`] naming the view
//! to show next.

pub mod flow;

pub use flow::{AccountFlow, AuthOutcome, RegistrationForm};
