//! Label workflow module
//!
//! This module drives one image from file selection to a submitted label set.
//!
//! # Overview
//!
//! The workflow controller is a small state machine that:
//! - **Validates the selected file** locally (non-empty, JPEG or PNG)
//! - **Requests AI labels** from the service and records the assigned image id
//! - **Maintains the label set** while the user adds and removes labels
//! - **Submits the final labels** and resets itself for the next image
//! - **Emits events** (phase changes, notices, navigation) for the front end
//!
//! # Phases
//!
//! ```text
//!            request_labels            success
//!   Idle ────────────────> AwaitingLabels ──────> LabelsReady
//!    ^                          │                   │  ^
//!    │                   failure│            submit │  │ add / remove labels
//!    │                          v                   v  │
//!    │                       Failed <──────────── Submitting
//!    │                     (retry re-enters        │
//!    │                      the failed step)       │ success
//!    └──────────────────── Submitted <─────────────┘
//! ```
//!
//! Only one request is ever in flight per controller: `request_labels` and
//! `submit` are rejected while the phase is `AwaitingLabels` or `Submitting`.
//! Every failed request lands in `Failed` with a classified cause.

pub mod controller;
pub mod file;
pub mod label_set;

pub use controller::{
    FailureCause, LabelWorkflow, Phase, WorkflowAction, WorkflowEvent, WorkflowState,
};
pub use file::ImageFile;
pub use label_set::{Label, LabelId, LabelOrigin, LabelSet};
