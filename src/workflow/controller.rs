//! Label workflow controller implementation
//!
//! This module implements the controller that coordinates one image's label
//! generation, label editing and submission against the service.

use crate::api::LabelApi;
use crate::error::{ErrorKind, Result, SnapLabelError, get_user_friendly_error};
use crate::navigation::{Notice, View};
use crate::session::SessionStore;
use crate::utils::validation::is_accepted_image_type;
use crate::workflow::file::ImageFile;
use crate::workflow::label_set::{Label, LabelId, LabelOrigin, LabelSet};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Network step of the workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowAction {
    /// Label generation (`request_labels`)
    GenerateLabels,
    /// Final submission (`submit`)
    Submit,
}

impl WorkflowAction {
    fn failure_message(self) -> &'static str {
        match self {
            Self::GenerateLabels => "An error occurred while generating labels.",
            Self::Submit => "An error occurred while submitting the data.",
        }
    }
}

/// Why a request failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailureCause {
    /// Classification of the failure
    pub kind: ErrorKind,
    /// Message suitable for showing to the user
    pub message: String,
    /// Underlying error text for logs and diagnostics
    pub detail: String,
}

/// Current step of the workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for a file to be submitted for labeling
    Idle,
    /// Label generation request in flight
    AwaitingLabels,
    /// Labels available for editing and submission
    LabelsReady,
    /// Submission request in flight
    Submitting,
    /// Submission succeeded; the controller resets to `Idle` right after
    Submitted,
    /// A request failed; `action` may be retried
    Failed {
        /// Step that failed
        action: WorkflowAction,
        /// Classified cause
        cause: FailureCause,
    },
}

impl Phase {
    /// Whether a network request is outstanding
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::AwaitingLabels | Self::Submitting)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("idle"),
            Self::AwaitingLabels => f.write_str("awaiting labels"),
            Self::LabelsReady => f.write_str("labels ready"),
            Self::Submitting => f.write_str("submitting"),
            Self::Submitted => f.write_str("submitted"),
            Self::Failed { .. } => f.write_str("failed"),
        }
    }
}

/// Snapshot of the workflow's data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowState {
    /// File chosen for labeling
    pub selected_file: Option<ImageFile>,
    /// Image id assigned by the service after label generation
    pub image_id: Option<String>,
    /// Active labels
    pub labels: LabelSet,
    /// Current phase
    pub phase: Phase,
}

impl Default for WorkflowState {
    fn default() -> Self {
        Self {
            selected_file: None,
            image_id: None,
            labels: LabelSet::new(),
            phase: Phase::Idle,
        }
    }
}

/// Output signals for the front end
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkflowEvent {
    /// The phase changed
    PhaseChanged(Phase),
    /// A message to show the user
    Notice(Notice),
    /// The front end should move to another view
    Navigate(View),
    /// The service rejected the session token; the owner of the session
    /// should clear it and send the user to login
    SessionRejected,
}

struct Inner {
    state: WorkflowState,
    /// Bumped on every reset so that responses to abandoned requests are dropped
    epoch: u64,
}

/// Label workflow controller
///
/// Methods take `&self` so that a controller shared behind an `Arc` can be
/// observed (`phase`, `snapshot`) while a request is in flight. The state lock
/// is never held across a network call.
pub struct LabelWorkflow {
    api: Arc<dyn LabelApi>,
    session: Arc<dyn SessionStore>,
    inner: Mutex<Inner>,
    events: mpsc::UnboundedSender<WorkflowEvent>,
}

impl LabelWorkflow {
    /// Create a controller in the `Idle` phase
    pub fn new(
        api: Arc<dyn LabelApi>,
        session: Arc<dyn SessionStore>,
        events: mpsc::UnboundedSender<WorkflowEvent>,
    ) -> Self {
        Self {
            api,
            session,
            inner: Mutex::new(Inner {
                state: WorkflowState::default(),
                epoch: 0,
            }),
            events,
        }
    }

    /// Current phase
    pub fn phase(&self) -> Phase {
        self.inner.lock().state.phase.clone()
    }

    /// Copy of the full workflow state
    pub fn snapshot(&self) -> WorkflowState {
        self.inner.lock().state.clone()
    }

    /// Image id assigned by the service, if labels have been generated
    pub fn image_id(&self) -> Option<String> {
        self.inner.lock().state.image_id.clone()
    }

    /// Copy of the current label set
    pub fn labels(&self) -> LabelSet {
        self.inner.lock().state.labels.clone()
    }

    /// Validate `file` and request AI labels for it
    ///
    /// Allowed from `Idle`, or from `Failed` after a generation failure.
    /// Invalid files are rejected before any phase change or network call.
    pub async fn request_labels(&self, file: ImageFile) -> Result<()> {
        if let Err(e) = validate_file(&file) {
            warn!("Rejected file {}: {}", file.name(), e);
            self.emit(WorkflowEvent::Notice(Notice::error(get_user_friendly_error(&e))));
            return Err(e);
        }

        let epoch = {
            let mut inner = self.inner.lock();
            let phase = &inner.state.phase;
            if phase.is_in_flight() {
                return Err(SnapLabelError::RequestInFlight);
            }
            let allowed = matches!(
                phase,
                Phase::Idle
                    | Phase::Failed {
                        action: WorkflowAction::GenerateLabels,
                        ..
                    }
            );
            if !allowed {
                return Err(SnapLabelError::InvalidPhase {
                    operation: "request labels",
                    phase: phase.to_string(),
                });
            }

            inner.state.selected_file = Some(file.clone());
            inner.state.phase = Phase::AwaitingLabels;
            inner.epoch
        };
        info!("Requesting labels for {}", file.name());
        self.emit(WorkflowEvent::PhaseChanged(Phase::AwaitingLabels));

        let token = self.session.get_token();
        let result = self.api.generate_labels(&file, token.as_deref()).await;

        match result {
            Ok(generated) => {
                {
                    let mut inner = self.inner.lock();
                    if inner.epoch != epoch {
                        debug!("Workflow was reset while generating labels; dropping response");
                        return Ok(());
                    }
                    inner.state.labels.set_ai_labels(generated.labels);
                    inner.state.image_id = Some(generated.image_id);
                    inner.state.phase = Phase::LabelsReady;
                }
                info!("Labels ready");
                self.emit(WorkflowEvent::PhaseChanged(Phase::LabelsReady));
                self.emit(WorkflowEvent::Notice(Notice::success(
                    "Labels generated successfully",
                )));
                Ok(())
            }
            Err(e) => Err(self.fail(epoch, WorkflowAction::GenerateLabels, e)),
        }
    }

    /// Submit the image id and every active label
    ///
    /// Allowed from `LabelsReady`, or from `Failed` after a submission
    /// failure. On success the controller signals navigation to search and
    /// resets to `Idle`.
    pub async fn submit(&self) -> Result<()> {
        let (epoch, image_id, final_labels) = {
            let mut inner = self.inner.lock();
            let phase = &inner.state.phase;
            if phase.is_in_flight() {
                return Err(SnapLabelError::RequestInFlight);
            }
            let allowed = matches!(
                phase,
                Phase::LabelsReady
                    | Phase::Failed {
                        action: WorkflowAction::Submit,
                        ..
                    }
            );
            if !allowed {
                return Err(SnapLabelError::InvalidPhase {
                    operation: "submit",
                    phase: phase.to_string(),
                });
            }
            if inner.state.selected_file.is_none() {
                return Err(SnapLabelError::NoFileSelected);
            }
            let image_id = inner
                .state
                .image_id
                .clone()
                .ok_or(SnapLabelError::MissingImageId)?;

            inner.state.phase = Phase::Submitting;
            (inner.epoch, image_id, inner.state.labels.final_labels())
        };
        info!(
            "Submitting {} labels for image {}",
            final_labels.len(),
            image_id
        );
        self.emit(WorkflowEvent::PhaseChanged(Phase::Submitting));

        let token = self.session.get_token();
        let result = self
            .api
            .submit_labels(&image_id, &final_labels, token.as_deref())
            .await;

        match result {
            Ok(()) => {
                {
                    let mut inner = self.inner.lock();
                    if inner.epoch != epoch {
                        debug!("Workflow was reset while submitting; dropping response");
                        return Ok(());
                    }
                    inner.state.phase = Phase::Submitted;
                }
                info!("Image {} submitted", image_id);
                self.emit(WorkflowEvent::PhaseChanged(Phase::Submitted));
                self.emit(WorkflowEvent::Notice(Notice::success(
                    "Data submitted successfully",
                )));
                self.emit(WorkflowEvent::Navigate(View::Search));
                self.reset();
                Ok(())
            }
            Err(e) => Err(self.fail(epoch, WorkflowAction::Submit, e)),
        }
    }

    /// Re-run the step that failed
    pub async fn retry(&self) -> Result<()> {
        let (action, file) = {
            let inner = self.inner.lock();
            match &inner.state.phase {
                Phase::Failed { action, .. } => (*action, inner.state.selected_file.clone()),
                phase => {
                    return Err(SnapLabelError::InvalidPhase {
                        operation: "retry",
                        phase: phase.to_string(),
                    });
                }
            }
        };

        info!("Retrying {:?}", action);
        match action {
            WorkflowAction::GenerateLabels => {
                let file = file.ok_or(SnapLabelError::NoFileSelected)?;
                self.request_labels(file).await
            }
            WorkflowAction::Submit => self.submit().await,
        }
    }

    /// Append a custom label
    ///
    /// Blank text is a no-op and returns `Ok(None)`. Allowed while labels are
    /// ready or after a failed submission.
    pub fn add_custom_label(&self, text: &str) -> Result<Option<LabelId>> {
        let mut inner = self.inner.lock();
        let editable = matches!(
            inner.state.phase,
            Phase::LabelsReady
                | Phase::Failed {
                    action: WorkflowAction::Submit,
                    ..
                }
        );
        if !editable {
            return Err(SnapLabelError::InvalidPhase {
                operation: "add a label",
                phase: inner.state.phase.to_string(),
            });
        }

        let id = inner.state.labels.add_custom(text);
        match id {
            Some(id) => debug!("Added custom label {} ({})", id, text.trim()),
            None => debug!("Ignoring blank custom label"),
        }
        Ok(id)
    }

    /// Remove a label from the collection matching `origin`
    ///
    /// Returns the removed label, or `None` if no label matched. Never issues
    /// a request.
    pub fn remove_label(&self, id: LabelId, origin: LabelOrigin) -> Option<Label> {
        let removed = self.inner.lock().state.labels.remove(id, origin);
        if let Some(label) = &removed {
            debug!("Removed {} label {} ({})", origin, id, label.text);
        }
        removed
    }

    /// Discard all state and return to `Idle`
    ///
    /// A response to a request that was in flight at reset time is ignored.
    pub fn reset(&self) {
        {
            let mut inner = self.inner.lock();
            inner.state = WorkflowState::default();
            inner.epoch += 1;
        }
        debug!("Workflow reset");
        self.emit(WorkflowEvent::PhaseChanged(Phase::Idle));
    }

    /// Record a failed request and return the error to the caller
    fn fail(&self, epoch: u64, action: WorkflowAction, e: SnapLabelError) -> SnapLabelError {
        let kind = e.kind();
        let message = if kind == ErrorKind::Auth {
            get_user_friendly_error(&e)
        } else {
            action.failure_message().to_string()
        };
        let cause = FailureCause {
            kind,
            message: message.clone(),
            detail: e.to_string(),
        };

        {
            let mut inner = self.inner.lock();
            if inner.epoch != epoch {
                debug!("Workflow was reset before {:?} failed: {}", action, e);
                return e;
            }
            inner.state.phase = Phase::Failed {
                action,
                cause: cause.clone(),
            };
        }
        error!("{:?} failed ({:?}): {}", action, kind, e);

        self.emit(WorkflowEvent::PhaseChanged(Phase::Failed { action, cause }));
        if kind == ErrorKind::Auth {
            self.emit(WorkflowEvent::SessionRejected);
        }
        self.emit(WorkflowEvent::Notice(Notice::error(message)));
        e
    }

    fn emit(&self, event: WorkflowEvent) {
        if let Err(e) = self.events.send(event) {
            debug!("No listener for workflow event: {:?}", e.0);
        }
    }
}

fn validate_file(file: &ImageFile) -> Result<()> {
    if !is_accepted_image_type(file.content_type()) {
        return Err(SnapLabelError::UnsupportedFileType(
            file.content_type().to_string(),
        ));
    }
    if file.is_empty() {
        return Err(SnapLabelError::EmptyFile(file.name().to_string()));
    }
    Ok(())
}
