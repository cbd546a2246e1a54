use acmcore::error::BackendError;
use http::StatusCode;
use thiserror::Error;

use crate::schedule::EntryKey;

/// Failures of the scheduler components.
///
/// The `Display` output is the message shown next to the affected row.
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ScheduleError {
    #[error("Can not save a transition without ACL!")]
    MissingAcl,
    #[error("Can not apply a transition without ACL!")]
    MissingApplyAcl,
    #[error("Not able to save this transition, workflow definition or acl is incorrect!")]
    BadRequest,
    #[error("There is already a transition with this start date!")]
    Conflict,
    #[error("Not able to save the transition")]
    SaveFailed,
    #[error("Not able to apply the transition")]
    ApplyFailed,
    #[error("Not able to destroy the transition")]
    DestroyFailed,
    #[error("A save is already in progress")]
    SaveInProgress,
    #[error("Transitions inherited from the series can not be changed here")]
    ReadOnly,
    #[error("Outdated response discarded")]
    Stale,
    #[error("No workflow selected")]
    NoWorkflow,
    #[error("Not able to load the workflow configuration")]
    WorkflowConfig,
    #[error("No such entry: {0}")]
    NoSuchEntry(EntryKey),
    #[error("Not supported for this entity: {0}")]
    Unsupported(&'static str),
}

impl ScheduleError {
    pub(crate) fn from_save(e: &BackendError) -> Self {
        match e.status() {
            Some(StatusCode::BAD_REQUEST) => Self::BadRequest,
            Some(StatusCode::CONFLICT) => Self::Conflict,
            _ => Self::SaveFailed,
        }
    }

    pub(crate) fn from_apply(e: &BackendError) -> Self {
        match e.status() {
            Some(StatusCode::CONFLICT) => Self::Conflict,
            _ => Self::ApplyFailed,
        }
    }
}
