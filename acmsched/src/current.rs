use acmcore::{
    acl::AclChoice,
    transition::ApplyForm,
    workflow::WorkflowParams,
};
use std::sync::Arc;

use crate::{
    error::ScheduleError,
    schedule::RequestToken,
    workflow::ConfigPanel,
};

/// The ACL in force on an entity, with its "apply now" edit state.
#[derive(Clone, Debug, Default)]
pub struct CurrentAcl {
    pub(crate) acl: AclChoice,
    pub(crate) name: String,
    pub(crate) override_: bool,
    pub(crate) managed: bool,
    pub(crate) is_from_series: bool,
    pub(crate) workflow_id: Option<String>,
    pub(crate) workflow_params: Option<WorkflowParams>,
    pub(crate) panel: Option<Arc<ConfigPanel>>,
    pub(crate) saved_acl: AclChoice,
    pub(crate) saved_override: bool,
    pub(crate) saved: bool,
    pub(crate) loading: bool,
    pub(crate) error: Option<ScheduleError>,
    pub(crate) in_flight: Option<RequestToken>,
}

/// An instant apply that has been validated and is waiting to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct ApplyRequest {
    pub token: RequestToken,
    pub form: ApplyForm,
    pub(crate) acl: AclChoice,
    pub(crate) override_: bool,
}

mod impls;
