use acmcore::{
    acl::AclChoice,
    transition::TransitionForm,
    workflow::WorkflowParams,
};
use chrono::{
    DateTime,
    Utc,
};
use std::sync::Arc;

use crate::{
    error::ScheduleError,
    workflow::ConfigPanel,
};

/// Stable identifier of an entry for the lifetime of a page.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct EntryKey(pub(crate) u64);

/// Identifies one issued request; a completion is only applied when it
/// carries the token the entry is waiting for.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct RequestToken(pub(crate) u64);

/// Where a transition shown on a scheduler comes from.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Origin {
    /// Belongs to the entity of the scheduler.
    #[default]
    Own,
    /// A series transition with override, shown on its episodes; read-only.
    Series,
}

/// The tracked fields of a transition.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleParams {
    pub acl: AclChoice,
    pub from_date: DateTime<Utc>,
    pub workflow_id: Option<String>,
    pub workflow_params: Option<WorkflowParams>,
    /// Only meaningful for series.
    pub override_: bool,
}

/// One scheduled ACL transition and its edit state.
///
/// A schedule is `new` until the first successful save, `saved` when the
/// current params equal the last persisted snapshot and dirty otherwise.
#[derive(Clone, Debug)]
pub struct Schedule {
    pub(crate) key: EntryKey,
    pub(crate) id: Option<String>,
    pub(crate) origin: Origin,
    pub(crate) params: ScheduleParams,
    pub(crate) saved_params: ScheduleParams,
    pub(crate) is_new: bool,
    pub(crate) saved: bool,
    pub(crate) loading: bool,
    pub(crate) error: Option<ScheduleError>,
    pub(crate) to_delete: bool,
    pub(crate) in_flight: Option<RequestToken>,
    pub(crate) panel: Option<Arc<ConfigPanel>>,
    pub(crate) saved_panel: Option<Arc<ConfigPanel>>,
}

/// Whether a save creates a transition or updates an existing one.
#[derive(Clone, Debug, PartialEq)]
pub enum SaveTarget {
    /// POST against the entity.
    Create { entity_id: String },
    /// PUT against the transition.
    Update { transition_id: String },
}

/// A save that has been validated and is waiting to be sent.
#[derive(Clone, Debug, PartialEq)]
pub struct SaveRequest {
    pub key: EntryKey,
    pub token: RequestToken,
    pub target: SaveTarget,
    pub form: TransitionForm,
    pub(crate) submitted: ScheduleParams,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DestroyRequest {
    pub key: EntryKey,
    pub token: RequestToken,
    pub transition_id: String,
}

/// Outcome of selecting a workflow on a schedule.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum WorkflowSelection {
    Unchanged,
    /// The saved workflow was selected again, its params are back.
    Restored,
    Cleared,
    /// A different workflow; its panel has to be attached.
    NeedsPanel(String),
}

mod impls;
