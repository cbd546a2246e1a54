use acmcore::{
    entity::EntityKind,
    workflow::WorkflowParams,
};
use chrono::{
    DateTime,
    Utc,
};

use crate::schedule::EntryKey;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Snapshot of one transition for display.
#[derive(Clone, Debug, PartialEq)]
pub struct ScheduleView {
    pub key: EntryKey,
    pub id: Option<String>,
    pub acl: String,
    pub from_date: DateTime<Utc>,
    pub workflow_id: Option<String>,
    pub workflow_params: Option<WorkflowParams>,
    /// `None` where override does not apply.
    pub override_: Option<bool>,
    pub is_new: bool,
    pub saved: bool,
    pub loading: bool,
    pub read_only: bool,
    /// The transition presumably in effect.
    pub current: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CurrentAclView {
    pub acl: String,
    pub name: String,
    pub managed: bool,
    pub is_from_series: bool,
    pub override_: Option<bool>,
    pub override_enabled: bool,
    pub workflow_id: Option<String>,
    pub saved: bool,
    pub loading: bool,
    pub error: Option<String>,
    pub acl_options: Vec<SelectOption>,
}

/// Everything needed to display one scheduler: the current ACL first,
/// then the transitions in date order.
#[derive(Clone, Debug, PartialEq)]
pub struct SchedulerView {
    pub kind: EntityKind,
    pub entity_id: String,
    pub collapsed: bool,
    pub current: CurrentAclView,
    pub schedules: Vec<ScheduleView>,
    pub acl_options: Vec<SelectOption>,
    pub workflow_options: Vec<SelectOption>,
}
