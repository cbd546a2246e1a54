use acmcore::{
    acl::AclChoice,
    entity::EntityKind,
    error::BackendError,
    transition::{
        iso_date,
        TransitionForm,
        TransitionRecord,
    },
    workflow::{
        decode_params,
        encode_params,
        WorkflowParams,
    },
};
use chrono::{
    DateTime,
    NaiveTime,
    TimeZone,
    Utc,
};
use std::{
    fmt,
    sync::Arc,
};

use crate::{
    error::ScheduleError,
    workflow::ConfigPanel,
};
use super::*;

impl fmt::Display for EntryKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

impl EntryKey {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Midnight (UTC) of the day following `now`.
pub(crate) fn next_midnight(now: DateTime<Utc>) -> DateTime<Utc> {
    let day = now.date_naive();
    let day = day.succ_opt().unwrap_or(day);
    Utc.from_utc_datetime(&day.and_time(NaiveTime::default()))
}

impl ScheduleParams {
    pub(crate) fn from_record(record: &TransitionRecord) -> Self {
        let acl = match record.acl_id() {
            Some(id) => AclChoice::template(id),
            // a transition without ACL removes the episode ACL
            None => AclChoice::InheritSeries,
        };
        let workflow_params = record.workflow_params
            .as_deref()
            .filter(|raw| !raw.is_empty())
            .and_then(|raw| decode_params(raw)
                .map_err(|e| log::warn!(
                    "transition {}: unreadable workflow params: {e}",
                    record.transition_id,
                ))
                .ok()
            );
        Self {
            acl,
            from_date: record.application_date,
            workflow_id: record.workflow_id.clone()
                .filter(|id| !id.is_empty()),
            workflow_params,
            override_: record.override_,
        }
    }
}

impl Schedule {
    pub(crate) fn from_record(
        key: EntryKey,
        record: &TransitionRecord,
        origin: Origin,
    ) -> Self {
        let params = ScheduleParams::from_record(record);
        Self {
            key,
            id: Some(record.transition_id.clone()),
            origin,
            saved_params: params.clone(),
            params,
            is_new: false,
            saved: true,
            loading: false,
            error: None,
            to_delete: false,
            in_flight: None,
            panel: None,
            saved_panel: None,
        }
    }

    /// A new entry dated the next midnight (UTC) after `now`.
    pub(crate) fn blank(
        key: EntryKey,
        acl: AclChoice,
        now: DateTime<Utc>,
    ) -> Self {
        let params = ScheduleParams {
            acl,
            from_date: next_midnight(now),
            workflow_id: None,
            workflow_params: None,
            override_: false,
        };
        Self {
            key,
            id: None,
            origin: Origin::Own,
            saved_params: params.clone(),
            params,
            is_new: true,
            saved: false,
            loading: false,
            error: None,
            to_delete: false,
            in_flight: None,
            panel: None,
            saved_panel: None,
        }
    }

    pub fn key(&self) -> EntryKey {
        self.key
    }

    /// The server id; `None` until the first successful save.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn origin(&self) -> Origin {
        self.origin
    }

    pub fn params(&self) -> &ScheduleParams {
        &self.params
    }

    pub fn saved_params(&self) -> &ScheduleParams {
        &self.saved_params
    }

    pub fn from_date(&self) -> DateTime<Utc> {
        self.params.from_date
    }

    pub fn is_new(&self) -> bool {
        self.is_new
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_read_only(&self) -> bool {
        self.origin == Origin::Series
    }

    pub fn is_to_delete(&self) -> bool {
        self.to_delete
    }

    pub fn error(&self) -> Option<&ScheduleError> {
        self.error.as_ref()
    }

    pub fn in_flight(&self) -> Option<RequestToken> {
        self.in_flight
    }

    pub fn panel(&self) -> Option<&Arc<ConfigPanel>> {
        self.panel.as_ref()
    }

    pub(crate) fn ensure_editable(&self) -> Result<(), ScheduleError> {
        if self.is_read_only() {
            Err(ScheduleError::ReadOnly)
        } else if self.in_flight.is_some() {
            Err(ScheduleError::SaveInProgress)
        } else {
            Ok(())
        }
    }

    /// Applies `f` to the current params, then settles the dirty flag.
    pub(crate) fn edit(
        &mut self,
        f: impl FnOnce(&mut ScheduleParams),
    ) -> Result<(), ScheduleError> {
        self.ensure_editable()?;
        f(&mut self.params);
        self.saved = false;
        self.check_changed();
        Ok(())
    }

    /// Clears the dirty flag of a persisted entry whose tracked fields all
    /// equal the last saved values.
    ///
    /// A new entry stays in the list even when brought back to its initial
    /// values; only `cancel` or a destroy removes it.
    pub fn check_changed(&mut self) -> bool {
        if self.in_flight.is_some() {
            !self.saved
        } else if !self.is_new && self.params == self.saved_params {
            self.rollback();
            false
        } else {
            self.saved = false;
            true
        }
    }

    /// A new entry is flagged for removal; a persisted one rolls back.
    ///
    /// Rejected while a request is in flight, as its outcome is not yet
    /// known.
    pub fn cancel(&mut self) -> Result<(), ScheduleError> {
        if self.is_read_only() {
            return Ok(());
        }
        if self.in_flight.is_some() {
            return Err(ScheduleError::SaveInProgress);
        }
        if self.is_new {
            self.to_delete = true;
        } else {
            self.rollback();
        }
        Ok(())
    }

    fn rollback(&mut self) {
        self.params = self.saved_params.clone();
        self.panel = self.saved_panel.clone();
        self.error = None;
        self.saved = true;
    }

    pub(crate) fn select_workflow(
        &mut self,
        workflow_id: Option<String>,
    ) -> Result<WorkflowSelection, ScheduleError> {
        self.ensure_editable()?;
        let workflow_id = workflow_id.filter(|id| !id.is_empty());
        if workflow_id == self.params.workflow_id {
            return Ok(WorkflowSelection::Unchanged);
        }
        match workflow_id {
            None => {
                self.edit(|params| {
                    params.workflow_id = None;
                    params.workflow_params = None;
                })?;
                self.panel = None;
                Ok(WorkflowSelection::Cleared)
            }
            Some(id) if !self.is_new
                && Some(&id) == self.saved_params.workflow_id.as_ref() =>
            {
                let restored = self.saved_params.workflow_params.clone();
                self.edit(|params| {
                    params.workflow_id = Some(id);
                    params.workflow_params = restored;
                })?;
                self.panel = self.saved_panel.clone();
                Ok(WorkflowSelection::Restored)
            }
            Some(id) => Ok(WorkflowSelection::NeedsPanel(id)),
        }
    }

    /// Switches to the workflow of `panel`, its defaults becoming the
    /// params.
    pub(crate) fn attach_workflow(
        &mut self,
        panel: Arc<ConfigPanel>,
    ) -> Result<(), ScheduleError> {
        let defaults = panel.defaults();
        let id = panel.definition_id().to_string();
        self.edit(|params| {
            params.workflow_id = Some(id);
            params.workflow_params = (!defaults.is_empty()).then_some(defaults);
        })?;
        self.panel = Some(panel);
        Ok(())
    }

    /// Attaches the panel of the already selected workflow, as done while
    /// building the scheduler; absent params take the panel defaults
    /// without making the entry dirty.
    pub(crate) fn adopt_panel(&mut self, panel: Arc<ConfigPanel>) {
        if self.params.workflow_params.is_none() {
            let defaults = panel.defaults();
            if !defaults.is_empty() {
                self.params.workflow_params = Some(defaults.clone());
                if !self.is_new {
                    self.saved_params.workflow_params = Some(defaults);
                }
            }
        }
        if !self.is_new {
            self.saved_panel = Some(panel.clone());
        }
        self.panel = Some(panel);
    }

    pub(crate) fn set_error(&mut self, error: ScheduleError) -> ScheduleError {
        self.error = Some(error.clone());
        error
    }

    /// Validates the entry and marks it as loading under `token`.
    pub(crate) fn prepare_save(
        &mut self,
        kind: EntityKind,
        entity_id: &str,
        can_inherit: bool,
        token: RequestToken,
    ) -> Result<SaveRequest, ScheduleError> {
        self.ensure_editable()?;
        let managed_acl_id = match &self.params.acl {
            AclChoice::Template(id) => Some(Some(id.clone())),
            AclChoice::InheritSeries if can_inherit => Some(None),
            _ => None,
        };
        let Some(managed_acl_id) = managed_acl_id else {
            return Err(self.set_error(ScheduleError::MissingAcl));
        };
        let workflow_definition_id = self.params.workflow_id.clone();
        let workflow_params = match (&workflow_definition_id, &self.params.workflow_params) {
            (Some(_), Some(params)) => encode_params(params),
            _ => Ok(None),
        };
        let workflow_params = match workflow_params {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("{}: cannot encode workflow params: {e}", self.key);
                return Err(self.set_error(ScheduleError::SaveFailed));
            }
        };
        let form = TransitionForm {
            application_date: iso_date(&self.params.from_date),
            managed_acl_id,
            workflow_definition_id,
            workflow_params,
            override_: kind.supports_override().then_some(self.params.override_),
        };
        let target = match &self.id {
            Some(transition_id) => SaveTarget::Update {
                transition_id: transition_id.clone(),
            },
            None => SaveTarget::Create {
                entity_id: entity_id.to_string(),
            },
        };
        self.error = None;
        self.loading = true;
        self.in_flight = Some(token);
        Ok(SaveRequest {
            key: self.key,
            token,
            target,
            form,
            submitted: self.params.clone(),
        })
    }

    /// Applies the outcome of a save; `result` carries the id assigned by
    /// the server on creation.
    pub(crate) fn complete_save(
        &mut self,
        request: SaveRequest,
        result: Result<Option<String>, BackendError>,
    ) -> Result<(), ScheduleError> {
        if self.in_flight != Some(request.token) {
            log::info!("{}: discarding stale save completion", self.key);
            return Err(ScheduleError::Stale);
        }
        self.in_flight = None;
        self.loading = false;
        match result {
            Ok(id) => {
                if let Some(id) = id {
                    self.id = Some(id);
                }
                self.is_new = false;
                self.saved_params = request.submitted;
                self.saved_panel = self.panel.clone();
                self.saved = true;
                self.error = None;
                log::info!("{}: saved transition {:?}", self.key, self.id);
                Ok(())
            }
            Err(e) => {
                log::warn!("{}: save failed: {e}", self.key);
                self.saved = false;
                Err(self.set_error(ScheduleError::from_save(&e)))
            }
        }
    }

    /// `None` when the entry was never persisted; it is then discarded
    /// right away.
    pub(crate) fn prepare_destroy(
        &mut self,
        token: RequestToken,
    ) -> Result<Option<DestroyRequest>, ScheduleError> {
        self.ensure_editable()?;
        match (&self.id, self.is_new) {
            (Some(transition_id), false) => {
                let transition_id = transition_id.clone();
                self.error = None;
                self.loading = true;
                self.in_flight = Some(token);
                Ok(Some(DestroyRequest {
                    key: self.key,
                    token,
                    transition_id,
                }))
            }
            _ => {
                self.to_delete = true;
                Ok(None)
            }
        }
    }

    pub(crate) fn complete_destroy(
        &mut self,
        request: DestroyRequest,
        result: Result<(), BackendError>,
    ) -> Result<(), ScheduleError> {
        if self.in_flight != Some(request.token) {
            log::info!("{}: discarding stale delete completion", self.key);
            return Err(ScheduleError::Stale);
        }
        self.in_flight = None;
        self.loading = false;
        match result {
            Ok(()) => {
                self.to_delete = true;
                log::info!("{}: deleted transition {}", self.key, request.transition_id);
                Ok(())
            }
            Err(e) => {
                log::warn!("{}: delete failed: {e}", self.key);
                Err(self.set_error(ScheduleError::DestroyFailed))
            }
        }
    }

    pub(crate) fn set_workflow_params(
        &mut self,
        params: WorkflowParams,
    ) -> Result<(), ScheduleError> {
        if self.params.workflow_id.is_none() {
            return Err(ScheduleError::NoWorkflow);
        }
        self.edit(|p| p.workflow_params = Some(params))
    }
}
