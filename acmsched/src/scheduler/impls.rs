use acmcore::{
    acl::{
        AclChoice,
        ActiveAclRecord,
    },
    entity::EntityKind,
    error::BackendError,
    transition::{
        TransitionRecord,
        TransitionsFor,
    },
    workflow::WorkflowParams,
};
use chrono::{
    DateTime,
    Utc,
};

use crate::{
    current::ApplyRequest,
    error::ScheduleError,
    schedule::{
        DestroyRequest,
        EntryKey,
        Origin,
        SaveRequest,
        SaveTarget,
        WorkflowSelection,
    },
    view::{
        CurrentAclView,
        ScheduleView,
        SchedulerView,
    },
    workflow::WorkflowConfigDialog,
};
use super::*;

impl Scheduler {
    /// Builds the scheduler of `row` from the batched transitions; without
    /// data for the row only the current ACL is shown.
    pub async fn init(platform: Platform, row: EntityRow, data: &TransitionsFor) -> Self {
        let entity = data.get(row.kind, &row.id);
        let active = entity
            .map(|entity| CurrentAcl::from_record(&entity.active_acl))
            .unwrap_or_else(|| CurrentAcl::from_record(&ActiveAclRecord::default()));
        let mut schedules: Vec<Schedule> = entity
            .map(|entity| entity.transitions.iter()
                .map(|record| Schedule::from_record(platform.next_key(), record, Origin::Own))
                .collect())
            .unwrap_or_default();
        if let (EntityKind::Episode, Some(series_id)) = (row.kind, row.series_id.as_deref()) {
            if let Some(series) = data.get(EntityKind::Series, series_id) {
                schedules.extend(series.transitions.iter()
                    .filter(|record| record.override_)
                    .map(|record| Schedule::from_record(platform.next_key(), record, Origin::Series)));
            }
        }
        for entry in schedules.iter_mut() {
            let Some(workflow_id) = entry.params.workflow_id.clone() else {
                continue;
            };
            match platform.configuration_panel(&workflow_id).await {
                Ok(panel) => entry.adopt_panel(panel),
                Err(e) => log::warn!(
                    "{} {}: no configuration panel for {workflow_id}: {e}",
                    row.kind,
                    row.id,
                ),
            }
        }
        log::debug!(
            "{} {}: {} transition(s)",
            row.kind,
            row.id,
            schedules.len(),
        );
        let mut result = Self {
            platform,
            row,
            active,
            schedules,
            collapsed: true,
        };
        result.resort();
        result
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn row(&self) -> &EntityRow {
        &self.row
    }

    pub fn kind(&self) -> EntityKind {
        self.row.kind
    }

    pub fn entity_id(&self) -> &str {
        &self.row.id
    }

    pub fn current_acl(&self) -> &CurrentAcl {
        &self.active
    }

    /// The transitions in date order.
    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    pub fn schedule(&self, key: EntryKey) -> Option<&Schedule> {
        self.schedules.iter().find(|entry| entry.key == key)
    }

    pub fn is_collapsed(&self) -> bool {
        self.collapsed
    }

    pub(crate) fn set_collapsed(&mut self, value: bool) {
        self.collapsed = value;
    }

    fn entry_mut(&mut self, key: EntryKey) -> Result<&mut Schedule, ScheduleError> {
        self.schedules.iter_mut()
            .find(|entry| entry.key == key)
            .ok_or(ScheduleError::NoSuchEntry(key))
    }

    /// Drops entries flagged for removal and restores date order.
    fn resort(&mut self) {
        self.schedules.retain(|entry| !entry.to_delete);
        self.schedules.sort_by_key(|entry| entry.params.from_date);
    }

    /// Adds a transition; without a record, a new blank entry dated the
    /// next midnight with the first available ACL template.
    pub fn insert_schedule(&mut self, record: Option<TransitionRecord>) -> EntryKey {
        self.insert_schedule_at(record, Utc::now())
    }

    pub fn insert_schedule_at(
        &mut self,
        record: Option<TransitionRecord>,
        now: DateTime<Utc>,
    ) -> EntryKey {
        let key = self.platform.next_key();
        let entry = match record {
            Some(record) => Schedule::from_record(key, &record, Origin::Own),
            None => {
                let acl = self.platform.acl_templates_cached()
                    .first()
                    .map(|acl| AclChoice::template(acl.id.as_str()))
                    .unwrap_or_default();
                Schedule::blank(key, acl, now)
            }
        };
        self.schedules.push(entry);
        self.resort();
        key
    }

    pub fn remove_schedule(&mut self, key: EntryKey) -> Option<Schedule> {
        let idx = self.schedules.iter().position(|entry| entry.key == key)?;
        let result = self.schedules.remove(idx);
        self.resort();
        Some(result)
    }

    /// Flips the collapsed flag, or sets it when a value is given.
    pub fn toggle(&mut self, collapse: Option<bool>) -> bool {
        self.collapsed = collapse.unwrap_or(!self.collapsed);
        self.collapsed
    }

    /// The latest transition dated before `now`, the one presumably in
    /// effect.
    pub fn current_schedule(&self, now: DateTime<Utc>) -> Option<&Schedule> {
        self.schedules.iter()
            .filter(|entry| entry.params.from_date < now)
            .max_by_key(|entry| entry.params.from_date)
    }

    pub fn draw(&mut self) -> SchedulerView {
        self.draw_at(Utc::now())
    }

    pub fn draw_at(&mut self, now: DateTime<Utc>) -> SchedulerView {
        self.resort();
        let kind = self.row.kind;
        let current_key = self.current_schedule(now).map(|entry| entry.key);
        let schedules = self.schedules.iter()
            .map(|entry| ScheduleView {
                key: entry.key,
                id: entry.id.clone(),
                acl: entry.params.acl.to_string(),
                from_date: entry.params.from_date,
                workflow_id: entry.params.workflow_id.clone(),
                workflow_params: entry.params.workflow_params.clone(),
                override_: kind.supports_override().then_some(entry.params.override_),
                is_new: entry.is_new,
                saved: entry.saved,
                loading: entry.loading,
                read_only: entry.is_read_only(),
                current: Some(entry.key) == current_key,
                error: entry.error.as_ref().map(ToString::to_string),
            })
            .collect();
        let active = &self.active;
        let current = CurrentAclView {
            acl: active.acl.to_string(),
            name: active.name.clone(),
            managed: active.managed,
            is_from_series: active.is_from_series,
            override_: kind.supports_override().then_some(active.override_),
            override_enabled: active.override_enabled(),
            workflow_id: active.workflow_id.clone(),
            saved: active.saved,
            loading: active.loading,
            error: active.error.as_ref().map(ToString::to_string),
            acl_options: self.platform.acl_options(
                self.row.can_inherit() && !active.is_from_series
            ),
        };
        SchedulerView {
            kind,
            entity_id: self.row.id.clone(),
            collapsed: self.collapsed,
            current,
            schedules,
            acl_options: self.platform.acl_options(self.row.can_inherit()),
            workflow_options: self.platform.workflow_options(),
        }
    }
}

// Transition edits.
impl Scheduler {
    pub fn change_acl(
        &mut self,
        key: EntryKey,
        acl: AclChoice,
    ) -> Result<(), ScheduleError> {
        self.entry_mut(key)?
            .edit(|params| params.acl = acl)
    }

    pub fn change_from_date(
        &mut self,
        key: EntryKey,
        from_date: DateTime<Utc>,
    ) -> Result<(), ScheduleError> {
        self.entry_mut(key)?
            .edit(|params| params.from_date = from_date)?;
        self.resort();
        Ok(())
    }

    pub fn change_override(
        &mut self,
        key: EntryKey,
        value: bool,
    ) -> Result<(), ScheduleError> {
        if !self.row.kind.supports_override() {
            return Err(ScheduleError::Unsupported("override"));
        }
        self.entry_mut(key)?
            .edit(|params| params.override_ = value)
    }

    /// Selects the workflow started by the transition; the panel of a
    /// newly chosen workflow is loaded and supplies the default params.
    pub async fn change_workflow(
        &mut self,
        key: EntryKey,
        workflow_id: Option<String>,
    ) -> Result<(), ScheduleError> {
        let platform = self.platform.clone();
        let entry = self.entry_mut(key)?;
        let WorkflowSelection::NeedsPanel(workflow_id) = entry.select_workflow(workflow_id)? else {
            return Ok(());
        };
        match platform.configuration_panel(&workflow_id).await {
            Ok(panel) => entry.attach_workflow(panel),
            Err(e) => {
                log::warn!("{key}: no configuration panel for {workflow_id}: {e}");
                Err(entry.set_error(ScheduleError::WorkflowConfig))
            }
        }
    }

    pub fn set_workflow_params(
        &mut self,
        key: EntryKey,
        params: WorkflowParams,
    ) -> Result<(), ScheduleError> {
        self.entry_mut(key)?
            .set_workflow_params(params)
    }

    /// Whether the entry still differs from what was last saved.
    pub fn check_changed(&mut self, key: EntryKey) -> Result<bool, ScheduleError> {
        Ok(self.entry_mut(key)?.check_changed())
    }

    pub fn cancel(&mut self, key: EntryKey) -> Result<(), ScheduleError> {
        self.entry_mut(key)?.cancel()?;
        self.resort();
        Ok(())
    }

    pub async fn open_workflow_config(
        &mut self,
        key: EntryKey,
    ) -> Result<WorkflowConfigDialog, ScheduleError> {
        let platform = self.platform.clone();
        let entry = self.entry_mut(key)?;
        entry.ensure_editable()?;
        let workflow_id = entry.params.workflow_id.clone()
            .ok_or(ScheduleError::NoWorkflow)?;
        let panel = match entry.panel.clone() {
            Some(panel) => panel,
            None => {
                let panel = platform.configuration_panel(&workflow_id).await
                    .map_err(|e| {
                        log::warn!("{key}: no configuration panel for {workflow_id}: {e}");
                        entry.set_error(ScheduleError::WorkflowConfig)
                    })?;
                entry.panel = Some(panel.clone());
                panel
            }
        };
        Ok(WorkflowConfigDialog::new(key, panel, entry.params.workflow_params.clone()))
    }

    /// Commits the params of the dialog to its entry, or discards them.
    pub fn close_workflow_config(
        &mut self,
        dialog: WorkflowConfigDialog,
        commit: bool,
    ) -> Result<(), ScheduleError> {
        let (key, params) = dialog.into_parts();
        if commit {
            self.set_workflow_params(key, params)
        } else {
            self.entry_mut(key).map(|_| ())
        }
    }
}

// Persistence of transitions.
impl Scheduler {
    pub fn begin_save(&mut self, key: EntryKey) -> Result<SaveRequest, ScheduleError> {
        let token = self.platform.next_token();
        let kind = self.row.kind;
        let can_inherit = self.row.can_inherit();
        let entity_id = self.row.id.clone();
        self.entry_mut(key)?
            .prepare_save(kind, &entity_id, can_inherit, token)
    }

    /// Sends a save; a creation answers the id of the new transition.
    pub async fn send_save(
        &self,
        request: &SaveRequest,
    ) -> Result<Option<String>, BackendError> {
        let backend = self.platform.backend();
        match &request.target {
            SaveTarget::Create { entity_id } => backend
                .add_transition(self.row.kind, entity_id, &request.form)
                .await
                .map(Some),
            SaveTarget::Update { transition_id } => backend
                .update_transition(self.row.kind, transition_id, &request.form)
                .await
                .map(|()| None),
        }
    }

    pub fn complete_save(
        &mut self,
        request: SaveRequest,
        result: Result<Option<String>, BackendError>,
    ) -> Result<(), ScheduleError> {
        let Ok(entry) = self.entry_mut(request.key) else {
            log::info!("{}: entry is gone, discarding save completion", request.key);
            return Err(ScheduleError::Stale);
        };
        let result = entry.complete_save(request, result);
        self.resort();
        result
    }

    /// Persists the entry: creates it when new, updates it otherwise.
    pub async fn save(&mut self, key: EntryKey) -> Result<(), ScheduleError> {
        let request = self.begin_save(key)?;
        let result = self.send_save(&request).await;
        self.complete_save(request, result)
    }

    /// `None` when the entry was only local and has been discarded.
    pub fn begin_destroy(
        &mut self,
        key: EntryKey,
    ) -> Result<Option<DestroyRequest>, ScheduleError> {
        let token = self.platform.next_token();
        let result = self.entry_mut(key)?.prepare_destroy(token)?;
        if result.is_none() {
            self.resort();
        }
        Ok(result)
    }

    pub async fn send_destroy(&self, request: &DestroyRequest) -> Result<(), BackendError> {
        self.platform.backend()
            .delete_transition(self.row.kind, &request.transition_id)
            .await
    }

    pub fn complete_destroy(
        &mut self,
        request: DestroyRequest,
        result: Result<(), BackendError>,
    ) -> Result<(), ScheduleError> {
        let Ok(entry) = self.entry_mut(request.key) else {
            log::info!("{}: entry is gone, discarding delete completion", request.key);
            return Err(ScheduleError::Stale);
        };
        let result = entry.complete_destroy(request, result);
        self.resort();
        result
    }

    /// Removes the entry, deleting it on the server when it was persisted.
    pub async fn destroy(&mut self, key: EntryKey) -> Result<(), ScheduleError> {
        let Some(request) = self.begin_destroy(key)? else {
            return Ok(());
        };
        let result = self.send_destroy(&request).await;
        self.complete_destroy(request, result)
    }
}

// The current ACL.
impl Scheduler {
    pub fn change_current_acl(&mut self, acl: AclChoice) -> Result<(), ScheduleError> {
        self.active.change_acl(acl)
    }

    pub fn change_current_override(&mut self, value: bool) -> Result<(), ScheduleError> {
        if !self.row.kind.supports_override() {
            return Err(ScheduleError::Unsupported("override"));
        }
        self.active.change_override(value)
    }

    pub async fn change_current_workflow(
        &mut self,
        workflow_id: Option<String>,
    ) -> Result<(), ScheduleError> {
        let panel = match workflow_id.filter(|id| !id.is_empty()) {
            Some(workflow_id) => {
                let panel = self.platform.configuration_panel(&workflow_id).await
                    .map_err(|e| {
                        log::warn!("no configuration panel for {workflow_id}: {e}");
                        self.active.set_error(ScheduleError::WorkflowConfig)
                    })?;
                Some(panel)
            }
            None => None,
        };
        self.active.change_workflow(panel)
    }

    pub fn cancel_current(&mut self) -> Result<(), ScheduleError> {
        self.active.cancel()
    }

    pub fn begin_apply(&mut self) -> Result<ApplyRequest, ScheduleError> {
        let token = self.platform.next_token();
        self.active.prepare_apply(self.row.kind, self.row.can_inherit(), token)
    }

    pub async fn send_apply(&self, request: &ApplyRequest) -> Result<(), BackendError> {
        self.platform.backend()
            .apply_acl(self.row.kind, &self.row.id, &request.form)
            .await
    }

    pub fn complete_apply(
        &mut self,
        request: ApplyRequest,
        result: Result<(), BackendError>,
    ) -> Result<(), ScheduleError> {
        let name = match &request.acl {
            AclChoice::Template(id) => self.platform.acl_name(id).map(str::to_string),
            AclChoice::InheritSeries => self.row.series_id.as_deref()
                .and_then(|series_id| self.platform.cached_transitions()?
                    .get(EntityKind::Series, series_id)
                    .map(|series| series.active_acl.name())),
            AclChoice::Unset => None,
        };
        self.active.complete_apply(request, result, name)
    }

    /// Applies the selected ACL right away.
    pub async fn apply(&mut self) -> Result<(), ScheduleError> {
        let request = self.begin_apply()?;
        let result = self.send_apply(&request).await;
        self.complete_apply(request, result)
    }
}
