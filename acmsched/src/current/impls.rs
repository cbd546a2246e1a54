use acmcore::{
    acl::{
        AclChoice,
        ActiveAclRecord,
    },
    entity::EntityKind,
    error::BackendError,
    transition::ApplyForm,
    workflow::encode_params,
};
use std::sync::Arc;

use crate::{
    error::ScheduleError,
    schedule::RequestToken,
    workflow::ConfigPanel,
};
use super::*;

impl CurrentAcl {
    pub(crate) fn from_record(record: &ActiveAclRecord) -> Self {
        let acl = record.acl();
        let override_ = record.override_();
        Self {
            saved_acl: acl.clone(),
            saved_override: override_,
            acl,
            name: record.name(),
            override_,
            managed: record.is_managed(),
            is_from_series: record.is_from_series(),
            saved: true,
            .. Default::default()
        }
    }

    pub fn acl(&self) -> &AclChoice {
        &self.acl
    }

    /// Display name of the active ACL.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn override_(&self) -> bool {
        self.override_
    }

    pub fn is_managed(&self) -> bool {
        self.managed
    }

    pub fn is_from_series(&self) -> bool {
        self.is_from_series
    }

    pub fn workflow_id(&self) -> Option<&str> {
        self.workflow_id.as_deref()
    }

    pub fn workflow_params(&self) -> Option<&WorkflowParams> {
        self.workflow_params.as_ref()
    }

    pub fn saved_acl(&self) -> &AclChoice {
        &self.saved_acl
    }

    pub fn is_saved(&self) -> bool {
        self.saved
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&ScheduleError> {
        self.error.as_ref()
    }

    pub fn in_flight(&self) -> Option<RequestToken> {
        self.in_flight
    }

    /// Override is not offered while the series ACL is selected.
    pub fn override_enabled(&self) -> bool {
        !self.acl.is_inherit()
    }

    fn ensure_editable(&self) -> Result<(), ScheduleError> {
        match self.in_flight {
            Some(_) => Err(ScheduleError::SaveInProgress),
            None => Ok(()),
        }
    }

    pub(crate) fn change_acl(&mut self, acl: AclChoice) -> Result<(), ScheduleError> {
        self.ensure_editable()?;
        if acl.is_inherit() {
            self.override_ = false;
        }
        self.acl = acl;
        self.check_changed();
        Ok(())
    }

    pub(crate) fn change_override(&mut self, value: bool) -> Result<(), ScheduleError> {
        self.ensure_editable()?;
        if value && !self.override_enabled() {
            return Err(ScheduleError::Unsupported("override with the series ACL"));
        }
        self.override_ = value;
        self.check_changed();
        Ok(())
    }

    /// Selects the workflow of `panel` to start on apply, or none.
    pub(crate) fn change_workflow(
        &mut self,
        panel: Option<Arc<ConfigPanel>>,
    ) -> Result<(), ScheduleError> {
        self.ensure_editable()?;
        match panel {
            Some(panel) => {
                let defaults = panel.defaults();
                self.workflow_id = Some(panel.definition_id().to_string());
                self.workflow_params = (!defaults.is_empty()).then_some(defaults);
                self.panel = Some(panel);
            }
            None => {
                self.workflow_id = None;
                self.workflow_params = None;
                self.panel = None;
            }
        }
        self.check_changed();
        Ok(())
    }

    /// Whether anything differs from the ACL in force.
    pub fn check_changed(&mut self) -> bool {
        let changed = self.acl != self.saved_acl
            || self.override_ != self.saved_override
            || self.workflow_id.is_some();
        self.saved = !changed;
        if !changed {
            self.error = None;
        }
        changed
    }

    /// Rolls back the local edits; rejected while an apply is in flight.
    pub fn cancel(&mut self) -> Result<(), ScheduleError> {
        self.ensure_editable()?;
        self.acl = self.saved_acl.clone();
        self.override_ = self.saved_override;
        self.workflow_id = None;
        self.workflow_params = None;
        self.panel = None;
        self.error = None;
        self.saved = true;
        Ok(())
    }

    pub(crate) fn set_error(&mut self, error: ScheduleError) -> ScheduleError {
        self.error = Some(error.clone());
        error
    }

    pub(crate) fn prepare_apply(
        &mut self,
        kind: EntityKind,
        can_inherit: bool,
        token: RequestToken,
    ) -> Result<ApplyRequest, ScheduleError> {
        self.ensure_editable()?;
        let acl_id = match &self.acl {
            AclChoice::Template(id) => Some(Some(id.clone())),
            AclChoice::InheritSeries if can_inherit => Some(None),
            _ => None,
        };
        let Some(acl_id) = acl_id else {
            return Err(self.set_error(ScheduleError::MissingApplyAcl));
        };
        let workflow_params = match (&self.workflow_id, &self.workflow_params) {
            (Some(_), Some(params)) => encode_params(params),
            _ => Ok(None),
        };
        let workflow_params = match workflow_params {
            Ok(encoded) => encoded,
            Err(e) => {
                log::warn!("cannot encode workflow params: {e}");
                return Err(self.set_error(ScheduleError::ApplyFailed));
            }
        };
        let override_ = kind.supports_override() && self.override_;
        let form = ApplyForm {
            acl_id,
            override_: kind.supports_override().then_some(override_),
            workflow_definition_id: self.workflow_id.clone(),
            workflow_params,
        };
        self.error = None;
        self.loading = true;
        self.in_flight = Some(token);
        Ok(ApplyRequest {
            token,
            form,
            acl: self.acl.clone(),
            override_,
        })
    }

    /// Applies the outcome of an instant apply; `name` is the display name
    /// of the applied ACL when known.
    pub(crate) fn complete_apply(
        &mut self,
        request: ApplyRequest,
        result: Result<(), BackendError>,
        name: Option<String>,
    ) -> Result<(), ScheduleError> {
        if self.in_flight != Some(request.token) {
            log::info!("discarding stale apply completion");
            return Err(ScheduleError::Stale);
        }
        self.in_flight = None;
        self.loading = false;
        if let Err(e) = result {
            log::warn!("apply failed: {e}");
            self.saved = false;
            return Err(self.set_error(ScheduleError::from_apply(&e)));
        }
        if request.acl != self.saved_acl {
            if self.is_from_series {
                self.is_from_series = false;
            } else if request.acl.is_inherit() {
                self.is_from_series = true;
            }
        }
        self.managed = request.acl.template_id().is_some() || self.is_from_series;
        if let Some(name) = name {
            self.name = name;
        }
        self.acl = request.acl.clone();
        self.saved_acl = request.acl;
        self.override_ = request.override_;
        self.saved_override = request.override_;
        self.workflow_id = None;
        self.workflow_params = None;
        self.panel = None;
        self.error = None;
        self.saved = true;
        log::info!("applied acl {}", self.saved_acl);
        Ok(())
    }
}
