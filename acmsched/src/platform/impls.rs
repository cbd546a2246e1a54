use acmcore::{
    acl::{
        AclTemplate,
        SERIES_ACL_ID,
        SERIES_ACL_LABEL,
    },
    entity::{
        EntityKind,
        EntityRow,
    },
    error::BackendError,
    transition::TransitionsQuery,
    workflow::WorkflowDefinition,
};
use std::sync::atomic::Ordering;

use crate::{
    schedule::{
        EntryKey,
        RequestToken,
    },
    view::SelectOption,
};
use super::*;

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn backend(mut self, val: impl AclManagerBackend + 'static) -> Self {
        self.backend = Some(Box::new(val));
        self
    }

    pub fn done(mut self, val: bool) -> Self {
        self.done = val;
        self
    }

    pub fn build(self) -> Platform {
        Platform(Arc::new(PlatformInner {
            backend: self.backend
                .expect("missing required argument backend"),
            done: self.done,
            acls: OnceCell::new(),
            workflows: OnceCell::new(),
            panels: Mutex::new(HashMap::new()),
            transitions: RwLock::new(None),
            keys: AtomicU64::new(0),
            tokens: AtomicU64::new(0),
        }))
    }
}

impl Platform {
    pub fn backend(&self) -> &dyn AclManagerBackend {
        self.0.backend.as_ref()
    }

    pub(crate) fn next_key(&self) -> EntryKey {
        EntryKey(self.0.keys.fetch_add(1, Ordering::Relaxed) + 1)
    }

    pub(crate) fn next_token(&self) -> RequestToken {
        RequestToken(self.0.tokens.fetch_add(1, Ordering::Relaxed) + 1)
    }

    /// Fetches the reference lists ahead of building any scheduler.
    pub async fn preload(&self) {
        self.acl_templates().await;
        self.workflow_definitions().await;
    }
}

// Reference caches.
impl Platform {
    /// The ACL templates, fetched on first use.  A failed fetch is not
    /// remembered and yields an empty list.
    pub async fn acl_templates(&self) -> &[AclTemplate] {
        let result = self.0.acls
            .get_or_try_init(|| async {
                log::trace!("fetching acl templates");
                self.0.backend.list_acls().await
            })
            .await;
        match result {
            Ok(acls) => acls.as_slice(),
            Err(e) => {
                log::warn!("unable to load acl templates: {e}");
                &[]
            }
        }
    }

    pub fn acl_templates_cached(&self) -> &[AclTemplate] {
        self.0.acls.get()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn acl_name(&self, id: &str) -> Option<&str> {
        self.acl_templates_cached()
            .iter()
            .find(|acl| acl.id == id)
            .map(|acl| acl.name.as_str())
    }

    /// The ACL select options; `inherit` adds the option to go back to the
    /// series ACL.
    pub fn acl_options(&self, inherit: bool) -> Vec<SelectOption> {
        let acls = self.acl_templates_cached();
        let mut result = Vec::with_capacity(acls.len() + 1);
        if inherit {
            result.push(SelectOption::new(SERIES_ACL_ID, SERIES_ACL_LABEL));
        }
        if acls.is_empty() {
            result.push(SelectOption::new("", NO_ACL_AVAILABLE));
        }
        result.extend(acls.iter()
            .map(|acl| SelectOption::new(&acl.id, &acl.name)));
        result
    }

    pub async fn workflow_definitions(&self) -> &[WorkflowDefinition] {
        let result = self.0.workflows
            .get_or_try_init(|| async {
                log::trace!("fetching workflow definitions");
                self.0.backend.list_workflow_definitions().await
            })
            .await;
        match result {
            Ok(defs) => defs.as_slice(),
            Err(e) => {
                log::warn!("unable to load workflow definitions: {e}");
                &[]
            }
        }
    }

    pub fn workflow_definitions_cached(&self) -> &[WorkflowDefinition] {
        self.0.workflows.get()
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The workflow select options, always led by the empty choice.
    pub fn workflow_options(&self) -> Vec<SelectOption> {
        std::iter::once(SelectOption::new("", NO_WORKFLOW))
            .chain(self.workflow_definitions_cached()
                .iter()
                .map(|def| SelectOption::new(&def.id, &def.description)))
            .collect()
    }

    /// The configuration panel of a workflow, fetched once per id.
    pub async fn configuration_panel(
        &self,
        definition_id: &str,
    ) -> Result<Arc<ConfigPanel>, BackendError> {
        let cached = self.0.panels.lock().get(definition_id).cloned();
        if let Some(panel) = cached {
            return Ok(panel);
        }
        log::trace!("fetching configuration panel of {definition_id}");
        let html = self.0.backend
            .workflow_configuration_panel(definition_id)
            .await?;
        let panel = Arc::new(ConfigPanel::parse(definition_id, html));
        Ok(self.0.panels.lock()
            .entry(definition_id.to_string())
            .or_insert(panel)
            .clone())
    }
}

// Batched transitions.
impl Platform {
    pub(crate) fn transitions_query(&self, rows: &[EntityRow]) -> TransitionsQuery {
        let mut query = TransitionsQuery::new(self.0.done);
        let push = |ids: &mut Vec<String>, id: &str| {
            if !ids.iter().any(|v| v == id) {
                ids.push(id.to_string());
            }
        };
        for row in rows {
            match row.kind {
                EntityKind::Episode => {
                    push(&mut query.episode_ids, &row.id);
                    // the series data provides the override transitions
                    if let Some(series_id) = row.series_id.as_deref() {
                        push(&mut query.series_ids, series_id);
                    }
                }
                EntityKind::Series => push(&mut query.series_ids, &row.id),
            }
        }
        query
    }

    /// The transitions of every row in one request, cached for the page
    /// session unless `refresh` is set.  A failed fetch is not cached.
    pub async fn transitions_for(
        &self,
        rows: &[EntityRow],
        refresh: bool,
    ) -> Result<Arc<TransitionsFor>, BackendError> {
        if !refresh {
            if let Some(cached) = self.cached_transitions() {
                return Ok(cached);
            }
        }
        let query = self.transitions_query(rows);
        if query.is_empty() {
            return Ok(Arc::new(TransitionsFor::default()));
        }
        log::trace!(
            "fetching transitions for {} episode(s), {} series",
            query.episode_ids.len(),
            query.series_ids.len(),
        );
        let result = self.0.backend.transitions_for(&query)
            .await
            .map_err(|e| {
                log::warn!("unable to load transitions: {e}");
                e
            })?;
        let result = Arc::new(result);
        *self.0.transitions.write() = Some(result.clone());
        Ok(result)
    }

    pub fn cached_transitions(&self) -> Option<Arc<TransitionsFor>> {
        self.0.transitions.read().clone()
    }
}
