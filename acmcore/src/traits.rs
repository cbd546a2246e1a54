use async_trait::async_trait;

use crate::{
    acl::AclTemplates,
    entity::EntityKind,
    error::BackendError,
    transition::{
        ApplyForm,
        TransitionForm,
        TransitionsFor,
        TransitionsQuery,
    },
    workflow::WorkflowDefinitions,
};

/// The remote acl-manager and workflow services used by the schedulers.
#[async_trait]
pub trait AclManagerBackend: Send + Sync {
    /// Pending transitions and active ACLs for every requested entity.
    async fn transitions_for(
        &self,
        query: &TransitionsQuery,
    ) -> Result<TransitionsFor, BackendError>;
    /// Create a transition for the entity, returning the assigned id.
    async fn add_transition(
        &self,
        kind: EntityKind,
        entity_id: &str,
        form: &TransitionForm,
    ) -> Result<String, BackendError>;
    async fn update_transition(
        &self,
        kind: EntityKind,
        transition_id: &str,
        form: &TransitionForm,
    ) -> Result<(), BackendError>;
    async fn delete_transition(
        &self,
        kind: EntityKind,
        transition_id: &str,
    ) -> Result<(), BackendError>;
    /// Apply an ACL to the entity right away.
    async fn apply_acl(
        &self,
        kind: EntityKind,
        entity_id: &str,
        form: &ApplyForm,
    ) -> Result<(), BackendError>;
    async fn list_acls(&self) -> Result<AclTemplates, BackendError>;
    async fn list_workflow_definitions(&self) -> Result<WorkflowDefinitions, BackendError>;
    /// The HTML form used to configure the workflow definition.
    async fn workflow_configuration_panel(
        &self,
        definition_id: &str,
    ) -> Result<String, BackendError>;
}
