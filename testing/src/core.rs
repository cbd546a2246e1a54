use acmcore::{
    acl::AclTemplates,
    entity::EntityKind,
    error::BackendError,
    traits::AclManagerBackend,
    transition::{
        ApplyForm,
        TransitionForm,
        TransitionsFor,
        TransitionsQuery,
    },
    workflow::WorkflowDefinitions,
};
use async_trait::async_trait;
use mockall::mock;

mock! {
    pub Backend {}

    #[async_trait]
    impl AclManagerBackend for Backend {
        async fn transitions_for(
            &self,
            query: &TransitionsQuery,
        ) -> Result<TransitionsFor, BackendError>;
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
        async fn apply_acl(
            &self,
            kind: EntityKind,
            entity_id: &str,
            form: &ApplyForm,
        ) -> Result<(), BackendError>;
        async fn list_acls(&self) -> Result<AclTemplates, BackendError>;
        async fn list_workflow_definitions(&self) -> Result<WorkflowDefinitions, BackendError>;
        async fn workflow_configuration_panel(
            &self,
            definition_id: &str,
        ) -> Result<String, BackendError>;
    }
}
