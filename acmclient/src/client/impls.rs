use acmcore::{
    acl::{
        AclListing,
        AclTemplates,
    },
    entity::EntityKind,
    error::BackendError,
    traits::AclManagerBackend,
    transition::{
        ApplyForm,
        TransitionCreated,
        TransitionForm,
        TransitionsFor,
        TransitionsQuery,
    },
    workflow::{
        DefinitionsDocument,
        WorkflowDefinitions,
    },
};
use async_trait::async_trait;
use reqwest::{
    RequestBuilder,
    Response,
};

use crate::{
    endpoint,
    error::backend_error,
};
use super::Client;

/// Send the request, turning any non-success status into an error.
async fn send(request: RequestBuilder) -> Result<Response, BackendError> {
    let response = request.send()
        .await
        .map_err(backend_error)?;
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        log::info!("request to {} failed with {status}", response.url());
        Err(BackendError::Status(status))
    }
}

async fn json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    // read as text first so that decode failures are reported as such
    let body = response.text()
        .await
        .map_err(backend_error)?;
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl AclManagerBackend for Client {
    async fn transitions_for(
        &self,
        query: &TransitionsQuery,
    ) -> Result<TransitionsFor, BackendError> {
        let url = endpoint::transitions_for(self.base(), query);
        log::trace!("GET {url}");
        json(send(self.0.http.get(url)).await?).await
    }

    async fn add_transition(
        &self,
        kind: EntityKind,
        entity_id: &str,
        form: &TransitionForm,
    ) -> Result<String, BackendError> {
        let url = endpoint::transition(self.base(), kind, entity_id);
        log::trace!("POST {url}");
        let created: TransitionCreated = json(
            send(self.0.http.post(url).form(form)).await?
        ).await?;
        Ok(created.transition_id)
    }

    async fn update_transition(
        &self,
        kind: EntityKind,
        transition_id: &str,
        form: &TransitionForm,
    ) -> Result<(), BackendError> {
        let url = endpoint::transition(self.base(), kind, transition_id);
        log::trace!("PUT {url}");
        send(self.0.http.put(url).form(form)).await?;
        Ok(())
    }

    async fn delete_transition(
        &self,
        kind: EntityKind,
        transition_id: &str,
    ) -> Result<(), BackendError> {
        let url = endpoint::transition(self.base(), kind, transition_id);
        log::trace!("DELETE {url}");
        send(self.0.http.delete(url)).await?;
        Ok(())
    }

    async fn apply_acl(
        &self,
        kind: EntityKind,
        entity_id: &str,
        form: &ApplyForm,
    ) -> Result<(), BackendError> {
        let url = endpoint::apply(self.base(), kind, entity_id);
        log::trace!("POST {url}");
        send(self.0.http.post(url).form(form)).await?;
        Ok(())
    }

    async fn list_acls(&self) -> Result<AclTemplates, BackendError> {
        let url = endpoint::acls(self.base());
        log::trace!("GET {url}");
        let AclListing(acls) = json(send(self.0.http.get(url)).await?).await?;
        Ok(acls)
    }

    async fn list_workflow_definitions(&self) -> Result<WorkflowDefinitions, BackendError> {
        let url = endpoint::workflow_definitions(self.base());
        log::trace!("GET {url}");
        let document: DefinitionsDocument = json(send(self.0.http.get(url)).await?).await?;
        Ok(document.into_definitions())
    }

    async fn workflow_configuration_panel(
        &self,
        definition_id: &str,
    ) -> Result<String, BackendError> {
        let url = endpoint::configuration_panel(self.base(), definition_id);
        log::trace!("GET {url}");
        send(self.0.http.get(url))
            .await?
            .text()
            .await
            .map_err(backend_error)
    }
}
