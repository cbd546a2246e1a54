use chrono::{
    DateTime,
    Utc,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{
    acl::{
        ActiveAclRecord,
        ManagedAclDigest,
    },
    serde_ext,
};

/// A pending transition as returned by `transitionsfor.json`.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionRecord {
    #[serde(deserialize_with = "serde_ext::id")]
    pub transition_id: String,
    pub application_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<ManagedAclDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_id: Option<String>,
    /// JSON encoded parameters, as stored by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_params: Option<String>,
    #[serde(default, rename = "override")]
    pub override_: bool,
    #[serde(default)]
    pub done: bool,
}

/// The active ACL and the pending transitions of one entity.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityTransitions {
    #[serde(default)]
    pub active_acl: ActiveAclRecord,
    #[serde(default, deserialize_with = "serde_ext::one_or_many")]
    pub transitions: Vec<TransitionRecord>,
}

/// The batched answer for every entity on a page, keyed by entity id.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TransitionsFor {
    #[serde(default)]
    pub episodes: HashMap<String, EntityTransitions>,
    #[serde(default)]
    pub series: HashMap<String, EntityTransitions>,
}

/// Selects the entities of a batched transition request.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionsQuery {
    pub done: bool,
    pub episode_ids: Vec<String>,
    pub series_ids: Vec<String>,
}

/// Form body used to create or update a scheduled transition.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionForm {
    pub application_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_acl_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_definition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_params: Option<String>,
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_: Option<bool>,
}

/// Form body of the instant apply endpoint.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplyForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl_id: Option<String>,
    #[serde(default, rename = "override", skip_serializing_if = "Option::is_none")]
    pub override_: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_definition_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflow_params: Option<String>,
}

/// Answer to the creation of a transition.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransitionCreated {
    #[serde(deserialize_with = "serde_ext::id")]
    pub transition_id: String,
}

mod impls;
pub use impls::iso_date;
