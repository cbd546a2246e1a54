use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::serde_ext;

/// A workflow definition that may be started when a transition applies.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct WorkflowDefinition {
    pub id: String,
    pub description: String,
}

pub type WorkflowDefinitions = Vec<WorkflowDefinition>;

/// Configuration values for a workflow, keyed by the form field id.
pub type WorkflowParams = BTreeMap<String, String>;

/// The envelope of `/workflow/definitions.json`.
#[derive(Debug, Default, Deserialize)]
pub struct DefinitionsDocument {
    #[serde(default)]
    pub definitions: DefinitionsInner,
}

#[derive(Debug, Default, Deserialize)]
pub struct DefinitionsInner {
    #[serde(default, deserialize_with = "serde_ext::one_or_many")]
    pub definition: Vec<RawDefinition>,
}

/// A definition entry; entries missing either field are not offered.
#[derive(Debug, Deserialize)]
pub struct RawDefinition {
    pub id: Option<String>,
    pub description: Option<String>,
}

mod impls;
pub use impls::{
    decode_params,
    encode_params,
};
