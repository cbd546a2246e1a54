use std::collections::BTreeMap;
use super::*;

impl DefinitionsDocument {
    pub fn into_definitions(self) -> WorkflowDefinitions {
        self.definitions.definition
            .into_iter()
            .filter_map(|RawDefinition { id, description }| Some(WorkflowDefinition {
                id: id?,
                description: description?,
            }))
            .collect()
    }
}

/// Encode parameters for the `workflowParams` form field; empty
/// parameters are not sent at all.
pub fn encode_params(params: &WorkflowParams) -> Result<Option<String>, serde_json::Error> {
    if params.is_empty() {
        Ok(None)
    } else {
        serde_json::to_string(params).map(Some)
    }
}

/// Decode the `workflowParams` JSON string carried by a transition.
///
/// Non-string values are kept in their JSON representation.
pub fn decode_params(raw: &str) -> Result<WorkflowParams, serde_json::Error> {
    let values: BTreeMap<String, serde_json::Value> = serde_json::from_str(raw)?;
    Ok(values.into_iter()
        .map(|(k, v)| match v {
            serde_json::Value::String(s) => (k, s),
            v => (k, v.to_string()),
        })
        .collect())
}
