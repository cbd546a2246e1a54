use acmcore::{
    acl::{
        AclTemplate,
        AclTemplates,
        ActiveAclRecord,
        ManagedAclDigest,
    },
    transition::{
        EntityTransitions,
        TransitionRecord,
    },
    workflow::{
        WorkflowDefinition,
        WorkflowDefinitions,
    },
};
use chrono::{
    DateTime,
    TimeZone,
    Utc,
};

pub fn utc(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("a valid date")
}

pub fn acl_templates() -> AclTemplates {
    vec![
        AclTemplate { id: "tmpl-A".to_string(), name: "Public".to_string() },
        AclTemplate { id: "tmpl-B".to_string(), name: "Private".to_string() },
    ]
}

pub fn workflow_definitions() -> WorkflowDefinitions {
    vec![
        WorkflowDefinition {
            id: "republish".to_string(),
            description: "Republish metadata".to_string(),
        },
        WorkflowDefinition {
            id: "retract".to_string(),
            description: "Retract".to_string(),
        },
    ]
}

/// A configuration panel with one text field and one checkbox.
pub const REPUBLISH_PANEL: &str = r#"<div id="workflow-configuration">
  <input type="text" id="comment" name="comment" value="none" class="configField"/>
  <input type="checkbox" id="distribute" name="distribute" value="true" class="configField" checked="checked"/>
</div>"#;

pub fn transition(
    id: &str,
    acl_id: Option<&str>,
    date: DateTime<Utc>,
) -> TransitionRecord {
    TransitionRecord {
        transition_id: id.to_string(),
        application_date: date,
        acl: acl_id.map(|acl_id| ManagedAclDigest {
            id: Some(acl_id.to_string()),
            .. Default::default()
        }),
        workflow_id: None,
        workflow_params: None,
        override_: false,
        done: false,
    }
}

pub fn managed_active(acl_id: &str, name: &str, is_from_series: bool) -> ActiveAclRecord {
    ActiveAclRecord {
        managed_acl: Some(ManagedAclDigest {
            id: Some(acl_id.to_string()),
            name: Some(name.to_string()),
            is_from_series,
            override_: false,
        }),
        unmanaged_acl: None,
    }
}

pub fn entity_transitions(
    active_acl: ActiveAclRecord,
    transitions: Vec<TransitionRecord>,
) -> EntityTransitions {
    EntityTransitions {
        active_acl,
        transitions,
    }
}
