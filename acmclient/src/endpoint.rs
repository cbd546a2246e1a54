//! URL templates of the acl-manager and workflow services.

use acmcore::{
    entity::EntityKind,
    transition::TransitionsQuery,
};

pub fn transitions_for(base: &str, query: &TransitionsQuery) -> String {
    // serializing a list of string pairs cannot fail
    let qs = serde_urlencoded::to_string(query.pairs())
        .unwrap_or_default();
    format!("{base}/acl-manager/transitionsfor.json?{qs}")
}

/// Transition collection of an entity (POST), or a single transition
/// (PUT, DELETE); the id is the entity id or the transition id
/// accordingly.
pub fn transition(base: &str, kind: EntityKind, id: &str) -> String {
    format!("{base}/acl-manager/{}/{id}", kind.path_segment())
}

pub fn apply(base: &str, kind: EntityKind, entity_id: &str) -> String {
    format!("{base}/acl-manager/apply/{}/{entity_id}", kind.path_segment())
}

pub fn acls(base: &str) -> String {
    format!("{base}/acl-manager/acl/acls.json")
}

pub fn workflow_definitions(base: &str) -> String {
    format!("{base}/workflow/definitions.json")
}

pub fn configuration_panel(base: &str, definition_id: &str) -> String {
    let qs = serde_urlencoded::to_string(&[("definitionId", definition_id)])
        .unwrap_or_default();
    format!("{base}/workflow/configurationPanel?{qs}")
}

#[cfg(test)]
mod test {
    use super::*;

    const BASE: &str = "http://localhost";

    #[test]
    fn urls() {
        let query = TransitionsQuery {
            done: false,
            episode_ids: vec!["e1".to_string(), "e2".to_string()],
            series_ids: vec![],
        };
        assert_eq!(
            transitions_for(BASE, &query),
            "http://localhost/acl-manager/transitionsfor.json?done=false&episodeIds=e1%2Ce2",
        );
        assert_eq!(
            transition(BASE, EntityKind::Series, "s1"),
            "http://localhost/acl-manager/series/s1",
        );
        assert_eq!(
            apply(BASE, EntityKind::Episode, "e1"),
            "http://localhost/acl-manager/apply/episode/e1",
        );
        assert_eq!(acls(BASE), "http://localhost/acl-manager/acl/acls.json");
        assert_eq!(workflow_definitions(BASE), "http://localhost/workflow/definitions.json");
        assert_eq!(
            configuration_panel(BASE, "ng schedule"),
            "http://localhost/workflow/configurationPanel?definitionId=ng+schedule",
        );
    }
}
