use chrono::{
    DateTime,
    SecondsFormat,
    Utc,
};

use crate::entity::EntityKind;
use super::*;

/// Formats a date the way the acl-manager expects `applicationDate`.
pub fn iso_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl TransitionRecord {
    pub fn acl_id(&self) -> Option<&str> {
        self.acl.as_ref().and_then(|acl| acl.id.as_deref())
    }
}

impl TransitionsFor {
    pub fn get(&self, kind: EntityKind, id: &str) -> Option<&EntityTransitions> {
        match kind {
            EntityKind::Episode => self.episodes.get(id),
            EntityKind::Series => self.series.get(id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty() && self.series.is_empty()
    }
}

impl TransitionsQuery {
    pub fn new(done: bool) -> Self {
        Self {
            done,
            .. Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.episode_ids.is_empty() && self.series_ids.is_empty()
    }

    /// Query pairs; ids are sent as comma separated lists and empty
    /// lists are omitted.
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut result = vec![("done", self.done.to_string())];
        if !self.episode_ids.is_empty() {
            result.push(("episodeIds", self.episode_ids.join(",")));
        }
        if !self.series_ids.is_empty() {
            result.push(("seriesIds", self.series_ids.join(",")));
        }
        result
    }
}

#[cfg(test)]
mod test {
    use chrono::{
        TimeZone,
        Utc,
    };
    use super::*;

    #[test]
    fn iso() {
        let date = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        assert_eq!(iso_date(&date), "2024-06-01T00:00:00Z");
    }

    #[test]
    fn query_pairs() {
        let mut query = TransitionsQuery::new(false);
        assert_eq!(query.pairs(), vec![("done", "false".to_string())]);
        query.episode_ids = vec!["e1".into(), "e2".into()];
        query.series_ids = vec!["s1".into()];
        assert_eq!(query.pairs(), vec![
            ("done", "false".to_string()),
            ("episodeIds", "e1,e2".to_string()),
            ("seriesIds", "s1".to_string()),
        ]);
    }

    #[test]
    fn transitions_for() -> anyhow::Result<()> {
        let data: TransitionsFor = serde_json::from_str(r#"{
            "episodes": {
                "EP-1": {
                    "activeAcl": {"managedAcl": {"id": 1, "name": "Private", "isFromSeries": false}},
                    "transitions": {
                        "transitionId": 100,
                        "applicationDate": "2024-06-01T00:00:00Z",
                        "acl": {"id": 2, "name": "Public"},
                        "workflowId": "republish",
                        "workflowParams": "{\"distribute\":\"true\"}",
                        "done": false
                    }
                }
            },
            "series": {
                "S-1": {
                    "activeAcl": {"unmanagedAcl": {}},
                    "transitions": []
                }
            }
        }"#)?;
        let episode = data.get(EntityKind::Episode, "EP-1")
            .expect("episode present");
        assert_eq!(episode.transitions.len(), 1);
        let transition = &episode.transitions[0];
        assert_eq!(transition.transition_id, "100");
        assert_eq!(transition.acl_id(), Some("2"));
        assert_eq!(transition.workflow_id.as_deref(), Some("republish"));
        assert!(!transition.override_);

        let series = data.get(EntityKind::Series, "S-1")
            .expect("series present");
        assert!(series.transitions.is_empty());
        assert!(!series.active_acl.is_managed());
        assert!(data.get(EntityKind::Series, "EP-1").is_none());
        Ok(())
    }

    #[test]
    fn forms() -> anyhow::Result<()> {
        let form = TransitionForm {
            application_date: "2024-06-01T00:00:00Z".to_string(),
            managed_acl_id: Some("tmpl-A".to_string()),
            override_: Some(true),
            .. Default::default()
        };
        assert_eq!(
            serde_urlencoded::to_string(&form)?,
            "applicationDate=2024-06-01T00%3A00%3A00Z&managedAclId=tmpl-A&override=true",
        );
        let form = ApplyForm::default();
        assert_eq!(serde_urlencoded::to_string(&form)?, "");

        let created: TransitionCreated = serde_json::from_str(r#"{"transitionId": 100}"#)?;
        assert_eq!(created.transition_id, "100");
        Ok(())
    }
}
