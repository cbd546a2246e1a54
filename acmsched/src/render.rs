//! Markup of the scheduler views.
//!
//! Rendering is a pure function of a [`SchedulerView`]; the markup carries
//! the entry keys so that user actions can be routed back to the
//! scheduler.

use html_escape::{
    encode_double_quoted_attribute as attr,
    encode_text as text,
};
use std::fmt::Write;

use crate::view::{
    CurrentAclView,
    ScheduleView,
    SchedulerView,
    SelectOption,
};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

fn select(
    out: &mut String,
    class: &str,
    options: &[SelectOption],
    selected: &str,
    disabled: bool,
) {
    let _ = write!(
        out,
        r#"<select class="{}"{}>"#,
        attr(class),
        if disabled { " disabled" } else { "" },
    );
    for option in options {
        let _ = write!(
            out,
            r#"<option value="{}"{}>{}</option>"#,
            attr(&option.value),
            if option.value == selected { " selected" } else { "" },
            text(&option.label),
        );
    }
    out.push_str("</select>");
}

fn checkbox(out: &mut String, class: &str, checked: bool, disabled: bool) {
    let _ = write!(
        out,
        r#"<input type="checkbox" class="{}"{}{}/>"#,
        attr(class),
        if checked { " checked" } else { "" },
        if disabled { " disabled" } else { "" },
    );
}

fn error(out: &mut String, error: Option<&str>) {
    if let Some(error) = error {
        let _ = write!(out, r#"<span class="error">{}</span>"#, text(error));
    }
}

fn current(out: &mut String, view: &CurrentAclView, workflows: &[SelectOption]) {
    let _ = write!(
        out,
        r#"<tr class="current{}{}"><td class="name">{}</td><td>"#,
        if view.saved { "" } else { " unsaved" },
        if view.loading { " loading" } else { "" },
        text(&view.name),
    );
    select(out, "acl", &view.acl_options, &view.acl, view.loading);
    out.push_str("</td><td>");
    if let Some(value) = view.override_ {
        checkbox(out, "override", value, view.loading || !view.override_enabled);
    }
    out.push_str("</td><td>");
    select(
        out,
        "workflow",
        workflows,
        view.workflow_id.as_deref().unwrap_or_default(),
        view.loading,
    );
    out.push_str("</td><td>");
    if !view.saved {
        out.push_str(r#"<button class="apply">Apply</button><button class="cancel">Cancel</button>"#);
    }
    error(out, view.error.as_deref());
    out.push_str("</td></tr>");
}

fn schedule(
    out: &mut String,
    view: &ScheduleView,
    acls: &[SelectOption],
    workflows: &[SelectOption],
) {
    let disabled = view.read_only || view.loading;
    let _ = write!(
        out,
        r#"<tr class="transition{}{}{}{}" data-key="{}"{}><td>"#,
        if view.is_new { " new" } else { "" },
        if view.saved { "" } else { " unsaved" },
        if view.current { " in-effect" } else { "" },
        if view.read_only { " from-series" } else { "" },
        view.key.value(),
        match &view.id {
            Some(id) => format!(r#" data-id="{}""#, attr(id)),
            None => String::new(),
        },
    );
    let _ = write!(
        out,
        r#"<input type="text" class="from-date" value="{}"{}/>"#,
        view.from_date.format(DATE_FORMAT),
        if disabled { " disabled" } else { "" },
    );
    out.push_str("</td><td>");
    select(out, "acl", acls, &view.acl, disabled);
    out.push_str("</td><td>");
    if let Some(value) = view.override_ {
        checkbox(out, "override", value, disabled);
    }
    out.push_str("</td><td>");
    select(
        out,
        "workflow",
        workflows,
        view.workflow_id.as_deref().unwrap_or_default(),
        disabled,
    );
    if view.workflow_id.is_some() && !view.read_only {
        out.push_str(r#"<button class="configure">Configure</button>"#);
    }
    out.push_str("</td><td>");
    if !view.read_only {
        if !view.saved {
            out.push_str(r#"<button class="save">Save</button><button class="cancel">Cancel</button>"#);
        }
        out.push_str(r#"<button class="delete">Delete</button>"#);
    }
    error(out, view.error.as_deref());
    out.push_str("</td></tr>");
}

/// The markup of one scheduler: the current ACL, then the transitions.
pub fn scheduler(view: &SchedulerView) -> String {
    let mut out = String::new();
    let _ = write!(
        out,
        r#"<table class="acl-scheduler{}" data-kind="{}" data-id="{}"><tbody>"#,
        if view.collapsed { " collapsed" } else { "" },
        view.kind,
        attr(&view.entity_id),
    );
    current(&mut out, &view.current, &view.workflow_options);
    if !view.collapsed {
        for entry in view.schedules.iter() {
            schedule(&mut out, entry, &view.acl_options, &view.workflow_options);
        }
        out.push_str(r#"<tr class="actions"><td colspan="5"><button class="add">Add transition</button></td></tr>"#);
    }
    out.push_str("</tbody></table>");
    out
}

pub fn page(views: &[SchedulerView]) -> String {
    views.iter()
        .map(scheduler)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod test {
    use acmcore::entity::EntityKind;
    use chrono::{
        TimeZone,
        Utc,
    };
    use crate::schedule::EntryKey;
    use super::*;

    fn view(collapsed: bool) -> SchedulerView {
        SchedulerView {
            kind: EntityKind::Series,
            entity_id: "S-1".to_string(),
            collapsed,
            current: CurrentAclView {
                acl: "tmpl-A".to_string(),
                name: "Public <all>".to_string(),
                managed: true,
                is_from_series: false,
                override_: Some(false),
                override_enabled: true,
                workflow_id: None,
                saved: true,
                loading: false,
                error: None,
                acl_options: vec![SelectOption::new("tmpl-A", "Public <all>")],
            },
            schedules: vec![ScheduleView {
                key: EntryKey(7),
                id: Some("T-1".to_string()),
                acl: "tmpl-A".to_string(),
                from_date: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
                workflow_id: None,
                workflow_params: None,
                override_: Some(true),
                is_new: false,
                saved: false,
                loading: false,
                read_only: false,
                current: false,
                error: Some("There is already a transition with this start date!".to_string()),
            }],
            acl_options: vec![SelectOption::new("tmpl-A", "Public <all>")],
            workflow_options: vec![SelectOption::new("", "-- No workflow --")],
        }
    }

    #[test]
    fn expanded() {
        let html = scheduler(&view(false));
        assert!(html.starts_with(r#"<table class="acl-scheduler" data-kind="series" data-id="S-1">"#));
        assert!(html.contains(r#"<td class="name">Public &lt;all&gt;</td>"#));
        assert!(html.contains(r#"<option value="tmpl-A" selected>Public &lt;all&gt;</option>"#));
        assert!(html.contains(r#"data-key="7" data-id="T-1""#));
        assert!(html.contains(r#"value="2024-06-01 00:00""#));
        assert!(html.contains(r#"<input type="checkbox" class="override" checked/>"#));
        assert!(html.contains(r#"<button class="save">"#));
        assert!(html.contains("There is already a transition with this start date!"));
    }

    #[test]
    fn collapsed() {
        let html = page(&[view(true), view(true)]);
        assert!(!html.contains("data-key"));
        assert_eq!(html.matches("acl-scheduler collapsed").count(), 2);
    }
}
