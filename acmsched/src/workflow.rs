use acmcore::workflow::WorkflowParams;
use regex::{
    Captures,
    Regex,
};
use std::{
    borrow::Cow,
    sync::{
        Arc,
        LazyLock,
    },
};

use crate::schedule::EntryKey;

static INPUT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<input\b([^>]*?)/?>")
        .expect("valid input tag pattern")
});

static ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)([a-z_:][-a-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'=<>`]+)))?"#)
        .expect("valid attribute pattern")
});

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum FieldKind {
    Text,
    Checkbox,
}

/// An input of a workflow configuration panel.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ConfigField {
    pub id: String,
    pub kind: FieldKind,
    /// The value the panel presets; `"true"`/`"false"` for checkboxes.
    pub default: String,
}

/// The configuration fragment of one workflow definition.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfigPanel {
    definition_id: String,
    html: String,
    fields: Vec<ConfigField>,
}

/// Edits the params of one entry against its workflow panel; nothing is
/// applied to the entry until the dialog is closed with a commit.
#[derive(Clone, Debug)]
pub struct WorkflowConfigDialog {
    key: EntryKey,
    panel: Arc<ConfigPanel>,
    params: WorkflowParams,
}

struct Attribute<'a> {
    name: Cow<'a, str>,
    value: Option<Cow<'a, str>>,
}

fn attributes(body: &str) -> Vec<Attribute<'_>> {
    ATTRIBUTE.captures_iter(body)
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            let value = caps.get(2)
                .or_else(|| caps.get(3))
                .or_else(|| caps.get(4))
                .map(|m| html_escape::decode_html_entities(m.as_str()));
            Some(Attribute {
                name: Cow::Owned(name.to_ascii_lowercase()),
                value,
            })
        })
        .collect()
}

fn attribute<'a>(attrs: &'a [Attribute<'a>], name: &str) -> Option<&'a Attribute<'a>> {
    attrs.iter().find(|attr| attr.name == name)
}

fn field(body: &str) -> Option<ConfigField> {
    let attrs = attributes(body);
    let id = attribute(&attrs, "id")
        .or_else(|| attribute(&attrs, "name"))
        .and_then(|attr| attr.value.as_deref())
        .filter(|id| !id.is_empty())?
        .to_string();
    let kind = match attribute(&attrs, "type")
        .and_then(|attr| attr.value.as_deref())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("checkbox") => FieldKind::Checkbox,
        Some("submit") | Some("button") | Some("reset") => return None,
        _ => FieldKind::Text,
    };
    let default = match kind {
        FieldKind::Checkbox => attribute(&attrs, "checked").is_some().to_string(),
        FieldKind::Text => attribute(&attrs, "value")
            .and_then(|attr| attr.value.as_deref())
            .unwrap_or_default()
            .to_string(),
    };
    Some(ConfigField { id, kind, default })
}

impl ConfigPanel {
    pub fn parse(definition_id: impl Into<String>, html: impl Into<String>) -> Self {
        let html = html.into();
        let fields = INPUT.captures_iter(&html)
            .filter_map(|caps| field(caps.get(1)?.as_str()))
            .collect();
        Self {
            definition_id: definition_id.into(),
            html,
            fields,
        }
    }

    pub fn definition_id(&self) -> &str {
        &self.definition_id
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn fields(&self) -> &[ConfigField] {
        &self.fields
    }

    /// The params as preset by the panel inputs.
    pub fn defaults(&self) -> WorkflowParams {
        self.fields.iter()
            .map(|field| (field.id.clone(), field.default.clone()))
            .collect()
    }

    /// The panel with its inputs showing `params`.
    pub fn render_with(&self, params: &WorkflowParams) -> String {
        INPUT.replace_all(&self.html, |caps: &Captures| {
            let body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
            let Some(field) = field(body) else {
                return caps[0].to_string();
            };
            let Some(value) = params.get(&field.id) else {
                return caps[0].to_string();
            };
            let mut result = String::from("<input");
            for attr in attributes(body) {
                match (field.kind, &*attr.name) {
                    (FieldKind::Checkbox, "checked") => continue,
                    (FieldKind::Text, "value") => continue,
                    _ => (),
                }
                result.push(' ');
                result.push_str(&attr.name);
                if let Some(value) = attr.value {
                    result.push_str("=\"");
                    result.push_str(&html_escape::encode_double_quoted_attribute(&value));
                    result.push('"');
                }
            }
            match field.kind {
                FieldKind::Checkbox if value == "true" => result.push_str(r#" checked="checked""#),
                FieldKind::Checkbox => (),
                FieldKind::Text => {
                    result.push_str(" value=\"");
                    result.push_str(&html_escape::encode_double_quoted_attribute(value));
                    result.push('"');
                }
            }
            result.push_str("/>");
            result
        }).into_owned()
    }
}

impl WorkflowConfigDialog {
    pub(crate) fn new(
        key: EntryKey,
        panel: Arc<ConfigPanel>,
        params: Option<WorkflowParams>,
    ) -> Self {
        let params = params.unwrap_or_else(|| panel.defaults());
        Self { key, panel, params }
    }

    pub fn key(&self) -> EntryKey {
        self.key
    }

    pub fn panel(&self) -> &ConfigPanel {
        &self.panel
    }

    pub fn params(&self) -> &WorkflowParams {
        &self.params
    }

    pub fn set(&mut self, id: impl Into<String>, value: impl Into<String>) {
        self.params.insert(id.into(), value.into());
    }

    pub fn unset(&mut self, id: &str) {
        self.params.remove(id);
    }

    /// The panel markup showing the working params.
    pub fn html(&self) -> String {
        self.panel.render_with(&self.params)
    }

    pub(crate) fn into_parts(self) -> (EntryKey, WorkflowParams) {
        (self.key, self.params)
    }
}
