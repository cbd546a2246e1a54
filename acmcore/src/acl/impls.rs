use serde::{
    Deserialize,
    Deserializer,
};
use std::fmt;
use crate::serde_ext;
use super::*;

#[derive(Deserialize)]
struct RawTemplate {
    #[serde(default, deserialize_with = "serde_ext::opt_id")]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

impl<'de> Deserialize<'de> for AclListing {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw: Vec<RawTemplate> = serde_ext::one_or_many(deserializer)?;
        Ok(AclListing(raw.into_iter()
            .filter_map(|RawTemplate { id, name }| Some(AclTemplate {
                id: id?,
                name: name?,
            }))
            .collect()
        ))
    }
}

impl AclChoice {
    pub fn template(id: impl Into<String>) -> Self {
        let id = id.into();
        if id.is_empty() {
            AclChoice::Unset
        } else {
            AclChoice::Template(id)
        }
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, AclChoice::Unset)
    }

    pub fn is_inherit(&self) -> bool {
        matches!(self, AclChoice::InheritSeries)
    }

    /// The template id, if this choice references one.
    pub fn template_id(&self) -> Option<&str> {
        match self {
            AclChoice::Template(id) => Some(id.as_str()),
            _ => None,
        }
    }

    /// The value used for this choice in select options.
    pub fn as_value(&self) -> &str {
        match self {
            AclChoice::Unset => "",
            AclChoice::Template(id) => id.as_str(),
            AclChoice::InheritSeries => SERIES_ACL_ID,
        }
    }
}

impl From<&str> for AclChoice {
    fn from(value: &str) -> Self {
        match value {
            // the literal "undefined" is what a blank option used to carry
            "" | "undefined" => AclChoice::Unset,
            SERIES_ACL_ID => AclChoice::InheritSeries,
            id => AclChoice::Template(id.to_string()),
        }
    }
}

impl From<String> for AclChoice {
    fn from(value: String) -> Self {
        AclChoice::from(value.as_str())
    }
}

impl From<AclChoice> for String {
    fn from(value: AclChoice) -> String {
        value.as_value().to_string()
    }
}

impl fmt::Display for AclChoice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_value())
    }
}

impl ActiveAclRecord {
    /// Whether the active ACL is tracked by a template.
    pub fn is_managed(&self) -> bool {
        self.managed_acl.is_some()
    }

    pub fn acl(&self) -> AclChoice {
        self.managed_acl
            .as_ref()
            .and_then(|m| m.id.as_deref())
            .map(AclChoice::template)
            .unwrap_or_default()
    }

    pub fn name(&self) -> String {
        self.managed_acl
            .as_ref()
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| UNMANAGED_ACL_NAME.to_string())
    }

    pub fn is_from_series(&self) -> bool {
        self.managed_acl
            .as_ref()
            .map(|m| m.is_from_series)
            .unwrap_or(false)
    }

    pub fn override_(&self) -> bool {
        self.managed_acl
            .as_ref()
            .map(|m| m.override_)
            .unwrap_or(false)
    }
}
