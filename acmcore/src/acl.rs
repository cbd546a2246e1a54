use serde::{Deserialize, Serialize};

use crate::serde_ext;

/// Select value standing for "fall back to the series ACL".
pub const SERIES_ACL_ID: &str = "_series";
/// Label of the [`SERIES_ACL_ID`] option.
pub const SERIES_ACL_LABEL: &str = "-> back to series ACL";
/// Name given to an active ACL that no template tracks.
pub const UNMANAGED_ACL_NAME: &str = "Unmanaged ACL";

/// The ACL selected for a transition or for the active state.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(into = "String", from = "String")]
pub enum AclChoice {
    /// Nothing selected; cannot be persisted.
    #[default]
    Unset,
    /// A managed ACL template, by id.
    Template(String),
    /// Remove the episode level ACL and inherit the one from the series.
    InheritSeries,
}

/// A managed ACL template as listed by the acl-manager.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct AclTemplate {
    #[serde(deserialize_with = "serde_ext::id")]
    pub id: String,
    pub name: String,
}

pub type AclTemplates = Vec<AclTemplate>;

/// The document of `acls.json`.
///
/// A lone template may be sent without the enclosing list, and entries
/// lacking an id or a name are not offered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AclListing(pub AclTemplates);

/// Digest of a managed ACL as embedded in transitions and active ACL
/// payloads.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagedAclDigest {
    #[serde(default, deserialize_with = "serde_ext::opt_id")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_from_series: bool,
    #[serde(default, rename = "override")]
    pub override_: bool,
}

/// The ACL in force on an entity, as reported by the server.
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveAclRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_acl: Option<ManagedAclDigest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unmanaged_acl: Option<serde_json::Value>,
}

mod impls;
