//! Helpers for the loosely typed JSON produced by the acl-manager
//! endpoints, where identifiers may be numbers or strings and a list
//! with a single member may be collapsed into the bare object.

use serde::{
    Deserialize,
    Deserializer,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Int(i64),
    Str(String),
}

impl From<IdRepr> for String {
    fn from(value: IdRepr) -> String {
        match value {
            IdRepr::Int(i) => i.to_string(),
            IdRepr::Str(s) => s,
        }
    }
}

pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(IdRepr::deserialize(deserializer)?.into())
}

pub(crate) fn opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IdRepr>::deserialize(deserializer)?.map(String::from))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

pub(crate) fn one_or_many<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        Some(OneOrMany::Many(v)) => v,
        Some(OneOrMany::One(v)) => vec![v],
        None => Vec::new(),
    })
}
