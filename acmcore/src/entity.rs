use serde::{Deserialize, Serialize};

/// The kind of entity a scheduler manages.
///
/// Episodes and series share one scheduler implementation; the kind
/// supplies everything that differs between the two.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Episode,
    Series,
}

/// An entity listed on a page, as found by the page initialisation.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct EntityRow {
    pub kind: EntityKind,
    pub id: String,
    /// The series an episode belongs to, if any.
    pub series_id: Option<String>,
}

mod impls;
