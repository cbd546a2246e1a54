use std::{
    fmt,
    str::FromStr,
};
use crate::error::ValueError;
use super::{
    EntityKind,
    EntityRow,
};

impl EntityKind {
    /// Path segment used by the acl-manager endpoints.
    pub fn path_segment(&self) -> &'static str {
        match self {
            EntityKind::Episode => "episode",
            EntityKind::Series => "series",
        }
    }

    /// Only series transitions carry the override flag.
    pub fn supports_override(&self) -> bool {
        matches!(self, EntityKind::Series)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.path_segment())
    }
}

impl FromStr for EntityKind {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_ref() {
            "episode" => Ok(EntityKind::Episode),
            "series" => Ok(EntityKind::Series),
            s => Err(ValueError::Unsupported(s.to_string())),
        }
    }
}

impl EntityRow {
    pub fn episode(id: impl Into<String>, series_id: Option<String>) -> Self {
        Self {
            kind: EntityKind::Episode,
            id: id.into(),
            series_id,
        }
    }

    pub fn series(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Series,
            id: id.into(),
            series_id: None,
        }
    }

    /// Whether the "back to series ACL" choice is meaningful for this
    /// entity.
    pub fn can_inherit(&self) -> bool {
        self.kind == EntityKind::Episode && self.series_id.is_some()
    }
}

#[cfg(feature = "clap")]
mod clap {
    use ::clap::{
        ValueEnum,
        builder::PossibleValue,
    };
    use super::*;

    impl ValueEnum for EntityKind {
        fn value_variants<'a>() -> &'a [Self] {
            &[
                EntityKind::Episode,
                EntityKind::Series,
            ]
        }

        fn to_possible_value(&self) -> Option<PossibleValue> {
            Some(PossibleValue::new(self.path_segment()))
        }
    }
}

#[cfg(test)]
mod test {
    use std::str::FromStr;
    use super::*;

    #[test]
    fn smoke() -> anyhow::Result<()> {
        assert_eq!(EntityKind::Episode.to_string(), "episode");
        assert_eq!(EntityKind::from_str("Series")?, EntityKind::Series);
        assert!(matches!(
            EntityKind::from_str("playlist").expect_err("should be an error"),
            ValueError::Unsupported(s) if s == "playlist",
        ));
        assert!(EntityKind::Series.supports_override());
        assert!(!EntityKind::Episode.supports_override());
        Ok(())
    }

    #[test]
    fn inherit() {
        assert!(EntityRow::episode("ep", Some("s1".into())).can_inherit());
        assert!(!EntityRow::episode("ep", None).can_inherit());
        assert!(!EntityRow::series("s1").can_inherit());
    }
}
