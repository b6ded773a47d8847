use serde::{Deserialize, Serialize};

/// Catalog media kind. The catalog provider calls these `movie` and `tv`;
/// we use `series` everywhere outside the provider wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Movie,
    Series,
}

impl MediaKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Series => "series",
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "movie" => Ok(Self::Movie),
            "series" | "tv" => Ok(Self::Series),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_kind_round_trip() {
        assert_eq!("movie".parse::<MediaKind>().unwrap(), MediaKind::Movie);
        assert_eq!("series".parse::<MediaKind>().unwrap(), MediaKind::Series);
        assert_eq!("tv".parse::<MediaKind>().unwrap(), MediaKind::Series);
        assert!("song".parse::<MediaKind>().is_err());
        assert_eq!(MediaKind::Movie.to_string(), "movie");
    }
}
