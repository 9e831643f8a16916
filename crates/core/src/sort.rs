//! Sort tokens accepted by the property listing.

use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// Ordering applied to a property listing.
///
/// Every ordering is made total by a trailing `id DESC` tie-break in the
/// query layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PropertySort {
    /// Newest first by id.
    #[default]
    IdDesc,
    IdAsc,
    PriceAsc,
    PriceDesc,
    YearAsc,
    YearDesc,
    NameAsc,
}

/// Legacy default token sent by existing clients. Ids are monotonic, so it
/// resolves to [`PropertySort::IdDesc`].
const LEGACY_DEFAULT_TOKEN: &str = "createdat_desc";

impl PropertySort {
    /// Parse an optional token; absent or blank tokens give the default.
    pub fn from_token(token: Option<&str>) -> Result<Self, CoreError> {
        match token.map(str::trim) {
            None | Some("") => Ok(Self::default()),
            Some(t) => t.parse(),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::IdDesc => "id_desc",
            Self::IdAsc => "id_asc",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
            Self::YearAsc => "year_asc",
            Self::YearDesc => "year_desc",
            Self::NameAsc => "name_asc",
        }
    }
}

impl FromStr for PropertySort {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "id_desc" | LEGACY_DEFAULT_TOKEN => Ok(Self::IdDesc),
            "id_asc" => Ok(Self::IdAsc),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "year_asc" => Ok(Self::YearAsc),
            "year_desc" => Ok(Self::YearDesc),
            "name_asc" => Ok(Self::NameAsc),
            other => Err(CoreError::InvalidArgument(format!(
                "Unknown sort token '{other}'"
            ))),
        }
    }
}

impl fmt::Display for PropertySort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn absent_and_blank_use_default() {
        assert_eq!(PropertySort::from_token(None).unwrap(), PropertySort::IdDesc);
        assert_eq!(PropertySort::from_token(Some("  ")).unwrap(), PropertySort::IdDesc);
    }

    #[test]
    fn legacy_token_maps_to_id_desc() {
        assert_eq!(
            PropertySort::from_token(Some("createdAt_desc")).unwrap(),
            PropertySort::IdDesc
        );
    }

    #[test]
    fn tokens_are_case_insensitive() {
        assert_eq!("PRICE_ASC".parse::<PropertySort>().unwrap(), PropertySort::PriceAsc);
    }

    #[test]
    fn unknown_token_rejected() {
        assert_matches!(
            PropertySort::from_token(Some("price; DROP TABLE")),
            Err(CoreError::InvalidArgument(_))
        );
    }

    #[test]
    fn display_round_trips_through_parse() {
        for sort in [
            PropertySort::IdDesc,
            PropertySort::YearAsc,
            PropertySort::NameAsc,
        ] {
            assert_eq!(sort.to_string().parse::<PropertySort>().unwrap(), sort);
        }
    }
}
