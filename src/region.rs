use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use strum::EnumCount;
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// The fixed zones of the board, used for area-coverage scoring.
///
/// The board is cut in a 3x3 grid, and each of the four corner zones is further split into
/// a small corner and the larger remainder.
///
/// # JSON
/// Regions are serialized by name, in SCREAMING_SNAKE_CASE (e.g. `"TOP_LEFT_SMALL"`).
#[derive(
    Clone,
    Copy,
    Debug,
    Deserialize,
    Display,
    EnumCountMacro,
    EnumIter,
    Eq,
    Hash,
    Ord,
    PartialEq,
    PartialOrd,
    Serialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "snake_case")]
pub enum Region {
    TopLeftSmall = 1,
    TopLeftLarge = 2,
    TopMiddle = 3,
    TopRightLarge = 4,
    TopRightSmall = 5,
    MiddleLeft = 6,
    MiddleMiddle = 7,
    MiddleRight = 8,
    BottomLeftSmall = 9,
    BottomLeftLarge = 10,
    BottomMiddle = 11,
    BottomRightLarge = 12,
    BottomRightSmall = 13,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_count() {
        assert_eq!(Region::COUNT, 13);
    }

    #[test]
    fn region_to_string() {
        assert_eq!(Region::TopLeftSmall.to_string(), "top_left_small");
        assert_eq!(Region::MiddleMiddle.to_string(), "middle_middle");
    }

    #[test]
    fn region_to_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&Region::TopLeftSmall)?,
            r#""TOP_LEFT_SMALL""#
        );
        assert_eq!(
            serde_json::to_string(&Region::BottomRightSmall)?,
            r#""BOTTOM_RIGHT_SMALL""#
        );

        Ok(())
    }

    #[test]
    fn json_to_region() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::from_str::<Region>(r#""MIDDLE_MIDDLE""#)?,
            Region::MiddleMiddle
        );
        assert_eq!(
            serde_json::from_str::<Region>(r#""BOTTOM_RIGHT_LARGE""#)?,
            Region::BottomRightLarge
        );

        Ok(())
    }

    #[test]
    fn invalid_json_to_region() {
        assert!(serde_json::from_str::<Region>("7").is_err());
        assert!(serde_json::from_str::<Region>(r#""top_left_small""#).is_err());
        assert!(serde_json::from_str::<Region>(r#""NORTH""#).is_err());
    }
}
