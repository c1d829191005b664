use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use strum::EnumCount;
use strum_macros::{Display, EnumCount as EnumCountMacro, EnumIter};

/// The four metro lines drawn during a game, one round each.
///
/// # JSON
/// Colors are serialized in lowercase.
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
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TrackColor {
    Red,
    Blue,
    Green,
    Purple,
}

impl TrackColor {
    /// Position of this color in per-color arrays.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}
