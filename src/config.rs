use serde::{Deserialize, Serialize};

/// Red cards that end a line's round when the deck still has cards left.
pub const DEFAULT_RED_CARD_CAP: usize = 5;

/// Tunables of a game, read by the [`crate::manager::Manager`].
///
/// # JSON
/// Every field is optional; missing fields take their default value.
///
/// # Example
/// ```
/// use london_system::config::Config;
///
/// let config = Config::from_json_str(r#"{"seed": 42}"#).unwrap();
/// assert_eq!(config.seed, Some(42));
/// assert_eq!(config.red_card_cap, 5);
/// assert!(!config.reset_board_between_rounds);
/// ```
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Config {
    /// Red cards drawn before the round of the current line ends.
    pub red_card_cap: usize,
    /// Seeds shuffling and turn order. `None` draws a seed from the operating system.
    pub seed: Option<u64>,
    /// Unblocks every track when a new line starts.
    /// Off by default: a blocked track stays unusable for the rest of the game.
    pub reset_board_between_rounds: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            red_card_cap: DEFAULT_RED_CARD_CAP,
            seed: None,
            reset_board_between_rounds: false,
        }
    }
}

impl Config {
    pub fn from_json_str(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    #[test]
    fn empty_json_to_config() -> serde_json::Result<()> {
        assert_eq!(Config::from_json_str("{}")?, Config::default());
        Ok(())
    }

    #[test]
    fn json_to_config() -> serde_json::Result<()> {
        assert_eq!(
            Config::from_json_str(
                r#"{"red_card_cap": 3, "seed": 7, "reset_board_between_rounds": true}"#
            )?,
            Config {
                red_card_cap: 3,
                seed: Some(7),
                reset_board_between_rounds: true,
            }
        );
        Ok(())
    }

    #[test]
    fn invalid_json_to_config() {
        assert!(Config::from_json_str(r#"{"red_card_cap": -1}"#).is_err());
    }

    #[test]
    fn config_to_json() -> serde_json::Result<()> {
        assert_eq!(
            serde_json::to_string(&Config::default())?,
            r#"{"red_card_cap":5,"seed":null,"reset_board_between_rounds":false}"#
        );
        Ok(())
    }
}
