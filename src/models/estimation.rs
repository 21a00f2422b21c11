use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::GameError;

/// A card on the planning poker table.
///
/// Variants are declared in card order, so the derived `Ord` sorts them the
/// way they are laid out: `0 < ½ < 1 < … < 100 < ∞ < ?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum EstimationValue {
    Zero,
    Half,
    One,
    Two,
    Three,
    Five,
    Eight,
    Thirteen,
    Twenty,
    Forty,
    OneHundred,
    Infinity,
    Unknown,
}

impl EstimationValue {
    /// All cards, in table order.
    pub const ALL: [EstimationValue; 13] = [
        Self::Zero,
        Self::Half,
        Self::One,
        Self::Two,
        Self::Three,
        Self::Five,
        Self::Eight,
        Self::Thirteen,
        Self::Twenty,
        Self::Forty,
        Self::OneHundred,
        Self::Infinity,
        Self::Unknown,
    ];

    /// The card face, also used as the wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Zero => "0",
            Self::Half => "1/2",
            Self::One => "1",
            Self::Two => "2",
            Self::Three => "3",
            Self::Five => "5",
            Self::Eight => "8",
            Self::Thirteen => "13",
            Self::Twenty => "20",
            Self::Forty => "40",
            Self::OneHundred => "100",
            Self::Infinity => "∞",
            Self::Unknown => "?",
        }
    }
}

impl FromStr for EstimationValue {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if let Some(value) = Self::ALL.iter().find(|v| v.as_str() == token) {
            return Ok(*value);
        }

        match token.to_ascii_lowercase().as_str() {
            "½" | "0.5" => Ok(Self::Half),
            "infinity" | "inf" => Ok(Self::Infinity),
            "unknown" => Ok(Self::Unknown),
            _ => Err(GameError::InvalidValue(s.to_string())),
        }
    }
}

impl fmt::Display for EstimationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for EstimationValue {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EstimationValue> for String {
    fn from(value: EstimationValue) -> Self {
        value.as_str().to_string()
    }
}

/// One player's vote in a round. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimation {
    pub player: String,
    pub value: EstimationValue,
}

impl Estimation {
    /// Build an estimation from a raw card token, e.g. `"5"`, `"1/2"` or `"?"`.
    pub fn new(value: &str, player: impl Into<String>) -> Result<Self, GameError> {
        Ok(Self {
            player: player.into(),
            value: value.parse()?,
        })
    }
}
