//! The fixed set of Nigerian state labels a classifier can emit.
//!
//! Variant declaration order is the classifier's output index order: the
//! labels sorted by byte order of their names, which puts the Federal
//! Capital Territory (`Abuja`) at index 1.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Number of labels a classifier scores.
pub const STATE_COUNT: usize = 37;

/// One of the 36 Nigerian states or the Federal Capital Territory.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
pub enum NigerianState {
    Abia,
    /// Federal Capital Territory.
    Abuja,
    Adamawa,
    #[serde(rename = "Akwa Ibom")]
    #[strum(serialize = "Akwa Ibom")]
    AkwaIbom,
    Anambra,
    Bauchi,
    Bayelsa,
    Benue,
    Borno,
    #[serde(rename = "Cross River")]
    #[strum(serialize = "Cross River")]
    CrossRiver,
    Delta,
    Ebonyi,
    Edo,
    Ekiti,
    Enugu,
    Gombe,
    Imo,
    Jigawa,
    Kaduna,
    Kano,
    Katsina,
    Kebbi,
    Kogi,
    Kwara,
    Lagos,
    Nassarawa,
    Niger,
    Ogun,
    Ondo,
    Osun,
    Oyo,
    Plateau,
    Rivers,
    Sokoto,
    Taraba,
    Yobe,
    Zamfara,
}

impl NigerianState {
    /// Returns the human-readable label (e.g. `"Akwa Ibom"`).
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Returns the classifier output index for this label.
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks up the label at a classifier output index.
    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::all().get(index).copied()
    }

    /// Returns all labels in classifier index order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::Abia,
            Self::Abuja,
            Self::Adamawa,
            Self::AkwaIbom,
            Self::Anambra,
            Self::Bauchi,
            Self::Bayelsa,
            Self::Benue,
            Self::Borno,
            Self::CrossRiver,
            Self::Delta,
            Self::Ebonyi,
            Self::Edo,
            Self::Ekiti,
            Self::Enugu,
            Self::Gombe,
            Self::Imo,
            Self::Jigawa,
            Self::Kaduna,
            Self::Kano,
            Self::Katsina,
            Self::Kebbi,
            Self::Kogi,
            Self::Kwara,
            Self::Lagos,
            Self::Nassarawa,
            Self::Niger,
            Self::Ogun,
            Self::Ondo,
            Self::Osun,
            Self::Oyo,
            Self::Plateau,
            Self::Rivers,
            Self::Sokoto,
            Self::Taraba,
            Self::Yobe,
            Self::Zamfara,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_count() {
        assert_eq!(NigerianState::all().len(), STATE_COUNT);
    }

    #[test]
    fn labels_are_sorted_by_name() {
        for pair in NigerianState::all().windows(2) {
            assert!(
                pair[0].name() < pair[1].name(),
                "{} should sort before {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn federal_capital_sits_at_index_one() {
        assert_eq!(NigerianState::Abuja.index(), 1);
        assert_eq!(NigerianState::from_index(1), Some(NigerianState::Abuja));
        assert_eq!(NigerianState::from_index(STATE_COUNT), None);
    }

    #[test]
    fn index_roundtrip() {
        for (i, state) in NigerianState::all().iter().enumerate() {
            assert_eq!(state.index(), i);
            assert_eq!(NigerianState::from_index(i), Some(*state));
        }
    }

    #[test]
    fn multi_word_names() {
        assert_eq!(NigerianState::AkwaIbom.to_string(), "Akwa Ibom");
        assert_eq!(
            "Cross River".parse::<NigerianState>().unwrap(),
            NigerianState::CrossRiver
        );
        assert_eq!(
            serde_json::to_string(&NigerianState::AkwaIbom).unwrap(),
            "\"Akwa Ibom\""
        );
        assert!("Atlantis".parse::<NigerianState>().is_err());
    }
}
