//! Locomotion modes and their per-mode coefficients.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A way of covering a leg.
///
/// The variants carry the structural rules the model builder needs: driving
/// is barred on toll legs, and self-powered modes are subject to the slope
/// limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Locomotion {
    /// On foot.
    Walk,
    /// By bicycle.
    Cycle,
    /// By bus.
    Bus,
    /// By car.
    Drive,
}

impl Locomotion {
    /// All modes, in display order.
    pub const ALL: [Self; 4] = [Self::Walk, Self::Cycle, Self::Bus, Self::Drive];

    /// The lowercase mode name used in variable labels.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Cycle => "cycle",
            Self::Bus => "bus",
            Self::Drive => "drive",
        }
    }

    /// True when the mode cannot be used on a toll leg.
    #[must_use]
    pub const fn barred_by_toll(self) -> bool {
        matches!(self, Self::Drive)
    }

    /// True when the mode is capped by the per-leg slope limit.
    #[must_use]
    pub const fn slope_limited(self) -> bool {
        matches!(self, Self::Walk | Self::Cycle)
    }
}

impl fmt::Display for Locomotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error from parsing an unknown mode name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown locomotion mode: {0}")]
pub struct ParseLocomotionError(pub String);

impl FromStr for Locomotion {
    type Err = ParseLocomotionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walk" => Ok(Self::Walk),
            "cycle" => Ok(Self::Cycle),
            "bus" => Ok(Self::Bus),
            "drive" => Ok(Self::Drive),
            other => Err(ParseLocomotionError(other.to_owned())),
        }
    }
}

/// Errors from [`ModeProfile::new`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// Speed must be strictly positive; it divides leg lengths.
    #[error("mode speed must be positive")]
    NonPositiveSpeed,
    /// Cost coefficients are per unit length and cannot be negative.
    #[error("mode cost must not be negative")]
    NegativeCost,
    /// Exercise coefficients are per unit length and cannot be negative.
    #[error("mode exercise must not be negative")]
    NegativeExercise,
}

/// Per-mode coefficients: speed, cost and exercise per unit of leg length.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ModeProfile {
    /// Distance covered per unit time.
    pub speed: f64,
    /// Cost per unit length.
    pub cost: f64,
    /// Exercise per unit length per unit of climb.
    pub exercise: f64,
}

impl ModeProfile {
    /// Validate and construct a profile.
    ///
    /// # Errors
    /// Returns a [`TransportError`] describing the first invalid coefficient.
    pub fn new(speed: f64, cost: f64, exercise: f64) -> Result<Self, TransportError> {
        if !(speed > 0.0) {
            return Err(TransportError::NonPositiveSpeed);
        }
        if !(cost >= 0.0) {
            return Err(TransportError::NegativeCost);
        }
        if !(exercise >= 0.0) {
            return Err(TransportError::NegativeExercise);
        }
        Ok(Self {
            speed,
            cost,
            exercise,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
struct ModeEntry {
    profile: ModeProfile,
    enabled: bool,
}

/// The set of locomotion modes available to a tour, with enable flags.
///
/// Disabled modes keep their profile but are invisible to the model builder
/// and the budget estimator.
///
/// # Examples
/// ```
/// use ramble_core::{Locomotion, TransportTable};
///
/// let mut table = TransportTable::default();
/// table.set_enabled(Locomotion::Drive, false);
/// assert_eq!(table.num_enabled(), 3);
/// assert!(table.profile(Locomotion::Drive).is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransportTable {
    entries: BTreeMap<Locomotion, ModeEntry>,
}

impl Default for TransportTable {
    /// The stock table: walk 1/0/1, cycle 3/2/2, bus 4/3/0, drive 7/5/0
    /// (speed/cost/exercise), all enabled.
    fn default() -> Self {
        let entries = [
            (Locomotion::Walk, (1.0, 0.0, 1.0)),
            (Locomotion::Cycle, (3.0, 2.0, 2.0)),
            (Locomotion::Bus, (4.0, 3.0, 0.0)),
            (Locomotion::Drive, (7.0, 5.0, 0.0)),
        ]
        .into_iter()
        .map(|(mode, (speed, cost, exercise))| {
            (
                mode,
                ModeEntry {
                    profile: ModeProfile {
                        speed,
                        cost,
                        exercise,
                    },
                    enabled: true,
                },
            )
        })
        .collect();
        Self { entries }
    }
}

impl TransportTable {
    /// A table with no modes at all.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Insert or replace a mode's profile, enabling it.
    pub fn set_profile(&mut self, mode: Locomotion, profile: ModeProfile) {
        self.entries.insert(
            mode,
            ModeEntry {
                profile,
                enabled: true,
            },
        );
    }

    /// Builder-style [`Self::set_profile`].
    #[must_use]
    pub fn with_profile(mut self, mode: Locomotion, profile: ModeProfile) -> Self {
        self.set_profile(mode, profile);
        self
    }

    /// Enable or disable a mode already in the table; unknown modes are
    /// ignored.
    pub fn set_enabled(&mut self, mode: Locomotion, enabled: bool) {
        if let Some(entry) = self.entries.get_mut(&mode) {
            entry.enabled = enabled;
        }
    }

    /// Builder-style [`Self::set_enabled`].
    #[must_use]
    pub fn with_enabled(mut self, mode: Locomotion, enabled: bool) -> Self {
        self.set_enabled(mode, enabled);
        self
    }

    /// The profile for `mode`, `None` when absent or disabled.
    #[must_use]
    pub fn profile(&self, mode: Locomotion) -> Option<&ModeProfile> {
        self.entries
            .get(&mode)
            .filter(|entry| entry.enabled)
            .map(|entry| &entry.profile)
    }

    /// True when `mode` is present and enabled.
    #[must_use]
    pub fn is_enabled(&self, mode: Locomotion) -> bool {
        self.entries.get(&mode).is_some_and(|entry| entry.enabled)
    }

    /// Iterate over enabled modes in display order.
    pub fn enabled_modes(&self) -> impl Iterator<Item = Locomotion> + '_ {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.enabled)
            .map(|(mode, _)| *mode)
    }

    /// Iterate over enabled `(mode, profile)` pairs in display order.
    pub fn enabled_profiles(&self) -> impl Iterator<Item = (Locomotion, &ModeProfile)> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.enabled)
            .map(|(mode, entry)| (*mode, &entry.profile))
    }

    /// Number of enabled modes.
    #[must_use]
    pub fn num_enabled(&self) -> usize {
        self.enabled_modes().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn default_table_enables_all_four_modes() {
        let table = TransportTable::default();
        assert_eq!(table.num_enabled(), 4);
        let modes: Vec<Locomotion> = table.enabled_modes().collect();
        assert_eq!(modes, Locomotion::ALL.to_vec());
    }

    #[rstest]
    fn disabled_modes_are_hidden() {
        let table = TransportTable::default().with_enabled(Locomotion::Drive, false);
        assert!(!table.is_enabled(Locomotion::Drive));
        assert!(table.profile(Locomotion::Drive).is_none());
        assert_eq!(table.num_enabled(), 3);
    }

    #[rstest]
    fn re_enabling_restores_the_profile() {
        let mut table = TransportTable::default();
        table.set_enabled(Locomotion::Bus, false);
        table.set_enabled(Locomotion::Bus, true);
        assert_eq!(table.profile(Locomotion::Bus).map(|p| p.speed), Some(4.0));
    }

    #[rstest]
    #[case(0.0, 0.0, 0.0, TransportError::NonPositiveSpeed)]
    #[case(1.0, -1.0, 0.0, TransportError::NegativeCost)]
    #[case(1.0, 0.0, -1.0, TransportError::NegativeExercise)]
    fn profile_rejects_invalid_coefficients(
        #[case] speed: f64,
        #[case] cost: f64,
        #[case] exercise: f64,
        #[case] expected: TransportError,
    ) {
        let err = ModeProfile::new(speed, cost, exercise).expect_err("profile should be rejected");
        assert_eq!(err, expected);
    }

    #[rstest]
    fn mode_names_round_trip() {
        for mode in Locomotion::ALL {
            let parsed: Locomotion = mode.name().parse().expect("name should parse");
            assert_eq!(parsed, mode);
        }
        assert!("rocket".parse::<Locomotion>().is_err());
    }
}
