//! Tour legs and random leg generation.

use rand::Rng;
use thiserror::Error;

/// Probability that a generated leg carries a tollbooth.
pub const TOLL_PROBABILITY: f64 = 0.2;

/// One segment of a tour.
///
/// Legs are immutable once generated; changing the tour shape regenerates
/// the whole list.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Leg {
    /// Length of the segment, strictly positive.
    pub length: f64,
    /// Climb over the segment, non-negative.
    pub uphill: f64,
    /// Whether the segment passes a tollbooth.
    pub toll: bool,
}

impl Leg {
    /// Validate and construct a leg.
    ///
    /// # Errors
    /// Returns [`LegError::NonPositiveLength`] or [`LegError::NegativeUphill`]
    /// for out-of-range values.
    pub fn new(length: f64, uphill: f64, toll: bool) -> Result<Self, LegError> {
        if !(length > 0.0) {
            return Err(LegError::NonPositiveLength);
        }
        if !(uphill >= 0.0) {
            return Err(LegError::NegativeUphill);
        }
        Ok(Self {
            length,
            uphill,
            toll,
        })
    }
}

/// Errors from leg construction and generation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LegError {
    /// A leg length of zero or less.
    #[error("leg length must be positive")]
    NonPositiveLength,
    /// A negative climb.
    #[error("leg uphill must not be negative")]
    NegativeUphill,
    /// A spec asking for zero legs.
    #[error("a tour needs at least one leg")]
    NoLegs,
    /// A spec whose length range is empty or non-positive.
    #[error("leg length range must satisfy 0 < min <= max")]
    InvalidLengthRange,
    /// A spec with a negative slope bound.
    #[error("max slope must not be negative")]
    NegativeSlope,
}

/// Shape parameters for generating a tour's legs.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LegSpec {
    /// Number of legs to generate.
    pub count: usize,
    /// Smallest allowed leg length.
    pub min_length: f64,
    /// Largest allowed leg length.
    pub max_length: f64,
    /// Upper bound on a leg's climb.
    pub max_slope: f64,
    /// Whether any leg may carry a tollbooth.
    pub tolls_enabled: bool,
}

impl Default for LegSpec {
    /// The stock tour shape: ten legs of length 2 to 10 with climbs up to 8.
    fn default() -> Self {
        Self {
            count: 10,
            min_length: 2.0,
            max_length: 10.0,
            max_slope: 8.0,
            tolls_enabled: true,
        }
    }
}

impl LegSpec {
    /// Check the spec's ranges.
    ///
    /// # Errors
    /// Returns the [`LegError`] for the first violated bound.
    pub fn validate(&self) -> Result<(), LegError> {
        if self.count == 0 {
            return Err(LegError::NoLegs);
        }
        if !(self.min_length > 0.0) || !(self.max_length >= self.min_length) {
            return Err(LegError::InvalidLengthRange);
        }
        if !(self.max_slope >= 0.0) {
            return Err(LegError::NegativeSlope);
        }
        Ok(())
    }
}

/// Generate `spec.count` random legs.
///
/// Lengths are uniform in `[min_length, max_length]`, climbs uniform in
/// `[0, max_slope]`, both rounded to one decimal place. Each leg carries a
/// tollbooth with probability [`TOLL_PROBABILITY`] unless tolls are
/// disabled.
///
/// # Errors
/// Returns a [`LegError`] when the spec's ranges are invalid.
///
/// # Examples
/// ```
/// use rand::SeedableRng;
///
/// let spec = ramble_core::LegSpec::default();
/// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
/// let legs = ramble_core::generate_legs(&spec, &mut rng)?;
/// assert_eq!(legs.len(), spec.count);
/// # Ok::<(), ramble_core::LegError>(())
/// ```
pub fn generate_legs<R: Rng + ?Sized>(spec: &LegSpec, rng: &mut R) -> Result<Vec<Leg>, LegError> {
    spec.validate()?;
    let legs = (0..spec.count)
        .map(|_| Leg {
            length: round_tenth(rng.gen_range(spec.min_length..=spec.max_length)),
            uphill: round_tenth(rng.gen_range(0.0..=spec.max_slope)),
            toll: spec.tolls_enabled && rng.gen_bool(TOLL_PROBABILITY),
        })
        .collect();
    Ok(legs)
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use rstest::rstest;

    #[rstest]
    #[case(1)]
    #[case(10)]
    #[case(100)]
    fn generates_the_requested_number_of_legs(#[case] count: usize) {
        let spec = LegSpec {
            count,
            ..LegSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let legs = generate_legs(&spec, &mut rng).expect("spec is valid");
        assert_eq!(legs.len(), count);
    }

    #[rstest]
    fn lengths_and_climbs_stay_in_bounds() {
        let spec = LegSpec {
            count: 200,
            min_length: 2.0,
            max_length: 10.0,
            max_slope: 8.0,
            tolls_enabled: true,
        };
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let legs = generate_legs(&spec, &mut rng).expect("spec is valid");
        for leg in legs {
            assert!(leg.length >= spec.min_length && leg.length <= spec.max_length);
            assert!(leg.uphill >= 0.0 && leg.uphill <= spec.max_slope);
        }
    }

    #[rstest]
    fn disabling_tolls_suppresses_tollbooths() {
        let spec = LegSpec {
            count: 200,
            tolls_enabled: false,
            ..LegSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let legs = generate_legs(&spec, &mut rng).expect("spec is valid");
        assert!(legs.iter().all(|leg| !leg.toll));
    }

    #[rstest]
    fn tolls_appear_at_roughly_the_configured_rate() {
        let spec = LegSpec {
            count: 1000,
            ..LegSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let legs = generate_legs(&spec, &mut rng).expect("spec is valid");
        let tolls = legs.iter().filter(|leg| leg.toll).count();
        assert!((100..=300).contains(&tolls), "got {tolls} tolls");
    }

    #[rstest]
    fn values_are_rounded_to_one_decimal() {
        let spec = LegSpec::default();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let legs = generate_legs(&spec, &mut rng).expect("spec is valid");
        for leg in legs {
            assert_eq!(leg.length, (leg.length * 10.0).round() / 10.0);
            assert_eq!(leg.uphill, (leg.uphill * 10.0).round() / 10.0);
        }
    }

    #[rstest]
    fn zero_count_is_rejected() {
        let spec = LegSpec {
            count: 0,
            ..LegSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(6);
        assert_eq!(
            generate_legs(&spec, &mut rng).expect_err("zero legs should be rejected"),
            LegError::NoLegs
        );
    }

    #[rstest]
    fn inverted_length_range_is_rejected() {
        let spec = LegSpec {
            min_length: 10.0,
            max_length: 2.0,
            ..LegSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        assert_eq!(
            generate_legs(&spec, &mut rng).expect_err("inverted range should be rejected"),
            LegError::InvalidLengthRange
        );
    }

    #[rstest]
    fn leg_constructor_validates_values() {
        assert_eq!(
            Leg::new(0.0, 1.0, false).expect_err("zero length should be rejected"),
            LegError::NonPositiveLength
        );
        assert_eq!(
            Leg::new(1.0, -0.1, false).expect_err("negative climb should be rejected"),
            LegError::NegativeUphill
        );
        assert!(Leg::new(1.0, 0.0, true).is_ok());
    }
}
