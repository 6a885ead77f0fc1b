//! Samples and sample sets returned by solvers.

use std::cmp::Ordering;
use std::collections::BTreeMap;

/// An assignment of binary variables to values.
///
/// Variables absent from the sample read as zero, matching the convention of
/// sparse solver answers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "V: serde::Deserialize<'de> + Ord"), transparent)
)]
pub struct Sample<V: Ord> {
    // Serialized as a JSON object, so labels must render as strings.
    values: BTreeMap<V, bool>,
}

impl<V: Ord> Sample<V> {
    /// The empty assignment.
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Assign `value` to `label`, replacing any previous assignment.
    pub fn set(&mut self, label: V, value: bool) {
        self.values.insert(label, value);
    }

    /// The assignment for `label`, if present.
    #[must_use]
    pub fn get(&self, label: &V) -> Option<bool> {
        self.values.get(label).copied()
    }

    /// The assignment for `label` as 0.0 or 1.0; absent variables read as 0.
    #[must_use]
    pub fn value(&self, label: &V) -> f64 {
        if self.values.get(label).copied().unwrap_or(false) {
            1.0
        } else {
            0.0
        }
    }

    /// Iterate over labels assigned the value one, in label order.
    pub fn ones(&self) -> impl Iterator<Item = &V> {
        self.values
            .iter()
            .filter(|(_, value)| **value)
            .map(|(label, _)| label)
    }

    /// Number of assigned variables, including zeros.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when no variable is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<V: Ord> FromIterator<(V, bool)> for Sample<V> {
    fn from_iter<I: IntoIterator<Item = (V, bool)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// One solver answer: a sample with its energy and feasibility verdict.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(bound(deserialize = "V: serde::Deserialize<'de> + Ord")))]
pub struct SampleRecord<V: Ord> {
    /// The variable assignment.
    pub sample: Sample<V>,
    /// Objective value of the assignment.
    pub energy: f64,
    /// Whether every hard constraint holds under the assignment.
    pub is_feasible: bool,
}

/// An energy-ordered collection of solver answers.
///
/// # Examples
/// ```
/// use ramble_cqm::{Sample, SampleRecord, SampleSet};
///
/// let records = vec![
///     SampleRecord { sample: Sample::from_iter([("a", true)]), energy: 2.0, is_feasible: true },
///     SampleRecord { sample: Sample::from_iter([("a", false)]), energy: -1.0, is_feasible: false },
/// ];
/// let set = SampleSet::new(records);
/// assert_eq!(set.first().map(|r| r.energy), Some(-1.0));
/// assert_eq!(set.best_feasible().map(|r| r.energy), Some(2.0));
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(deserialize = "V: serde::Deserialize<'de> + Ord"), transparent)
)]
pub struct SampleSet<V: Ord> {
    records: Vec<SampleRecord<V>>,
}

impl<V: Ord> SampleSet<V> {
    /// Build a sample set, ordering records by ascending energy.
    #[must_use]
    pub fn new(mut records: Vec<SampleRecord<V>>) -> Self {
        records.sort_by(|lhs, rhs| {
            lhs.energy
                .partial_cmp(&rhs.energy)
                .unwrap_or(Ordering::Equal)
        });
        Self { records }
    }

    /// The lowest-energy record, feasible or not.
    #[must_use]
    pub fn first(&self) -> Option<&SampleRecord<V>> {
        self.records.first()
    }

    /// The lowest-energy feasible record.
    #[must_use]
    pub fn best_feasible(&self) -> Option<&SampleRecord<V>> {
        self.records.iter().find(|record| record.is_feasible)
    }

    /// Iterate over records in energy order.
    pub fn iter(&self) -> impl Iterator<Item = &SampleRecord<V>> {
        self.records.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the set holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<V: Clone + Ord> SampleSet<V> {
    /// A copy containing only feasible records.
    #[must_use]
    pub fn filter_feasible(&self) -> Self {
        Self {
            records: self
                .records
                .iter()
                .filter(|record| record.is_feasible)
                .cloned()
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(energy: f64, is_feasible: bool) -> SampleRecord<&'static str> {
        SampleRecord {
            sample: Sample::from_iter([("a", true)]),
            energy,
            is_feasible,
        }
    }

    #[rstest]
    fn records_are_ordered_by_energy() {
        let set = SampleSet::new(vec![record(3.0, true), record(-1.0, true), record(0.5, true)]);
        let energies: Vec<f64> = set.iter().map(|r| r.energy).collect();
        assert_eq!(energies, vec![-1.0, 0.5, 3.0]);
    }

    #[rstest]
    fn best_feasible_skips_infeasible_records() {
        let set = SampleSet::new(vec![record(-2.0, false), record(1.0, true)]);
        assert_eq!(set.first().map(|r| r.energy), Some(-2.0));
        assert_eq!(set.best_feasible().map(|r| r.energy), Some(1.0));
    }

    #[rstest]
    fn filter_feasible_drops_infeasible_records() {
        let set = SampleSet::new(vec![record(-2.0, false), record(1.0, true)]);
        let feasible = set.filter_feasible();
        assert_eq!(feasible.len(), 1);
        assert!(feasible.iter().all(|r| r.is_feasible));
    }

    #[rstest]
    fn ones_lists_set_variables() {
        let sample = Sample::from_iter([("a", true), ("b", false), ("c", true)]);
        let ones: Vec<&&str> = sample.ones().collect();
        assert_eq!(ones, vec![&"a", &"c"]);
    }

    #[cfg(feature = "serde")]
    #[rstest]
    fn json_round_trip_preserves_records() {
        let set = SampleSet::new(vec![record(1.5, true)]);
        let json = serde_json::to_string(&set).expect("sample set should serialize");
        let back: SampleSet<String> =
            serde_json::from_str(&json).expect("sample set should deserialize");
        assert_eq!(back.len(), 1);
        assert!(back.first().is_some_and(|r| r.is_feasible));
    }
}
