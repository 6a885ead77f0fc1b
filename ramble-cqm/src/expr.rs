//! Linear and quadratic expressions over binary variables.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};

use crate::sampleset::Sample;

/// A polynomial of degree at most two over binary variables.
///
/// Terms are keyed by variable label so repeated additions of the same
/// variable merge into a single coefficient. Binary variables square to
/// themselves, which callers should keep in mind when building quadratic
/// terms by hand.
///
/// # Examples
/// ```
/// use ramble_cqm::Expression;
///
/// let expr = Expression::variable("a") + Expression::term("b", 2.0);
/// assert_eq!(expr.linear_coefficient(&"a"), 1.0);
/// assert_eq!(expr.linear_coefficient(&"b"), 2.0);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(bound(
        serialize = "V: serde::Serialize",
        deserialize = "V: serde::Deserialize<'de> + Ord"
    ))
)]
pub struct Expression<V: Ord> {
    #[cfg_attr(feature = "serde", serde(with = "term_pairs"))]
    linear: BTreeMap<V, f64>,
    #[cfg_attr(feature = "serde", serde(with = "term_pairs"))]
    quadratic: BTreeMap<(V, V), f64>,
    offset: f64,
}

impl<V: Ord> Default for Expression<V> {
    fn default() -> Self {
        Self {
            linear: BTreeMap::new(),
            quadratic: BTreeMap::new(),
            offset: 0.0,
        }
    }
}

impl<V: Ord> Expression<V> {
    /// The zero expression.
    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    /// A single variable with coefficient one.
    #[must_use]
    pub fn variable(label: V) -> Self {
        Self::term(label, 1.0)
    }

    /// A single variable scaled by `coefficient`.
    #[must_use]
    pub fn term(label: V, coefficient: f64) -> Self {
        let mut linear = BTreeMap::new();
        linear.insert(label, coefficient);
        Self {
            linear,
            quadratic: BTreeMap::new(),
            offset: 0.0,
        }
    }

    /// A constant expression.
    #[must_use]
    pub fn constant(offset: f64) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    /// Add `coefficient` to the linear term for `label`.
    pub fn add_linear(&mut self, label: V, coefficient: f64) {
        *self.linear.entry(label).or_insert(0.0) += coefficient;
    }

    /// Add `coefficient` to the quadratic term for the pair `(u, v)`.
    ///
    /// The pair is stored in sorted order so `(u, v)` and `(v, u)` refer to
    /// the same term.
    pub fn add_quadratic(&mut self, u: V, v: V, coefficient: f64) {
        let key = if u <= v { (u, v) } else { (v, u) };
        *self.quadratic.entry(key).or_insert(0.0) += coefficient;
    }

    /// Add `offset` to the constant term.
    pub fn add_offset(&mut self, offset: f64) {
        self.offset += offset;
    }

    /// The constant term.
    #[must_use]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// The linear coefficient for `label`, zero when absent.
    #[must_use]
    pub fn linear_coefficient(&self, label: &V) -> f64 {
        self.linear.get(label).copied().unwrap_or(0.0)
    }

    /// Iterate over linear terms in label order.
    pub fn linear_terms(&self) -> impl Iterator<Item = (&V, f64)> {
        self.linear.iter().map(|(label, coeff)| (label, *coeff))
    }

    /// Iterate over quadratic terms in label order.
    pub fn quadratic_terms(&self) -> impl Iterator<Item = (&V, &V, f64)> {
        self.quadratic
            .iter()
            .map(|((u, v), coeff)| (u, v, *coeff))
    }

    /// True when the expression has no terms and a zero offset.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.linear.is_empty() && self.quadratic.is_empty() && self.offset == 0.0
    }

    /// Number of distinct variables mentioned.
    #[must_use]
    pub fn num_variables(&self) -> usize {
        let mut seen = BTreeSet::new();
        for label in self.linear.keys() {
            seen.insert(label);
        }
        for (u, v) in self.quadratic.keys() {
            seen.insert(u);
            seen.insert(v);
        }
        seen.len()
    }

    /// True when `label` appears in any term.
    #[must_use]
    pub fn mentions(&self, label: &V) -> bool {
        self.linear.contains_key(label)
            || self
                .quadratic
                .keys()
                .any(|(u, v)| u == label || v == label)
    }

    /// Value of the expression under `sample`; absent variables read as 0.
    #[must_use]
    pub fn evaluate(&self, sample: &Sample<V>) -> f64 {
        let mut total = self.offset;
        for (label, coeff) in &self.linear {
            total += coeff * sample.value(label);
        }
        for ((u, v), coeff) in &self.quadratic {
            total += coeff * sample.value(u) * sample.value(v);
        }
        total
    }
}

impl<V: Clone + Ord> Expression<V> {
    /// Insert every variable mentioned by the expression into `out`.
    pub fn collect_variables(&self, out: &mut BTreeSet<V>) {
        for label in self.linear.keys() {
            out.insert(label.clone());
        }
        for (u, v) in self.quadratic.keys() {
            out.insert(u.clone());
            out.insert(v.clone());
        }
    }
}

/// Sum an iterator of expressions, merging like terms.
///
/// # Examples
/// ```
/// use ramble_cqm::{Expression, quicksum};
///
/// let sum = quicksum((0..3).map(|i| Expression::variable(i)));
/// assert_eq!(sum.num_variables(), 3);
/// ```
pub fn quicksum<V: Ord, I>(terms: I) -> Expression<V>
where
    I: IntoIterator<Item = Expression<V>>,
{
    let mut total = Expression::zero();
    for term in terms {
        total += term;
    }
    total
}

impl<V: Ord> AddAssign for Expression<V> {
    fn add_assign(&mut self, rhs: Self) {
        for (label, coeff) in rhs.linear {
            *self.linear.entry(label).or_insert(0.0) += coeff;
        }
        for (key, coeff) in rhs.quadratic {
            *self.quadratic.entry(key).or_insert(0.0) += coeff;
        }
        self.offset += rhs.offset;
    }
}

impl<V: Ord> Add for Expression<V> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self += rhs;
        self
    }
}

impl<V: Ord> Sub for Expression<V> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + (-rhs)
    }
}

impl<V: Ord> Neg for Expression<V> {
    type Output = Self;

    fn neg(mut self) -> Self {
        for coeff in self.linear.values_mut() {
            *coeff = -*coeff;
        }
        for coeff in self.quadratic.values_mut() {
            *coeff = -*coeff;
        }
        self.offset = -self.offset;
        self
    }
}

impl<V: Ord> Mul<f64> for Expression<V> {
    type Output = Self;

    fn mul(mut self, rhs: f64) -> Self {
        for coeff in self.linear.values_mut() {
            *coeff *= rhs;
        }
        for coeff in self.quadratic.values_mut() {
            *coeff *= rhs;
        }
        self.offset *= rhs;
        self
    }
}

impl<V: Ord + fmt::Display> fmt::Display for Expression<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut terms: Vec<(f64, String)> = self
            .linear
            .iter()
            .map(|(label, coeff)| (*coeff, label.to_string()))
            .collect();
        terms.extend(
            self.quadratic
                .iter()
                .map(|((u, v), coeff)| (*coeff, format!("{u}*{v}"))),
        );

        if terms.is_empty() {
            return write!(f, "{}", self.offset);
        }

        for (index, (coeff, body)) in terms.iter().enumerate() {
            let magnitude = coeff.abs();
            if index == 0 {
                let sign = if *coeff < 0.0 { "-" } else { "" };
                write!(f, "{sign}{magnitude} {body}")?;
            } else {
                let sign = if *coeff < 0.0 { "-" } else { "+" };
                write!(f, " {sign} {magnitude} {body}")?;
            }
        }
        if self.offset != 0.0 {
            let sign = if self.offset < 0.0 { "-" } else { "+" };
            write!(f, " {sign} {}", self.offset.abs())?;
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
mod term_pairs {
    //! Serialize term maps as sequences of `(key, coefficient)` pairs.
    //!
    //! JSON objects require string keys; structured labels would not survive
    //! a plain map representation.

    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<K, S>(map: &BTreeMap<K, f64>, serializer: S) -> Result<S::Ok, S::Error>
    where
        K: Serialize + Ord,
        S: Serializer,
    {
        serializer.collect_seq(map.iter())
    }

    pub fn deserialize<'de, K, D>(deserializer: D) -> Result<BTreeMap<K, f64>, D::Error>
    where
        K: Deserialize<'de> + Ord,
        D: Deserializer<'de>,
    {
        let pairs: Vec<(K, f64)> = Vec::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}
