//!
//! Log-space probability
//!
//! Every score in a trellis is a `Prob`: the natural log of a probability,
//! with `-inf` standing for an impossible event.
//!
//! ```text
//! p + q  ->  logaddexp(log p, log q)
//! p * q  ->  log p + log q
//! p / q  ->  log p - log q
//! ```
//!
use approx::AbsDiffEq;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::cmp::Ordering;
use std::str::FromStr;

///
/// `log(exp(a) + exp(b))`
///
/// The larger operand is factored out, `a + log(1 + exp(b - a))` for
/// `a >= b`, so that no intermediate overflows. `-inf` is the identity and
/// `add_log(-inf, -inf)` is `-inf` (never NaN).
///
#[inline]
pub fn add_log(a: f64, b: f64) -> f64 {
    let (hi, lo) = if a < b { (b, a) } else { (a, b) };
    if lo == f64::NEG_INFINITY {
        hi
    } else if hi == lo {
        hi + std::f64::consts::LN_2
    } else {
        hi + (lo - hi).exp().ln_1p()
    }
}

///
/// Probability `0 <= p <= 1` stored as `log p`.
///
#[derive(Clone, Copy, Debug, SerializeDisplay, DeserializeFromStr)]
pub struct Prob(f64);

/// `Prob` from a probability
pub fn p(value: f64) -> Prob {
    Prob::from_prob(value)
}

/// `Prob` from a log probability
pub fn lp(log_value: f64) -> Prob {
    Prob::from_log_prob(log_value)
}

impl Prob {
    pub fn from_prob(value: f64) -> Prob {
        Prob(value.ln())
    }
    pub fn from_log_prob(log_value: f64) -> Prob {
        Prob(log_value)
    }
    /// `p`
    pub fn to_value(self) -> f64 {
        self.0.exp()
    }
    /// `log p`
    pub fn to_log_value(self) -> f64 {
        self.0
    }
    /// `p = 0`, i.e. `log p = -inf`
    pub fn is_zero(self) -> bool {
        self.0 == f64::NEG_INFINITY
    }
    /// `p = 1`
    pub fn is_one(self) -> bool {
        self.0 == 0.0
    }
    /// `log p` is in `[-inf, 0]`
    pub fn is_valid(self) -> bool {
        self.0 <= 0.0
    }
    pub fn zero() -> Prob {
        Prob(f64::NEG_INFINITY)
    }
    pub fn one() -> Prob {
        Prob(0.0)
    }
    ///
    /// `|log p - log q|`
    ///
    /// Two zeros are 0 apart, and a zero is infinitely far from any
    /// non-zero.
    ///
    pub fn log_diff(&self, other: Prob) -> f64 {
        if self.is_zero() || other.is_zero() {
            if self.is_zero() == other.is_zero() {
                0.0
            } else {
                f64::INFINITY
            }
        } else {
            (self.0 - other.0).abs()
        }
    }
}

impl Default for Prob {
    fn default() -> Self {
        Prob::zero()
    }
}

impl num_traits::Zero for Prob {
    fn zero() -> Self {
        Prob::zero()
    }
    fn is_zero(&self) -> bool {
        Prob::is_zero(*self)
    }
}

impl num_traits::One for Prob {
    fn one() -> Self {
        Prob::one()
    }
}

///
/// `log p` with full precision, followed by `p` for readability:
/// `-0.6931471805599453 (p=0.5000)`
///
impl std::fmt::Display for Prob {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} (p={:.4})", self.0, self.to_value())
    }
}

/// Parses the leading log value of the `Display` form (or a bare log value).
impl FromStr for Prob {
    type Err = std::num::ParseFloatError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let log_value = s.split_whitespace().next().unwrap_or(s);
        log_value.parse::<f64>().map(Prob)
    }
}

impl std::ops::Add for Prob {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Prob(add_log(self.0, rhs.0))
    }
}

impl std::ops::Mul for Prob {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Prob(self.0 + rhs.0)
    }
}

/// `0 / q = 0` for any `q`, including `0 / 0`.
impl std::ops::Div for Prob {
    type Output = Self;
    fn div(self, rhs: Self) -> Self {
        if self.is_zero() {
            self
        } else {
            Prob(self.0 - rhs.0)
        }
    }
}

impl std::ops::AddAssign for Prob {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = add_log(self.0, rhs.0);
    }
}

impl std::ops::MulAssign for Prob {
    fn mul_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl std::iter::Sum for Prob {
    fn sum<I: Iterator<Item = Prob>>(iter: I) -> Prob {
        iter.fold(Prob::zero(), std::ops::Add::add)
    }
}

impl<'a> std::iter::Sum<&'a Prob> for Prob {
    fn sum<I: Iterator<Item = &'a Prob>>(iter: I) -> Prob {
        iter.copied().sum()
    }
}

impl std::iter::Product for Prob {
    fn product<I: Iterator<Item = Prob>>(iter: I) -> Prob {
        iter.fold(Prob::one(), std::ops::Mul::mul)
    }
}

impl<'a> std::iter::Product<&'a Prob> for Prob {
    fn product<I: Iterator<Item = &'a Prob>>(iter: I) -> Prob {
        iter.copied().product()
    }
}

/// Compared in log space. All zeros are equal.
impl AbsDiffEq for Prob {
    type Epsilon = f64;
    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }
    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        (self.is_zero() && other.is_zero()) || self.0.abs_diff_eq(&other.0, epsilon)
    }
}

///
/// Total order of `f64::total_cmp` on `log p`.
///
/// `==`, `<` and `>` follow the same order as `sort` and `max`, so `-0.0`
/// and `0.0` are distinct values.
///
impl Ord for Prob {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for Prob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Prob {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Prob {}
