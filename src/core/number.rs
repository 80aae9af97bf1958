//! Exact rational constants.
//!
//! Every `Constant` node carries a [`Number`], an arbitrary-precision rational.
//! Conversions are explicit (`from_i64`, `from_f64`, `from_rational`); there are
//! no implicit numeric conversions into the expression tree.

use std::fmt;

use num_bigint::BigInt;
use num_integer::Roots;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// Largest integer exponent folded exactly by [`Number::checked_pow`].
pub const MAX_EXACT_POWER: u32 = 64;

/// Largest root degree folded exactly by [`Number::checked_pow`].
pub const MAX_ROOT_DEGREE: u32 = 64;

/// An exact rational number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Number(BigRational);

impl Number {
    /// The integer `n`
    #[must_use]
    pub fn from_i64(n: i64) -> Self {
        Self(BigRational::from_integer(BigInt::from(n)))
    }

    /// `numer / denom`, normalized. Returns `None` for a zero denominator.
    #[must_use]
    pub fn from_fraction(numer: i64, denom: i64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        Some(Self(BigRational::new(BigInt::from(numer), BigInt::from(denom))))
    }

    /// Wrap an existing rational
    #[must_use]
    pub const fn from_rational(r: BigRational) -> Self {
        Self(r)
    }

    /// The exact binary value of a finite float. `None` for NaN or infinities.
    #[must_use]
    pub fn from_f64(f: f64) -> Option<Self> {
        BigRational::from_float(f).map(Self)
    }

    /// Parse a decimal literal such as `12`, `0.25` or `3.` exactly.
    #[must_use]
    pub fn parse_decimal(text: &str) -> Option<Self> {
        let (int_part, frac_part) = match text.split_once('.') {
            Some((i, f)) => (i, f),
            None => (text, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return None;
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        let digits = format!("{int_part}{frac_part}");
        let numer: BigInt = digits.parse().ok()?;
        let scale = u32::try_from(frac_part.len()).ok()?;
        let denom = BigInt::from(10u32).pow(scale);
        Some(Self(BigRational::new(numer, denom)))
    }

    #[must_use]
    pub fn zero() -> Self {
        Self(BigRational::zero())
    }

    #[must_use]
    pub fn one() -> Self {
        Self(BigRational::one())
    }

    #[must_use]
    pub fn minus_one() -> Self {
        Self::from_i64(-1)
    }

    /// Borrow the underlying rational
    #[must_use]
    pub const fn as_rational(&self) -> &BigRational {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn is_one(&self) -> bool {
        self.0.is_one()
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.0.is_integer()
    }

    /// The value as an `i64` when it is an integer that fits.
    #[must_use]
    pub fn to_i64(&self) -> Option<i64> {
        if self.0.is_integer() {
            self.0.to_integer().to_i64()
        } else {
            None
        }
    }

    /// Nearest `f64` (may round for large numerators/denominators).
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.0.to_f64().unwrap_or_else(|| {
            let n = self.0.numer().to_f64().unwrap_or(f64::NAN);
            let d = self.0.denom().to_f64().unwrap_or(f64::NAN);
            n / d
        })
    }

    /// -1, 0 or 1 according to the sign
    #[must_use]
    pub fn signum(&self) -> Self {
        Self(self.0.signum())
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    #[must_use]
    pub fn add(&self, other: &Self) -> Self {
        Self(&self.0 + &other.0)
    }

    #[must_use]
    pub fn mul(&self, other: &Self) -> Self {
        Self(&self.0 * &other.0)
    }

    #[must_use]
    pub fn neg(&self) -> Self {
        Self(-&self.0)
    }

    /// Multiplicative inverse, `None` for zero
    #[must_use]
    pub fn recip(&self) -> Option<Self> {
        if self.0.is_zero() {
            None
        } else {
            Some(Self(self.0.recip()))
        }
    }

    /// `self ^ exp` when the result is an exactly representable rational.
    ///
    /// Integer exponents are folded up to [`MAX_EXACT_POWER`] in magnitude.
    /// Fractional exponents `p/q` fold when `q <= MAX_ROOT_DEGREE` and the
    /// `q`-th roots of numerator and denominator are exact integers.
    #[must_use]
    pub fn checked_pow(&self, exp: &Self) -> Option<Self> {
        let q = exp.0.denom().to_u32()?;
        if q > MAX_ROOT_DEGREE {
            return None;
        }
        let p = exp.0.numer().to_i64()?;
        if p.unsigned_abs() > u64::from(MAX_EXACT_POWER) {
            return None;
        }
        if self.0.is_zero() {
            return if p > 0 { Some(Self::zero()) } else { None };
        }

        let root = if q == 1 {
            self.0.clone()
        } else {
            if self.0.is_negative() && q % 2 == 0 {
                return None;
            }
            let numer = exact_root(self.0.numer(), q)?;
            let denom = exact_root(self.0.denom(), q)?;
            BigRational::new(numer, denom)
        };

        let magnitude = u32::try_from(p.unsigned_abs()).ok()?;
        let raised = BigRational::new(
            root.numer().pow(magnitude),
            root.denom().pow(magnitude),
        );
        if p < 0 {
            Some(Self(raised.recip()))
        } else {
            Some(Self(raised))
        }
    }
}

fn exact_root(n: &BigInt, degree: u32) -> Option<BigInt> {
    let root = Roots::nth_root(n, degree);
    (root.pow(degree) == *n).then_some(root)
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_integer() {
            write!(f, "{}", self.0.numer())
        } else {
            write!(f, "{}/{}", self.0.numer(), self.0.denom())
        }
    }
}
