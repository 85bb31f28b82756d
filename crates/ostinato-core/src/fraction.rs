use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Exact rational time. All positions on the cycle timeline are fractions,
/// so nested subdivisions never accumulate floating point error.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Fraction {
    pub numerator: i64,
    pub denominator: i64,
}

impl Fraction {
    /// Creates a new fraction, normalized to lowest terms with a positive
    /// denominator.
    ///
    /// # Panics
    ///
    /// Panics if `denominator` is zero.
    pub fn new(numerator: i64, denominator: i64) -> Self {
        if denominator == 0 {
            panic!("Fraction denominator cannot be zero");
        }
        let mut f = Fraction {
            numerator,
            denominator,
        };
        f.simplify();
        f
    }

    pub fn from_int(n: i64) -> Self {
        Fraction {
            numerator: n,
            denominator: 1,
        }
    }

    /// Approximates a float to microcycle resolution. Good enough for
    /// wall-clock conversions; exact pattern math should stay in fractions.
    pub fn from_float(value: f64) -> Self {
        const PRECISION: i64 = 1_000_000;
        Fraction::new((value * PRECISION as f64).round() as i64, PRECISION)
    }

    pub fn to_float(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    fn simplify(&mut self) {
        if self.denominator < 0 {
            self.numerator = -self.numerator;
            self.denominator = -self.denominator;
        }
        let g = gcd(self.numerator.abs(), self.denominator);
        if g > 1 {
            self.numerator /= g;
            self.denominator /= g;
        }
    }

    /// Largest integer cycle at or below this time. Uses euclidean division
    /// so negative times round toward negative infinity.
    pub fn floor(&self) -> Self {
        Fraction::from_int(self.numerator.div_euclid(self.denominator))
    }

    pub fn ceil(&self) -> Self {
        let d = self.numerator.div_euclid(self.denominator);
        if self.numerator.rem_euclid(self.denominator) == 0 {
            Fraction::from_int(d)
        } else {
            Fraction::from_int(d + 1)
        }
    }

    /// Position within the current cycle, always in `[0, 1)`.
    pub fn cycle_pos(&self) -> Self {
        *self - self.floor()
    }

    pub fn is_zero(&self) -> bool {
        self.numerator == 0
    }

    pub fn is_negative(&self) -> bool {
        self.numerator < 0
    }

    pub fn abs(&self) -> Self {
        Fraction {
            numerator: self.numerator.abs(),
            denominator: self.denominator,
        }
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

impl Add for Fraction {
    type Output = Fraction;

    fn add(self, other: Fraction) -> Fraction {
        Fraction::new(
            self.numerator * other.denominator + other.numerator * self.denominator,
            self.denominator * other.denominator,
        )
    }
}

impl Sub for Fraction {
    type Output = Fraction;

    fn sub(self, other: Fraction) -> Fraction {
        Fraction::new(
            self.numerator * other.denominator - other.numerator * self.denominator,
            self.denominator * other.denominator,
        )
    }
}

impl Mul for Fraction {
    type Output = Fraction;

    fn mul(self, other: Fraction) -> Fraction {
        Fraction::new(
            self.numerator * other.numerator,
            self.denominator * other.denominator,
        )
    }
}

impl Div for Fraction {
    type Output = Fraction;

    fn div(self, other: Fraction) -> Fraction {
        Fraction::new(
            self.numerator * other.denominator,
            self.denominator * other.numerator,
        )
    }
}

impl Neg for Fraction {
    type Output = Fraction;

    fn neg(self) -> Fraction {
        Fraction {
            numerator: -self.numerator,
            denominator: self.denominator,
        }
    }
}

impl PartialEq for Fraction {
    fn eq(&self, other: &Self) -> bool {
        self.numerator * other.denominator == other.numerator * self.denominator
    }
}

impl Eq for Fraction {}

impl PartialOrd for Fraction {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Fraction {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.numerator * other.denominator).cmp(&(other.numerator * self.denominator))
    }
}

impl From<i64> for Fraction {
    fn from(n: i64) -> Self {
        Fraction::from_int(n)
    }
}

impl From<f64> for Fraction {
    fn from(value: f64) -> Self {
        Fraction::from_float(value)
    }
}

impl fmt::Display for Fraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denominator == 1 {
            write!(f, "{}", self.numerator)
        } else {
            write!(f, "{}/{}", self.numerator, self.denominator)
        }
    }
}
