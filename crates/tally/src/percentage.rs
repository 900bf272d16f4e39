use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};

/// Unit of progress.
///
/// Stored in fraction form, `0.0` to `1.0` being the natural bounds. The type itself does not clamp,
/// so values outside of that range survive a round-trip through the conversions.
#[derive(Debug, Clone, Copy, Default)]
pub struct Percentage {
    fraction: f64,
}

impl Percentage {
    pub const ZERO: Self = Self::from_fraction(0.0);
    pub const FULL: Self = Self::from_fraction(1.0);

    /// e.g. `0.75` for 75%
    pub const fn from_fraction(fraction: f64) -> Self {
        Self {
            fraction,
        }
    }

    /// e.g. `75.0` for 75%
    pub fn from_value(value: f64) -> Self {
        Self::from_fraction(value / 100.0)
    }

    pub fn fraction(self) -> f64 {
        self.fraction
    }

    pub fn value(self) -> f64 {
        self.fraction * 100.0
    }

    fn canonical_bits(self) -> u64 {
        if self.fraction.is_nan() {
            f64::NAN.to_bits()
        } else if self.fraction == 0.0 {
            // folds -0.0 into 0.0
            0.0_f64.to_bits()
        } else {
            self.fraction.to_bits()
        }
    }
}

impl Display for Percentage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1}%", self.value())
    }
}

/// NaN is equal to NaN and lower than any number.
impl Ord for Percentage {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.fraction.is_nan(), other.fraction.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self
                .fraction
                .partial_cmp(&other.fraction)
                .unwrap_or(Ordering::Equal),
        }
    }
}

impl PartialOrd for Percentage {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Percentage {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Percentage {}

impl Hash for Percentage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical_bits().hash(state)
    }
}
