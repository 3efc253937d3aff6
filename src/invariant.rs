//! The error budget `f(r, n)` of the summary.
//!
//! For a tuple at rank `r` in a stream of `n` items the sum `g + delta` of
//! that tuple may not exceed `f(r, n)`. The biased invariant grants the same
//! relative error everywhere, the targeted invariant is tight near each
//! configured quantile and loose elsewhere. See Section 4 of "Effective
//! Computation of Biased Quantiles over Data Streams", Definitions 4 and 5.

use crate::error::{Error, Result};

/// A quantile of special interest and the error tolerated when querying it
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde_support", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde_support", serde(try_from = "RawTarget"))]
pub struct Target {
    quantile: f64,
    error: f64,
    // Definition 5, case i: r > quantile * n
    coefficient1: f64,
    // Definition 5, case ii: r <= quantile * n
    coefficient2: f64,
}

#[cfg(feature = "serde_support")]
#[derive(Deserialize)]
struct RawTarget {
    quantile: f64,
    error: f64,
}

#[cfg(feature = "serde_support")]
impl std::convert::TryFrom<RawTarget> for Target {
    type Error = Error;

    fn try_from(raw: RawTarget) -> Result<Target> {
        Target::new(raw.quantile, raw.error)
    }
}

fn in_unit_interval(x: f64) -> bool {
    x > 0.0 && x < 1.0
}

impl Target {
    /// Create a new Target
    ///
    /// Both `quantile` and `error` must lie strictly between 0 and 1.
    ///
    /// # Examples
    /// ```
    /// use fuzzy_quantile::Target;
    ///
    /// let p99 = Target::new(0.99, 0.001).unwrap();
    /// assert_eq!(0.99, p99.quantile());
    /// assert!(Target::new(1.0, 0.001).is_err());
    /// ```
    pub fn new(quantile: f64, error: f64) -> Result<Target> {
        if !in_unit_interval(quantile) || !in_unit_interval(error) {
            return Err(Error::InvalidTarget { quantile, error });
        }
        Ok(Target {
            quantile,
            error,
            coefficient1: 2.0 * error / quantile,
            coefficient2: 2.0 * error / (1.0 - quantile),
        })
    }

    /// The targeted quantile
    pub fn quantile(&self) -> f64 {
        self.quantile
    }

    /// The error tolerated at the targeted quantile
    pub fn error(&self) -> f64 {
        self.error
    }

    fn bound(&self, r: u64, n: u64) -> f64 {
        if r <= (self.quantile * n as f64) as u64 {
            self.coefficient2 * n.saturating_sub(r) as f64
        } else {
            self.coefficient1 * r as f64
        }
    }
}

/// The invariant function, selected once at construction
///
/// Only obtainable through `Invariant::biased` and `Invariant::targeted`, so
/// every `Invariant` in existence has been validated.
#[derive(Debug, Clone, PartialEq)]
pub struct Invariant {
    kind: Kind,
}

#[derive(Debug, Clone, PartialEq)]
enum Kind {
    Biased { epsilon: f64 },
    Targeted(Vec<Target>),
}

impl Invariant {
    /// Create a biased invariant with error `epsilon`
    ///
    /// `epsilon` must lie strictly between 0 and 1.
    pub fn biased(epsilon: f64) -> Result<Invariant> {
        if !in_unit_interval(epsilon) {
            return Err(Error::InvalidEpsilon { epsilon });
        }
        Ok(Invariant {
            kind: Kind::Biased { epsilon },
        })
    }

    /// Create a targeted invariant over `targets`
    ///
    /// At least one target is required.
    pub fn targeted(targets: Vec<Target>) -> Result<Invariant> {
        if targets.is_empty() {
            return Err(Error::NoTargets);
        }
        Ok(Invariant {
            kind: Kind::Targeted(targets),
        })
    }

    /// The relative error in biased mode, `None` in targeted mode
    pub fn epsilon(&self) -> Option<f64> {
        match self.kind {
            Kind::Biased { epsilon } => Some(epsilon),
            Kind::Targeted(_) => None,
        }
    }

    /// The targets in targeted mode, empty in biased mode
    pub fn targets(&self) -> &[Target] {
        match self.kind {
            Kind::Biased { .. } => &[],
            Kind::Targeted(ref targets) => &targets[..],
        }
    }

    /// Evaluate `f(r, n)`
    ///
    /// # Examples
    /// ```
    /// use fuzzy_quantile::Invariant;
    ///
    /// let inv = Invariant::biased(0.01).unwrap();
    /// assert_eq!(20.0, inv.bound(1000, 5000));
    /// ```
    pub fn bound(&self, r: u64, n: u64) -> f64 {
        match self.kind {
            Kind::Biased { epsilon } => 2.0 * epsilon * r as f64,
            Kind::Targeted(ref targets) => targets
                .iter()
                .map(|t| t.bound(r, n))
                .fold((n + 1) as f64, f64::min),
        }
    }

    /// `floor(f(r, n))`, the integral budget for `g + delta`
    pub fn threshold(&self, r: u64, n: u64) -> u64 {
        self.bound(r, n).floor() as u64
    }

    /// The tightest error this invariant guarantees
    ///
    /// This is ε in biased mode and the smallest target error in targeted
    /// mode. It drives the sizing of the insertion buffer.
    pub fn effective_epsilon(&self) -> f64 {
        match self.kind {
            Kind::Biased { epsilon } => epsilon,
            Kind::Targeted(ref targets) => targets
                .iter()
                .map(Target::error)
                .fold(::std::f64::INFINITY, f64::min),
        }
    }
}
