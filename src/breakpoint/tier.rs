//! Viewport breakpoint tiers.

use std::fmt;
use std::str::FromStr;

/// Minimum viewport width for the `lg` tier.
pub const LG_MIN_WIDTH: f64 = 1200.0;

/// Minimum viewport width for the `md` tier.
pub const MD_MIN_WIDTH: f64 = 992.0;

/// Minimum viewport width for the `sm` tier.
pub const SM_MIN_WIDTH: f64 = 768.0;

/// Tier used when the viewport hint is missing or not a number.
pub const DEFAULT_TIER: Tier = Tier::Xs;

// =============================================================================
// Tier
// =============================================================================

/// A coarse viewport-size classification, ordered from largest to smallest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tier {
    Lg,
    Md,
    Sm,
    Xs,
}

impl Tier {
    /// All tiers, largest first.
    pub const ALL: [Tier; 4] = [Tier::Lg, Tier::Md, Tier::Sm, Tier::Xs];

    /// Classify a numeric viewport width.
    ///
    /// NaN compares false against every threshold and lands in `Xs`.
    pub fn from_width(width: f64) -> Tier {
        if width >= LG_MIN_WIDTH {
            Tier::Lg
        } else if width >= MD_MIN_WIDTH {
            Tier::Md
        } else if width >= SM_MIN_WIDTH {
            Tier::Sm
        } else {
            Tier::Xs
        }
    }

    /// Query-key prefix for this tier.
    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Lg => "lg",
            Tier::Md => "md",
            Tier::Sm => "sm",
            Tier::Xs => "xs",
        }
    }

    /// The next larger tier, or `None` for `Lg`.
    pub fn larger(self) -> Option<Tier> {
        match self {
            Tier::Lg => None,
            Tier::Md => Some(Tier::Lg),
            Tier::Sm => Some(Tier::Md),
            Tier::Xs => Some(Tier::Sm),
        }
    }

    /// Tiers searched when resolving a dimension: `self` first, then each
    /// larger tier up to and including `Lg`.
    pub fn fallback_chain(self) -> impl Iterator<Item = Tier> {
        std::iter::successors(Some(self), |tier| tier.larger())
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tier {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lg" => Ok(Tier::Lg),
            "md" => Ok(Tier::Md),
            "sm" => Ok(Tier::Sm),
            "xs" => Ok(Tier::Xs),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve the breakpoint tier for a raw viewport-size signal.
///
/// The signal is trimmed and parsed as a decimal number. A missing, empty,
/// non-numeric or non-finite signal resolves to [`DEFAULT_TIER`].
pub fn resolve_tier(signal: Option<&str>) -> Tier {
    match signal.and_then(parse_width) {
        Some(width) => Tier::from_width(width),
        None => DEFAULT_TIER,
    }
}

fn parse_width(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|width| width.is_finite())
}

// =============================================================================
// Tests
// =============================================================================
