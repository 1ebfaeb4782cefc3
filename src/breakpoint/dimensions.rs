//! Per-tier dimension requests and their resolution.

use std::collections::HashMap;

use url::form_urlencoded;

use super::tier::Tier;

// =============================================================================
// Axis
// =============================================================================

/// The image axis a dimension applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Width,
    Height,
}

impl Axis {
    /// Query-key suffix for this axis (`w` or `h`).
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Width => "w",
            Axis::Height => "h",
        }
    }

    fn from_suffix(s: &str) -> Option<Axis> {
        match s {
            "w" => Some(Axis::Width),
            "h" => Some(Axis::Height),
            _ => None,
        }
    }
}

// =============================================================================
// Dimension Request
// =============================================================================

/// Dimensions requested in a query string, keyed by tier and axis.
///
/// Built from keys of the form `<tier>-<axis>`, e.g. `lg-w=400&xs-h=120`.
/// Other keys are ignored, as are values that are not positive integers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DimensionRequest {
    values: HashMap<(Tier, Axis), u32>,
}

impl DimensionRequest {
    /// Parse a raw (undecoded) query string.
    ///
    /// Pairs are percent-decoded; a later duplicate key overwrites an earlier one.
    pub fn parse(query: &str) -> Self {
        let mut values = HashMap::new();

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let Some(slot) = parse_key(&key) else {
                continue;
            };
            match parse_pixels(&value) {
                Some(pixels) => {
                    values.insert(slot, pixels);
                }
                // A malformed later value still overrides an earlier good one.
                None => {
                    values.remove(&slot);
                }
            }
        }

        Self { values }
    }

    /// The value explicitly set for `tier` and `axis`, without fallback.
    pub fn get(&self, tier: Tier, axis: Axis) -> Option<u32> {
        self.values.get(&(tier, axis)).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }
}

fn parse_key(key: &str) -> Option<(Tier, Axis)> {
    let (tier, axis) = key.split_once('-')?;
    Some((tier.parse().ok()?, Axis::from_suffix(axis)?))
}

fn parse_pixels(value: &str) -> Option<u32> {
    value.trim().parse::<u32>().ok().filter(|&px| px > 0)
}

// =============================================================================
// Resolution
// =============================================================================

/// Resolve a single axis for `tier`, walking toward larger tiers.
///
/// Returns the first value found along `tier → … → lg`, or `None`.
pub fn resolve_dimension(tier: Tier, params: &DimensionRequest, axis: Axis) -> Option<u32> {
    tier.fallback_chain()
        .find_map(|candidate| params.get(candidate, axis))
}

/// Resolve both axes for `tier`.
pub fn resolve_dimensions(tier: Tier, params: &DimensionRequest) -> ResolvedDimensions {
    ResolvedDimensions {
        width: resolve_dimension(tier, params, Axis::Width),
        height: resolve_dimension(tier, params, Axis::Height),
    }
}

/// Target dimensions for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ResolvedDimensions {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

impl ResolvedDimensions {
    pub fn new(width: Option<u32>, height: Option<u32>) -> Self {
        Self { width, height }
    }

    /// Pick the transform for these dimensions.
    ///
    /// Equal width and height crop a centered square; unequal ones fit the
    /// image inside the box; anything less leaves the image untouched.
    pub fn transform(&self) -> Transform {
        match (self.width, self.height) {
            (Some(width), Some(height)) if width == height => Transform::Crop { side: width },
            (Some(width), Some(height)) => Transform::Resize { width, height },
            _ => Transform::Passthrough,
        }
    }
}

/// How a source image is turned into the served variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transform {
    /// Center-anchored square of exactly `side × side`.
    Crop { side: u32 },

    /// Aspect-preserving fit inside `width × height`.
    Resize { width: u32, height: u32 },

    /// Serve the source as stored.
    Passthrough,
}

impl Transform {
    /// Short label for logs and headers.
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Crop { .. } => "crop",
            Transform::Resize { .. } => "resize",
            Transform::Passthrough => "passthrough",
        }
    }

    /// Largest output side this transform would produce, if it resamples.
    pub fn max_side(&self) -> Option<u32> {
        match *self {
            Transform::Crop { side } => Some(side),
            Transform::Resize { width, height } => Some(width.max(height)),
            Transform::Passthrough => None,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
