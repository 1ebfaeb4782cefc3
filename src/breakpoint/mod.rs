//! Breakpoint resolution.
//!
//! Maps a viewport-size hint onto one of four breakpoint tiers and resolves
//! the pixel dimensions requested for that tier from the query string.
//!
//! # Tiers
//!
//! ```text
//!   viewport width   tier
//!   ≥ 1200           lg
//!   ≥ 992            md
//!   ≥ 768            sm
//!   otherwise        xs   (also: missing or unparsable hint)
//! ```
//!
//! # Fallback Walk
//!
//! Query keys have the form `<tier>-<axis>` (`lg-w`, `sm-h`, ...). When the
//! current tier has no value for an axis, the lookup walks toward larger tiers
//! only:
//!
//! ```text
//! xs ──► sm ──► md ──► lg
//! ```
//!
//! A large viewport never inherits a smaller tier's dimension.
//!
//! # Example
//!
//! ```
//! use fly_images::breakpoint::{resolve_dimension, resolve_tier, Axis, DimensionRequest, Tier};
//!
//! let tier = resolve_tier(Some("800"));
//! assert_eq!(tier, Tier::Sm);
//!
//! let params = DimensionRequest::parse("md-w=300&lg-w=600");
//! assert_eq!(resolve_dimension(tier, &params, Axis::Width), Some(300));
//! assert_eq!(resolve_dimension(tier, &params, Axis::Height), None);
//! ```

mod dimensions;
mod tier;

pub use dimensions::{
    resolve_dimension, resolve_dimensions, Axis, DimensionRequest, ResolvedDimensions, Transform,
};
pub use tier::{resolve_tier, Tier, DEFAULT_TIER, LG_MIN_WIDTH, MD_MIN_WIDTH, SM_MIN_WIDTH};
