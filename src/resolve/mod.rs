//! Geometric inference over a label grid: circle scoring and family roll-up.

mod aggregate;
mod circle;

pub use aggregate::{FamilyHint, dominant_family};
pub use circle::{
    MIN_SIGMA, QueryCircle, ResolveParams, ScoredRegion, gaussian_sigma, resolve_circle,
};
