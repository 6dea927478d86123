//! Static catalog of labeled body regions.
//!
//! Every region is an axis-aligned rectangle in normalized illustration
//! coordinates (`0..=1` on both axes, origin at the top-left). The catalog
//! is validated once when it is built; afterwards it is read-only and can be
//! shared freely between threads.
//!
//! # Example
//! ```ignore
//! use bodymap_engine::catalog::{BodySide, RegionCatalog};
//!
//! let catalog = RegionCatalog::builtin();
//! let abs = catalog.region(209).unwrap();
//! assert_eq!(abs.name_primary, "Rectus Abdominis");
//! assert_eq!(catalog.side_of(209), Some(BodySide::Front));
//! ```

mod data;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selection::SelectionError;

/// Errors detected while building a [`RegionCatalog`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    /// Id `0` marks background pixels in the label grid.
    #[error("region id 0 is reserved for background")]
    ReservedId,
    /// The same id appears twice (on one side or across both sides).
    #[error("region id {0} is declared more than once")]
    DuplicateId(u16),
    /// Box corners are not ordered (`x1 < x2`, `y1 < y2`) or not finite.
    #[error("region {id} has an inverted or empty box {bounds:?}")]
    InvertedBox { id: u16, bounds: [f64; 4] },
    /// Box leaves the normalized `[0, 1]` square.
    #[error("region {id} box {bounds:?} is outside the unit square")]
    OutOfRange { id: u16, bounds: [f64; 4] },
}

/// The two body illustrations a gesture can be drawn on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodySide {
    Front,
    Back,
}

impl BodySide {
    pub const ALL: [Self; 2] = [Self::Front, Self::Back];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Front => "front",
            Self::Back => "back",
        }
    }

    /// Slot used by per-side tables.
    pub(crate) const fn index(self) -> usize {
        match self {
            Self::Front => 0,
            Self::Back => 1,
        }
    }
}

impl fmt::Display for BodySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BodySide {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            _ => Err(SelectionError::UnknownSide(s.to_owned())),
        }
    }
}

/// Axis-aligned rectangle in normalized coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct NormBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl NormBox {
    #[must_use]
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[must_use]
    pub const fn from_array(arr: [f64; 4]) -> Self {
        Self::new(arr[0], arr[1], arr[2], arr[3])
    }

    #[must_use]
    pub const fn to_array(self) -> [f64; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Midpoint of the box, still normalized.
    #[must_use]
    pub fn center(self) -> (f64, f64) {
        ((self.x1 + self.x2) / 2.0, (self.y1 + self.y2) / 2.0)
    }

    fn is_ordered(self) -> bool {
        self.to_array().iter().all(|v| v.is_finite()) && self.x1 < self.x2 && self.y1 < self.y2
    }

    fn is_in_unit_square(self) -> bool {
        self.to_array().iter().all(|v| (0.0..=1.0).contains(v))
    }
}

impl From<[f64; 4]> for NormBox {
    fn from(arr: [f64; 4]) -> Self {
        Self::from_array(arr)
    }
}

impl From<NormBox> for [f64; 4] {
    fn from(bounds: NormBox) -> Self {
        bounds.to_array()
    }
}

/// One catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RegionDef {
    /// Nonzero id, unique across both sides.
    pub id: u16,
    /// English display name.
    pub name_primary: &'static str,
    /// Arabic display name.
    pub name_secondary: &'static str,
    /// Coarse grouping used for the region hint, e.g. `"Shoulder"`.
    pub family: &'static str,
    #[serde(rename = "box")]
    pub bounds: NormBox,
}

/// Regions drawn on one illustration, in authoring order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideCatalog {
    pub image: &'static str,
    pub regions: Vec<RegionDef>,
}

impl SideCatalog {
    #[must_use]
    pub fn new(image: &'static str, regions: Vec<RegionDef>) -> Self {
        Self { image, regions }
    }
}

/// Validated, immutable region table for both body sides.
#[derive(Debug, Clone)]
pub struct RegionCatalog {
    sides: [SideCatalog; 2],
    by_id: BTreeMap<u16, (BodySide, usize)>,
}

impl RegionCatalog {
    /// Validates both sides and builds the id index.
    pub fn new(front: SideCatalog, back: SideCatalog) -> Result<Self, CatalogError> {
        let sides = [front, back];
        let mut by_id = BTreeMap::new();

        for side in BodySide::ALL {
            for (index, def) in sides[side.index()].regions.iter().enumerate() {
                validate_region(def)?;
                if by_id.insert(def.id, (side, index)).is_some() {
                    return Err(CatalogError::DuplicateId(def.id));
                }
            }
        }

        Ok(Self { sides, by_id })
    }

    /// The hand-authored catalog shipped with the crate.
    ///
    /// Built on first access. An invalid built-in table is a programming
    /// error and aborts construction.
    pub fn builtin() -> &'static RegionCatalog {
        static INSTANCE: OnceLock<RegionCatalog> = OnceLock::new();
        INSTANCE.get_or_init(|| {
            let front = SideCatalog::new(data::FRONT_IMAGE, data::FRONT_REGIONS.to_vec());
            let back = SideCatalog::new(data::BACK_IMAGE, data::BACK_REGIONS.to_vec());
            Self::new(front, back)
                .unwrap_or_else(|err| panic!("built-in region catalog is invalid: {err}"))
        })
    }

    /// Regions of one side in authoring order.
    #[must_use]
    pub fn regions(&self, side: BodySide) -> &[RegionDef] {
        &self.sides[side.index()].regions
    }

    /// Name of the illustration the side's boxes were authored against.
    #[must_use]
    pub fn image(&self, side: BodySide) -> &'static str {
        self.sides[side.index()].image
    }

    /// Looks up a region by id, regardless of side.
    #[must_use]
    pub fn region(&self, id: u16) -> Option<&RegionDef> {
        let (side, index) = *self.by_id.get(&id)?;
        self.sides[side.index()].regions.get(index)
    }

    #[must_use]
    pub fn side_of(&self, id: u16) -> Option<BodySide> {
        self.by_id.get(&id).map(|(side, _)| *side)
    }

    /// Total number of regions over both sides.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

fn validate_region(def: &RegionDef) -> Result<(), CatalogError> {
    if def.id == 0 {
        return Err(CatalogError::ReservedId);
    }
    let bounds = def.bounds.to_array();
    if !def.bounds.is_ordered() {
        return Err(CatalogError::InvertedBox { id: def.id, bounds });
    }
    if !def.bounds.is_in_unit_square() {
        return Err(CatalogError::OutOfRange { id: def.id, bounds });
    }
    Ok(())
}
