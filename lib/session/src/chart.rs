//! Renderer-agnostic chart data
//!
//! Two point sets are produced per shuffle: the items in their given order and
//! the items in tour order. Each point carries its planar coordinates, the
//! item label for hover-style identification, and its sequence position. The
//! capability profile only decides which interactions a renderer should
//! offer; it never changes the numbers.

use serde::{Deserialize, Serialize};
use smallvec::{smallvec, SmallVec};
use smartshuffle_core::{Embedding, Error, Item, Result, Tour};
use std::str::FromStr;

/// Interaction capability of the client that will render the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CapabilityProfile {
    /// Small touch screens: tap and hover only
    Constrained,
    #[default]
    Full,
}

impl CapabilityProfile {
    pub fn from_constrained(constrained: bool) -> Self {
        if constrained {
            CapabilityProfile::Constrained
        } else {
            CapabilityProfile::Full
        }
    }

    pub fn interactions(&self) -> InteractionSet {
        match self {
            CapabilityProfile::Constrained => {
                smallvec![Interaction::Hover, Interaction::Tap, Interaction::Reset]
            }
            CapabilityProfile::Full => smallvec![
                Interaction::Hover,
                Interaction::Pan,
                Interaction::WheelZoom,
                Interaction::BoxZoom,
                Interaction::Reset,
                Interaction::Save,
            ],
        }
    }
}

impl FromStr for CapabilityProfile {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "constrained" | "mobile" => Ok(CapabilityProfile::Constrained),
            "full" | "desktop" => Ok(CapabilityProfile::Full),
            other => Err(format!("unknown capability profile '{}'", other)),
        }
    }
}

/// An interactive affordance a renderer may attach to the chart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interaction {
    Hover,
    Tap,
    Pan,
    WheelZoom,
    BoxZoom,
    Reset,
    Save,
}

pub type InteractionSet = SmallVec<[Interaction; 6]>;

/// One item placed on the chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Index of the item in the input order
    pub index: usize,
    /// Position of the point within its set
    pub position: usize,
    pub x: f64,
    pub y: f64,
    pub label: String,
}

/// A named, ordered set of chart points
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartPointSet {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

impl ChartPointSet {
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.points.iter().map(|p| p.label.as_str()).collect()
    }

    /// Coordinates in sequence order, for drawing the connecting line
    pub fn path(&self) -> Vec<[f64; 2]> {
        self.points.iter().map(|p| [p.x, p.y]).collect()
    }
}

/// Both point sets plus the interactions the client can use
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub profile: CapabilityProfile,
    pub interactions: InteractionSet,
    pub original: ChartPointSet,
    pub sorted: ChartPointSet,
}

/// Converts items, embedding and tour into [`ChartData`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ChartDataAdapter {
    profile: CapabilityProfile,
}

impl ChartDataAdapter {
    pub const ORIGINAL: &'static str = "original";
    pub const SORTED: &'static str = "sorted";

    pub fn new(profile: CapabilityProfile) -> Self {
        Self { profile }
    }

    pub fn adapt(&self, items: &[Item], embedding: &Embedding, tour: &Tour) -> Result<ChartData> {
        if embedding.len() != items.len() {
            return Err(Error::CardinalityMismatch {
                items: items.len(),
                records: embedding.len(),
            });
        }
        if tour.len() != items.len() {
            return Err(Error::CardinalityMismatch {
                items: items.len(),
                records: tour.len(),
            });
        }

        let point = |position: usize, index: usize| {
            let [x, y] = embedding.point(index);
            ChartPoint {
                index,
                position,
                x,
                y,
                label: items[index].name.clone(),
            }
        };

        let original = ChartPointSet {
            name: Self::ORIGINAL.to_string(),
            points: (0..items.len()).map(|i| point(i, i)).collect(),
        };
        let sorted = ChartPointSet {
            name: Self::SORTED.to_string(),
            points: tour
                .order()
                .iter()
                .enumerate()
                .map(|(k, &i)| point(k, i))
                .collect(),
        };

        Ok(ChartData {
            profile: self.profile,
            interactions: self.profile.interactions(),
            original,
            sorted,
        })
    }
}
