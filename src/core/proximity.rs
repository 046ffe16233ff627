//! "Is any other point within r meters" flags over planar coordinates.
//!
//! Two interchangeable strategies share one contract: entry `i` is flagged
//! for radius `r` iff some `j != i` has `distance(i, j) <= r`. Points with a
//! non-finite coordinate are never flagged and never flag anyone.

use crate::domain::model::Point;
use crate::utils::error::{Result, SpatialError};
use rstar::primitives::GeomWithData;
use rstar::RTree;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProximityStrategy {
    /// Full N×N distance matrix.
    #[default]
    Matrix,
    /// R-tree radius queries, for inputs too large for the matrix.
    Rtree,
}

impl FromStr for ProximityStrategy {
    type Err = SpatialError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "matrix" => Ok(Self::Matrix),
            "rtree" => Ok(Self::Rtree),
            other => Err(SpatialError::InvalidConfigValueError {
                field: "strategy".to_string(),
                value: other.to_string(),
                reason: "Valid values: matrix, rtree".to_string(),
            }),
        }
    }
}

/// Symmetric pairwise distances, diagonal fixed at +∞.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    values: Vec<f64>,
}

impl DistanceMatrix {
    pub fn compute(points: &[Point]) -> Self {
        let size = points.len();
        let mut values = vec![f64::INFINITY; size * size];

        for i in 0..size {
            for j in (i + 1)..size {
                let d = points[i].distance(&points[j]);
                values[i * size + j] = d;
                values[j * size + i] = d;
            }
        }

        Self { size, values }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.size + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.size..(i + 1) * self.size]
    }

    /// One 0/1 entry per point; NaN distances compare false.
    pub fn within(&self, radius: f64) -> Vec<u8> {
        (0..self.size)
            .map(|i| u8::from(self.row(i).iter().any(|&d| d <= radius)))
            .collect()
    }
}

/// Flags for each radius, in the order given.
pub fn proximity_flags(
    points: &[Point],
    radii: &[u32],
    strategy: ProximityStrategy,
) -> Vec<(u32, Vec<u8>)> {
    match strategy {
        ProximityStrategy::Matrix => {
            let matrix = DistanceMatrix::compute(points);
            tracing::debug!("Built {}x{} distance matrix", matrix.len(), matrix.len());
            radii
                .iter()
                .map(|&r| (r, matrix.within(f64::from(r))))
                .collect()
        }
        ProximityStrategy::Rtree => {
            let index = PointIndex::build(points);
            radii
                .iter()
                .map(|&r| (r, index.within(points, f64::from(r))))
                .collect()
        }
    }
}

type IndexedPoint = GeomWithData<[f64; 2], usize>;

struct PointIndex {
    tree: RTree<IndexedPoint>,
}

impl PointIndex {
    fn build(points: &[Point]) -> Self {
        let entries: Vec<IndexedPoint> = points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_finite())
            .map(|(i, p)| GeomWithData::new([p.x, p.y], i))
            .collect();

        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    fn within(&self, points: &[Point], radius: f64) -> Vec<u8> {
        let squared = radius * radius;
        points
            .iter()
            .enumerate()
            .map(|(i, p)| {
                if !p.is_finite() {
                    return 0;
                }
                let hit = self
                    .tree
                    .locate_within_distance([p.x, p.y], squared)
                    .any(|other| other.data != i);
                u8::from(hit)
            })
            .collect()
    }
}
