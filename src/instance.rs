use crate::error::{Error, Result};
use log::info;
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A point in Euclidean 2d-space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn distance(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// The number of points in each set of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub farms: usize,
    pub urban_centers: usize,
    pub water_bodies: usize,
    pub candidates: usize,
}

impl Default for Counts {
    fn default() -> Self {
        Counts {
            farms: 22,
            urban_centers: 4,
            water_bodies: 6,
            candidates: 30,
        }
    }
}

/// The geography of a siting problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instance {
    /// Farms producing one unit of waste each
    pub farms: Vec<Point>,
    /// Urban centers that should be kept away from facilities
    pub urban_centers: Vec<Point>,
    /// Lakes and rivers that should be kept away from facilities
    pub water_bodies: Vec<Point>,
    /// Sites where a facility may be built
    pub candidates: Vec<Point>,
}

impl Instance {
    /// Draws every point uniformly from the unit square.
    ///
    /// The sets are drawn in the order farms, urban centers, water bodies, candidates, and each
    /// point draws its x coordinate before its y coordinate, so the same seed always yields the
    /// same instance.
    pub fn random(counts: Counts, seed: u64) -> Instance {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut points = |n: usize| -> Vec<Point> {
            (0..n)
                .map(|_| {
                    let x = rng.gen::<f64>();
                    let y = rng.gen::<f64>();
                    Point::new(x, y)
                })
                .collect()
        };

        let farms = points(counts.farms);
        let urban_centers = points(counts.urban_centers);
        let water_bodies = points(counts.water_bodies);
        let candidates = points(counts.candidates);

        info!("Generated instance {:?} with seed {}", counts, seed);
        Instance {
            farms,
            urban_centers,
            water_bodies,
            candidates,
        }
    }

    pub fn counts(&self) -> Counts {
        Counts {
            farms: self.farms.len(),
            urban_centers: self.urban_centers.len(),
            water_bodies: self.water_bodies.len(),
            candidates: self.candidates.len(),
        }
    }

    /// Rejects instances that cannot be turned into a meaningful model
    pub fn validate(&self) -> Result<()> {
        if self.farms.is_empty() {
            return Err(Error::InvalidInstance("there are no farms".into()));
        }
        if self.candidates.is_empty() {
            return Err(Error::InvalidInstance("there are no candidate sites".into()));
        }

        let all = self
            .farms
            .iter()
            .chain(&self.urban_centers)
            .chain(&self.water_bodies)
            .chain(&self.candidates);
        if let Some(p) = all.into_iter().find(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return Err(Error::InvalidInstance(format!(
                "point ({}, {}) is not finite",
                p.x, p.y
            )));
        }

        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Instance> {
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let instance: Instance = serde_json::from_reader(reader)?;
        instance.validate()?;
        Ok(instance)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

/// Pairwise Euclidean distances, `D[i, j]` is the distance from `a[i]` to `b[j]`.
pub fn distance_matrix(a: &[Point], b: &[Point]) -> Array2<f64> {
    Array2::from_shape_fn((a.len(), b.len()), |(i, j)| a[i].distance(&b[j]))
}
