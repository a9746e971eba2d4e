use crate::error::Result;
use crate::instance::Counts;
use crate::models::siting::{FacilityTypes, Weights};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to reproduce a siting run. Missing fields fall back to the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SitingConfig {
    /// Size of the generated instance
    pub counts: Counts,
    /// Seed of the instance generator
    pub seed: u64,
    /// Capacity, cost and impact weights of the facility kinds
    pub facilities: FacilityTypes,
    /// Scalarization weights
    pub weights: Weights,
    /// Solver backend, `microlp` or `gurobi`
    pub solver: String,
}

impl Default for SitingConfig {
    fn default() -> Self {
        SitingConfig {
            counts: Counts::default(),
            seed: 42,
            facilities: FacilityTypes::default(),
            weights: Weights::default(),
            solver: "microlp".to_string(),
        }
    }
}

impl SitingConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<SitingConfig> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        let config: SitingConfig = serde_json::from_reader(reader)?;
        config.facilities.validate()?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
