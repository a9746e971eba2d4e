use crate::error::{Error, Result};
use crate::instance::{distance_matrix, Instance};
use crate::lp::{Expression, Variable};
use derive_more::Constructor;
use float_ord::FloatOrd;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FacilityKind {
    Small,
    Large,
}

impl FacilityKind {
    pub const ALL: [FacilityKind; 2] = [FacilityKind::Small, FacilityKind::Large];

    /// Position of the kind in [`FacilityKind::ALL`] and in per-kind variable families
    pub fn index(self) -> usize {
        match self {
            FacilityKind::Small => 0,
            FacilityKind::Large => 1,
        }
    }
}

impl fmt::Display for FacilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacilityKind::Small => write!(f, "small"),
            FacilityKind::Large => write!(f, "large"),
        }
    }
}

/// Properties of one kind of facility
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Constructor)]
pub struct FacilityType {
    /// Units of waste the facility can process
    pub capacity: f64,
    /// Investment cost of building it
    pub cost: f64,
    /// Multiplier on the distance from an urban center to this facility
    pub safety_weight: f64,
    /// Multiplier on the distance from a water body to this facility
    pub water_weight: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacilityTypes {
    pub small: FacilityType,
    pub large: FacilityType,
}

impl Default for FacilityTypes {
    fn default() -> Self {
        FacilityTypes {
            small: FacilityType::new(2.0, 1.0, 1.0, 1.0),
            large: FacilityType::new(10.0, 3.0, 0.5, 0.5),
        }
    }
}

impl FacilityTypes {
    pub fn get(&self, kind: FacilityKind) -> &FacilityType {
        match kind {
            FacilityKind::Small => &self.small,
            FacilityKind::Large => &self.large,
        }
    }

    /// Collects one property per kind, ordered as [`FacilityKind::ALL`]
    pub fn per_kind(&self, property: impl Fn(&FacilityType) -> f64) -> [f64; 2] {
        FacilityKind::ALL.map(|kind| property(self.get(kind)))
    }

    /// The largest value of a property across the kinds
    pub fn max_of(&self, property: impl Fn(&FacilityType) -> f64) -> f64 {
        FacilityKind::ALL
            .iter()
            .map(|&kind| FloatOrd(property(self.get(kind))))
            .max()
            .map(|m| m.0)
            .unwrap_or(0.0)
    }

    pub fn validate(&self) -> Result<()> {
        for kind in FacilityKind::ALL {
            let t = self.get(kind);
            let fields = [
                ("capacity", t.capacity),
                ("cost", t.cost),
                ("safety weight", t.safety_weight),
                ("water weight", t.water_weight),
            ];
            for (name, value) in fields {
                if !value.is_finite() || value < 0.0 {
                    return Err(Error::InvalidInstance(format!(
                        "{} facility has invalid {} {}",
                        kind, name, value
                    )));
                }
            }
        }
        Ok(())
    }
}

/// One value per objective component
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Objectives<T> {
    /// Distance-weighted waste flow from farms to facilities
    pub transport: T,
    /// Weighted distance from each urban center to its nearest facility, summed
    pub safety: T,
    /// Weighted distance from each water body to its nearest facility, summed
    pub water: T,
    /// Total investment in facilities
    pub investment: T,
}

impl<T> Objectives<T> {
    pub fn map<U>(&self, f: impl Fn(&T) -> U) -> Objectives<U> {
        Objectives {
            transport: f(&self.transport),
            safety: f(&self.safety),
            water: f(&self.water),
            investment: f(&self.investment),
        }
    }
}

impl fmt::Display for Objectives<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transport = {:.4}, safety = {:.4}, water = {:.4}, investment = {:.4}",
            self.transport, self.safety, self.water, self.investment
        )
    }
}

/// Scalarization weights. The model minimizes the weighted sum, so a negative weight asks
/// for that component to be maximized.
pub type Weights = Objectives<f64>;

impl Default for Weights {
    fn default() -> Self {
        Objectives {
            transport: 0.1,
            safety: -0.2,
            water: -0.3,
            investment: 1.0,
        }
    }
}

impl Weights {
    /// Reads weights in the order transport, safety, water, investment
    pub fn from_slice(weights: &[f64]) -> Result<Weights> {
        match weights {
            &[transport, safety, water, investment] => Ok(Objectives {
                transport,
                safety,
                water,
                investment,
            }),
            _ => Err(Error::InvalidInstance(format!(
                "expected 4 objective weights, got {}",
                weights.len()
            ))),
        }
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.transport, self.safety, self.water, self.investment]
    }

    /// The weighted sum of the objective component variables
    pub fn scalarize(&self, objectives: &Objectives<Variable>) -> Expression {
        self.transport * objectives.transport
            + self.safety * objectives.safety
            + self.water * objectives.water
            + self.investment * objectives.investment
    }

    /// The weighted sum of already computed objective values
    pub fn apply(&self, values: &Objectives<f64>) -> f64 {
        self.transport * values.transport
            + self.safety * values.safety
            + self.water * values.water
            + self.investment * values.investment
    }
}

/// sets for the siting model
#[derive(Debug)]
#[allow(non_snake_case)]
pub struct Sets {
    /// Set of farms
    pub F: Vec<usize>,
    /// Set of urban centers
    pub U: Vec<usize>,
    /// Set of water bodies
    pub W: Vec<usize>,
    /// Set of candidate sites
    pub C: Vec<usize>,
    /// Facility kinds that may be built at a candidate site
    pub T: Vec<FacilityKind>,
}

impl Sets {
    pub fn new(instance: &Instance) -> Sets {
        Sets {
            F: (0..instance.farms.len()).collect(),
            U: (0..instance.urban_centers.len()).collect(),
            W: (0..instance.water_bodies.len()).collect(),
            C: (0..instance.candidates.len()).collect(),
            T: FacilityKind::ALL.to_vec(),
        }
    }
}

/// parameters for the siting model
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct Parameters {
    /// distance from farm i to candidate j
    pub D_farm: Array2<f64>,
    /// distance from urban center k to candidate j
    pub D_urban: Array2<f64>,
    /// distance from water body k to candidate j
    pub D_water: Array2<f64>,
    /// capacity, cost and impact weights of each facility kind
    pub facilities: FacilityTypes,
    /// scalarization weights of the objective components
    pub weights: Weights,
}

impl Parameters {
    pub fn new(instance: &Instance, facilities: FacilityTypes, weights: Weights) -> Result<Parameters> {
        instance.validate()?;
        facilities.validate()?;
        if let Some(w) = weights.to_array().iter().find(|w| !w.is_finite()) {
            return Err(Error::InvalidInstance(format!("objective weight {} is not finite", w)));
        }

        Ok(Parameters {
            D_farm: distance_matrix(&instance.farms, &instance.candidates),
            D_urban: distance_matrix(&instance.urban_centers, &instance.candidates),
            D_water: distance_matrix(&instance.water_bodies, &instance.candidates),
            facilities,
            weights,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{Counts, Point};

    #[test]
    fn weights_read_in_component_order() {
        let w = Weights::from_slice(&[0.1, -0.2, -0.3, 1.0]).unwrap();
        assert_eq!(w, Weights::default());
        assert!(Weights::from_slice(&[1.0, 2.0]).is_err());
    }

    #[test]
    fn max_impact_weight() {
        let types = FacilityTypes::default();
        assert_eq!(types.max_of(|t| t.safety_weight), 1.0);
        assert_eq!(types.max_of(|t| t.capacity), 10.0);
        assert_eq!(types.per_kind(|t| t.cost), [1.0, 3.0]);
    }

    #[test]
    fn negative_capacity_is_rejected() {
        let mut types = FacilityTypes::default();
        types.large.capacity = -1.0;
        assert!(matches!(types.validate(), Err(Error::InvalidInstance(_))));
    }

    #[test]
    fn parameters_have_one_matrix_per_landmark_set() {
        let instance = Instance::random(Counts::default(), 42);
        let params = Parameters::new(&instance, FacilityTypes::default(), Weights::default()).unwrap();
        assert_eq!(params.D_farm.dim(), (22, 30));
        assert_eq!(params.D_urban.dim(), (4, 30));
        assert_eq!(params.D_water.dim(), (6, 30));
    }

    #[test]
    fn instance_without_farms_is_rejected() {
        let instance = Instance {
            farms: vec![],
            urban_centers: vec![],
            water_bodies: vec![],
            candidates: vec![Point::new(0.5, 0.5)],
        };
        let result = Parameters::new(&instance, FacilityTypes::default(), Weights::default());
        assert!(result.is_err());
    }
}
