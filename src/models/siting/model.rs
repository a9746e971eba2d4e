use super::nearest::{nearest_facility, unit_square_big_m, NearestDistance};
use super::sets_and_parameters::{FacilityKind, FacilityTypes, Objectives, Parameters, Sets, Weights};
use crate::error::Result;
use crate::instance::Instance;
use crate::lp::{AddVars, ConvertVars, Direction, Expression, Model, ModelBuilder, Sense, Variable};
use crate::solver::{Solution, Solver};
use itertools::iproduct;
use log::{debug, info};
use serde::Serialize;

pub struct Variables {
    /// 1 if a facility of kind t is built at candidate j, `y[t][j]`
    pub y: Vec<Vec<Variable>>,
    /// fraction of the waste of farm i processed at candidate j, `x[i][j]`
    pub x: Vec<Vec<Variable>>,
    /// weighted distance from each urban center to its nearest facility
    pub nearest_urban: NearestDistance,
    /// weighted distance from each water body to its nearest facility
    pub nearest_water: NearestDistance,
    /// the objective components, each pinned by an equality constraint
    pub f: Objectives<Variable>,
}

/// The facility siting MILP together with handles to its variables
pub struct SitingModel {
    pub model: Model,
    pub vars: Variables,
    pub weights: Weights,
}

#[allow(non_snake_case)]
impl SitingModel {
    /// builds the siting model
    pub fn build(sets: &Sets, parameters: &Parameters) -> SitingModel {
        info!(
            "Building siting model with {} farms and {} candidate sites",
            sets.F.len(),
            sets.C.len()
        );

        let mut builder = ModelBuilder::new("facility_siting");

        //*************CREATE VARIABLES*************//
        let F = sets.F.len();
        let C = sets.C.len();
        let T = sets.T.len();

        // 1 if a facility of kind t is built at candidate j
        let y = (T, C).binary(&mut builder, "y");

        // fraction of farm i's waste sent to candidate j
        let x = (F, C).bounded(&mut builder, "x", &(0.0..1.0));

        let f = Objectives {
            transport: builder.free("f_transport"),
            safety: builder.free("f_safety"),
            water: builder.free("f_water"),
            investment: builder.free("f_investment"),
        };

        // ******************** ADD CONSTRAINTS ********************

        // at most one facility per candidate site
        for j in &sets.C {
            let lhs = sets.T.iter().map(|t| y[t.index()][*j]).sum::<Expression>();
            builder.add_constr(&format!("exclusive_{}", j), lhs, Sense::Le, 1.0);
        }

        // all the waste of a farm is processed somewhere
        for i in &sets.F {
            let lhs = sets.C.iter().map(|j| x[*i][*j]).sum::<Expression>();
            builder.add_constr(&format!("conservation_{}", i), lhs, Sense::Eq, 1.0);
        }

        // inflow is bounded by the capacity of what is built, zero if nothing is
        for j in &sets.C {
            let inflow = sets.F.iter().map(|i| x[*i][*j]).sum::<Expression>();
            let capacity = sets
                .T
                .iter()
                .map(|t| parameters.facilities.get(*t).capacity * y[t.index()][*j])
                .sum::<Expression>();
            builder.add_constr(&format!("capacity_{}", j), inflow - capacity, Sense::Le, 0.0);
        }

        let nearest_urban = nearest_facility(
            &mut builder,
            "nearest_urban",
            &sets.U,
            parameters.D_urban.view(),
            &parameters.facilities.per_kind(|t| t.safety_weight),
            &y,
            unit_square_big_m(parameters.facilities.max_of(|t| t.safety_weight)),
        );
        let nearest_water = nearest_facility(
            &mut builder,
            "nearest_water",
            &sets.W,
            parameters.D_water.view(),
            &parameters.facilities.per_kind(|t| t.water_weight),
            &y,
            unit_square_big_m(parameters.facilities.max_of(|t| t.water_weight)),
        );

        // OBJECTIVE COMPONENTS

        let transport = iproduct!(&sets.F, &sets.C)
            .map(|(i, j)| parameters.D_farm[[*i, *j]] * x[*i][*j])
            .sum::<Expression>();
        builder.add_constr("def_transport", f.transport - transport, Sense::Eq, 0.0);

        let safety = nearest_urban.vars.iter().copied().sum::<Expression>();
        builder.add_constr("def_safety", f.safety - safety, Sense::Eq, 0.0);

        let water = nearest_water.vars.iter().copied().sum::<Expression>();
        builder.add_constr("def_water", f.water - water, Sense::Eq, 0.0);

        let investment = iproduct!(&sets.T, &sets.C)
            .map(|(t, j)| parameters.facilities.get(*t).cost * y[t.index()][*j])
            .sum::<Expression>();
        builder.add_constr("def_investment", f.investment - investment, Sense::Eq, 0.0);

        builder.set_objective(parameters.weights.scalarize(&f), Direction::Minimize);

        let model = builder.build();
        debug!(
            "Siting model has {} variables and {} constraints",
            model.variables().len(),
            model.constraints().len()
        );

        SitingModel {
            model,
            vars: Variables {
                y,
                x,
                nearest_urban,
                nearest_water,
                f,
            },
            weights: parameters.weights,
        }
    }

    /// Validates the instance and builds the model for it
    pub fn from_instance(
        instance: &Instance,
        facilities: FacilityTypes,
        weights: Weights,
    ) -> Result<SitingModel> {
        let sets = Sets::new(instance);
        let parameters = Parameters::new(instance, facilities, weights)?;
        Ok(SitingModel::build(&sets, &parameters))
    }

    pub fn solve(self, solver: &dyn Solver) -> Result<SitingResult> {
        let SitingModel {
            model,
            vars,
            weights,
        } = self;
        let solution = solver.solve(model)?;
        let result = SitingResult::new(&vars, &solution);

        info!("Objectives: {}", result.objectives);
        debug!(
            "Scalarized with {:?}: {} (solver reported {})",
            weights.to_array(),
            result.scalar,
            solution.objective()
        );
        Ok(result)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SitingResult {
    /// value of every objective component
    pub objectives: Objectives<f64>,
    /// the scalarized objective
    pub scalar: f64,
    /// what is built at each candidate site
    pub facilities: Vec<Option<FacilityKind>>,
    /// raw value of `y[t][j]`
    pub y: Vec<Vec<f64>>,
    /// fraction of farm i's waste processed at candidate j
    pub x: Vec<Vec<f64>>,
    pub nearest_urban: Vec<f64>,
    pub nearest_water: Vec<f64>,
}

impl SitingResult {
    pub fn new(vars: &Variables, solution: &Solution) -> SitingResult {
        let y = vars.y.convert(solution);
        let candidates = y.first().map_or(0, |row| row.len());
        let facilities = (0..candidates)
            .map(|j| {
                FacilityKind::ALL
                    .iter()
                    .copied()
                    .find(|t| y[t.index()][j] > 0.5)
            })
            .collect();

        SitingResult {
            objectives: vars.f.map(|&v| solution.value(v)),
            scalar: solution.objective(),
            facilities,
            y,
            x: vars.x.convert(solution),
            nearest_urban: vars.nearest_urban.vars.convert(solution),
            nearest_water: vars.nearest_water.vars.convert(solution),
        }
    }

    /// Candidates with a facility, and its kind
    pub fn built(&self) -> impl Iterator<Item = (usize, FacilityKind)> + '_ {
        self.facilities
            .iter()
            .enumerate()
            .filter_map(|(j, kind)| kind.map(|kind| (j, kind)))
    }

    /// Total waste processed at candidate `j`
    pub fn inflow(&self, j: usize) -> f64 {
        self.x.iter().map(|row| row[j]).sum()
    }

    /// Largest deviation of a farm's total outflow from one unit
    pub fn conservation_error(&self) -> f64 {
        self.x
            .iter()
            .map(|row| (row.iter().sum::<f64>() - 1.0).abs())
            .fold(0.0, f64::max)
    }

    /// Largest amount by which a site exceeds one facility
    pub fn exclusivity_error(&self) -> f64 {
        let candidates = self.facilities.len();
        (0..candidates)
            .map(|j| (self.y.iter().map(|row| row[j]).sum::<f64>() - 1.0).max(0.0))
            .fold(0.0, f64::max)
    }

    /// Flow conservation and facility exclusivity hold up to `tol`
    pub fn is_consistent(&self, tol: f64) -> bool {
        self.conservation_error() <= tol && self.exclusivity_error() <= tol
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{distance_matrix, Counts, Point};
    use crate::solver::MicrolpSolver;

    const TOL: f64 = 1e-6;

    fn two_site_instance() -> Instance {
        Instance {
            farms: vec![Point::new(0.2, 0.2)],
            urban_centers: vec![Point::new(0.5, 0.5)],
            water_bodies: vec![],
            candidates: vec![Point::new(0.2, 0.2), Point::new(0.8, 0.8)],
        }
    }

    #[test]
    fn default_instance_has_expected_size() {
        let instance = Instance::random(Counts::default(), 42);
        let siting =
            SitingModel::from_instance(&instance, FacilityTypes::default(), Weights::default())
                .unwrap();

        // y, x, nearest distances and the four objective components
        assert_eq!(siting.model.variables().len(), 2 * 30 + 22 * 30 + 4 + 6 + 4);
        // exclusivity, conservation, capacity, relaxations and definitions
        assert_eq!(
            siting.model.constraints().len(),
            30 + 22 + 30 + 4 * 30 + 6 * 30 + 4
        );
        assert_eq!(siting.vars.nearest_urban.constraints.len(), 4 * 30);
        assert!(siting.model.find_constr("def_investment").is_some());
    }

    #[test]
    fn single_farm_uses_small_facility_at_zero_distance() {
        let instance = two_site_instance();
        let siting =
            SitingModel::from_instance(&instance, FacilityTypes::default(), Weights::default())
                .unwrap();
        let result = siting.solve(&MicrolpSolver::new()).unwrap();

        assert_eq!(result.facilities, vec![Some(FacilityKind::Small), None]);
        assert!((result.x[0][0] - 1.0).abs() < TOL);
        assert!(result.x[0][1].abs() < TOL);
        assert!(result.objectives.transport.abs() < TOL);
        assert!((result.objectives.investment - 1.0).abs() < TOL);

        let to_site = Point::new(0.5, 0.5).distance(&Point::new(0.2, 0.2));
        assert!((result.objectives.safety - to_site).abs() < TOL);
        assert!(result.objectives.water.abs() < TOL);
    }

    #[test]
    fn solved_random_instance_is_consistent() {
        let counts = Counts {
            farms: 6,
            urban_centers: 2,
            water_bodies: 2,
            candidates: 5,
        };
        let instance = Instance::random(counts, 3);
        let facilities = FacilityTypes::default();
        let weights = Weights::default();
        let SitingModel { model, vars, .. } =
            SitingModel::from_instance(&instance, facilities, weights).unwrap();
        // building is deterministic, so a second build hands out the same variables
        let check = SitingModel::from_instance(&instance, facilities, weights)
            .unwrap()
            .model;

        let solution = MicrolpSolver::new().solve(model).unwrap();
        assert!(check.violations(solution.values(), 1e-6).is_empty());

        let result = SitingResult::new(&vars, &solution);
        assert!(result.is_consistent(TOL));
        assert!((result.scalar - weights.apply(&result.objectives)).abs() < TOL);

        for (j, kind) in result.built() {
            assert!(result.inflow(j) <= facilities.get(kind).capacity + TOL);
        }
        for (j, kind) in result.facilities.iter().enumerate() {
            if kind.is_none() {
                assert!(result.inflow(j) < TOL);
            }
        }

        // maximizing safety drives each distance to the nearest built facility
        let d_urban = distance_matrix(&instance.urban_centers, &instance.candidates);
        for (k, value) in result.nearest_urban.iter().enumerate() {
            let nearest = result
                .built()
                .map(|(j, kind)| d_urban[[k, j]] * facilities.get(kind).safety_weight)
                .fold(f64::INFINITY, f64::min);
            assert!((value - nearest).abs() < TOL, "{} vs {}", value, nearest);
        }
    }

    #[test]
    fn too_little_capacity_is_infeasible() {
        let mut instance = two_site_instance();
        instance.farms = vec![Point::new(0.1, 0.1); 25];
        let result =
            SitingModel::from_instance(&instance, FacilityTypes::default(), Weights::default())
                .unwrap()
                .solve(&MicrolpSolver::new());
        assert!(matches!(result, Err(crate::error::Error::Infeasible)));
    }
}
