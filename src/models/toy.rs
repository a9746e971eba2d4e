//! A three variable weighted-sum LP.
//!
//! Every `x_i` lies in `[0, 2/3]` and together they must cover at least one unit,
//! `x0 + x1 + x2 >= 1`. Minimizing a non-negative weighting of the variables pushes the
//! optimum onto the face `x0 + x1 + x2 = 1` of that box.

use crate::error::Result;
use crate::lp::{AddVars, Direction, Expression, Model, ModelBuilder, Sense, Variable};
use crate::solver::Solver;
use log::info;
use serde::Serialize;

/// Upper bound of every variable
pub const UPPER: f64 = 2.0 / 3.0;

/// Weights of the worked example
pub const REFERENCE_WEIGHTS: [f64; 3] = [0.5, 0.2, 0.3];

pub struct ToyLp {
    pub model: Model,
    pub x: [Variable; 3],
    weights: [f64; 3],
}

#[derive(Debug, Clone, Serialize)]
pub struct ToyResult {
    pub weights: [f64; 3],
    pub x: [f64; 3],
    pub objective: f64,
}

impl ToyLp {
    pub fn build(weights: [f64; 3]) -> ToyLp {
        let mut builder = ModelBuilder::new("toy_lp");

        let vars = 3usize.bounded(&mut builder, "x", &(0.0..UPPER));
        let x = [vars[0], vars[1], vars[2]];

        let cover = x.iter().copied().sum::<Expression>();
        builder.add_constr("cover", cover, Sense::Ge, 1.0);

        let objective = x
            .iter()
            .zip(weights)
            .map(|(&v, w)| w * v)
            .sum::<Expression>();
        builder.set_objective(objective, Direction::Minimize);

        ToyLp {
            model: builder.build(),
            x,
            weights,
        }
    }

    pub fn solve(self, solver: &dyn Solver) -> Result<ToyResult> {
        let ToyLp { model, x, weights } = self;
        let solution = solver.solve(model)?;

        let result = ToyResult {
            weights,
            x: x.map(|v| solution.value(v)),
            objective: solution.objective(),
        };
        info!("Toy LP optimum x = {:?}, objective = {}", result.x, result.objective);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::MicrolpSolver;

    const TOL: f64 = 1e-6;

    #[test]
    fn reference_weights() {
        let result = ToyLp::build(REFERENCE_WEIGHTS)
            .solve(&MicrolpSolver::new())
            .unwrap();

        // the two cheapest variables cover the unit, the cheapest one at its bound
        assert!(result.x[0].abs() < TOL);
        assert!((result.x[1] - UPPER).abs() < TOL);
        assert!((result.x[2] - 1.0 / 3.0).abs() < TOL);
        assert!((result.objective - (0.2 * UPPER + 0.3 / 3.0)).abs() < TOL);
    }

    #[test]
    fn cover_is_tight_for_positive_weights() {
        let weightings = [
            [1.0, 1.0, 1.0],
            [0.5, 0.2, 0.3],
            [0.1, 5.0, 2.0],
            [3.0, 0.01, 0.02],
        ];
        for weights in weightings {
            let result = ToyLp::build(weights).solve(&MicrolpSolver::new()).unwrap();
            let sum: f64 = result.x.iter().sum();
            assert!((sum - 1.0).abs() < TOL, "{:?} gave {:?}", weights, result.x);
            for xi in result.x {
                assert!(xi > -TOL && xi < UPPER + TOL);
            }
        }
    }

    #[test]
    fn model_has_expected_shape() {
        let lp = ToyLp::build([1.0, 2.0, 3.0]);
        assert_eq!(lp.model.variables().len(), 3);
        assert_eq!(lp.model.constraints().len(), 1);
        assert!(lp.model.find_constr("cover").is_some());
    }
}
