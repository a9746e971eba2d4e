use super::{Solution, Solver};
use crate::error::Result;
use crate::lp::{Direction, Model, Row};
use good_lp::{Solution as _, SolverModel};
use log::{debug, info};

/// Pure Rust simplex and branch-and-bound backend, through `good_lp`
#[derive(Debug, Default, Clone)]
pub struct MicrolpSolver {}

impl MicrolpSolver {
    pub fn new() -> Self {
        MicrolpSolver {}
    }
}

impl Solver for MicrolpSolver {
    fn name(&self) -> &str {
        "microlp"
    }

    fn solve(&self, model: Model) -> Result<Solution> {
        info!(
            "Solving {} with microlp ({} variables, {} constraints)",
            model.name(),
            model.variables().len(),
            model.constraints().len()
        );

        let Model {
            name,
            problem,
            variables,
            constraints,
            objective,
            direction,
        } = model;

        let unsolved = match direction {
            Direction::Minimize => problem.minimise(objective.clone()),
            Direction::Maximize => problem.maximise(objective.clone()),
        };
        let solved = constraints
            .iter()
            .map(Row::to_constraint)
            .fold(unsolved.using(good_lp::microlp), |lp, c| lp.with(c))
            .solve()?;

        let values = variables
            .iter()
            .map(|v| (v.var, solved.value(v.var)))
            .collect();
        let solution = Solution::new(&objective, values);
        debug!("{} solved, objective = {}", name, solution.objective());
        Ok(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::lp::{ModelBuilder, Sense};

    #[test]
    fn infeasible_model_is_reported() {
        let mut builder = ModelBuilder::new("infeasible");
        let x = builder.continuous("x", &(0.0..1.0));
        builder.add_constr("too_much", x, Sense::Ge, 2.0);
        builder.set_objective(x, Direction::Minimize);

        let result = MicrolpSolver::new().solve(builder.build());
        assert!(matches!(result, Err(Error::Infeasible)));
    }

    #[test]
    fn unbounded_model_is_reported() {
        let mut builder = ModelBuilder::new("unbounded");
        let x = builder.continuous("x", &(0.0..f64::INFINITY));
        builder.add_constr("floor", x, Sense::Ge, 1.0);
        builder.set_objective(x, Direction::Maximize);

        let result = MicrolpSolver::new().solve(builder.build());
        assert!(matches!(result, Err(Error::Unbounded)));
    }

    #[test]
    fn constants_stay_on_the_left_hand_side() {
        let mut builder = ModelBuilder::new("shifted");
        let x = builder.continuous("x", &(0.0..10.0));
        // x + 2 >= 5
        builder.add_constr("shifted", x + 2.0, Sense::Ge, 5.0);
        builder.set_objective(x + 1.0, Direction::Minimize);

        let solution = MicrolpSolver::new().solve(builder.build()).unwrap();
        assert!((solution.value(x) - 3.0).abs() < 1e-6);
        assert!((solution.objective() - 4.0).abs() < 1e-6);
    }

    #[test]
    fn binaries_take_integral_values() {
        let mut builder = ModelBuilder::new("knapsack");
        let a = builder.binary("a");
        let b = builder.binary("b");
        builder.add_constr("weight", 3.0 * a + 2.0 * b, Sense::Le, 4.0);
        builder.set_objective(5.0 * a + 4.0 * b, Direction::Maximize);

        let solution = MicrolpSolver::new().solve(builder.build()).unwrap();
        assert!((solution.value(a) - 1.0).abs() < 1e-6);
        assert!(solution.value(b).abs() < 1e-6);
    }
}
