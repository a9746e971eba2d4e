//! The boundary to external LP/MILP solvers.

#[cfg(feature = "gurobi")]
mod gurobi;
mod microlp;

#[cfg(feature = "gurobi")]
pub use self::gurobi::GurobiSolver;
pub use self::microlp::MicrolpSolver;

use crate::error::{Error, Result};
use crate::lp::{Expression, Model, Values, Variable};

/// A backend able to solve a [`Model`] to optimality.
///
/// Infeasible and unbounded models are reported as [`Error::Infeasible`] and
/// [`Error::Unbounded`]. The call blocks until the backend returns.
pub trait Solver {
    fn name(&self) -> &str;
    fn solve(&self, model: Model) -> Result<Solution>;
}

/// Optimal values of every variable of a solved model
#[derive(Debug, Clone)]
pub struct Solution {
    objective: f64,
    values: Values,
}

impl Solution {
    /// Wraps the raw values returned by a backend. The objective is evaluated here so that
    /// every backend reports it the same way, constant term included.
    pub fn new(objective: &Expression, values: Values) -> Solution {
        Solution {
            objective: objective.eval_with(&values),
            values,
        }
    }

    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Panics if `var` does not belong to the solved model
    pub fn value(&self, var: Variable) -> f64 {
        self.values[&var]
    }

    pub fn eval(&self, expr: &Expression) -> f64 {
        expr.eval_with(&self.values)
    }

    pub fn values(&self) -> &Values {
        &self.values
    }
}

/// Picks a backend by name
pub fn by_name(name: &str) -> Result<Box<dyn Solver>> {
    match name {
        "microlp" => Ok(Box::new(MicrolpSolver::new())),
        #[cfg(feature = "gurobi")]
        "gurobi" => Ok(Box::new(GurobiSolver::new())),
        other => Err(Error::Solver(format!("unknown solver backend `{}`", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_backend_is_rejected() {
        assert!(matches!(by_name("simplex-by-hand"), Err(Error::Solver(_))));
        assert_eq!(by_name("microlp").unwrap().name(), "microlp");
    }
}
