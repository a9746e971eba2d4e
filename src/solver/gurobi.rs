use super::{Solution, Solver};
use crate::error::{Error, Result};
use crate::lp::{Direction, Expression, Model, Sense, VarKind, Variable};
use good_lp::IntoAffineExpression;
use grb::prelude::*;
use log::{debug, info};
use std::collections::HashMap;

/// Gurobi backend. Requires a local Gurobi installation and licence.
#[derive(Debug, Default, Clone)]
pub struct GurobiSolver {
    /// Print the Gurobi log to stdout
    pub verbose: bool,
}

impl GurobiSolver {
    pub fn new() -> Self {
        GurobiSolver { verbose: false }
    }
}

/// `sum(coef * var)` of a `good_lp` expression in terms of the Gurobi variables
fn linear_part(expr: &Expression, vars: &HashMap<Variable, Var>) -> Expr {
    expr.linear_coefficients()
        .into_iter()
        .map(|(var, coef)| coef * vars[&var])
        .grb_sum()
}

impl Solver for GurobiSolver {
    fn name(&self) -> &str {
        "gurobi"
    }

    fn solve(&self, model: Model) -> Result<Solution> {
        info!("Solving {} with gurobi", model.name());

        let mut grb_model = grb::Model::new(model.name())?;
        if !self.verbose {
            grb_model.set_param(grb::param::OutputFlag, 0)?;
        }

        let mut vars = HashMap::with_capacity(model.variables().len());
        for v in model.variables() {
            let vtype = match v.kind {
                VarKind::Binary => VarType::Binary,
                VarKind::Continuous => VarType::Continuous,
            };
            let var = grb_model.add_var(&v.name, vtype, 0.0, v.lower, v.upper, std::iter::empty())?;
            vars.insert(v.var, var);
        }

        // variables must be registered before constraints can reference them
        grb_model.update()?;

        for c in model.constraints() {
            let lhs = linear_part(&c.lhs, &vars);
            let rhs = c.rhs - c.lhs.constant();
            match c.sense {
                Sense::Le => grb_model.add_constr(&c.name, c!(lhs <= rhs))?,
                Sense::Ge => grb_model.add_constr(&c.name, c!(lhs >= rhs))?,
                Sense::Eq => grb_model.add_constr(&c.name, c!(lhs == rhs))?,
            };
        }

        let sense = match model.direction() {
            Direction::Minimize => ModelSense::Minimize,
            Direction::Maximize => ModelSense::Maximize,
        };
        grb_model.set_objective(linear_part(model.objective(), &vars), sense)?;

        grb_model.optimize()?;

        match grb_model.status()? {
            Status::Optimal => (),
            Status::Infeasible => return Err(Error::Infeasible),
            Status::Unbounded | Status::InfOrUnbd => return Err(Error::Unbounded),
            status => {
                return Err(Error::Solver(format!(
                    "gurobi finished with status {:?}",
                    status
                )))
            }
        }

        let order = model.variables().iter().map(|v| v.var).collect::<Vec<_>>();
        let x = grb_model.get_obj_attr_batch(attr::X, order.iter().map(|v| vars[v]))?;
        let values = order.into_iter().zip(x).collect();

        let solution = Solution::new(model.objective(), values);
        debug!("{} solved, objective = {}", model.name(), solution.objective());
        Ok(solution)
    }
}
