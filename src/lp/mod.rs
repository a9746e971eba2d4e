//! Immutable description of linear and mixed-integer programs.
//!
//! Variables and expressions are `good_lp` types. A [`Model`] is assembled once through a
//! [`ModelBuilder`], which also records the name, kind and bounds of every variable and keeps
//! every constraint as a named row, and is never mutated afterwards. It is handed by value to
//! a [`Solver`](crate::solver::Solver).

mod vars;

pub use good_lp::{Expression, Variable};
pub use vars::{AddVars, ConvertVars};

use derive_more::{Deref, From, Into};
use good_lp::constraint;
use good_lp::{variable, ProblemVariables};
use log::trace;
use std::collections::HashMap;
use std::fmt;
use std::ops::Range;
use typed_index_collections::{TiSlice, TiVec};

/// Value of every variable of a model
pub type Values = HashMap<Variable, f64>;

#[derive(Deref, Debug, PartialEq, Eq, PartialOrd, Ord, From, Into, Clone, Copy, Hash)]
pub struct ConstrId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VarKind {
    Continuous,
    Binary,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VarInfo {
    pub var: Variable,
    pub name: String,
    pub kind: VarKind,
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Le,
    Ge,
    Eq,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Le => write!(f, "<="),
            Sense::Ge => write!(f, ">="),
            Sense::Eq => write!(f, "=="),
        }
    }
}

/// A named constraint `lhs <sense> rhs`
#[derive(Debug, Clone)]
pub struct Row {
    pub name: String,
    pub lhs: Expression,
    pub sense: Sense,
    pub rhs: f64,
}

impl Row {
    /// The row as a `good_lp` constraint
    pub fn to_constraint(&self) -> good_lp::Constraint {
        let slack = self.lhs.clone() - self.rhs;
        match self.sense {
            Sense::Le => constraint::leq(slack, 0.0),
            Sense::Ge => constraint::leq(slack * -1.0, 0.0),
            Sense::Eq => constraint::eq(slack, 0.0),
        }
    }

    /// How far the assignment is from satisfying the row. Zero when satisfied.
    pub fn violation(&self, values: &Values) -> f64 {
        let lhs = self.lhs.eval_with(values);
        match self.sense {
            Sense::Le => (lhs - self.rhs).max(0.0),
            Sense::Ge => (self.rhs - lhs).max(0.0),
            Sense::Eq => (lhs - self.rhs).abs(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Minimize,
    Maximize,
}

/// Something an assignment gets wrong with respect to a model
#[derive(Debug, Clone, PartialEq)]
pub enum Violation {
    Bound { var: Variable, name: String, value: f64 },
    Integrality { var: Variable, name: String, value: f64 },
    Constraint { constr: ConstrId, name: String, amount: f64 },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::Bound { name, value, .. } => {
                write!(f, "{} = {} is outside its bounds", name, value)
            }
            Violation::Integrality { name, value, .. } => {
                write!(f, "{} = {} is not binary", name, value)
            }
            Violation::Constraint { name, amount, .. } => {
                write!(f, "constraint {} violated by {}", name, amount)
            }
        }
    }
}

/// An immutable linear or mixed-integer program
pub struct Model {
    pub(crate) name: String,
    pub(crate) problem: ProblemVariables,
    pub(crate) variables: Vec<VarInfo>,
    pub(crate) constraints: TiVec<ConstrId, Row>,
    pub(crate) objective: Expression,
    pub(crate) direction: Direction,
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Model")
            .field("name", &self.name)
            .field("variables", &self.variables.len())
            .field("constraints", &self.constraints.len())
            .field("direction", &self.direction)
            .finish()
    }
}

impl Model {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn variables(&self) -> &[VarInfo] {
        &self.variables
    }

    pub fn constraints(&self) -> &TiSlice<ConstrId, Row> {
        &self.constraints
    }

    pub fn constraint(&self, constr: ConstrId) -> &Row {
        &self.constraints[constr]
    }

    /// Looks up a constraint by its name
    pub fn find_constr(&self, name: &str) -> Option<ConstrId> {
        self.constraints
            .iter_enumerated()
            .find(|(_, c)| c.name == name)
            .map(|(id, _)| id)
    }

    pub fn objective(&self) -> &Expression {
        &self.objective
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn objective_value(&self, values: &Values) -> f64 {
        self.objective.eval_with(values)
    }

    /// Checks bounds, integrality and every constraint against `values`.
    ///
    /// `tol` is the absolute tolerance applied to each check. An empty result means the
    /// assignment is feasible.
    pub fn violations(&self, values: &Values, tol: f64) -> Vec<Violation> {
        let mut out = Vec::new();

        for v in &self.variables {
            let value = values[&v.var];
            if value < v.lower - tol || value > v.upper + tol {
                out.push(Violation::Bound {
                    var: v.var,
                    name: v.name.clone(),
                    value,
                });
            }
            if v.kind == VarKind::Binary && (value - value.round()).abs() > tol {
                out.push(Violation::Integrality {
                    var: v.var,
                    name: v.name.clone(),
                    value,
                });
            }
        }

        for (constr, c) in self.constraints.iter_enumerated() {
            let amount = c.violation(values);
            if amount > tol {
                trace!("{} violated by {}", c.name, amount);
                out.push(Violation::Constraint {
                    constr,
                    name: c.name.clone(),
                    amount,
                });
            }
        }

        out
    }
}

/// Incrementally collects variables and constraints, then freezes them into a [`Model`]
pub struct ModelBuilder {
    name: String,
    problem: ProblemVariables,
    variables: Vec<VarInfo>,
    constraints: TiVec<ConstrId, Row>,
    objective: Expression,
    direction: Direction,
}

impl ModelBuilder {
    pub fn new(name: &str) -> ModelBuilder {
        ModelBuilder {
            name: name.to_string(),
            problem: ProblemVariables::new(),
            variables: Vec::new(),
            constraints: TiVec::new(),
            objective: Expression::default(),
            direction: Direction::Minimize,
        }
    }

    pub fn add_var(&mut self, name: &str, kind: VarKind, bounds: &Range<f64>) -> Variable {
        let definition = match kind {
            VarKind::Binary => variable().binary(),
            VarKind::Continuous => variable().min(bounds.start).max(bounds.end),
        };
        let var = self.problem.add(definition.name(name));
        self.variables.push(VarInfo {
            var,
            name: name.to_string(),
            kind,
            lower: bounds.start,
            upper: bounds.end,
        });
        var
    }

    pub fn binary(&mut self, name: &str) -> Variable {
        self.add_var(name, VarKind::Binary, &(0.0..1.0))
    }

    pub fn continuous(&mut self, name: &str, bounds: &Range<f64>) -> Variable {
        self.add_var(name, VarKind::Continuous, bounds)
    }

    pub fn free(&mut self, name: &str) -> Variable {
        self.continuous(name, &(f64::NEG_INFINITY..f64::INFINITY))
    }

    pub fn add_constr(
        &mut self,
        name: &str,
        lhs: impl Into<Expression>,
        sense: Sense,
        rhs: f64,
    ) -> ConstrId {
        let id = ConstrId(self.constraints.len());
        self.constraints.push(Row {
            name: name.to_string(),
            lhs: lhs.into(),
            sense,
            rhs,
        });
        id
    }

    pub fn set_objective(&mut self, expr: impl Into<Expression>, direction: Direction) {
        self.objective = expr.into();
        self.direction = direction;
    }

    pub fn build(self) -> Model {
        Model {
            name: self.name,
            problem: self.problem,
            variables: self.variables,
            constraints: self.constraints,
            objective: self.objective,
            direction: self.direction,
        }
    }
}
