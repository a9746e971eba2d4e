//! Weighted-sum multi-objective optimization: a toy LP and a facility siting MILP.
//!
//! Models are described with [`lp::ModelBuilder`] and handed by value to a
//! [`solver::Solver`] backend.

pub mod config;
pub mod error;
pub mod instance;
pub mod lp;
pub mod models;
pub mod plot;
pub mod report;
pub mod solver;

pub use error::{Error, Result};
