//! Linearized "distance to the nearest built facility".
//!
//! For every landmark `k` and candidate site `j`
//!
//! ```text
//! d_k <= D[k, j] * sum_t(w_t * y_tj) + M * (1 - sum_t(y_tj))
//! ```
//!
//! When a facility of kind `t` is built at `j` the right-hand side is the weighted distance
//! `D[k, j] * w_t`. When nothing is built there it is `M`, which must not cut off any weighted
//! distance to a site that does have a facility. `d_k` therefore ends up bounded by the
//! smallest weighted distance to a built facility, and an objective pushing `d_k` upwards makes
//! it equal to that minimum.
//!
//! [`unit_square_big_m`] is `sqrt(2) * max_t w_t`, the longest distance inside the unit square
//! times the largest weight. It is only valid while every point lies in the unit square.

use crate::lp::{AddVars, ConstrId, Expression, ModelBuilder, Sense, Variable};
use float_ord::FloatOrd;
use itertools::iproduct;
use log::warn;
use ndarray::ArrayView2;

/// The auxiliary distance variables together with the constraints that define them
#[derive(Debug, Clone)]
pub struct NearestDistance {
    /// One variable per landmark
    pub vars: Vec<Variable>,
    /// Relaxation constraints, landmark major
    pub constraints: Vec<ConstrId>,
    /// The big-M value used in every constraint
    pub big_m: f64,
}

/// Big-M for points drawn from the unit square
pub fn unit_square_big_m(max_weight: f64) -> f64 {
    std::f64::consts::SQRT_2 * max_weight
}

/// Largest weighted distance any landmark can have to any candidate
pub fn largest_weighted_distance(distances: ArrayView2<f64>, weights: &[f64]) -> f64 {
    let max_distance = distances.iter().map(|&d| FloatOrd(d)).max().map_or(0.0, |d| d.0);
    let max_weight = weights.iter().map(|&w| FloatOrd(w)).max().map_or(0.0, |w| w.0);
    max_distance * max_weight
}

/// False when `big_m` would cap some landmark below its true weighted distance
pub fn big_m_covers(distances: ArrayView2<f64>, weights: &[f64], big_m: f64) -> bool {
    largest_weighted_distance(distances, weights) <= big_m
}

/// Adds one nearest-distance variable per landmark.
///
/// * `landmarks` - indices into the rows of `distances`
/// * `distances` - landmark by candidate distance matrix
/// * `weights` - impact weight of each facility kind, indexed like `y`
/// * `y` - `y[t][j]` is 1 when a facility of kind `t` is built at candidate `j`
pub fn nearest_facility(
    builder: &mut ModelBuilder,
    name: &str,
    landmarks: &[usize],
    distances: ArrayView2<f64>,
    weights: &[f64],
    y: &[Vec<Variable>],
    big_m: f64,
) -> NearestDistance {
    let candidates = distances.ncols();

    if !big_m_covers(distances, weights, big_m) {
        warn!(
            "big-M {} for {} is smaller than the largest weighted distance {}; \
             sites without a facility will constrain {}",
            big_m,
            name,
            largest_weighted_distance(distances, weights),
            name
        );
    }

    let vars = landmarks.len().cont(builder, name);

    let mut constraints = Vec::with_capacity(landmarks.len() * candidates);
    for ((pos, &k), j) in iproduct!(landmarks.iter().enumerate(), 0..candidates) {
        let mut lhs = Expression::from(vars[pos]);
        for (t, w) in weights.iter().enumerate() {
            lhs.add_mul(big_m - distances[[k, j]] * w, y[t][j]);
        }
        let id = builder.add_constr(&format!("{}_{}_{}", name, k, j), lhs, Sense::Le, big_m);
        constraints.push(id);
    }

    NearestDistance {
        vars,
        constraints,
        big_m,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::{distance_matrix, Point};
    use crate::lp::{Model, Values, Violation};
    use ndarray::{array, Array2};

    const WEIGHTS: [f64; 2] = [1.0, 0.5];

    /// one landmark, two candidates, facility variables for two kinds
    fn setup(distances: &Array2<f64>, big_m: f64) -> (Model, NearestDistance, Vec<Vec<Variable>>) {
        let mut builder = ModelBuilder::new("nearest");
        let y = (2usize, 2usize).binary(&mut builder, "y");
        let nearest = nearest_facility(
            &mut builder,
            "d",
            &[0],
            distances.view(),
            &WEIGHTS,
            &y,
            big_m,
        );
        (builder.build(), nearest, y)
    }

    fn assignment(model: &Model, set: &[(Variable, f64)]) -> Values {
        let mut values: Values = model.variables().iter().map(|v| (v.var, 0.0)).collect();
        values.extend(set.iter().copied());
        values
    }

    #[test]
    fn unit_square_big_m_is_diagonal_times_max_weight() {
        let (_, nearest, _) = setup(&array![[0.1, 0.9]], unit_square_big_m(1.0));
        assert!((nearest.big_m - std::f64::consts::SQRT_2).abs() < 1e-12);
        assert_eq!(nearest.vars.len(), 1);
        assert_eq!(nearest.constraints.len(), 2);
    }

    #[test]
    fn unbuilt_site_does_not_bind_with_unit_square_big_m() {
        let (model, nearest, y) = setup(&array![[0.1, 0.9]], unit_square_big_m(1.0));
        // small facility at the far site only, true nearest distance is 0.9
        let values = assignment(&model, &[(y[0][1], 1.0), (nearest.vars[0], 0.9)]);
        assert!(model.violations(&values, 1e-9).is_empty());

        // anything above the true distance is cut off by the built site
        let values = assignment(&model, &[(y[0][1], 1.0), (nearest.vars[0], 0.95)]);
        assert!(!model.violations(&values, 1e-9).is_empty());
    }

    #[test]
    fn large_facility_uses_its_own_weight() {
        let (model, nearest, y) = setup(&array![[0.1, 0.9]], unit_square_big_m(1.0));
        let values = assignment(&model, &[(y[1][1], 1.0), (nearest.vars[0], 0.45)]);
        assert!(model.violations(&values, 1e-9).is_empty());

        let values = assignment(&model, &[(y[1][1], 1.0), (nearest.vars[0], 0.5)]);
        assert!(!model.violations(&values, 1e-9).is_empty());
    }

    #[test]
    fn too_small_big_m_binds_at_unbuilt_site() {
        let (model, nearest, y) = setup(&array![[0.1, 0.9]], 0.05);
        let values = assignment(&model, &[(y[0][1], 1.0), (nearest.vars[0], 0.9)]);
        let violations = model.violations(&values, 1e-9);
        // the empty site 0 now caps d at 0.05
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0],
            Violation::Constraint { name, .. } if name == "d_0_0"
        ));
    }

    #[test]
    fn landmark_outside_unit_square_is_cut_off() {
        let landmark = [Point::new(3.0, 3.0)];
        let candidates = [Point::new(0.0, 0.0), Point::new(1.0, 1.0)];
        let distances = distance_matrix(&landmark, &candidates);
        let big_m = unit_square_big_m(1.0);

        assert!(largest_weighted_distance(distances.view(), &WEIGHTS) > big_m);
        assert!(!big_m_covers(distances.view(), &WEIGHTS, big_m));
        assert!(big_m_covers(array![[0.1, 0.9]].view(), &WEIGHTS, big_m));

        // small facility at (1, 1) only, the empty site at the origin caps d below the truth
        let (model, nearest, y) = setup(&distances, big_m);
        let truth = landmark[0].distance(&candidates[1]);
        let values = assignment(&model, &[(y[0][1], 1.0), (nearest.vars[0], truth)]);
        let violations = model.violations(&values, 1e-9);
        assert_eq!(violations.len(), 1);
        assert!(matches!(
            &violations[0],
            Violation::Constraint { name, .. } if name == "d_0_0"
        ));
    }
}
