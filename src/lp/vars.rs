use super::{ModelBuilder, VarKind, Variable};
use crate::solver::Solution;
use std::ops::Range;

pub trait AddVars {
    type Out;

    /// Create a family of variables of any type, named `{base_name}_{index}`
    fn vars(
        &self,
        builder: &mut ModelBuilder,
        base_name: &str,
        kind: VarKind,
        bounds: &Range<f64>,
    ) -> Self::Out;

    /// Binary variables
    fn binary(&self, builder: &mut ModelBuilder, base_name: &str) -> Self::Out {
        self.vars(builder, base_name, VarKind::Binary, &(0.0..1.0))
    }

    /// A continuous non-negative variable
    fn cont(&self, builder: &mut ModelBuilder, base_name: &str) -> Self::Out {
        self.vars(builder, base_name, VarKind::Continuous, &(0.0..f64::INFINITY))
    }

    /// A continuous variable in the given range
    fn bounded(&self, builder: &mut ModelBuilder, base_name: &str, bounds: &Range<f64>) -> Self::Out {
        self.vars(builder, base_name, VarKind::Continuous, bounds)
    }
}

impl AddVars for usize {
    type Out = Vec<Variable>;

    fn vars(
        &self,
        builder: &mut ModelBuilder,
        base_name: &str,
        kind: VarKind,
        bounds: &Range<f64>,
    ) -> Self::Out {
        (0..*self)
            .map(|i| builder.add_var(&format!("{}_{}", base_name, i), kind, bounds))
            .collect()
    }
}

impl AddVars for (usize, usize) {
    type Out = Vec<<usize as AddVars>::Out>;

    fn vars(
        &self,
        builder: &mut ModelBuilder,
        base_name: &str,
        kind: VarKind,
        bounds: &Range<f64>,
    ) -> Self::Out {
        (0..self.0)
            .map(|i| {
                self.1
                    .vars(builder, &format!("{}_{}", base_name, i), kind, bounds)
            })
            .collect()
    }
}

/// Reads solved values back into the shape the variables were created in
pub trait ConvertVars {
    type Out;
    fn convert(&self, solution: &Solution) -> Self::Out;
}

impl<T: ConvertVars> ConvertVars for Vec<T> {
    type Out = Vec<T::Out>;

    fn convert(&self, solution: &Solution) -> Self::Out {
        self.iter().map(|e| e.convert(solution)).collect()
    }
}

impl ConvertVars for Variable {
    type Out = f64;

    fn convert(&self, solution: &Solution) -> Self::Out {
        solution.value(*self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_families_are_named_by_index() {
        let mut builder = ModelBuilder::new("names");
        let flow = (2usize, 3usize).cont(&mut builder, "flow");
        let model = builder.build();

        assert_eq!(flow.len(), 2);
        assert_eq!(flow[1].len(), 3);
        let info = model
            .variables()
            .iter()
            .find(|v| v.var == flow[1][2])
            .unwrap();
        assert_eq!(info.name, "flow_1_2");
        assert_eq!(model.variables().len(), 6);
    }
}
