use crate::error::Result;
use crate::instance::Instance;
use crate::models::siting::{SitingResult, Weights};
use crate::models::toy::ToyResult;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

/// Flows below this are not printed
const FLOW_EPS: f64 = 1e-6;

/// Identifies a single run
#[derive(Debug, Clone, Serialize)]
pub struct RunInfo {
    pub run_id: String,
    pub created: String,
    pub solver: String,
}

impl RunInfo {
    pub fn new(solver: &str) -> RunInfo {
        RunInfo {
            run_id: Uuid::new_v4().to_string(),
            created: Utc::now().to_rfc3339(),
            solver: solver.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ToyReport {
    #[serde(flatten)]
    pub run: RunInfo,
    pub result: ToyResult,
}

impl fmt::Display for ToyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.result;
        writeln!(f, "run {} ({})", self.run.run_id, self.run.solver)?;
        writeln!(
            f,
            "minimize {}*x0 + {}*x1 + {}*x2",
            r.weights[0], r.weights[1], r.weights[2]
        )?;
        writeln!(f, "x = ({:.4}, {:.4}, {:.4})", r.x[0], r.x[1], r.x[2])?;
        write!(f, "objective = {:.4}", r.objective)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SitingReport {
    #[serde(flatten)]
    pub run: RunInfo,
    /// Seed the instance was generated from, if it was generated
    pub seed: Option<u64>,
    pub weights: Weights,
    pub instance: Instance,
    pub result: SitingResult,
}

impl fmt::Display for SitingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = &self.result;
        writeln!(f, "run {} ({})", self.run.run_id, self.run.solver)?;
        writeln!(f, "weights: {}", self.weights)?;
        writeln!(f, "objectives: {}", r.objectives)?;
        writeln!(f, "scalarized objective = {:.4}", r.scalar)?;

        writeln!(f, "facilities:")?;
        for (j, kind) in r.built() {
            writeln!(f, "  site {:>3}: {} (inflow {:.3})", j, kind, r.inflow(j))?;
        }

        write!(f, "flows:")?;
        for (i, row) in r.x.iter().enumerate() {
            for (j, &flow) in row.iter().enumerate() {
                if flow > FLOW_EPS {
                    write!(f, "\n  farm {:>3} -> site {:>3}: {:.3}", i, j, flow)?;
                }
            }
        }
        Ok(())
    }
}

/// Writes any report as pretty printed JSON
pub fn write_json<T: Serialize>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    serde_json::to_writer_pretty(file, value)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toy_report_serializes_run_info_inline() {
        let report = ToyReport {
            run: RunInfo::new("microlp"),
            result: ToyResult {
                weights: [0.5, 0.2, 0.3],
                x: [0.0, 2.0 / 3.0, 1.0 / 3.0],
                objective: 0.2333,
            },
        };
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["solver"], "microlp");
        assert!(json["run_id"].as_str().unwrap().len() == 36);
        assert_eq!(json["result"]["objective"], 0.2333);
        assert!(report.to_string().contains("objective = 0.2333"));
    }
}
