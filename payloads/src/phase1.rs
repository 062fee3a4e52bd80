//! Typed rows for the `phase1_benchmarks` table.
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::BenchmarkRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Phase1Row {
    pub task_id: u32,
    pub task_name: String,
    pub latency_us: f64,
    pub iteration: u64,
    /// Free-form; usually a serialized [`crate::hardware::HardwareConfig`].
    pub hardware_config: Value,
    pub outlier: bool,
}

impl From<Phase1Row> for BenchmarkRow {
    fn from(row: Phase1Row) -> BenchmarkRow {
        let mut map = Map::new();
        map.insert("task_id".into(), row.task_id.into());
        map.insert("task_name".into(), row.task_name.into());
        map.insert("latency_us".into(), row.latency_us.into());
        map.insert("iteration".into(), row.iteration.into());
        map.insert("hardware_config".into(), row.hardware_config);
        map.insert("outlier".into(), row.outlier.into());
        BenchmarkRow::from(map)
    }
}
