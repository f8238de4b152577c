use serde::{Deserialize, Serialize};
use std::fmt;

use crate::values::{EntityId, Timestamp};

/// Metric column that can be routed to a detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Metric {
    #[serde(rename = "cpu_util")]
    Cpu,
    #[serde(rename = "mem_util")]
    Memory,
}

impl Metric {
    /// All metrics in routing order
    pub const ALL: [Metric; 2] = [Metric::Cpu, Metric::Memory];

    /// Column name in source data
    pub fn column(&self) -> &'static str {
        match self {
            Metric::Cpu => "cpu_util",
            Metric::Memory => "mem_util",
        }
    }

    pub fn from_column(name: &str) -> Option<Self> {
        match name {
            "cpu_util" => Some(Metric::Cpu),
            "mem_util" => Some(Metric::Memory),
            _ => None,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// One telemetry observation for an entity
///
/// Metric columns are optional; an absent value means the column was
/// missing or empty in the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub entity_id: EntityId,
    pub timestamp: Timestamp,
    pub cpu_util: Option<f64>,
    pub mem_util: Option<f64>,
}

impl Row {
    pub fn new(entity_id: impl Into<EntityId>, timestamp: Timestamp) -> Self {
        Self {
            entity_id: entity_id.into(),
            timestamp,
            cpu_util: None,
            mem_util: None,
        }
    }

    pub fn with_cpu(mut self, value: f64) -> Self {
        self.cpu_util = Some(value);
        self
    }

    pub fn with_memory(mut self, value: f64) -> Self {
        self.mem_util = Some(value);
        self
    }

    /// Value of a metric column, if present
    #[inline]
    pub fn value(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Cpu => self.cpu_util,
            Metric::Memory => self.mem_util,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_builder() {
        let row = Row::new("m_1", 100).with_cpu(42.0);
        assert_eq!(row.value(Metric::Cpu), Some(42.0));
        assert_eq!(row.value(Metric::Memory), None);
    }

    #[test]
    fn test_metric_columns_round_trip() {
        for metric in Metric::ALL {
            assert_eq!(Metric::from_column(metric.column()), Some(metric));
        }
        assert_eq!(Metric::from_column("disk_util"), None);
    }
}
