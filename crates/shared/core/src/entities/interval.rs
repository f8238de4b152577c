use serde::{Deserialize, Serialize};

use crate::values::Timestamp;

/// Labeled time range in which a true anomaly exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyInterval {
    pub start_time: Timestamp,
    pub end_time: Timestamp,
}

impl AnomalyInterval {
    pub fn new(start_time: Timestamp, end_time: Timestamp) -> Self {
        Self {
            start_time,
            end_time,
        }
    }

    /// Inclusive on both ends
    #[inline]
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        self.start_time <= timestamp && timestamp <= self.end_time
    }
}
