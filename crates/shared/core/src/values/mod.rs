/// Ordered sample key, in whole seconds
pub type Timestamp = i64;

/// Identifier of a monitored entity (e.g. a machine id)
pub type EntityId = String;

/// Signed distance between two timestamps in seconds
#[inline]
pub fn seconds_between(from: Timestamp, to: Timestamp) -> f64 {
    (to - from) as f64
}
