use blackice_core::Row;

use crate::error::SourceResult;

/// Port for chunked row ingestion
///
/// Implementations yield rows in source order. A chunk is the unit the
/// pipeline processes and accounts for in its throughput metrics.
pub trait RowSource {
    /// Next chunk of rows, or `None` once the source is exhausted
    fn next_chunk(&mut self) -> SourceResult<Option<Vec<Row>>>;

    /// Drain the source into a single vector
    fn read_all(&mut self) -> SourceResult<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(chunk) = self.next_chunk()? {
            rows.extend(chunk);
        }
        Ok(rows)
    }
}
