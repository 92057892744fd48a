/// Fixed-size batching of filtered prospects
///
/// Batches keep requests under the completion service's rate limit.
/// The partition is ordered, disjoint and exhaustive; only the last batch
/// may be short.
use crate::error::{EnrichError, Result};

/// Batch size that fits inside the current completion rate limit
pub const DEFAULT_BATCH_SIZE: usize = 150;

/// A contiguous slice of rows to classify in one request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Batch<'a, T> {
    /// Zero-based position of this batch in the run
    pub index: usize,
    /// Offset of the first row within the full record set
    pub offset: usize,
    pub records: &'a [T],
}

impl<'a, T> Batch<'a, T> {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Split `records` into consecutive batches of at most `batch_size` rows.
pub fn split_into_batches<T>(records: &[T], batch_size: usize) -> Result<Vec<Batch<'_, T>>> {
    if batch_size == 0 {
        return Err(EnrichError::Config("batch size must be at least 1".to_string()));
    }

    Ok(records
        .chunks(batch_size)
        .enumerate()
        .map(|(index, records)| Batch {
            index,
            offset: index * batch_size,
            records,
        })
        .collect())
}
