//! Batch accumulation for the write path.
//!
//! Rows are flushed every [`BATCH_SIZE`] additions and once more at the end;
//! the same discipline applies to insert and update.

/// Rows per flushed batch.
pub const BATCH_SIZE: usize = 1000;

/// Accumulates bound rows and yields full chunks as they fill up.
#[derive(Debug)]
pub(crate) struct BatchBuffer<T> {
    pending: Vec<T>,
    capacity: usize,
}

impl<T> BatchBuffer<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        BatchBuffer {
            pending: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Add one row; returns a full chunk when the buffer reaches capacity.
    pub(crate) fn push(&mut self, row: T) -> Option<Vec<T>> {
        self.pending.push(row);
        if self.pending.len() == self.capacity {
            Some(std::mem::replace(
                &mut self.pending,
                Vec::with_capacity(self.capacity),
            ))
        } else {
            None
        }
    }

    /// Drain whatever remains after the last full chunk.
    pub(crate) fn finish(mut self) -> Option<Vec<T>> {
        if self.pending.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.pending))
        }
    }
}
