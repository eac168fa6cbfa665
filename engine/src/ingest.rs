use crate::catalog::{CatalogIndex, IngestOutcome};
use crate::record::RawRecord;

pub const DEFAULT_CHUNK_SIZE: usize = 2000;

/// Per-batch outcome tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub added: usize,
    pub duplicates: usize,
    pub unidentified: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.added + self.duplicates + self.unidentified
    }
}

/// Resumable ingestion over a record stream. The caller drives it one
/// chunk at a time and may stop (drop it) between chunks; every
/// completed chunk leaves the catalog fully consistent, so a cancelled
/// run is just a shorter batch.
pub struct ChunkedIngest<I> {
    records: I,
    chunk_size: usize,
    summary: BatchSummary,
}

impl<I> ChunkedIngest<I>
where
    I: Iterator<Item = RawRecord>,
{
    pub fn new(records: I, chunk_size: usize) -> Self {
        Self {
            records,
            chunk_size: chunk_size.max(1),
            summary: BatchSummary::default(),
        }
    }

    /// Ingests up to one chunk of records. Returns how many were
    /// consumed, or `None` once the stream is exhausted.
    pub fn process_chunk(&mut self, catalog: &mut CatalogIndex) -> Option<usize> {
        let mut consumed = 0;
        while consumed < self.chunk_size {
            let Some(record) = self.records.next() else { break };
            consumed += 1;
            match catalog.ingest(&record) {
                IngestOutcome::Added(_) => self.summary.added += 1,
                IngestOutcome::Duplicate => self.summary.duplicates += 1,
                IngestOutcome::Unidentified => self.summary.unidentified += 1,
            }
        }
        if consumed == 0 {
            return None;
        }
        tracing::debug!(consumed, processed = self.summary.total(), "ingest chunk");
        Some(consumed)
    }

    pub fn summary(&self) -> BatchSummary {
        self.summary
    }
}
