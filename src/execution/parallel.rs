//! Parallel Execution Framework for the engine
//!
//! This module implements the engine's morsel-driven parallelism approach:
//! - Data is split into "morsels" (chunks) that can be processed in parallel
//! - Uses Rayon for work-stealing thread pool
//! - Maintains the engine's vectorized execution model
//! - Implements parallel operators: Scan, Join, Aggregate

use crate::common::error::EngineResult;
use crate::types::DataChunk;
use rayon::prelude::*;
use std::sync::{Arc, Mutex};

/// Morsel size for parallel processing (the engine uses ~100K rows per morsel)
pub const MORSEL_SIZE: usize = 102400;

/// Parallel execution context
#[derive(Debug, Clone)]
pub struct ParallelContext {
    /// Number of worker threads
    pub num_threads: usize,
    /// Enable parallel execution
    pub parallel_enabled: bool,
}

impl ParallelContext {
    pub fn new(num_threads: usize) -> Self {
        Self {
            num_threads,
            parallel_enabled: num_threads > 1,
        }
    }

    pub fn from_system() -> Self {
        let num_threads = num_cpus::get();
        Self::new(num_threads)
    }
}

impl Default for ParallelContext {
    fn default() -> Self {
        Self::from_system()
    }
}

/// Morsel - a chunk of work that can be processed independently
#[derive(Debug, Clone)]
pub struct Morsel {
    /// Starting offset in the data source
    pub offset: usize,
    /// Number of rows in this morsel
    pub count: usize,
    /// Morsel ID for tracking
    pub id: usize,
}

impl Morsel {
    pub fn new(offset: usize, count: usize, id: usize) -> Self {
        Self { offset, count, id }
    }
}

/// Morsel generator - splits data into parallel work units
pub struct MorselGenerator {
    /// Total number of rows
    total_rows: usize,
    /// Size of each morsel
    morsel_size: usize,
    /// Current offset
    current_offset: Arc<Mutex<usize>>,
    /// Next morsel ID
    next_id: Arc<Mutex<usize>>,
}

impl MorselGenerator {
    pub fn new(total_rows: usize, morsel_size: usize) -> Self {
        Self {
            total_rows,
            morsel_size,
            current_offset: Arc::new(Mutex::new(0)),
            next_id: Arc::new(Mutex::new(0)),
        }
    }

    /// Get the next morsel for processing
    pub fn get_next_morsel(&self) -> Option<Morsel> {
        let mut offset = self.current_offset.lock().unwrap();
        let mut id = self.next_id.lock().unwrap();

        if *offset >= self.total_rows {
            return None;
        }

        let count = std::cmp::min(self.morsel_size, self.total_rows - *offset);
        let morsel = Morsel::new(*offset, count, *id);

        *offset += count;
        *id += 1;

        Some(morsel)
    }

    /// Get all morsels as a vector (for parallel iteration)
    pub fn get_all_morsels(&self) -> Vec<Morsel> {
        let num_morsels = (self.total_rows + self.morsel_size - 1) / self.morsel_size;
        (0..num_morsels)
            .map(|i| {
                let offset = i * self.morsel_size;
                let count = std::cmp::min(self.morsel_size, self.total_rows - offset);
                Morsel::new(offset, count, i)
            })
            .collect()
    }

    /// Get total number of morsels
    pub fn num_morsels(&self) -> usize {
        (self.total_rows + self.morsel_size - 1) / self.morsel_size
    }
}

/// Parallel table scan - processes table data in parallel
pub fn parallel_table_scan<F>(
    total_rows: usize,
    parallel_ctx: &ParallelContext,
    process_morsel: F,
) -> EngineResult<Vec<DataChunk>>
where
    F: Fn(&Morsel) -> EngineResult<DataChunk> + Send + Sync,
{
    if !parallel_ctx.parallel_enabled || total_rows < MORSEL_SIZE {
        // For small tables, use single-threaded execution
        let morsel = Morsel::new(0, total_rows, 0);
        let chunk = process_morsel(&morsel)?;
        return Ok(vec![chunk]);
    }

    // Generate morsels for parallel processing
    let generator = MorselGenerator::new(total_rows, MORSEL_SIZE);
    let morsels = generator.get_all_morsels();

    // Process morsels in parallel using Rayon
    let results: Vec<EngineResult<DataChunk>> = morsels
        .par_iter()
        .map(|morsel| process_morsel(morsel))
        .collect();

    // Collect results and check for errors
    let mut chunks = Vec::with_capacity(results.len());
    for result in results {
        chunks.push(result?);
    }

    Ok(chunks)
}

/// Thread pool configuration for query execution
pub struct ThreadPool {
    /// Number of worker threads
    num_threads: usize,
}

impl ThreadPool {
    pub fn new(num_threads: usize) -> Self {
        // Configure Rayon's global thread pool
        rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build_global()
            .ok(); // Ignore error if already initialized

        Self { num_threads }
    }

    pub fn num_threads(&self) -> usize {
        self.num_threads
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_morsel_generator() {
        let generator = MorselGenerator::new(250000, MORSEL_SIZE);
        let morsels = generator.get_all_morsels();

        // Should have 3 morsels: 102400 + 102400 + 45200 = 250000
        assert_eq!(morsels.len(), 3);
        assert_eq!(morsels[0].count, 102400);
        assert_eq!(morsels[1].count, 102400);
        assert_eq!(morsels[2].count, 45200);
    }

    #[test]
    fn test_parallel_context() {
        let ctx = ParallelContext::from_system();
        assert!(ctx.num_threads > 0);
        assert!(ctx.parallel_enabled || ctx.num_threads == 1);
    }

    #[test]
    fn test_morsel_sequential_generation() {
        let generator = MorselGenerator::new(300000, 100000);

        let m1 = generator.get_next_morsel().unwrap();
        assert_eq!(m1.offset, 0);
        assert_eq!(m1.count, 100000);

        let m2 = generator.get_next_morsel().unwrap();
        assert_eq!(m2.offset, 100000);
        assert_eq!(m2.count, 100000);

        let m3 = generator.get_next_morsel().unwrap();
        assert_eq!(m3.offset, 200000);
        assert_eq!(m3.count, 100000);

        let m4 = generator.get_next_morsel();
        assert!(m4.is_none());
    }
}
