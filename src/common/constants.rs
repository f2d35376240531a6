//! Constants used throughout the engine

/// Maximum logical row count of a chunk. All kernels size their output
/// buffers to this bound; a chunk's `size()` never exceeds it.
pub const STANDARD_VECTOR_SIZE: usize = 2048;

/// Invalid index constant
pub const INVALID_INDEX: usize = usize::MAX;

/// Invalid column constant
pub const INVALID_COLUMN: usize = usize::MAX;

/// Default memory limit for a query (1GB)
pub const DEFAULT_MEMORY_LIMIT: usize = 1024 * 1024 * 1024;

/// Maximum threads for parallel execution
pub const MAX_THREADS: usize = 64;
