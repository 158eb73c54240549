//! # numkit-core
//!
//! Core library for numkit: a parallel map with per-task timeouts, a chunked
//! rectangle-rule integrator built on it, memoized Fibonacci over a shared
//! cache, and a handful of descriptive statistics.

pub mod cache;
pub mod constants;
pub mod error;
pub mod fibonacci;
pub mod integral;
pub mod options;
pub mod parallel;
pub mod progress;
pub mod stats;

// Re-exports
pub use cache::{CacheStats, SharedCache};
pub use constants::{exit_codes, CORRECTION_FACTOR, DEFAULT_CHUNK_TIMEOUT, DX};
pub use error::NumError;
pub use fibonacci::{fibonacci, fibonacci_many, fibonacci_with_cache, seeded_cache, FibCache};
pub use integral::{integral, integral_chunked, plan_chunks, riemann_sum, Chunk, Integrator};
pub use options::{Dispatch, IntegrationOptions, MapOptions};
pub use parallel::{parallel_map, parallel_map_with, try_parallel_map};
pub use progress::{CancellationToken, ChildToken};
