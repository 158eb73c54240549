//! Dispatch and integration options.

use std::time::Duration;

use serde::Serialize;

use crate::constants::{CORRECTION_FACTOR, DEFAULT_CHUNK_TIMEOUT, DEFAULT_TASK_TIMEOUT, DX};

/// How a parallel map schedules its tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dispatch {
    /// One named OS thread per item.
    #[default]
    Threads,
    /// Tasks spawned onto the rayon global pool.
    Pool,
    /// Inline, in input order, on the calling thread. Timeouts do not apply.
    Sequential,
}

/// Options for `parallel_map_with`.
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Maximum time to wait for each task's result.
    pub timeout: Duration,
    /// Scheduling strategy.
    pub dispatch: Dispatch,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TASK_TIMEOUT,
            dispatch: Dispatch::default(),
        }
    }
}

impl MapOptions {
    /// Options with the given timeout and the default dispatch.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Self::default()
        }
    }
}

/// Options for the rectangle-rule integrator.
#[derive(Debug, Clone)]
pub struct IntegrationOptions {
    /// Step width of the scan.
    pub dx: f64,
    /// Correction factor applied once to the final sum.
    pub correction: f64,
    /// Per-chunk timeout for concurrent dispatch.
    pub chunk_timeout: Duration,
    /// Scheduling strategy for chunks.
    pub dispatch: Dispatch,
}

impl Default for IntegrationOptions {
    fn default() -> Self {
        Self {
            dx: DX,
            correction: CORRECTION_FACTOR,
            chunk_timeout: DEFAULT_CHUNK_TIMEOUT,
            dispatch: Dispatch::default(),
        }
    }
}

impl IntegrationOptions {
    /// Normalize options, restoring defaults for unusable values.
    #[must_use]
    pub fn normalize(mut self) -> Self {
        if !(self.dx.is_finite() && self.dx > 0.0) {
            self.dx = DX;
        }
        if !(self.correction.is_finite() && self.correction > 0.0) {
            self.correction = CORRECTION_FACTOR;
        }
        if self.chunk_timeout.is_zero() {
            self.chunk_timeout = DEFAULT_CHUNK_TIMEOUT;
        }
        self
    }

    /// Map options matching this integrator's chunk dispatch.
    #[must_use]
    pub fn map_options(&self) -> MapOptions {
        MapOptions {
            timeout: self.chunk_timeout,
            dispatch: self.dispatch,
        }
    }
}
