//! Cooperative cancellation shared between a dispatcher and its tasks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::NumError;

/// Cooperative cancellation token backed by an atomic flag.
///
/// Clones share the same flag, so a dispatcher can hand a clone to every
/// task and cancel all of them at once.
///
/// # Example
/// ```
/// use numkit_core::progress::CancellationToken;
///
/// let token = CancellationToken::new();
/// assert!(!token.is_cancelled());
///
/// token.cancel();
/// assert!(token.is_cancelled());
/// assert!(token.check_cancelled().is_err());
/// ```
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a new, not yet cancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Check for cancellation, returning `NumError::Cancelled` if requested.
    pub fn check_cancelled(&self) -> Result<(), NumError> {
        if self.is_cancelled() {
            Err(NumError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Create a token that is cancelled whenever `self` is, but can also be
    /// cancelled on its own without affecting `self`.
    #[must_use]
    pub fn child(&self) -> ChildToken {
        ChildToken {
            parent: self.clone(),
            own: Self::new(),
        }
    }
}

/// A token linked to a parent: cancelled if either it or its parent is.
#[derive(Clone, Debug)]
pub struct ChildToken {
    parent: CancellationToken,
    own: CancellationToken,
}

impl ChildToken {
    /// Check if this token or its parent has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.own.is_cancelled() || self.parent.is_cancelled()
    }

    /// Cancel this token only.
    pub fn cancel(&self) {
        self.own.cancel();
    }

    /// Check for cancellation, returning `NumError::Cancelled` if requested.
    pub fn check_cancelled(&self) -> Result<(), NumError> {
        if self.is_cancelled() {
            Err(NumError::Cancelled)
        } else {
            Ok(())
        }
    }
}
