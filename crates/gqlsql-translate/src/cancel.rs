//! Cooperative cancellation (spec §5 "Cancellation"): translation checks a token at every
//! recursive descent boundary and aborts without emitting partial SQL. Grounded on the Go
//! original's use of a `context.Context` threaded through `translator` — the idiomatic Rust
//! shape for a value that is cheap to clone, safe to share across translations, and checked
//! synchronously (no executor/async runtime is assumed here) is an `Arc<AtomicBool>`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::TranslationError;

/// A cheaply cloneable cancellation flag. Cloning shares the same underlying flag; calling
/// [`CancellationToken::cancel`] on any clone is visible to all of them.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        CancellationToken { cancelled: Arc::new(AtomicBool::new(false)) }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Checked at each recursive descent boundary in the translator.
    pub fn check(&self) -> Result<(), TranslationError> {
        if self.is_cancelled() {
            Err(TranslationError::Cancelled)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_token_is_not_cancelled() {
        let token = CancellationToken::new();
        assert!(token.check().is_ok());
    }

    #[test]
    fn cancelling_a_clone_is_visible_through_the_original() {
        let token = CancellationToken::new();
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(TranslationError::Cancelled)));
    }
}
