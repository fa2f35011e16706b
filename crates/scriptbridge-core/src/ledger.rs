//! Accounting for per-call foreign references.
//!
//! Every foreign reference the invoker acquires (module instance, resolved
//! function) holds a [`RefGuard`]; the guard decrements the shared count when
//! it is dropped, on success and failure paths alike. The lifecycle manager
//! refuses to finalize while the count is nonzero, and tests assert the count
//! returns to zero after every invocation path.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::trace;

/// Shared count of live foreign references.
#[derive(Clone, Debug, Default)]
pub struct RefLedger {
    live: Arc<AtomicUsize>,
}

/// Scoped acquisition of one foreign reference.
///
/// Releases its ledger slot when dropped. Guards are not cloneable, so a
/// reference can never be released twice.
#[derive(Debug)]
pub struct RefGuard {
    live: Arc<AtomicUsize>,
    what: &'static str,
}

impl RefLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the acquisition of one foreign reference.
    pub fn acquire(&self, what: &'static str) -> RefGuard {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(what, live, "foreign reference acquired");
        RefGuard {
            live: Arc::clone(&self.live),
            what,
        }
    }

    /// Number of foreign references currently outstanding.
    pub fn outstanding(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

impl Drop for RefGuard {
    fn drop(&mut self) {
        let live = self.live.fetch_sub(1, Ordering::SeqCst) - 1;
        trace!(what = self.what, live, "foreign reference released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_release() {
        let ledger = RefLedger::new();
        assert_eq!(ledger.outstanding(), 0);

        let a = ledger.acquire("module");
        let b = ledger.acquire("function");
        assert_eq!(ledger.outstanding(), 2);

        drop(a);
        assert_eq!(ledger.outstanding(), 1);
        drop(b);
        assert_eq!(ledger.outstanding(), 0);
    }

    #[test]
    fn test_release_on_early_exit() {
        let ledger = RefLedger::new();

        fn failing_sequence(ledger: &RefLedger) -> Result<(), ()> {
            let _module = ledger.acquire("module");
            Err(())
        }

        assert!(failing_sequence(&ledger).is_err());
        assert_eq!(ledger.outstanding(), 0);
    }
}
