//! Per-call execution context and store management.
//!
//! A fresh [`wasmtime::Store`] carrying a [`CallContext`] is created for each
//! import → resolve → call sequence and dropped when the sequence ends, so a
//! call can never observe state left behind by an earlier one.

use std::time::{Duration, Instant};

use wasmtime::{Engine, Store};

/// Per-call state accessible from registered native functions.
pub struct CallContext {
    /// Name of the script module this call runs against.
    pub script: String,

    /// Number of native (host) functions the guest has called so far.
    pub host_calls: u64,

    start_time: Instant,
}

impl CallContext {
    /// Create a new context for one invocation of `script`.
    pub fn new(script: impl Into<String>) -> Self {
        Self {
            script: script.into(),
            host_calls: 0,
            start_time: Instant::now(),
        }
    }

    /// Elapsed time since the invocation started.
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Create a fresh store for one invocation.
pub fn create_store(engine: &Engine, script: impl Into<String>) -> Store<CallContext> {
    Store::new(engine, CallContext::new(script))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_creation() {
        let ctx = CallContext::new("guest");

        assert_eq!(ctx.script, "guest");
        assert_eq!(ctx.host_calls, 0);
    }

    #[test]
    fn test_store_creation() {
        let engine = Engine::default();
        let store = create_store(&engine, "guest");

        assert_eq!(store.data().script, "guest");
    }
}
