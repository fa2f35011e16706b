//! Error types for the scriptbridge.
//!
//! This module defines two error types using `thiserror`:
//! - [`BridgeError`]: every failure the bridge can surface to its caller,
//!   from lifecycle misuse to a trapping guest call
//! - [`HostFault`]: failures inside a host-exposed native function, converted
//!   into a guest-visible trap at the call boundary

use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the bridge.
///
/// Every import/resolve/call failure is fatal to the bridge operation in
/// progress: intermediate foreign references are released and one of these
/// variants is returned. There is no retry.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// The runtime was already initialized (or already finalized) when an
    /// operation valid only before `initialize()` was attempted.
    #[error("runtime already initialized")]
    AlreadyInitialized,

    /// An invoker operation was attempted while the runtime was not in the
    /// Initialized state.
    #[error("runtime not initialized")]
    NotInitialized,

    /// The configured runtime-home override does not name a directory.
    #[error("runtime home override is not a directory: {path}")]
    HomeOverrideInvalid {
        /// The offending path.
        path: PathBuf,
    },

    /// The runtime failed to boot (engine creation, native-module install,
    /// or working-directory resolution).
    #[error("runtime failed to boot: {reason}")]
    Boot {
        /// Description of the boot failure.
        reason: String,
    },

    /// The named script module could not be located on the search path, or
    /// raised while being imported.
    #[error("script module not found: {module} ({reason})")]
    ModuleNotFound {
        /// The module name that was requested.
        module: String,
        /// Why the import failed (lookup miss, compile error, trap).
        reason: String,
    },

    /// The named export is absent from the module, or is not a callable.
    #[error("function not found: {module}::{function}")]
    FunctionNotFound {
        /// The module the lookup ran against.
        module: String,
        /// The export name that was requested.
        function: String,
    },

    /// An argument or return value could not be marshaled across the
    /// boundary (arity mismatch, non-scalar parameter or result type).
    #[error("argument marshal error: {reason}")]
    ArgumentMarshal {
        /// Description of the shape mismatch.
        reason: String,
    },

    /// The foreign invocation raised.
    #[error("call to '{function}' raised: {diagnostic}")]
    Call {
        /// The function that was being invoked.
        function: String,
        /// The captured foreign diagnostic (trap message).
        diagnostic: String,
    },

    /// Teardown was attempted out of order, or per-call references were
    /// still outstanding. Reported but non-fatal: the runtime is considered
    /// torn down regardless.
    #[error("finalize error: {reason}")]
    Finalize {
        /// Description of the finalize failure.
        reason: String,
    },
}

/// A failure inside a host-exposed native function.
///
/// Handlers must never let an internal fault escape unmarshaled; the
/// registrar converts a `HostFault` into a trap the guest can observe,
/// keeping the host process alive.
#[derive(Error, Debug)]
pub enum HostFault {
    /// The guest passed an argument the handler cannot accept.
    #[error("invalid argument: {reason}")]
    InvalidArgument {
        /// Description of why the argument was invalid.
        reason: String,
    },

    /// The handler failed internally.
    #[error("host function failed: {reason}")]
    Internal {
        /// Description of the internal failure.
        reason: String,
    },
}

impl BridgeError {
    /// Create a new `Boot` error.
    pub fn boot(reason: impl Into<String>) -> Self {
        Self::Boot {
            reason: reason.into(),
        }
    }

    /// Create a new `ModuleNotFound` error.
    pub fn module_not_found(module: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ModuleNotFound {
            module: module.into(),
            reason: reason.into(),
        }
    }

    /// Create a new `FunctionNotFound` error.
    pub fn function_not_found(module: impl Into<String>, function: impl Into<String>) -> Self {
        Self::FunctionNotFound {
            module: module.into(),
            function: function.into(),
        }
    }

    /// Create a new `ArgumentMarshal` error.
    pub fn marshal(reason: impl Into<String>) -> Self {
        Self::ArgumentMarshal {
            reason: reason.into(),
        }
    }

    /// Create a new `Call` error.
    pub fn call(function: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self::Call {
            function: function.into(),
            diagnostic: diagnostic.into(),
        }
    }

    /// Create a new `Finalize` error.
    pub fn finalize(reason: impl Into<String>) -> Self {
        Self::Finalize {
            reason: reason.into(),
        }
    }

    /// Returns `true` if this error indicates the script module was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ModuleNotFound { .. })
    }

    /// Returns `true` if this error indicates lifecycle misuse rather than a
    /// failure inside the foreign runtime.
    pub fn is_lifecycle(&self) -> bool {
        matches!(
            self,
            Self::AlreadyInitialized | Self::NotInitialized | Self::Finalize { .. }
        )
    }
}

impl HostFault {
    /// Create a new `InvalidArgument` fault.
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            reason: reason.into(),
        }
    }

    /// Create a new `Internal` fault.
    pub fn internal(reason: impl Into<String>) -> Self {
        Self::Internal {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BridgeError::module_not_found("does_not_exist", "not on search path");
        assert_eq!(
            err.to_string(),
            "script module not found: does_not_exist (not on search path)"
        );

        let err = BridgeError::AlreadyInitialized;
        assert_eq!(err.to_string(), "runtime already initialized");
    }

    #[test]
    fn test_is_not_found() {
        assert!(BridgeError::module_not_found("guest", "lookup miss").is_not_found());
        assert!(!BridgeError::NotInitialized.is_not_found());
    }

    #[test]
    fn test_is_lifecycle() {
        assert!(BridgeError::AlreadyInitialized.is_lifecycle());
        assert!(BridgeError::NotInitialized.is_lifecycle());
        assert!(BridgeError::finalize("already finalized").is_lifecycle());
        assert!(!BridgeError::call("f", "trap").is_lifecycle());
    }

    #[test]
    fn test_host_fault_display() {
        let fault = HostFault::invalid_argument("expected non-negative serial");
        assert_eq!(
            fault.to_string(),
            "invalid argument: expected non-negative serial"
        );
    }
}
