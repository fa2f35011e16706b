//! The canonical diagnostics module.
//!
//! A fixed module importable by guest scripts, used to prove the native
//! surface is wired up: its zero-argument `testfun` always returns `42`.

use tracing::info;

use scriptbridge_core::NativeModuleDescriptor;

/// Module identifier guest scripts import.
pub const DIAGNOSTICS_MODULE: &str = "hostdiag";

/// Name of the diagnostic function.
pub const TESTFUN: &str = "testfun";

/// The constant `testfun` returns.
pub const TESTFUN_RESULT: i64 = 42;

/// Build the diagnostics module descriptor.
///
/// Register the result with the lifecycle manager before `initialize()`.
pub fn diagnostics_module() -> NativeModuleDescriptor {
    NativeModuleDescriptor::new(DIAGNOSTICS_MODULE).function(TESTFUN, 0, |_args| {
        info!(value = TESTFUN_RESULT, "diagnostic testfun invoked");
        Ok(TESTFUN_RESULT)
    })
}
