//! Host-exposed native modules for scriptbridge.
//!
//! This crate provides the host side of the bridge: the native module
//! descriptors guest scripts can import. Handlers here must never let an
//! internal fault escape unmarshaled; a fault is returned as a
//! [`scriptbridge_common::HostFault`] and surfaces to the guest as a trap.

pub mod diagnostics;

pub use diagnostics::{DIAGNOSTICS_MODULE, TESTFUN, TESTFUN_RESULT, diagnostics_module};
