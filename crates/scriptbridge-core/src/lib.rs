//! Core Wasmtime bridge for scriptbridge.
//!
//! This crate embeds a single WebAssembly runtime inside the host process and
//! provides:
//! - [`ScriptRuntime`]: one-shot runtime lifecycle (initialize/finalize)
//! - [`NativeModuleDescriptor`]: the host-exposed callable surface
//! - [`ScriptInvoker`]: import a script module, resolve a function, call it
//! - [`RefLedger`]: accounting for every per-call foreign reference
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                    ScriptRuntime                        │
//! │  (one per process, Uninitialized → Initialized →        │
//! │   Finalized, owns Engine + Linker + search path)        │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    ScriptInvoker                        │
//! │  (valid only while Initialized)                         │
//! │  import_module → get_function → call                    │
//! └─────────────────────────────────────────────────────────┘
//!                            │
//!                            ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │        ModuleHandle / ForeignFunctionHandle             │
//! │  (per-call, ledger-guarded, released on every path)     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod invoker;
pub mod ledger;
pub mod lifecycle;
pub mod marshal;
pub mod registrar;

pub use context::CallContext;
pub use invoker::{ForeignFunctionHandle, ModuleHandle, ScriptInvoker};
pub use ledger::{RefGuard, RefLedger};
pub use lifecycle::{LifecycleState, ScriptRuntime};
pub use marshal::ArgumentList;
pub use registrar::{NativeFunctionDef, NativeModuleDescriptor};
