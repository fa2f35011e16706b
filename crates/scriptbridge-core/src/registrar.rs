//! Native module registration.
//!
//! A [`NativeModuleDescriptor`] declares the host-exposed callable surface
//! (module name plus an ordered function table) that guest code can import.
//! Descriptors are registered with the lifecycle manager before
//! `initialize()` and installed into the runtime's linker when it boots.

use std::sync::Arc;

use tracing::{debug, warn};
use wasmtime::{Engine, FuncType, Linker, Val, ValType};

use scriptbridge_common::{BridgeError, HostFault};

use crate::context::CallContext;

/// Handler backing one host-exposed function.
///
/// Takes the unmarshaled scalar arguments in order and returns one scalar.
/// A returned [`HostFault`] is converted into a guest-visible trap; it never
/// unwinds into the host.
pub type HostHandler = Arc<dyn Fn(&[i64]) -> Result<i64, HostFault> + Send + Sync>;

/// One entry of a native module's function table.
#[derive(Clone)]
pub struct NativeFunctionDef {
    /// Export name the guest imports.
    pub name: String,

    /// Declared argument count. Fixed per function; the wasm type system has
    /// no variadic signatures.
    pub arity: usize,

    /// The host-side implementation.
    pub handler: HostHandler,
}

/// An immutable host-exposed module: name plus ordered function table.
#[derive(Clone)]
pub struct NativeModuleDescriptor {
    name: String,
    functions: Vec<NativeFunctionDef>,
}

impl NativeModuleDescriptor {
    /// Start a descriptor for the module named `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            functions: Vec::new(),
        }
    }

    /// Add a function to the table (builder style).
    pub fn function<F>(mut self, name: impl Into<String>, arity: usize, handler: F) -> Self
    where
        F: Fn(&[i64]) -> Result<i64, HostFault> + Send + Sync + 'static,
    {
        self.functions.push(NativeFunctionDef {
            name: name.into(),
            arity,
            handler: Arc::new(handler),
        });
        self
    }

    /// The module name guest code imports.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The ordered function table.
    pub fn functions(&self) -> &[NativeFunctionDef] {
        &self.functions
    }

    /// Install every function of this descriptor into `linker`.
    ///
    /// Each function is given the wasm type `(i64 × arity) -> i64`. Handler
    /// faults are raised as traps carrying the qualified function name.
    pub(crate) fn install(
        &self,
        engine: &Engine,
        linker: &mut Linker<CallContext>,
    ) -> Result<(), BridgeError> {
        for def in &self.functions {
            let ty = FuncType::new(
                engine,
                std::iter::repeat(ValType::I64).take(def.arity),
                [ValType::I64],
            );
            let handler = Arc::clone(&def.handler);
            let qualified = format!("{}.{}", self.name, def.name);
            let trap_name = qualified.clone();

            linker
                .func_new(
                    &self.name,
                    &def.name,
                    ty,
                    move |mut caller, params, results| {
                        caller.data_mut().host_calls += 1;

                        // Parameters are i64 by the declared type above.
                        let args: Vec<i64> = params.iter().filter_map(Val::i64).collect();
                        match handler(&args) {
                            Ok(value) => {
                                results[0] = Val::I64(value);
                                Ok(())
                            }
                            Err(fault) => {
                                warn!(function = %trap_name, %fault, "host function fault");
                                Err(wasmtime::Error::msg(format!("{trap_name}: {fault}")))
                            }
                        }
                    },
                )
                .map_err(|e| {
                    BridgeError::boot(format!("failed to install native function {qualified}: {e}"))
                })?;

            debug!(function = %qualified, arity = def.arity, "native function installed");
        }

        Ok(())
    }
}

impl std::fmt::Debug for NativeModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeModuleDescriptor")
            .field("name", &self.name)
            .field(
                "functions",
                &self
                    .functions
                    .iter()
                    .map(|d| (d.name.as_str(), d.arity))
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
