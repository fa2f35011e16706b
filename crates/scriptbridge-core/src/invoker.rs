//! Script import, function resolution, and invocation.
//!
//! [`ScriptInvoker`] performs the per-call sequence: import a script module
//! from the search path, resolve a named function inside it, marshal the
//! arguments, perform one blocking call, and unmarshal the result. Every
//! foreign reference acquired along the way ([`ModuleHandle`],
//! [`ForeignFunctionHandle`]) carries a ledger guard released when the handle
//! drops, so nothing is leaked even when a step in the middle fails.

use std::path::PathBuf;

use tracing::{debug, error, info, instrument};
use wasmtime::{Func, Instance, Store, Val};

use scriptbridge_common::{BridgeConfig, BridgeError};

use crate::context::{CallContext, create_store};
use crate::ledger::{RefGuard, RefLedger};
use crate::lifecycle::RuntimeInner;
use crate::marshal::{ArgumentList, check_signature, unmarshal_return};

/// Performs import → resolve → call sequences against the booted runtime.
///
/// Obtained from [`crate::ScriptRuntime::invoker`], which guarantees the
/// runtime is Initialized. The call is synchronous; the invoking thread
/// blocks until the foreign function returns or raises.
pub struct ScriptInvoker<'rt> {
    inner: &'rt RuntimeInner,
    config: &'rt BridgeConfig,
    ledger: RefLedger,
}

/// An imported script module, alive for the duration of one call sequence.
///
/// Owns the per-call store; dropping the handle releases the instance and
/// its ledger slot.
pub struct ModuleHandle {
    name: String,
    store: Store<CallContext>,
    instance: Instance,
    _guard: RefGuard,
}

impl ModuleHandle {
    /// The module name this handle was imported as.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A callable resolved inside an imported module.
///
/// Borrows its module mutably and is consumed by [`ScriptInvoker::call`], so
/// it cannot outlive the invocation that created it.
pub struct ForeignFunctionHandle<'m> {
    name: String,
    func: Func,
    module: &'m mut ModuleHandle,
    _guard: RefGuard,
}

impl ForeignFunctionHandle<'_> {
    /// The export name this handle was resolved as.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<'rt> ScriptInvoker<'rt> {
    pub(crate) fn new(
        inner: &'rt RuntimeInner,
        config: &'rt BridgeConfig,
        ledger: RefLedger,
    ) -> Self {
        Self {
            inner,
            config,
            ledger,
        }
    }

    /// Import the named script module.
    ///
    /// Tries `<dir>/<name>.<ext>` for every search-path directory and every
    /// configured extension, in order, then compiles and instantiates the
    /// first match with a fresh store.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::ModuleNotFound`] when no candidate file
    /// exists, when compilation fails, or when the module raises while being
    /// imported (missing import, trapping start function). The foreign
    /// diagnostic is logged before the error is surfaced.
    #[instrument(skip(self))]
    pub fn import_module(&self, name: &str) -> Result<ModuleHandle, BridgeError> {
        let Some(path) = self.locate(name) else {
            return Err(BridgeError::module_not_found(
                name,
                "not found on module search path",
            ));
        };
        debug!(path = %path.display(), "script module located");

        let bytes = std::fs::read(&path).map_err(|e| {
            BridgeError::module_not_found(name, format!("cannot read {}: {e}", path.display()))
        })?;

        let module = wasmtime::Module::new(&self.inner.engine, &bytes).map_err(|e| {
            error!(module = name, diagnostic = %e, "script compilation failed");
            BridgeError::module_not_found(name, format!("compilation failed: {e}"))
        })?;

        let guard = self.ledger.acquire("module");
        let mut store = create_store(&self.inner.engine, name);
        let instance = self
            .inner
            .linker
            .instantiate(&mut store, &module)
            .map_err(|e| {
                error!(module = name, diagnostic = ?e, "script raised during import");
                BridgeError::module_not_found(name, format!("import raised: {}", e.root_cause()))
            })?;

        Ok(ModuleHandle {
            name: name.to_string(),
            store,
            instance,
            _guard: guard,
        })
    }

    /// Resolve a named function inside an imported module.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::FunctionNotFound`] when the export is absent
    /// or exists but is not invocable (a memory, global, or table).
    pub fn get_function<'m>(
        &self,
        module: &'m mut ModuleHandle,
        name: &str,
    ) -> Result<ForeignFunctionHandle<'m>, BridgeError> {
        let Some(export) = module.instance.get_export(&mut module.store, name) else {
            debug!(module = %module.name, function = name, "export absent");
            return Err(BridgeError::function_not_found(&module.name, name));
        };

        let Some(func) = export.into_func() else {
            debug!(module = %module.name, function = name, "export not callable");
            return Err(BridgeError::function_not_found(&module.name, name));
        };

        Ok(ForeignFunctionHandle {
            name: name.to_string(),
            func,
            module,
            _guard: self.ledger.acquire("function"),
        })
    }

    /// Call a resolved function with the given arguments.
    ///
    /// Marshals each host integer into the foreign representation in order,
    /// blocks until the function returns or raises, and unmarshals the
    /// single returned scalar. The function handle and argument list are
    /// consumed; their references are released before this returns on every
    /// path.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::ArgumentMarshal`] when the declared signature does
    ///   not fit the scalar boundary or the argument count
    /// - [`BridgeError::Call`] when the invocation raises; the foreign
    ///   diagnostic is captured and logged first
    #[instrument(skip(self, function, args), fields(function = %function.name))]
    pub fn call(
        &self,
        function: ForeignFunctionHandle<'_>,
        args: ArgumentList,
    ) -> Result<i64, BridgeError> {
        let ty = function.func.ty(&function.module.store);
        check_signature(&ty, args.len())?;

        let params = args.marshal();
        let mut results = vec![Val::I64(0)];

        function
            .func
            .call(&mut function.module.store, &params, &mut results)
            .map_err(|e| {
                error!(function = %function.name, diagnostic = ?e, "foreign call raised");
                BridgeError::call(&function.name, e.root_cause().to_string())
            })?;

        let value = unmarshal_return(&results)?;

        let data = function.module.store.data();
        info!(
            module = %function.module.name,
            function = %function.name,
            value,
            host_calls = data.host_calls,
            duration_us = data.elapsed().as_micros(),
            "foreign call completed"
        );
        Ok(value)
    }

    /// Perform one full import → resolve → call sequence.
    ///
    /// Every intermediate foreign reference is released before this returns,
    /// on the success path and on every failure path.
    pub fn invoke(
        &self,
        module: &str,
        function: &str,
        args: impl Into<ArgumentList>,
    ) -> Result<i64, BridgeError> {
        let mut handle = self.import_module(module)?;
        let func = self.get_function(&mut handle, function)?;
        self.call(func, args.into())
    }

    fn locate(&self, name: &str) -> Option<PathBuf> {
        for dir in &self.inner.search_path {
            for ext in &self.config.module_extensions {
                let candidate = dir.join(format!("{name}.{ext}"));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }
}

impl std::fmt::Debug for ScriptInvoker<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptInvoker")
            .field("search_path", &self.inner.search_path)
            .finish_non_exhaustive()
    }
}
