//! One-shot runtime lifecycle management.
//!
//! [`ScriptRuntime`] owns the single embedded runtime of the process. Its
//! lifecycle is strictly ordered: native modules are registered while
//! Uninitialized, `initialize()` boots the runtime exactly once, invocations
//! happen while Initialized, and `finalize()` tears everything down exactly
//! once. Transitions are monotonic; duplicate initialization is rejected by
//! an explicit state check on this resource object.

use std::path::PathBuf;

use tracing::{debug, info, warn};
use wasmtime::{Config, Engine, Linker, OptLevel};

use scriptbridge_common::{BridgeConfig, BridgeError};

use crate::context::CallContext;
use crate::invoker::ScriptInvoker;
use crate::ledger::RefLedger;
use crate::registrar::NativeModuleDescriptor;

/// Lifecycle state of the embedded runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Created, not yet booted. Native modules may still be registered.
    Uninitialized,
    /// Booted and accepting invocations.
    Initialized,
    /// Torn down. Terminal.
    Finalized,
}

/// The embedded runtime resource.
///
/// At most one instance should be Initialized per process; the runtime is
/// not reentrant and callers must serialize access to it.
pub struct ScriptRuntime {
    config: BridgeConfig,
    state: LifecycleState,
    pending: Vec<NativeModuleDescriptor>,
    inner: Option<RuntimeInner>,
    ledger: RefLedger,
}

/// Everything that only exists between `initialize()` and `finalize()`.
pub(crate) struct RuntimeInner {
    pub(crate) engine: Engine,
    pub(crate) linker: Linker<CallContext>,
    pub(crate) search_path: Vec<PathBuf>,
}

impl ScriptRuntime {
    /// Create an uninitialized runtime with the given configuration.
    pub fn new(config: BridgeConfig) -> Self {
        Self {
            config,
            state: LifecycleState::Uninitialized,
            pending: Vec::new(),
            inner: None,
            ledger: RefLedger::new(),
        }
    }

    /// Create an uninitialized runtime with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(BridgeConfig::default())
    }

    /// Record a runtime-home override.
    ///
    /// Consulted at `initialize()` time; an explicit override always beats
    /// the environment variable and the baked-in default.
    pub fn configure(&mut self, home_override: Option<PathBuf>) {
        self.config.home_override = home_override;
    }

    /// Add a native module to the pending startup table.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::AlreadyInitialized`] once `initialize()` has
    /// succeeded; the startup table is sealed after boot.
    pub fn register_native_module(
        &mut self,
        descriptor: NativeModuleDescriptor,
    ) -> Result<(), BridgeError> {
        if self.state != LifecycleState::Uninitialized {
            return Err(BridgeError::AlreadyInitialized);
        }

        debug!(module = descriptor.name(), "native module registered");
        self.pending.push(descriptor);
        Ok(())
    }

    /// Boot the runtime.
    ///
    /// Resolves the runtime home, installs every pending native module into
    /// the linker, creates the engine, then appends the current working
    /// directory to the module search path. Existing search-path entries are
    /// never removed or reordered.
    ///
    /// # Errors
    ///
    /// - [`BridgeError::AlreadyInitialized`] if the runtime is not
    ///   Uninitialized
    /// - [`BridgeError::HomeOverrideInvalid`] if an explicit or environment
    ///   home override does not name a directory
    /// - [`BridgeError::Boot`] if the engine cannot be created, a native
    ///   module cannot be installed, or the working directory is unavailable
    pub fn initialize(&mut self) -> Result<(), BridgeError> {
        if self.state != LifecycleState::Uninitialized {
            return Err(BridgeError::AlreadyInitialized);
        }

        let home = self.config.resolved_home()?;

        let mut wasmtime_config = Config::new();
        wasmtime_config.cranelift_opt_level(OptLevel::Speed);
        let engine = Engine::new(&wasmtime_config)
            .map_err(|e| BridgeError::boot(format!("engine creation failed: {e}")))?;

        let mut linker: Linker<CallContext> = Linker::new(&engine);
        for descriptor in &self.pending {
            descriptor.install(&engine, &mut linker)?;
        }

        let mut search_path = Vec::new();
        if let Some(home) = &home {
            search_path.push(home.clone());
        }
        let cwd = std::env::current_dir()
            .map_err(|e| BridgeError::boot(format!("working directory unavailable: {e}")))?;
        search_path.push(cwd);

        info!(
            home = ?home,
            native_modules = self.pending.len(),
            "runtime initialized"
        );

        self.inner = Some(RuntimeInner {
            engine,
            linker,
            search_path,
        });
        self.state = LifecycleState::Initialized;
        Ok(())
    }

    /// Tear the runtime down.
    ///
    /// Valid only after all invocations have completed and released their
    /// references. From the Initialized state the runtime is considered torn
    /// down once this returns, even when a sub-error is reported.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Finalize`] if the runtime was not Initialized,
    /// or if per-call foreign references were still outstanding at teardown.
    pub fn finalize(&mut self) -> Result<(), BridgeError> {
        match self.state {
            LifecycleState::Uninitialized => {
                return Err(BridgeError::finalize("runtime was never initialized"));
            }
            LifecycleState::Finalized => {
                return Err(BridgeError::finalize("runtime already finalized"));
            }
            LifecycleState::Initialized => {}
        }

        let outstanding = self.ledger.outstanding();
        self.inner = None;
        self.state = LifecycleState::Finalized;

        if outstanding > 0 {
            warn!(outstanding, "finalized with foreign references outstanding");
            return Err(BridgeError::finalize(format!(
                "{outstanding} foreign reference(s) still outstanding"
            )));
        }

        info!("runtime finalized");
        Ok(())
    }

    /// Obtain an invoker for one or more call sequences.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotInitialized`] while the runtime is not in
    /// the Initialized state.
    pub fn invoker(&self) -> Result<ScriptInvoker<'_>, BridgeError> {
        match (&self.state, &self.inner) {
            (LifecycleState::Initialized, Some(inner)) => Ok(ScriptInvoker::new(
                inner,
                &self.config,
                self.ledger.clone(),
            )),
            _ => Err(BridgeError::NotInitialized),
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// The reference ledger shared with per-call handles.
    pub fn ledger(&self) -> &RefLedger {
        &self.ledger
    }

    /// The module search path, while Initialized.
    pub fn search_path(&self) -> Option<&[PathBuf]> {
        self.inner.as_ref().map(|inner| inner.search_path.as_slice())
    }
}

impl std::fmt::Debug for ScriptRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptRuntime")
            .field("state", &self.state)
            .field("pending_modules", &self.pending.len())
            .field("outstanding_refs", &self.ledger.outstanding())
            .finish_non_exhaustive()
    }
}
