//! Runtime-home environment override tests.
//!
//! These live in their own test binary (and behind a local mutex) because
//! they mutate `SCRIPTBRIDGE_HOME`, which is process-global state.

#![allow(unsafe_code)]

use std::sync::Mutex;

use scriptbridge_common::{BridgeConfig, BridgeError, HOME_ENV_VAR};
use scriptbridge_core::ScriptRuntime;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const COMPUTE_WAT: &str = r#"
    (module
        (func (export "compute") (param i64 i64) (result i64)
            (i64.add (local.get 0) (local.get 1))
        )
    )
"#;

#[test]
fn test_env_home_is_searched() {
    let _guard = ENV_LOCK.lock().unwrap();

    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("guest.wat"), COMPUTE_WAT).unwrap();

    // SAFETY: serialized behind ENV_LOCK; this binary runs no other threads
    // touching the environment.
    unsafe { std::env::set_var(HOME_ENV_VAR, dir.path()) };

    let mut runtime = ScriptRuntime::with_defaults();
    runtime.initialize().unwrap();

    let value = runtime
        .invoker()
        .unwrap()
        .invoke("guest", "compute", [3, 8])
        .unwrap();
    assert_eq!(value, 11);

    unsafe { std::env::remove_var(HOME_ENV_VAR) };
    runtime.finalize().unwrap();
}

#[test]
fn test_invalid_env_home_rejected() {
    let _guard = ENV_LOCK.lock().unwrap();

    // SAFETY: serialized behind ENV_LOCK.
    unsafe { std::env::set_var(HOME_ENV_VAR, "/definitely/not/a/dir") };

    let mut runtime = ScriptRuntime::with_defaults();
    let result = runtime.initialize();

    unsafe { std::env::remove_var(HOME_ENV_VAR) };

    assert!(matches!(
        result,
        Err(BridgeError::HomeOverrideInvalid { .. })
    ));
}

#[test]
fn test_explicit_override_beats_env() {
    let _guard = ENV_LOCK.lock().unwrap();

    let home = tempfile::tempdir().unwrap();
    std::fs::write(home.path().join("guest.wat"), COMPUTE_WAT).unwrap();

    // The environment points somewhere invalid; the explicit override wins,
    // so initialization must still succeed.
    // SAFETY: serialized behind ENV_LOCK.
    unsafe { std::env::set_var(HOME_ENV_VAR, "/definitely/not/a/dir") };

    let config = BridgeConfig {
        home_override: Some(home.path().to_path_buf()),
        ..Default::default()
    };
    let mut runtime = ScriptRuntime::new(config);
    let result = runtime.initialize();

    unsafe { std::env::remove_var(HOME_ENV_VAR) };

    result.unwrap();
    let value = runtime
        .invoker()
        .unwrap()
        .invoke("guest", "compute", [3, 8])
        .unwrap();
    assert_eq!(value, 11);
}
