//! Scalar marshaling across the host/guest boundary.
//!
//! The value domain exchanged with guest code is a single integer scalar per
//! argument and per return value, carried as wasm `i64`. Richer types are
//! deliberately unsupported; [`check_signature`] rejects any function whose
//! declared type falls outside that domain before the call is attempted.

use wasmtime::{FuncType, Val, ValType};

use scriptbridge_common::BridgeError;

/// An ordered sequence of marshaled scalar arguments.
///
/// Constructed fresh per call and consumed by the call.
#[derive(Debug, Clone, Default)]
pub struct ArgumentList {
    values: Vec<i64>,
}

impl ArgumentList {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one scalar argument.
    pub fn push(&mut self, value: i64) {
        self.values.push(value);
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the list holds no arguments.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Marshal every argument into its foreign representation, in order.
    pub fn marshal(&self) -> Vec<Val> {
        self.values.iter().map(|v| Val::I64(*v)).collect()
    }
}

impl From<&[i64]> for ArgumentList {
    fn from(values: &[i64]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

impl<const N: usize> From<[i64; N]> for ArgumentList {
    fn from(values: [i64; N]) -> Self {
        Self {
            values: values.to_vec(),
        }
    }
}

/// Check that a foreign function's declared type fits the scalar boundary.
///
/// The function must take exactly `arg_count` `i64` parameters and return
/// exactly one `i64`.
///
/// # Errors
///
/// Returns [`BridgeError::ArgumentMarshal`] describing the first mismatch.
pub fn check_signature(ty: &FuncType, arg_count: usize) -> Result<(), BridgeError> {
    let params: Vec<ValType> = ty.params().collect();
    if params.len() != arg_count {
        return Err(BridgeError::marshal(format!(
            "function takes {} argument(s), {} supplied",
            params.len(),
            arg_count
        )));
    }
    if let Some(pos) = params.iter().position(|p| !matches!(p, ValType::I64)) {
        return Err(BridgeError::marshal(format!(
            "parameter {pos} is {}, only i64 scalars are supported",
            params[pos]
        )));
    }

    let results: Vec<ValType> = ty.results().collect();
    if results.len() != 1 || !matches!(results[0], ValType::I64) {
        return Err(BridgeError::marshal(
            "function must return exactly one i64 scalar",
        ));
    }

    Ok(())
}

/// Unmarshal the single returned scalar back into a host integer.
///
/// # Errors
///
/// Returns [`BridgeError::ArgumentMarshal`] if the result slot does not hold
/// a single `i64` (ruled out up front by [`check_signature`], but the result
/// buffer is still checked rather than coerced).
pub fn unmarshal_return(results: &[Val]) -> Result<i64, BridgeError> {
    match results {
        [value] => value
            .i64()
            .ok_or_else(|| BridgeError::marshal("return value is not an i64 scalar")),
        _ => Err(BridgeError::marshal(format!(
            "expected one return value, got {}",
            results.len()
        ))),
    }
}
