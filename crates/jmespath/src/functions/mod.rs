//! Builtin function catalogue.

pub mod collection;
pub mod conversion;
pub mod higher_order;
pub mod math;
pub mod string;

use crate::error::JmesError;
use crate::runtime::FunctionDefinition;
use crate::value::{ExprRef, Map, Value};
use std::sync::Arc;

/// Every builtin.
pub fn all_functions() -> Vec<Arc<FunctionDefinition>> {
    let mut fns = Vec::new();
    fns.extend(math::functions());
    fns.extend(collection::functions());
    fns.extend(string::functions());
    fns.extend(conversion::functions());
    fns.extend(higher_order::functions());
    fns
}

// Argument accessors. Signatures are checked before a builtin runs, so a
// mismatch here only happens when a host registers an inconsistent
// definition; it is still reported as a type error rather than a panic.

pub(crate) fn number_arg(function: &str, position: usize, value: &Value) -> Result<f64, JmesError> {
    value
        .as_f64()
        .ok_or_else(|| JmesError::type_error(function, position, "number", value.type_name()))
}

pub(crate) fn array_arg<'v>(
    function: &str,
    position: usize,
    value: &'v Value,
) -> Result<&'v [Value], JmesError> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(JmesError::type_error(function, position, "array", other.type_name())),
    }
}

pub(crate) fn string_arg<'v>(
    function: &str,
    position: usize,
    value: &'v Value,
) -> Result<&'v str, JmesError> {
    match value {
        Value::String(s) => Ok(s),
        other => Err(JmesError::type_error(function, position, "string", other.type_name())),
    }
}

pub(crate) fn object_arg<'v>(
    function: &str,
    position: usize,
    value: &'v Value,
) -> Result<&'v Map, JmesError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(JmesError::type_error(function, position, "object", other.type_name())),
    }
}

pub(crate) fn expref_arg<'v>(
    function: &str,
    position: usize,
    value: &'v Value,
) -> Result<&'v ExprRef, JmesError> {
    match value {
        Value::Expref(expref) => Ok(expref),
        other => Err(JmesError::type_error(function, position, "expref", other.type_name())),
    }
}
