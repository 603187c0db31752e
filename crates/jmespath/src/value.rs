//! [`Value`], the JSON-like value type queries are evaluated against.
//!
//! Besides the JSON primitives it carries [`ExprRef`], the closure produced by
//! `&expr`, so expression references can travel through argument lists like
//! any other value.

use crate::ast::Ast;
use indexmap::IndexMap;
use serde_json::Number;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// Insertion-ordered object representation.
pub type Map = IndexMap<String, Value>;

/// An unevaluated expression paired with the value it was captured against.
#[derive(Debug, Clone, PartialEq)]
pub struct ExprRef {
    pub node: Arc<Ast>,
    pub context: Box<Value>,
}

impl ExprRef {
    pub fn new(node: Arc<Ast>, context: Value) -> Self {
        ExprRef { node, context: Box::new(context) }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<Value>),
    Object(Map),
    Expref(ExprRef),
}

impl Value {
    /// Builds a number, emitting integral values as integers. Non-finite
    /// results have no JSON representation and become `Null`.
    pub fn from_f64(n: f64) -> Value {
        if n.is_finite() && n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
            return Value::Number(Number::from(n as i64));
        }
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }

    /// Semantic type name, as reported by `type()` and in type errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
            Value::Expref(_) => "expref",
        }
    }

    /// `""`, `false`, `null`, `[]` and `{}` are false; everything else,
    /// including `0`, is true.
    pub fn is_false(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::String(s) => s.is_empty(),
            Value::Array(a) => a.is_empty(),
            Value::Object(o) => o.is_empty(),
            Value::Number(_) | Value::Expref(_) => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Map> {
        match self {
            Value::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Canonical JSON text. Expression references encode as `null`.
    pub fn to_json_string(&self) -> String {
        serde_json::Value::from(self.clone()).to_string()
    }
}

/// Structural equality: same type, scalars by value, arrays element-wise,
/// objects by key set regardless of order. Numbers compare numerically.
pub fn deep_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Null, Value::Null) => true,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Array(a), Value::Array(b)) => {
            a.len() == b.len() && a.iter().zip(b).all(|(x, y)| deep_equal(x, y))
        }
        (Value::Object(a), Value::Object(b)) => {
            if a.len() != b.len() {
                return false;
            }
            a.iter().all(|(key, val_a)| match b.get(key) {
                Some(val_b) => deep_equal(val_a, val_b),
                None => false,
            })
        }
        (Value::Expref(a), Value::Expref(b)) => {
            Arc::ptr_eq(&a.node, &b.node) && deep_equal(&a.context, &b.context)
        }
        _ => false,
    }
}

/// Ordering used by `<`, `<=`, `>`, `>=`. Only numbers, strings and
/// booleans are ordered, and only against their own type.
pub fn native_cmp(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_json_string())
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(arr) => {
                Value::Array(arr.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(obj) => {
                Value::Object(obj.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        Value::from(v.clone())
    }
}

impl From<Value> for serde_json::Value {
    fn from(v: Value) -> Self {
        match v {
            Value::Null | Value::Expref(_) => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Number(n) => serde_json::Value::Number(n),
            Value::String(s) => serde_json::Value::String(s),
            Value::Array(arr) => {
                serde_json::Value::Array(arr.into_iter().map(serde_json::Value::from).collect())
            }
            Value::Object(obj) => serde_json::Value::Object(
                obj.into_iter()
                    .map(|(k, v)| (k, serde_json::Value::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}
