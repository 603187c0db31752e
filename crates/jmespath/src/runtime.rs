//! Function registry and argument type checking.

use crate::error::JmesError;
use crate::eval_ctx::EvalCtx;
use crate::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Semantic parameter types accepted by builtin signatures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgType {
    Any,
    Number,
    String,
    Array,
    ArrayNumber,
    ArrayString,
    Object,
    Boolean,
    Expref,
    Null,
}

impl ArgType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ArgType::Any => true,
            ArgType::Number => matches!(value, Value::Number(_)),
            ArgType::String => matches!(value, Value::String(_)),
            ArgType::Array => matches!(value, Value::Array(_)),
            ArgType::ArrayNumber => match value {
                Value::Array(items) => items.iter().all(|v| ArgType::Number.matches(v)),
                _ => false,
            },
            ArgType::ArrayString => match value {
                Value::Array(items) => items.iter().all(|v| ArgType::String.matches(v)),
                _ => false,
            },
            ArgType::Object => matches!(value, Value::Object(_)),
            ArgType::Boolean => matches!(value, Value::Bool(_)),
            ArgType::Expref => matches!(value, Value::Expref(_)),
            ArgType::Null => matches!(value, Value::Null),
        }
    }
}

impl fmt::Display for ArgType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArgType::Any => "any",
            ArgType::Number => "number",
            ArgType::String => "string",
            ArgType::Array => "array",
            ArgType::ArrayNumber => "array-number",
            ArgType::ArrayString => "array-string",
            ArgType::Object => "object",
            ArgType::Boolean => "boolean",
            ArgType::Expref => "expref",
            ArgType::Null => "null",
        };
        f.write_str(name)
    }
}

/// One parameter of a function signature.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub types: &'static [ArgType],
    /// Only meaningful on the last parameter.
    pub variadic: bool,
}

impl ParamSpec {
    pub const fn of(types: &'static [ArgType]) -> Self {
        ParamSpec { types, variadic: false }
    }

    pub const fn variadic(types: &'static [ArgType]) -> Self {
        ParamSpec { types, variadic: true }
    }

    fn expected(&self) -> String {
        self.types.iter().map(ArgType::to_string).collect::<Vec<_>>().join("|")
    }
}

/// Builtin implementation. Arguments have already been evaluated and checked
/// against the signature.
pub type EvalFn = for<'a> fn(Vec<Value>, &mut EvalCtx<'a>) -> Result<Value, JmesError>;

pub struct FunctionDefinition {
    pub name: &'static str,
    pub signature: &'static [ParamSpec],
    pub eval_fn: EvalFn,
}

impl fmt::Debug for FunctionDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionDefinition")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish()
    }
}

/// Hook for function names absent from the registry.
pub type UnknownFunctionResolver =
    dyn for<'a> Fn(&str, Vec<Value>, &mut EvalCtx<'a>) -> Result<Value, JmesError> + Send + Sync;

/// Checks arity (exact, or at least N with a variadic tail) and per-position
/// types. Variadic extras are checked against the last parameter.
pub fn validate_args(
    name: &str,
    signature: &[ParamSpec],
    args: &[Value],
) -> Result<(), JmesError> {
    let variadic = signature.last().is_some_and(|p| p.variadic);
    if (variadic && args.len() < signature.len()) || (!variadic && args.len() != signature.len()) {
        return Err(JmesError::arity(name, signature.len(), variadic, args.len()));
    }
    for (i, arg) in args.iter().enumerate() {
        let spec = signature.get(i).or(signature.last());
        let Some(spec) = spec else { break };
        if !spec.types.iter().any(|t| t.matches(arg)) {
            return Err(JmesError::type_error(name, i + 1, spec.expected(), arg.type_name()));
        }
    }
    Ok(())
}

/// Registry of named functions, kept in registration order.
#[derive(Debug, Default, Clone)]
pub struct Runtime {
    functions: IndexMap<&'static str, Arc<FunctionDefinition>>,
}

impl Runtime {
    /// A registry with no functions.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding every builtin.
    pub fn builtins() -> Self {
        let mut runtime = Self::empty();
        for def in crate::functions::all_functions() {
            runtime.register(def);
        }
        runtime
    }

    /// Process-wide builtin registry.
    pub fn shared() -> Arc<Runtime> {
        static SHARED: OnceLock<Arc<Runtime>> = OnceLock::new();
        Arc::clone(SHARED.get_or_init(|| Arc::new(Runtime::builtins())))
    }

    /// Adds or replaces a function.
    pub fn register(&mut self, def: Arc<FunctionDefinition>) {
        self.functions.insert(def.name, def);
    }

    pub fn get(&self, name: &str) -> Option<&Arc<FunctionDefinition>> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.functions.keys().copied()
    }

    /// Validates and invokes `name`. Unknown names go to the context's
    /// resolver, if any.
    pub fn call(&self, name: &str, args: Vec<Value>, ctx: &mut EvalCtx<'_>) -> Result<Value, JmesError> {
        let Some(def) = self.functions.get(name) else {
            return match ctx.resolver() {
                Some(resolver) => {
                    tracing::debug!(function = name, "delegating to unknown-function resolver");
                    (*resolver)(name, args, ctx)
                }
                None => Err(JmesError::UnknownFunction(name.to_string())),
            };
        };
        tracing::trace!(function = name, argc = args.len(), "call");
        validate_args(def.name, def.signature, &args)?;
        (def.eval_fn)(args, ctx)
    }
}
