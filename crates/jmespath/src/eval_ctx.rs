use crate::error::JmesError;
use crate::runtime::{Runtime, UnknownFunctionResolver};
use crate::scope::ScopeChain;
use crate::value::{ExprRef, Value};
use std::fmt;
use std::sync::Arc;

/// Host-supplied settings for a search.
#[derive(Clone, Default)]
pub struct SearchOptions {
    /// Called for function names the runtime does not know.
    pub resolve_unknown_function: Option<Arc<UnknownFunctionResolver>>,
    /// Maximum interpreter recursion depth. `None` means unbounded by this
    /// setting.
    pub max_depth: Option<usize>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_resolver<F>(mut self, resolver: F) -> Self
    where
        F: for<'a> Fn(&str, Vec<Value>, &mut EvalCtx<'a>) -> Result<Value, JmesError>
            + Send
            + Sync
            + 'static,
    {
        self.resolve_unknown_function = Some(Arc::new(resolver));
        self
    }

    /// Bounds interpreter recursion. Parsing has its own fixed bound,
    /// [`MAX_NESTING`](crate::parser::MAX_NESTING), applied before this one.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }
}

impl fmt::Debug for SearchOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchOptions")
            .field("resolve_unknown_function", &self.resolve_unknown_function.is_some())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

/// State of one evaluation session, passed to the interpreter and to every
/// function call.
///
/// A context is confined to a single evaluation; `let` pushes frames onto
/// its scope chain.
pub struct EvalCtx<'a> {
    /// `let` bindings visible to field lookups.
    pub scope: &'a mut ScopeChain,
    /// Function registry used for `Function` nodes.
    pub runtime: Arc<Runtime>,
    resolve_unknown_function: Option<Arc<UnknownFunctionResolver>>,
    max_depth: Option<usize>,
    depth: usize,
}

impl<'a> EvalCtx<'a> {
    pub fn new(scope: &'a mut ScopeChain, runtime: Arc<Runtime>) -> Self {
        EvalCtx {
            scope,
            runtime,
            resolve_unknown_function: None,
            max_depth: None,
            depth: 0,
        }
    }

    pub fn with_options(mut self, options: &SearchOptions) -> Self {
        self.resolve_unknown_function = options.resolve_unknown_function.clone();
        self.max_depth = options.max_depth;
        self
    }

    pub fn resolver(&self) -> Option<Arc<UnknownFunctionResolver>> {
        self.resolve_unknown_function.clone()
    }

    /// Evaluates an expression reference against `value`.
    pub fn eval_expref(&mut self, expref: &ExprRef, value: &Value) -> Result<Value, JmesError> {
        crate::evaluate(&expref.node, value, self)
    }

    /// Evaluates an expression reference against the value it captured.
    pub fn eval_expref_in_context(&mut self, expref: &ExprRef) -> Result<Value, JmesError> {
        crate::evaluate(&expref.node, &expref.context, self)
    }

    pub(crate) fn enter(&mut self) -> Result<(), JmesError> {
        self.depth += 1;
        match self.max_depth {
            Some(max) if self.depth > max => {
                self.depth -= 1;
                Err(JmesError::Runtime(format!("maximum evaluation depth of {max} exceeded")))
            }
            _ => Ok(()),
        }
    }

    pub(crate) fn leave(&mut self) {
        self.depth -= 1;
    }
}
