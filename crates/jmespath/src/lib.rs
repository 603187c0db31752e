//! JMESPath query language for JSON documents.
//!
//! # Overview
//!
//! An expression string is tokenized by [`Lexer`], parsed into an [`Ast`] by
//! the Pratt [`Parser`], and evaluated against a [`Value`] by [`evaluate`].
//! Function calls dispatch through a [`Runtime`] registry of builtins, with an
//! optional host resolver for names the registry does not know.
//!
//! # Example
//!
//! ```
//! use jmespath::search_json;
//! use serde_json::json;
//!
//! let data = json!({"people": [{"name": "a", "age": 30}, {"name": "b", "age": 10}]});
//! let result = search_json(&data, "people[?age > `20`].name").unwrap();
//!
//! assert_eq!(result, json!(["a"]));
//! ```

pub mod ast;
pub mod error;
pub mod eval_ctx;
pub mod evaluate;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod runtime;
pub mod scope;
pub mod value;

pub use ast::{Ast, Comparator, KeyValuePair};
pub use error::{ErrorKind, JmesError};
pub use eval_ctx::{EvalCtx, SearchOptions};
pub use evaluate::evaluate;
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::Parser;
pub use runtime::{ArgType, EvalFn, FunctionDefinition, ParamSpec, Runtime, UnknownFunctionResolver};
pub use scope::ScopeChain;
pub use value::{deep_equal, ExprRef, Map, Value};

/// Splits `text` into tokens. The end-of-input token is not included.
pub fn tokenize(text: &str) -> Result<Vec<Token>, JmesError> {
    Lexer::tokenize(text)
}

/// Parses `text` into an expression tree.
#[tracing::instrument(level = "debug", err(level = "debug"))]
pub fn compile(text: &str) -> Result<Ast, JmesError> {
    Parser::parse(text)
}

/// Compiles `text` and evaluates it against `value` with the builtin runtime.
pub fn search(value: &Value, text: &str) -> Result<Value, JmesError> {
    search_with(value, text, &SearchOptions::default())
}

/// Like [`search`], with host-supplied options.
#[tracing::instrument(level = "debug", skip(value), err(level = "debug"))]
pub fn search_with(value: &Value, text: &str, options: &SearchOptions) -> Result<Value, JmesError> {
    let ast = compile(text)?;
    let mut scope = ScopeChain::new();
    let mut ctx = EvalCtx::new(&mut scope, Runtime::shared()).with_options(options);
    evaluate(&ast, value, &mut ctx)
}

/// Runs [`search`] on `serde_json` values.
pub fn search_json(value: &serde_json::Value, text: &str) -> Result<serde_json::Value, JmesError> {
    search(&Value::from(value), text).map(serde_json::Value::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing::span::{Attributes, Id, Record};
    use tracing::{Event, Level, Metadata, Subscriber};

    /// Collects the level of every event it sees.
    struct RecordedLevels(Arc<Mutex<Vec<Level>>>);

    impl Subscriber for RecordedLevels {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &Attributes<'_>) -> Id {
            Id::from_u64(1)
        }
        fn record(&self, _: &Id, _: &Record<'_>) {}
        fn record_follows_from(&self, _: &Id, _: &Id) {}
        fn event(&self, event: &Event<'_>) {
            if let Ok(mut levels) = self.0.lock() {
                levels.push(*event.metadata().level());
            }
        }
        fn enter(&self, _: &Id) {}
        fn exit(&self, _: &Id) {}
    }

    #[test]
    fn malformed_queries_are_not_logged_as_errors() {
        let levels = Arc::new(Mutex::new(Vec::new()));
        let subscriber = RecordedLevels(Arc::clone(&levels));
        tracing::subscriber::with_default(subscriber, || {
            assert!(compile("foo[").is_err());
            assert!(search(&Value::Null, "length(1, 2)").is_err());
        });
        let levels = levels.lock().unwrap();
        assert!(levels.contains(&Level::DEBUG));
        assert!(!levels.contains(&Level::ERROR), "{levels:?}");
    }
}
