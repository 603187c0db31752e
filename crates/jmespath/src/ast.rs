//! Expression AST produced by the parser.

use crate::value::Value;
use std::fmt;
use std::sync::Arc;

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Equal,        // ==
    NotEqual,     // !=
    Less,         // <
    LessEqual,    // <=
    Greater,      // >
    GreaterEqual, // >=
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            Comparator::Equal => "==",
            Comparator::NotEqual => "!=",
            Comparator::Less => "<",
            Comparator::LessEqual => "<=",
            Comparator::Greater => ">",
            Comparator::GreaterEqual => ">=",
        };
        f.write_str(op)
    }
}

/// One `key: expression` entry of a multiselect hash.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValuePair {
    pub key: String,
    pub value: Ast,
}

/// A node of a compiled expression.
///
/// The tree is immutable once built. `ExpressionReference` holds its child
/// behind an `Arc` so evaluating it only clones a pointer.
#[derive(Debug, Clone, PartialEq)]
pub enum Ast {
    /// `foo`, `"foo"`
    Field { name: String },
    /// `lhs.rhs`
    Subexpression { lhs: Box<Ast>, rhs: Box<Ast> },
    /// `[2]`, `[-1]`
    Index { index: i64 },
    /// `[start:stop:step]`, every part optional
    Slice {
        start: Option<i64>,
        stop: Option<i64>,
        step: Option<i64>,
    },
    /// `lhs[...]` where rhs is an `Index` or `Slice`
    IndexExpression { lhs: Box<Ast>, rhs: Box<Ast> },
    /// Array projection: `lhs[*].rhs`, `lhs[].rhs`, `lhs[1:].rhs`
    Projection { lhs: Box<Ast>, rhs: Box<Ast> },
    /// Object value projection: `lhs.*.rhs`
    ValueProjection { lhs: Box<Ast>, rhs: Box<Ast> },
    /// `lhs[?condition].rhs`
    FilterProjection {
        lhs: Box<Ast>,
        rhs: Box<Ast>,
        condition: Box<Ast>,
    },
    /// `node[]`
    Flatten { node: Box<Ast> },
    Comparator {
        op: Comparator,
        lhs: Box<Ast>,
        rhs: Box<Ast>,
    },
    Or { lhs: Box<Ast>, rhs: Box<Ast> },
    And { lhs: Box<Ast>, rhs: Box<Ast> },
    Not { node: Box<Ast> },
    /// `` `json` `` or `'raw string'`
    Literal { value: Value },
    /// `lhs | rhs`
    Pipe { lhs: Box<Ast>, rhs: Box<Ast> },
    /// `@`
    Current,
    /// Implicit current node, introduced by the parser.
    Identity,
    /// `[a, b]`
    MultiSelectList { elements: Vec<Ast> },
    /// `{a: x, b: y}`
    MultiSelectHash { pairs: Vec<KeyValuePair> },
    /// `name(arg, ...)`
    Function { name: String, args: Vec<Ast> },
    /// `&expr`
    ExpressionReference { node: Arc<Ast> },
}

impl Ast {
    pub(crate) fn boxed(self) -> Box<Ast> {
        Box::new(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_display() {
        assert_eq!(Comparator::LessEqual.to_string(), "<=");
        assert_eq!(Comparator::NotEqual.to_string(), "!=");
    }

    #[test]
    fn expression_reference_shares_subtree() {
        let inner = Arc::new(Ast::Field { name: "a".into() });
        let node = Ast::ExpressionReference { node: Arc::clone(&inner) };
        let copy = node.clone();
        match (node, copy) {
            (Ast::ExpressionReference { node: a }, Ast::ExpressionReference { node: b }) => {
                assert!(Arc::ptr_eq(&a, &b));
            }
            _ => unreachable!(),
        }
    }
}
