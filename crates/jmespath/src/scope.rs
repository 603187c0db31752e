use crate::value::{Map, Value};

/// Stack of `let` binding frames.
///
/// Lookup walks from the innermost frame outward and returns the first
/// binding found.
#[derive(Debug, Default)]
pub struct ScopeChain {
    frames: Vec<Map>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: Map) {
        self.frames.push(frame);
    }

    pub fn pop(&mut self) {
        self.frames.pop();
    }

    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.frames.iter().rev().find_map(|frame| frame.get(name))
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(pairs: &[(&str, i64)]) -> Map {
        pairs.iter().map(|(k, v)| (k.to_string(), Value::from(*v))).collect()
    }

    #[test]
    fn innermost_binding_wins() {
        let mut scope = ScopeChain::new();
        scope.push(frame(&[("a", 1), ("b", 2)]));
        scope.push(frame(&[("a", 10)]));
        assert_eq!(scope.resolve("a"), Some(&Value::from(10i64)));
        assert_eq!(scope.resolve("b"), Some(&Value::from(2i64)));
        assert_eq!(scope.resolve("c"), None);

        scope.pop();
        assert_eq!(scope.resolve("a"), Some(&Value::from(1i64)));
        scope.pop();
        assert_eq!(scope.depth(), 0);
        assert_eq!(scope.resolve("a"), None);
    }

    #[test]
    fn null_binding_is_still_a_binding() {
        let mut scope = ScopeChain::new();
        scope.push(frame(&[("a", 1)]));
        let mut inner = Map::new();
        inner.insert("a".into(), Value::Null);
        scope.push(inner);
        assert_eq!(scope.resolve("a"), Some(&Value::Null));
    }
}
