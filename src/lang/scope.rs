/// Context markers tracked while reading a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    OpenParens,
    OpenBraces,
    OpenBrackets,
    If,
    OuterIf,
    ElseIf,
    Until,
    For,
    DefFn,
    DefFnSig,
    DefFnArgs,
    IntExpression,
    IntParens,
    FloatExpression,
    Modifier,
    StringExpression,
    SgnExpression,
    Print,
    SemiColonAllowed,
    Assignment,
    Comparator,
    Operator,
    Operation,
    ParamSep,
}

impl Scope {
    pub fn is_open(self) -> bool {
        match self {
            Scope::OpenParens | Scope::OpenBraces | Scope::OpenBrackets => true,
            _ => false,
        }
    }
}

/// A statement-scoped stack of [`Scope`] markers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScopeStack(Vec<Scope>);

impl ScopeStack {
    pub fn new() -> ScopeStack {
        ScopeStack(vec![])
    }

    pub fn push(&mut self, scope: Scope) {
        self.0.push(scope)
    }

    pub fn pop(&mut self) -> Option<Scope> {
        self.0.pop()
    }

    pub fn last(&self) -> Option<Scope> {
        self.0.last().copied()
    }

    pub fn get(&self, index: usize) -> Option<Scope> {
        self.0.get(index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn includes(&self, scope: Scope) -> bool {
        self.0.contains(&scope)
    }

    pub fn clear(&mut self) {
        self.0.clear()
    }

    /// Pop everything down to and including the nearest `scope`. When the
    /// marker is absent the stack is emptied and false is returned.
    pub fn pop_to(&mut self, scope: Scope) -> bool {
        while let Some(last) = self.0.pop() {
            if last == scope {
                return true;
            }
        }
        false
    }

    /// True when the newest `value` sits above the newest `before`.
    /// A missing `value` is never after; a missing `before` always is.
    pub fn state_is_after(&self, value: Scope, before: Scope) -> bool {
        let position = |s: Scope| self.0.iter().rposition(|x| *x == s);
        match (position(value), position(before)) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some(v), Some(b)) => v > b,
        }
    }

    /// The oldest unclosed bracket of any kind.
    pub fn first_open(&self) -> Option<Scope> {
        self.0.iter().copied().find(|s| s.is_open())
    }

    /// Re-enter an integer expression after leaving a nested float context,
    /// restoring the bracket that opened directly inside it.
    pub fn restart_int_expression(&mut self) {
        let index = match self.0.iter().rposition(|s| *s == Scope::IntExpression) {
            Some(index) => index,
            None => return,
        };
        let reopen = self.0.get(index + 1).copied().filter(|s| s.is_open());
        self.pop_to(Scope::IntExpression);
        self.push(Scope::IntExpression);
        if let Some(scope) = reopen {
            self.push(scope);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pop_to() {
        let mut s = ScopeStack::new();
        s.push(Scope::If);
        s.push(Scope::OpenParens);
        s.push(Scope::IntExpression);
        assert!(s.pop_to(Scope::OpenParens));
        assert_eq!(s.last(), Some(Scope::If));
        assert!(!s.pop_to(Scope::OpenBraces));
        assert!(s.is_empty());
    }

    #[test]
    fn test_state_is_after() {
        let mut s = ScopeStack::new();
        s.push(Scope::Print);
        s.push(Scope::SemiColonAllowed);
        assert!(s.state_is_after(Scope::SemiColonAllowed, Scope::OpenParens));
        s.push(Scope::OpenParens);
        assert!(!s.state_is_after(Scope::SemiColonAllowed, Scope::OpenParens));
        assert!(!s.state_is_after(Scope::IntExpression, Scope::Print));
    }

    #[test]
    fn test_restart_int_expression() {
        let mut s = ScopeStack::new();
        s.push(Scope::IntExpression);
        s.push(Scope::OpenParens);
        s.push(Scope::Operation);
        s.restart_int_expression();
        assert_eq!(s.len(), 2);
        assert_eq!(s.first_open(), Some(Scope::OpenParens));
    }
}
